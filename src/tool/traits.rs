// ABOUTME: Defines the Tool trait - the core abstraction for agent capabilities.
// ABOUTME: Tools describe their schema and side effects, and execute asynchronously.

use async_trait::async_trait;

use super::ToolResult;
use crate::error::ToolError;

/// How much a tool can change the world outside the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ToolEffect {
    /// Reads data only.
    ReadOnly,
    /// Writes files or otherwise mutates state.
    Mutating,
    /// Can destroy data or run arbitrary programs.
    Destructive,
}

/// A tool that can be executed by an agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description for the model.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's input parameters.
    fn schema(&self) -> serde_json::Value;

    /// Side-effect class used by the auto approval policies.
    fn effect(&self) -> ToolEffect {
        ToolEffect::Mutating
    }

    /// The command string for shell-like tools.
    ///
    /// Returning `Some` makes the approval engine run the command classifier
    /// on every call, whatever the configured policy.
    fn command(&self, _params: &serde_json::Value) -> Option<String> {
        None
    }

    /// Filesystem paths named by the parameters, checked against the sandbox
    /// before the call is approved.
    fn paths(&self, _params: &serde_json::Value) -> Vec<String> {
        Vec::new()
    }

    /// Whether a successful result should also be shown to the model as a
    /// human message carrying the raw output.
    fn injects_output(&self) -> bool {
        false
    }

    /// Execute the tool with the given parameters.
    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError>;
}
