// ABOUTME: Defines the LlmClient trait - the seam between the agent loop
// ABOUTME: and whatever model provider the embedder plugs in.

use async_trait::async_trait;

use super::{Message, Response, ToolDefinition};
use crate::error::LlmError;

/// Trait for model client implementations.
///
/// The agent loop passes the full history and every registered tool
/// definition on each call. Deadlines are enforced by the caller.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one inference step.
    async fn invoke(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Response, LlmError>;
}
