// ABOUTME: Core types for model communication - messages, tool calls,
// ABOUTME: tool definitions, and model responses.

use serde::{Deserialize, Serialize};

/// Role of a message in the conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    Human,
    Ai,
    ToolResult,
}

/// A model-requested invocation of a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier, unique within a turn.
    pub id: String,

    /// Name of the requested tool.
    pub name: String,

    /// JSON arguments, normally an object.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Create a tool call.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// A conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,

    /// Calls requested by an AI message, in request order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// The call a ToolResult message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Set on human messages that carry tool output instead of user input.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub injected: bool,
}

impl Message {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            injected: false,
        }
    }

    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::plain(Role::System, text)
    }

    /// Create a human message.
    pub fn human(text: impl Into<String>) -> Self {
        Self::plain(Role::Human, text)
    }

    /// Create an AI message with text content only.
    pub fn ai(text: impl Into<String>) -> Self {
        Self::plain(Role::Ai, text)
    }

    /// Create an AI message carrying tool calls.
    pub fn ai_with_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::plain(Role::Ai, text)
        }
    }

    /// Create a tool result message answering `tool_call_id`.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::plain(Role::ToolResult, content)
        }
    }

    /// Create a human message carrying raw tool output for the model.
    pub fn tool_output(text: impl Into<String>) -> Self {
        Self {
            injected: true,
            ..Self::plain(Role::Human, text)
        }
    }

    /// Whether this message opens a user turn.
    pub fn is_turn_start(&self) -> bool {
        self.role == Role::Human && !self.injected
    }

    /// Whether this is a system message.
    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// Definition of a tool for the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a model invocation: either a final answer or tool calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl Response {
    /// A final answer with no tool calls.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// A response requesting tool calls.
    pub fn with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: text.into(),
            tool_calls,
        }
    }

    /// Check if the response requests any tools.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Convert the response into the AI message recorded in history.
    pub fn into_message(self) -> Message {
        Message::ai_with_calls(self.text, self.tool_calls)
    }
}
