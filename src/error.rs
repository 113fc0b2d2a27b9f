// ABOUTME: Defines all error types for toolgate using thiserror.
// ABOUTME: Each concern has its own error enum, unified under ToolgateError.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level error type for the toolgate library.
#[derive(Debug, thiserror::Error)]
pub enum ToolgateError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
}

/// Errors from model client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Errors from tool registration and execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Execution failed: {0}")]
    Execution(#[source] anyhow::Error),

    #[error("Tool panicked: {0}")]
    Panicked(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidParams(err.to_string())
    }
}

/// Errors from resolving a path inside the sandbox root.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("Path is empty")]
    Empty,

    #[error("Path traversal detected in '{0}'")]
    Traversal(String),

    #[error("Path '{0}' resolves outside the sandbox root")]
    OutsideRoot(String),

    #[error("Failed to resolve '{path}': {source}")]
    Resolve {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid sandbox root '{root}': {reason}", root = .root.display())]
    InvalidRoot { root: PathBuf, reason: String },
}

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Rejection reasons for user input, raised before history is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Input is empty")]
    Empty,

    #[error("Input is too long ({len} characters, maximum is {max})")]
    TooLong { len: usize, max: usize },
}

/// Errors that abort a single agent turn.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Invalid input: {0}")]
    InputValidation(#[from] InputError),

    #[error("Model did not respond within {timeout:?} (iteration {iteration})")]
    LlmTimeout { iteration: usize, timeout: Duration },

    #[error("Model request failed (iteration {iteration}): {source}")]
    Llm {
        iteration: usize,
        #[source]
        source: LlmError,
    },

    #[error("Turn cancelled before iteration {iteration}")]
    Cancelled { iteration: usize },

    #[error("History storage failed: {0}")]
    Storage(#[source] anyhow::Error),
}

impl AgentError {
    /// A short message safe to show the user. Details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AgentError::InputValidation(e) => e.to_string(),
            AgentError::LlmTimeout { .. } => "The model took too long to respond.".to_string(),
            AgentError::Llm { .. } => "The model request failed.".to_string(),
            AgentError::Cancelled { .. } => "The request was cancelled.".to_string(),
            AgentError::Storage(_) => "Conversation history could not be saved.".to_string(),
        }
    }
}
