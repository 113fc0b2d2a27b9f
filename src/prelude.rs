// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use toolgate::prelude::*;` to get started quickly.

pub use crate::agent::{
    Agent, AgentBuilder, ContextMode, ContextRetriever, HistoryStore, JsonFileHistoryStore,
    MemoryHistoryStore, TurnResult, TurnStop,
};
pub use crate::config::{AgentSettings, Config};
pub use crate::context::AgentContext;
pub use crate::error::{
    AgentError, ConfigError, InputError, LlmError, SandboxError, ToolError, ToolgateError,
};
pub use crate::llm::{LlmClient, Message, Response, Role, ToolCall, ToolDefinition};
pub use crate::permission::{
    AlwaysApprove, AlwaysReject, ApprovalContext, ApprovalEngine, ApprovalHandler,
    ApprovalPolicy, Decision, Denial, PendingApproval, PolicyTable, RiskHint, Verdict,
    approval_channel,
};
pub use crate::security::{CommandClass, CommandClassifier, PathSandbox, RateLimit, RateLimiter};
pub use crate::tool::{Registry, Tool, ToolEffect, ToolResult};
pub use crate::tools::{ListFilesTool, ReadFileTool, ShellTool, WriteFileTool};
