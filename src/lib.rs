// ABOUTME: Root module for toolgate - an approval-gated tool loop for LLM agents.
// ABOUTME: Re-exports the main entry points from submodules.

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod permission;
pub mod prelude;
pub mod security;
pub mod tool;
pub mod tools;

pub use agent::{Agent, TurnResult, TurnStop};
pub use config::Config;
pub use context::AgentContext;
pub use error::ToolgateError;
