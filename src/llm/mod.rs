// ABOUTME: LLM module - message model and the client abstraction.
// ABOUTME: Providers live outside this crate and implement LlmClient.

mod client;
mod types;

pub use client::*;
pub use types::*;
