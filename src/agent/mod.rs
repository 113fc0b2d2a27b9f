// ABOUTME: Agent module - the session loop plus its history, storage,
// ABOUTME: and retrieval collaborators.

mod history;
mod retrieval;
mod runner;
mod store;

pub use history::{sanitize, trim_history, validate_input};
pub use retrieval::{ContextMode, ContextRetriever};
pub use runner::{Agent, AgentBuilder, MAX_ITERATIONS_MESSAGE, TurnResult, TurnStop};
pub use store::{HistoryStore, JsonFileHistoryStore, MemoryHistoryStore};

#[cfg(test)]
mod store_test;
