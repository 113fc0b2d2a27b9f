// ABOUTME: Retrieval collaborator - supplies knowledge-base context that is
// ABOUTME: appended to the model's view of the user's input.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Whether retrieved context is added to user turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    #[default]
    Off,
    Rag,
}

/// Source of context text for a query, e.g. a vector store.
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Context relevant to `query`. An empty string means nothing relevant.
    async fn get_context(&self, query: &str) -> Result<String, anyhow::Error>;
}
