// ABOUTME: History storage for agent sessions - a trait plus in-memory
// ABOUTME: and one-JSON-file-per-session implementations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::llm::Message;

/// Trait for storing and retrieving session histories.
///
/// Implement this trait to provide custom storage backends
/// (database, remote service, etc.).
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Save the full history of a session, replacing any previous one.
    async fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), anyhow::Error>;

    /// Load a session's history.
    /// Returns None if nothing was stored for the session.
    async fn load(&self, session_id: &str) -> Result<Option<Vec<Message>>, anyhow::Error>;

    /// Delete a session's history.
    async fn delete(&self, session_id: &str) -> Result<(), anyhow::Error>;

    /// List all stored session IDs.
    async fn list(&self) -> Result<Vec<String>, anyhow::Error>;
}

/// In-memory history store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryHistoryStore {
    sessions: RwLock<HashMap<String, Vec<Message>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new store wrapped in Arc for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), anyhow::Error> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), messages.to_vec());
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<Vec<Message>>, anyhow::Error> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn delete(&self, session_id: &str) -> Result<(), anyhow::Error> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, anyhow::Error> {
        Ok(self.sessions.read().await.keys().cloned().collect())
    }
}

/// Stores each session as `<dir>/<session_id>.json`.
///
/// Writes go to a temporary file that is then renamed over the old one.
pub struct JsonFileHistoryStore {
    dir: PathBuf,
}

impl JsonFileHistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> Result<PathBuf, anyhow::Error> {
        let valid = !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            anyhow::bail!("invalid session id '{}'", session_id);
        }
        Ok(self.dir.join(format!("{}.json", session_id)))
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistoryStore {
    async fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), anyhow::Error> {
        let path = self.path_for(session_id)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let json = serde_json::to_vec_pretty(messages)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<Vec<Message>>, anyhow::Error> {
        let path = self.path_for(session_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        let messages = serde_json::from_slice(&bytes)
            .with_context(|| format!("corrupt history file {}", path.display()))?;
        Ok(Some(messages))
    }

    async fn delete(&self, session_id: &str) -> Result<(), anyhow::Error> {
        let path = self.path_for(session_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to delete {}", path.display())),
        }
    }

    async fn list(&self) -> Result<Vec<String>, anyhow::Error> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
