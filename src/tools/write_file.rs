// ABOUTME: WriteFileTool - writes text content to a file inside the sandbox.
// ABOUTME: Creates parent directories and overwrites existing files.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ToolError;
use crate::security::PathSandbox;
use crate::tool::{Tool, ToolEffect, ToolResult};

/// Tool for writing file contents.
pub struct WriteFileTool {
    sandbox: Arc<PathSandbox>,
}

impl WriteFileTool {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file. Creates the file if it doesn't exist, overwrites if it does."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the file, relative to the workspace root"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write to the file"
                }
            },
            "required": ["path", "content"]
        })
    }

    fn effect(&self) -> ToolEffect {
        ToolEffect::Mutating
    }

    fn paths(&self, params: &serde_json::Value) -> Vec<String> {
        params["path"].as_str().map(String::from).into_iter().collect()
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            path: String,
            content: String,
        }
        let params: Params = serde_json::from_value(params)?;

        let path = match self.sandbox.validate(&params.path) {
            Ok(path) => path,
            Err(e) => return Ok(ToolResult::error(format!("Invalid path: {}", e))),
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::Execution(e.into()))?;
        }

        match tokio::fs::write(&path, &params.content).await {
            Ok(()) => Ok(ToolResult::text(format!(
                "Successfully wrote {} bytes to {}",
                params.content.len(),
                params.path
            ))
            .with_metadata("bytes_written", params.content.len())),
            Err(e) => Ok(ToolResult::error(format!("Failed to write file: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tool() -> (TempDir, WriteFileTool) {
        let dir = TempDir::new().unwrap();
        let sandbox = Arc::new(PathSandbox::new(dir.path()).unwrap());
        (dir, WriteFileTool::new(sandbox))
    }

    #[tokio::test]
    async fn test_write_file_success() {
        let (dir, tool) = tool();
        let result = tool
            .execute(serde_json::json!({"path": "test.txt", "content": "Hello, world!"}))
            .await
            .unwrap();

        assert!(!result.is_error);
        assert!(result.content.contains("13 bytes"));
        let content = std::fs::read_to_string(dir.path().join("test.txt")).unwrap();
        assert_eq!(content, "Hello, world!");
    }

    #[tokio::test]
    async fn test_write_file_creates_dirs() {
        let (dir, tool) = tool();
        let result = tool
            .execute(serde_json::json!({"path": "a/b/c/test.txt", "content": "nested"}))
            .await
            .unwrap();

        assert!(!result.is_error);
        assert!(dir.path().join("a/b/c/test.txt").exists());
    }

    #[tokio::test]
    async fn test_write_file_refuses_escape() {
        let (dir, tool) = tool();
        let result = tool
            .execute(serde_json::json!({"path": "../escape.txt", "content": "x"}))
            .await
            .unwrap();

        assert!(result.is_error);
        assert!(!dir.path().parent().unwrap().join("escape.txt").exists());
    }
}
