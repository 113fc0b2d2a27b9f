// ABOUTME: ReadFileTool - reads a text file inside the sandbox.
// ABOUTME: Its output is also injected into the conversation for the model.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ToolError;
use crate::security::PathSandbox;
use crate::tool::{Tool, ToolEffect, ToolResult};

/// Files larger than this are refused rather than flooding the context.
pub const MAX_READ_BYTES: u64 = 1024 * 1024;

/// Tool for reading file contents.
pub struct ReadFileTool {
    sandbox: Arc<PathSandbox>,
}

impl ReadFileTool {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a file. Returns the file contents as text."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the file, relative to the workspace root"
                }
            },
            "required": ["path"]
        })
    }

    fn effect(&self) -> ToolEffect {
        ToolEffect::ReadOnly
    }

    fn paths(&self, params: &serde_json::Value) -> Vec<String> {
        params["path"].as_str().map(String::from).into_iter().collect()
    }

    fn injects_output(&self) -> bool {
        true
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            path: String,
        }
        let params: Params = serde_json::from_value(params)?;

        let path = match self.sandbox.validate(&params.path) {
            Ok(path) => path,
            Err(e) => return Ok(ToolResult::error(format!("Invalid path: {}", e))),
        };

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.len() > MAX_READ_BYTES => {
                return Ok(ToolResult::error(format!(
                    "File is too large to read ({} bytes, limit {})",
                    meta.len(),
                    MAX_READ_BYTES
                )));
            }
            Ok(_) => {}
            Err(e) => return Ok(ToolResult::error(format!("Failed to read file: {}", e))),
        }

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(ToolResult::text(content).with_metadata("path", &params.path)),
            Err(e) => Ok(ToolResult::error(format!("Failed to read file: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tool() -> (TempDir, ReadFileTool) {
        let dir = TempDir::new().unwrap();
        let sandbox = Arc::new(PathSandbox::new(dir.path()).unwrap());
        (dir, ReadFileTool::new(sandbox))
    }

    #[tokio::test]
    async fn test_read_file_success() {
        let (dir, tool) = tool();
        std::fs::write(dir.path().join("hello.txt"), "Hello, world!\n").unwrap();

        let result = tool
            .execute(serde_json::json!({"path": "hello.txt"}))
            .await
            .unwrap();

        assert!(!result.is_error);
        assert!(result.content.contains("Hello, world!"));
        assert_eq!(result.metadata["path"], "hello.txt");
    }

    #[tokio::test]
    async fn test_read_file_not_found() {
        let (_dir, tool) = tool();
        let result = tool
            .execute(serde_json::json!({"path": "missing.txt"}))
            .await
            .unwrap();

        assert!(result.is_error);
        assert!(result.content.contains("Failed to read file"));
    }

    #[tokio::test]
    async fn test_read_file_outside_sandbox() {
        let (_dir, tool) = tool();
        let result = tool
            .execute(serde_json::json!({"path": "../../etc/passwd"}))
            .await
            .unwrap();

        assert!(result.is_error);
        assert!(result.content.starts_with("Invalid path"));
    }

    #[tokio::test]
    async fn test_read_file_missing_param() {
        let (_dir, tool) = tool();
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }

    #[test]
    fn test_declares_path_and_effect() {
        let (_dir, tool) = tool();
        assert_eq!(tool.effect(), ToolEffect::ReadOnly);
        assert!(tool.injects_output());
        assert_eq!(
            tool.paths(&serde_json::json!({"path": "a/b.txt"})),
            vec!["a/b.txt".to_string()]
        );
    }
}
