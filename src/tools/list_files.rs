// ABOUTME: ListFilesTool - lists sandboxed files matching a glob pattern.
// ABOUTME: Entries are relative to the workspace root; directories end in '/'.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ToolError;
use crate::security::PathSandbox;
use crate::tool::{Tool, ToolEffect, ToolResult};

/// Tool for listing files in a directory with glob patterns.
pub struct ListFilesTool {
    sandbox: Arc<PathSandbox>,
}

impl ListFilesTool {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List files in a directory matching a glob pattern."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The directory to list, relative to the workspace root (default: root)"
                },
                "glob": {
                    "type": "string",
                    "description": "Glob pattern to match (default: *)"
                }
            }
        })
    }

    fn effect(&self) -> ToolEffect {
        ToolEffect::ReadOnly
    }

    fn paths(&self, params: &serde_json::Value) -> Vec<String> {
        params["path"].as_str().map(String::from).into_iter().collect()
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        #[derive(Deserialize, Default)]
        struct Params {
            path: Option<String>,
            glob: Option<String>,
        }
        let params: Params = if params.is_null() {
            Params::default()
        } else {
            serde_json::from_value(params)?
        };

        let base = match self.sandbox.validate(params.path.as_deref().unwrap_or(".")) {
            Ok(base) => base,
            Err(e) => return Ok(ToolResult::error(format!("Invalid path: {}", e))),
        };

        let pattern = params.glob.unwrap_or_else(|| "*".to_string());
        if pattern.starts_with('/') || pattern.split('/').any(|part| part == "..") {
            return Ok(ToolResult::error("Glob pattern must stay inside the directory"));
        }

        let base_pattern = glob::Pattern::escape(&base.display().to_string());
        let full_pattern = format!("{}/{}", base_pattern, pattern);
        let entries = match glob::glob(&full_pattern) {
            Ok(entries) => entries,
            Err(e) => return Ok(ToolResult::error(format!("Invalid glob pattern: {}", e))),
        };

        let root = self.sandbox.root();
        let mut files = Vec::new();
        for path in entries.flatten() {
            // Symlinked entries may point anywhere; list only what resolves inside.
            let Ok(resolved) = path.canonicalize() else {
                continue;
            };
            if !resolved.starts_with(root) {
                continue;
            }
            let shown = path.strip_prefix(root).unwrap_or(&path).display().to_string();
            if path.is_dir() {
                files.push(format!("{}/", shown));
            } else {
                files.push(shown);
            }
        }
        files.sort();

        if files.is_empty() {
            Ok(ToolResult::text("No files found"))
        } else {
            let count = files.len();
            Ok(ToolResult::text(files.join("\n")).with_metadata("count", count))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tool() -> (TempDir, ListFilesTool) {
        let dir = TempDir::new().unwrap();
        let sandbox = Arc::new(PathSandbox::new(dir.path()).unwrap());
        (dir, ListFilesTool::new(sandbox))
    }

    #[tokio::test]
    async fn test_list_files() {
        let (dir, tool) = tool();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();

        let result = tool.execute(serde_json::json!({})).await.unwrap();

        assert!(!result.is_error);
        assert_eq!(result.content, "a.txt\nb.txt\nsrc/");
        assert_eq!(result.metadata["count"], 3);
    }

    #[tokio::test]
    async fn test_list_files_with_glob_in_subdir() {
        let (dir, tool) = tool();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/lib.rs"), "").unwrap();
        std::fs::write(dir.path().join("src/notes.md"), "").unwrap();

        let result = tool
            .execute(serde_json::json!({"path": "src", "glob": "*.rs"}))
            .await
            .unwrap();

        assert_eq!(result.content, "src/lib.rs");
    }

    #[tokio::test]
    async fn test_list_files_empty() {
        let (_dir, tool) = tool();
        let result = tool.execute(serde_json::Value::Null).await.unwrap();
        assert_eq!(result.content, "No files found");
    }

    #[tokio::test]
    async fn test_list_files_rejects_escaping_glob() {
        let (_dir, tool) = tool();
        let result = tool
            .execute(serde_json::json!({"glob": "../*"}))
            .await
            .unwrap();
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_list_files_rejects_escaping_path() {
        let (_dir, tool) = tool();
        let result = tool
            .execute(serde_json::json!({"path": "../.."}))
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.content.starts_with("Invalid path"));
    }
}
