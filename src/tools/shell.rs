// ABOUTME: ShellTool - executes shell commands inside the sandbox root.
// ABOUTME: Returns stdout/stderr, reports non-zero exit codes, enforces a timeout.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ToolError;
use crate::security::PathSandbox;
use crate::tool::{Tool, ToolEffect, ToolResult};

/// Default wall-clock limit for one command.
pub const DEFAULT_SHELL_TIMEOUT: Duration = Duration::from_secs(30);

/// Tool for executing shell commands.
/// Uses `bash -c` on Unix and `cmd.exe /C` on Windows.
pub struct ShellTool {
    sandbox: Arc<PathSandbox>,
    timeout: Duration,
}

impl ShellTool {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self {
            sandbox,
            timeout: DEFAULT_SHELL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell_execute"
    }

    fn description(&self) -> &str {
        "Execute a shell command in the workspace and return its output. Use for running tests, git commands, etc."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                },
                "working_dir": {
                    "type": "string",
                    "description": "Directory to run in, relative to the workspace root (default: root)"
                }
            },
            "required": ["command"]
        })
    }

    fn effect(&self) -> ToolEffect {
        ToolEffect::Destructive
    }

    fn command(&self, params: &serde_json::Value) -> Option<String> {
        Some(params["command"].as_str().unwrap_or_default().to_string())
    }

    fn paths(&self, params: &serde_json::Value) -> Vec<String> {
        params["working_dir"]
            .as_str()
            .map(String::from)
            .into_iter()
            .collect()
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            command: String,
            working_dir: Option<String>,
        }
        let params: Params = serde_json::from_value(params)?;

        let dir = match params.working_dir.as_deref() {
            Some(dir) => match self.sandbox.validate(dir) {
                Ok(dir) => dir,
                Err(e) => return Ok(ToolResult::error(format!("Invalid working_dir: {}", e))),
            },
            None => self.sandbox.root().to_path_buf(),
        };

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = tokio::process::Command::new("cmd.exe");
            c.arg("/C").arg(&params.command);
            c
        } else {
            let mut c = tokio::process::Command::new("bash");
            c.arg("-c").arg(&params.command);
            c
        };
        cmd.current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(output) => output.map_err(|e| ToolError::Execution(e.into()))?,
            Err(_) => {
                return Ok(ToolResult::error(format!(
                    "Command timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let code = output.status.code().unwrap_or(-1);

        let result = if output.status.success() {
            if stderr.is_empty() {
                stdout.to_string()
            } else {
                format!("{}\n\nstderr:\n{}", stdout, stderr)
            }
        } else {
            format!(
                "Command failed with exit code {}\n\nstdout:\n{}\n\nstderr:\n{}",
                code, stdout, stderr
            )
        };

        if output.status.success() {
            Ok(ToolResult::text(result).with_metadata("exit_code", code))
        } else {
            Ok(ToolResult::error(result).with_metadata("exit_code", code))
        }
    }
}
