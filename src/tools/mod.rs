// ABOUTME: Built-in tools for common agent operations, all sandboxed.
// ABOUTME: register_builtins wires them into a registry at startup.

mod list_files;
mod read_file;
mod shell;
mod write_file;

use std::sync::Arc;
use std::time::Duration;

pub use list_files::ListFilesTool;
pub use read_file::{MAX_READ_BYTES, ReadFileTool};
pub use shell::{DEFAULT_SHELL_TIMEOUT, ShellTool};
pub use write_file::WriteFileTool;

use crate::error::ToolError;
use crate::security::PathSandbox;
use crate::tool::Registry;

/// Register every built-in tool against one sandbox.
pub async fn register_builtins(
    registry: &Registry,
    sandbox: Arc<PathSandbox>,
    shell_timeout: Duration,
) -> Result<(), ToolError> {
    registry
        .register(ReadFileTool::new(Arc::clone(&sandbox)))
        .await?;
    registry
        .register(WriteFileTool::new(Arc::clone(&sandbox)))
        .await?;
    registry
        .register(ListFilesTool::new(Arc::clone(&sandbox)))
        .await?;
    registry
        .register(ShellTool::new(sandbox).with_timeout(shell_timeout))
        .await?;
    Ok(())
}
