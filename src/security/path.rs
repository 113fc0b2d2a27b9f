// ABOUTME: Path sandbox - resolves user-supplied paths against a root and
// ABOUTME: refuses anything that would escape it, symlinks included.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::SandboxError;

/// Bounds filesystem access to a single root directory.
#[derive(Debug, Clone)]
pub struct PathSandbox {
    /// Canonical root, symlinks resolved.
    root: PathBuf,
    /// Root as configured, used to accept absolute paths spelled that way.
    configured: PathBuf,
}

impl PathSandbox {
    /// Create a sandbox rooted at an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, SandboxError> {
        let configured = root.into();
        let root = configured
            .canonicalize()
            .map_err(|e| SandboxError::InvalidRoot {
                root: configured.clone(),
                reason: e.to_string(),
            })?;
        if !root.is_dir() {
            return Err(SandboxError::InvalidRoot {
                root: configured,
                reason: "not a directory".into(),
            });
        }
        Ok(Self { root, configured })
    }

    /// The canonical sandbox root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `user_path` inside the root.
    ///
    /// Relative paths are joined onto the root. Absolute paths are only
    /// accepted when they already point inside the root, which makes
    /// validation idempotent. A `..` that would climb above the root fails
    /// before the filesystem is touched. The deepest existing ancestor is
    /// then canonicalized so a symlink pointing outside is caught too.
    /// Paths that don't exist yet (write targets) resolve normally.
    pub fn validate(&self, user_path: &str) -> Result<PathBuf, SandboxError> {
        if user_path.trim().is_empty() {
            return Err(SandboxError::Empty);
        }

        let input = Path::new(user_path);
        let relative = if input.is_absolute() {
            input
                .strip_prefix(&self.root)
                .or_else(|_| input.strip_prefix(&self.configured))
                .map_err(|_| SandboxError::OutsideRoot(user_path.to_string()))?
        } else {
            input
        };

        let normalized = normalize(relative)
            .ok_or_else(|| SandboxError::Traversal(user_path.to_string()))?;

        let resolved = resolve_existing(&self.root.join(normalized)).map_err(|source| {
            SandboxError::Resolve {
                path: user_path.to_string(),
                source,
            }
        })?;

        if !resolved.starts_with(&self.root) {
            tracing::warn!(path = %user_path, resolved = %resolved.display(), "sandbox escape rejected");
            return Err(SandboxError::OutsideRoot(user_path.to_string()));
        }
        Ok(resolved)
    }
}

/// Lexically fold `.` and `..`. Returns `None` if `..` climbs above the start
/// or the path carries a root or prefix component.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::Normal(part) => parts.push(part),
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.iter().collect())
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest.
fn resolve_existing(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut tail = Vec::new();

    loop {
        match existing.symlink_metadata() {
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let Some(name) = existing.file_name() else {
                    return Err(e);
                };
                tail.push(name.to_os_string());
                if !existing.pop() {
                    return Err(e);
                }
            }
            Err(e) => return Err(e),
        }
    }

    let mut resolved = existing.canonicalize()?;
    for part in tail.iter().rev() {
        resolved.push(part);
    }
    Ok(resolved)
}
