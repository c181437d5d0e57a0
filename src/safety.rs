use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Workspace safety checks to prevent patching files outside the project root.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    /// Canonical path to the project root
    workspace_root: PathBuf,
    /// Directory names that may not be patched (e.g. vendored dependencies)
    forbidden_dirs: Vec<String>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside workspace: {path} (workspace: {workspace})")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("Path is in forbidden directory '{forbidden}': {path}")]
    ForbiddenPath { path: PathBuf, forbidden: String },

    #[error("Failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl WorkspaceGuard {
    /// Create a new workspace guard with the given root.
    ///
    /// The root is canonicalized to handle symlinks correctly.
    pub fn new(
        workspace_root: impl AsRef<Path>,
        forbidden_dirs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, SafetyError> {
        let workspace_root = workspace_root.as_ref().canonicalize()?;
        Ok(Self {
            workspace_root,
            forbidden_dirs: forbidden_dirs.into_iter().map(Into::into).collect(),
        })
    }

    /// Check if a path is safe to patch.
    ///
    /// Returns the canonicalized absolute path if safe.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };

        // Canonicalize to resolve symlinks and .. components
        let canonical = absolute.canonicalize()?;

        let relative =
            canonical
                .strip_prefix(&self.workspace_root)
                .map_err(|_| SafetyError::OutsideWorkspace {
                    path: canonical.clone(),
                    workspace: self.workspace_root.clone(),
                })?;

        for component in relative.components() {
            let Component::Normal(name) = component else {
                continue;
            };
            if let Some(forbidden) = self
                .forbidden_dirs
                .iter()
                .find(|dir| name.to_str() == Some(dir.as_str()))
            {
                return Err(SafetyError::ForbiddenPath {
                    path: canonical.clone(),
                    forbidden: forbidden.clone(),
                });
            }
        }

        Ok(canonical)
    }

    /// Get the workspace root.
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }
}
