//! Per-session scratch directories under the configured work dir

use crate::state_machine::{sanitize_file_name, Feature};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to create {path}: {source}")]
    Create { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
}

/// Root of all session directories
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create `<root>/<user>-<feature>-<uuid>/`
    pub async fn open_session(
        &self,
        user_id: i64,
        feature: Option<Feature>,
    ) -> Result<SessionDir, WorkspaceError> {
        let label = feature.map_or("session", Feature::command);
        let path = self
            .root
            .join(format!("{user_id}-{label}-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| WorkspaceError::Create {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(user_id, path = %path.display(), "Opened session directory");
        Ok(SessionDir { path })
    }
}

/// Scratch directory owned by one session
#[derive(Debug)]
pub struct SessionDir {
    path: PathBuf,
}

impl SessionDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an outbound artifact; the returned path is inside this directory
    pub async fn stage(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, WorkspaceError> {
        let mut safe = sanitize_file_name(file_name);
        if safe.is_empty() || safe.chars().all(|c| c == '.') {
            safe = "artifact".to_string();
        }
        let path = self.path.join(safe);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| WorkspaceError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Remove a staged artifact after delivery. Failures are logged, not returned.
    pub async fn discard(&self, staged: &Path) {
        if let Err(e) = tokio::fs::remove_file(staged).await {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %staged.display(), error = %e, "Failed to remove staged file");
            }
        }
    }

    pub async fn remove(self) -> Result<(), WorkspaceError> {
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(WorkspaceError::Remove {
                path: self.path,
                source,
            }),
        }
    }
}
