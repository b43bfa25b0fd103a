//! JSON file persistence for a monitor session's continuation state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::discourse::MonitorState;

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state, or `None` if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<Option<MonitorState>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read state file: {}", self.path.display()))
            }
        };
        let state = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))?;
        Ok(Some(state))
    }

    /// Replace the saved state. Writes to a sibling temp file first and renames it into place.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    pub async fn save(&self, state: &MonitorState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_vec_pretty(state).context("Failed to serialize state")?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace state file: {}", self.path.display()))?;

        debug!(path = %self.path.display(), ?state, "Saved monitor state");
        Ok(())
    }
}
