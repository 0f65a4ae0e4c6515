//! Ephemeral per-run workspaces
//!
//! Each compile-and-run cycle gets a fresh directory under the system temp
//! root, named with a millisecond timestamp plus random entropy so concurrent
//! runs never collide. Cleanup is best-effort: a failure to remove files is
//! logged at warn level and never surfaces to the caller.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::distr::Alphanumeric;
use rand::Rng;
use tracing::warn;

use crate::error::RunnerError;

/// An ephemeral working directory for one run.
///
/// Dropping a workspace removes the directory tree if [`Workspace::cleanup`]
/// was not already called.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    cleaned: bool,
}

impl Workspace {
    /// Create a fresh directory named `{prefix}-{millis}-{entropy}` under
    /// the system temp root.
    pub fn create(prefix: &str) -> Result<Self, RunnerError> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let entropy: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        let dir = std::env::temp_dir().join(format!("{prefix}-{millis}-{entropy}"));
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            cleaned: false,
        })
    }

    /// Path of the workspace directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a file inside the workspace.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Write source text into the workspace and return its path.
    pub fn write_source(&self, name: &str, contents: &str) -> Result<PathBuf, RunnerError> {
        let path = self.path(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Write raw bytes into the workspace and return the file's path.
    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> Result<PathBuf, RunnerError> {
        let path = self.path(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Remove the workspace tree. Failures are logged, not returned.
    pub fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        if let Err(err) = std::fs::remove_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), %err, "workspace cleanup failed");
        }
        self.cleaned = true;
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}
