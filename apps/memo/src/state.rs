//! Lifecycle of the process-wide store connection.

use crate::db::SqliteRepository;
use std::mem;
use std::path::{Path, PathBuf};

/// Observable lifecycle state of a [`StoreHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Open,
    /// The last open attempt failed; every store operation is a no-op.
    Disabled,
    Closed,
}

enum Inner {
    Uninitialized,
    Open { path: PathBuf, repo: SqliteRepository },
    Disabled { path: PathBuf, reason: String },
    Closed,
}

/// Store connection that is opened lazily, degrades to disabled on open
/// failure, and is compacted when closed.
pub struct StoreHandle {
    inner: Inner,
}

impl StoreHandle {
    pub fn new() -> Self {
        Self {
            inner: Inner::Uninitialized,
        }
    }

    pub fn state(&self) -> StoreState {
        match self.inner {
            Inner::Uninitialized => StoreState::Uninitialized,
            Inner::Open { .. } => StoreState::Open,
            Inner::Disabled { .. } => StoreState::Disabled,
            Inner::Closed => StoreState::Closed,
        }
    }

    /// Path of the open store, or of the store that failed to open.
    pub fn path(&self) -> Option<&Path> {
        match &self.inner {
            Inner::Open { path, .. } | Inner::Disabled { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Why the store is disabled, if it is.
    pub fn disabled_reason(&self) -> Option<&str> {
        match &self.inner {
            Inner::Disabled { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Make sure the store at `path` is open.
    ///
    /// A store open at another path is closed first. Returns false when the
    /// store could not be opened and is now disabled.
    pub fn ensure_open(&mut self, path: &Path) -> bool {
        if let Inner::Open { path: current, .. } = &self.inner {
            if current == path {
                return true;
            }
            self.close();
        }

        match SqliteRepository::open(path) {
            Ok(repo) => {
                tracing::info!("Opened problem store: {}", path.display());
                self.inner = Inner::Open {
                    path: path.to_path_buf(),
                    repo,
                };
                true
            }
            Err(e) => {
                tracing::error!("Failed to open problem store {}: {}", path.display(), e);
                self.inner = Inner::Disabled {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                };
                false
            }
        }
    }

    pub fn repo(&self) -> Option<&SqliteRepository> {
        match &self.inner {
            Inner::Open { repo, .. } => Some(repo),
            _ => None,
        }
    }

    /// Run `f` against the open store; `None` when it is not open.
    pub fn with_repo<T>(&self, f: impl FnOnce(&SqliteRepository) -> T) -> Option<T> {
        self.repo().map(f)
    }

    /// Compact and close the store if it is open.
    pub fn close(&mut self) {
        match mem::replace(&mut self.inner, Inner::Closed) {
            Inner::Open { path, repo } => {
                if let Err(e) = repo.compact() {
                    tracing::warn!("Failed to compact problem store {}: {}", path.display(), e);
                }
                if let Err(e) = repo.close() {
                    tracing::warn!("Failed to close problem store {}: {}", path.display(), e);
                }
                tracing::info!("Closed problem store: {}", path.display());
            }
            other => self.inner = other,
        }
    }
}

impl Default for StoreHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        self.close();
    }
}
