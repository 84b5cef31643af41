//! Repository Session
//!
//! Acquires a working copy of a target repository and guarantees release of
//! any temporary state. A caller-owned handle (local path) has no cleanup
//! obligation; a temporary handle (batch clone) owns its directory and
//! removes it exactly once - explicitly via `release`, or through the Drop
//! backstop on early-error paths.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::registry::{ProjectCandidate, ProjectRegistry};
use crate::types::{DocError, Result};

/// A filesystem root plus its ownership mode.
#[derive(Debug)]
pub struct RepositoryHandle {
    root: PathBuf,
    temporary: bool,
    cleaned: bool,
}

impl RepositoryHandle {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Release the handle. Removes the owned directory tree for temporary
    /// handles; no-op for caller-owned ones.
    pub fn release(mut self) -> Result<()> {
        self.cleanup().map_err(DocError::Io)
    }

    fn cleanup(&mut self) -> std::io::Result<()> {
        if self.cleaned || !self.temporary {
            self.cleaned = true;
            return Ok(());
        }
        self.cleaned = true;
        debug!("Removing temporary clone at {}", self.root.display());
        std::fs::remove_dir_all(&self.root)
    }
}

impl Drop for RepositoryHandle {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            warn!(
                "Failed to remove temporary clone {}: {}",
                self.root.display(),
                e
            );
        }
    }
}

/// Open a caller-owned local repository. Validates the path exists and is a
/// directory; `release` is a no-op.
pub fn open_local(path: &Path) -> Result<RepositoryHandle> {
    if !path.exists() {
        return Err(DocError::Acquisition(format!(
            "repository path does not exist: {}",
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(DocError::Acquisition(format!(
            "repository path is not a directory: {}",
            path.display()
        )));
    }

    Ok(RepositoryHandle {
        root: path.to_path_buf(),
        temporary: false,
        cleaned: false,
    })
}

/// Clone a candidate's default branch into a fresh directory under
/// `work_root` and return a temporary handle owning it.
pub async fn acquire_clone(
    registry: &dyn ProjectRegistry,
    candidate: &ProjectCandidate,
    work_root: &Path,
) -> Result<RepositoryHandle> {
    std::fs::create_dir_all(work_root)?;

    // Timestamped directory name avoids collision with a prior run's clone
    let dest = work_root.join(format!(
        "{}-{}",
        candidate.slug(),
        Utc::now().format("%Y%m%d%H%M%S")
    ));

    if let Err(e) = registry.clone_repo(candidate, &dest).await {
        // A failed clone may leave a partial tree behind
        if dest.exists() {
            let _ = std::fs::remove_dir_all(&dest);
        }
        return Err(DocError::Acquisition(format!(
            "clone of '{}' failed: {}",
            candidate.path_with_namespace, e
        )));
    }

    Ok(RepositoryHandle {
        root: dest,
        temporary: true,
        cleaned: false,
    })
}
