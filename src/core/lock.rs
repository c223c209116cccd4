use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use tracing::debug;

use crate::error::{PublishError, Result};

/// Path of the publish lock inside the destination's git directory.
///
/// `git_dir` is what git2 reports as the repository path; for a linked
/// worktree that is `.git/worktrees/<name>` of the main repository.
#[must_use]
pub fn publish_lock_path(git_dir: &Path) -> PathBuf {
    git_dir.join("sitepub.lock")
}

/// Guard that holds the publish lock for one destination.
pub struct PublishLockGuard {
    file: File,
}

impl Drop for PublishLockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Take the exclusive publish lock for the repository at `git_dir` without waiting.
///
/// # Errors
/// Returns [`PublishError::Configuration`] if another run already holds the
/// lock, or [`PublishError::Io`] if the lock file cannot be opened.
pub fn acquire_publish_lock(git_dir: &Path) -> Result<PublishLockGuard> {
    let path = publish_lock_path(git_dir);

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&path)
        .map_err(|e| PublishError::io(format!("failed to open lock file {}", path.display()), e))?;

    if file.try_lock_exclusive().is_err() {
        return Err(PublishError::Configuration(format!(
            "another publish is already running ({} is locked)",
            path.display()
        )));
    }

    debug!(path = %path.display(), "acquired publish lock");
    Ok(PublishLockGuard { file })
}
