use std::{
    path::Path,
    process::{Command, Stdio},
};

use git2::{Repository, Status, StatusOptions};
use tracing::{debug, info};

use crate::error::{PublishError, Result};

/// Make sure `destination` is the work tree of a non-bare git repository.
///
/// # Errors
/// Returns [`PublishError::Configuration`] if it is not.
pub fn open_destination(destination: &Path) -> Result<Repository> {
    let repo = Repository::open(destination).map_err(|e| {
        PublishError::Configuration(format!(
            "{} is not a git repository: {}",
            destination.display(),
            e.message()
        ))
    })?;
    if repo.is_bare() {
        return Err(PublishError::Configuration(format!(
            "{} is a bare repository; a work tree is required",
            destination.display()
        )));
    }
    Ok(repo)
}

/// Whether the index differs from `HEAD` (or holds anything on an unborn branch).
///
/// # Errors
/// Returns [`PublishError::Configuration`] if the repository cannot be opened
/// or its status cannot be read.
pub fn has_staged_changes(destination: &Path) -> Result<bool> {
    // Fresh handle so the index written by `git add` is read from disk.
    let repo = open_destination(destination)?;
    let mut opts = StatusOptions::new();
    opts.include_untracked(false).include_ignored(false);
    let statuses = repo.statuses(Some(&mut opts)).map_err(|e| {
        PublishError::Configuration(format!(
            "failed to read status of {}: {}",
            destination.display(),
            e.message()
        ))
    })?;

    let staged = Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE;
    Ok(statuses.iter().any(|s| s.status().intersects(staged)))
}

/// Short id of the destination's `HEAD` commit, if there is one.
#[must_use]
pub fn head_short_id(destination: &Path) -> Option<String> {
    let repo = Repository::open(destination).ok()?;
    let head = repo.head().ok()?.peel_to_commit().ok()?;
    let short = head.as_object().short_id().ok()?;
    short.as_str().map(str::to_string)
}

/// `git add --all`
///
/// # Errors
/// Returns [`PublishError::Vcs`] if git exits unsuccessfully.
pub fn stage_all(destination: &Path) -> Result<()> {
    git(destination, "add", &["add", "--all"])
}

/// `git commit -m <message>`
///
/// # Errors
/// Returns [`PublishError::Vcs`] if git exits unsuccessfully.
pub fn commit(destination: &Path, message: &str) -> Result<()> {
    git(destination, "commit", &["commit", "--quiet", "-m", message])
}

/// `git push` to the branch's configured remote.
///
/// # Errors
/// Returns [`PublishError::Vcs`] if git exits unsuccessfully.
pub fn push(destination: &Path) -> Result<()> {
    info!(dest = %destination.display(), "pushing");
    git(destination, "push", &["push"])
}

fn git(destination: &Path, step: &'static str, args: &[&str]) -> Result<()> {
    debug!(?args, dir = %destination.display(), "running git");
    let status = Command::new("git")
        .args(args)
        .current_dir(destination)
        .stdin(Stdio::null())
        .status()
        .map_err(|source| PublishError::Spawn {
            tool: "git".to_string(),
            source,
        })?;
    if !status.success() {
        return Err(PublishError::Vcs {
            step,
            status,
            destination: destination.to_path_buf(),
        });
    }
    Ok(())
}
