//! Replacing the destination's contents with the build output.
//!
//! The destination's `.git` entry is never removed and a `.git` entry in the
//! build output is never copied, so the destination stays a working
//! repository.

use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::error::{PublishError, Result};

const GIT_DIR: &str = ".git";

/// What a sync would do, as paths relative to the two roots.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Top-level destination entries that would be removed.
    pub remove: Vec<PathBuf>,
    /// Files (and symlinks) that would be copied from the build output.
    pub copy: Vec<PathBuf>,
}

fn is_git_dir(name: &OsStr) -> bool {
    name == GIT_DIR
}

/// Remove every entry of `dest` except `.git`. Returns how many top-level
/// entries were removed.
///
/// # Errors
/// Returns [`PublishError::Io`] if listing or removing an entry fails.
pub fn clear_destination(dest: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in read_dir(dest)? {
        let entry =
            entry.map_err(|e| PublishError::io(format!("failed to list {}", dest.display()), e))?;
        if is_git_dir(&entry.file_name()) {
            continue;
        }

        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| PublishError::io(format!("failed to stat {}", path.display()), e))?;
        let res = if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        res.map_err(|e| PublishError::io(format!("failed to remove {}", path.display()), e))?;

        trace!(path = %path.display(), "removed");
        removed += 1;
    }

    debug!(dest = %dest.display(), removed, "destination cleared");
    Ok(removed)
}

/// Recursively copy the contents of `src` into `dest`. Returns the number of
/// files copied.
///
/// # Errors
/// Returns [`PublishError::Io`] if walking the source or writing the copy fails.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in walk(src) {
        let entry = entry.map_err(|e| {
            PublishError::io(format!("failed to walk {}", src.display()), io::Error::from(e))
        })?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| {
                PublishError::io(format!("failed to create {}", target.display()), e)
            })?;
            continue;
        }

        if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| {
                PublishError::io(
                    format!(
                        "failed to copy {} to {}",
                        entry.path().display(),
                        target.display()
                    ),
                    e,
                )
            })?;
        }
        trace!(path = %rel.display(), "copied");
        copied += 1;
    }

    debug!(src = %src.display(), dest = %dest.display(), copied, "build output copied");
    Ok(copied)
}

/// Describe what [`clear_destination`] followed by [`copy_tree`] would do.
///
/// # Errors
/// Returns [`PublishError::Io`] if either tree cannot be read.
pub fn plan(src: &Path, dest: &Path) -> Result<SyncPlan> {
    let mut out = SyncPlan::default();

    for entry in read_dir(dest)? {
        let entry =
            entry.map_err(|e| PublishError::io(format!("failed to list {}", dest.display()), e))?;
        let name = entry.file_name();
        if !is_git_dir(&name) {
            out.remove.push(PathBuf::from(name));
        }
    }

    for entry in walk(src) {
        let entry = entry.map_err(|e| {
            PublishError::io(format!("failed to walk {}", src.display()), io::Error::from(e))
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(src) {
            out.copy.push(rel.to_path_buf());
        }
    }

    out.remove.sort();
    out.copy.sort();
    Ok(out)
}

fn read_dir(dir: &Path) -> Result<fs::ReadDir> {
    fs::read_dir(dir).map_err(|e| PublishError::io(format!("failed to read {}", dir.display()), e))
}

fn walk(src: &Path) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> {
    WalkDir::new(src)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.depth() == 1 && is_git_dir(e.file_name())))
}

#[cfg(unix)]
fn copy_symlink(src: &Path, target: &Path) -> Result<()> {
    let link = fs::read_link(src)
        .map_err(|e| PublishError::io(format!("failed to read link {}", src.display()), e))?;
    std::os::unix::fs::symlink(&link, target)
        .map_err(|e| PublishError::io(format!("failed to create link {}", target.display()), e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, target: &Path) -> Result<()> {
    fs::copy(src, target).map(|_| ()).map_err(|e| {
        PublishError::io(
            format!("failed to copy {} to {}", src.display(), target.display()),
            e,
        )
    })
}
