use std::{
    env,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::error::{PublishError, Result};

/// Guard that holds the process inside another working directory.
///
/// Dropping the guard changes back to the directory that was current when it
/// was created, whether the scope ends normally or through an error.
#[derive(Debug)]
pub struct WorkdirGuard {
    previous: PathBuf,
}

impl WorkdirGuard {
    /// Remember the current directory and change into `path`.
    ///
    /// # Errors
    /// Returns [`PublishError::Io`] if the current directory cannot be read or
    /// `path` cannot be entered.
    pub fn enter(path: &Path) -> Result<Self> {
        let previous = env::current_dir()
            .map_err(|e| PublishError::io("failed to read current directory", e))?;
        env::set_current_dir(path)
            .map_err(|e| PublishError::io(format!("failed to enter {}", path.display()), e))?;
        debug!(from = %previous.display(), to = %path.display(), "changed working directory");
        Ok(Self { previous })
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            warn!(dir = %self.previous.display(), error = %e, "failed to restore working directory");
        } else {
            debug!(dir = %self.previous.display(), "restored working directory");
        }
    }
}
