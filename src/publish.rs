use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{
    config::PublishConfig,
    core::{build, lock, sync, vcs, workdir::WorkdirGuard},
    error::{PublishError, Result},
};

/// Outcome of one publish run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub destination: PathBuf,
    /// Top-level destination entries removed (or that would be, on a dry run).
    pub removed: usize,
    /// Files copied from the build output (or that would be, on a dry run).
    pub copied: usize,
    /// Short id of the new commit, when one was created.
    pub commit: Option<String>,
    pub pushed: bool,
    pub dry_run: bool,
}

/// Build the site and publish it to the destination repository.
///
/// Nothing in the destination is touched until the generator has succeeded
/// and produced output. The process working directory is moved into the
/// destination for the git steps and restored before returning.
///
/// # Errors
/// Returns a [`PublishError`]; see its variants for which failures happen
/// before and after the destination is replaced.
pub fn publish(cfg: &PublishConfig) -> Result<PublishReport> {
    let (destination, git_dir) = check_destination(cfg)?;
    let _lock = lock::acquire_publish_lock(&git_dir)?;

    let output = build::run_generator(cfg)?;
    check_output(&destination, &output)?;

    let mut report = PublishReport {
        destination: destination.clone(),
        dry_run: cfg.dry_run,
        ..PublishReport::default()
    };

    if cfg.dry_run {
        let plan = sync::plan(&output, &destination)?;
        for path in &plan.remove {
            info!(path = %path.display(), "would remove");
        }
        for path in &plan.copy {
            info!(path = %path.display(), "would copy");
        }
        info!(message = %cfg.message, push = cfg.push, "would commit");
        report.removed = plan.remove.len();
        report.copied = plan.copy.len();
        return Ok(report);
    }

    report.removed = sync::clear_destination(&destination)?;
    report.copied = sync::copy_tree(&output, &destination)?;
    info!(
        dest = %destination.display(),
        removed = report.removed,
        copied = report.copied,
        "destination replaced"
    );

    let _cwd = WorkdirGuard::enter(&destination)?;

    vcs::stage_all(&destination)?;
    if vcs::has_staged_changes(&destination)? {
        vcs::commit(&destination, &cfg.message)?;
        report.commit = vcs::head_short_id(&destination);
        info!(commit = report.commit.as_deref().unwrap_or("unknown"), "committed");
    } else {
        warn!("build output unchanged; nothing to commit");
    }

    if cfg.push {
        vcs::push(&destination)?;
        report.pushed = true;
    }

    Ok(report)
}

/// Validate the destination before anything runs.
///
/// Returns its canonical path and the repository's git directory.
fn check_destination(cfg: &PublishConfig) -> Result<(PathBuf, PathBuf)> {
    let destination = &cfg.destination;
    let meta = fs::metadata(destination).map_err(|e| {
        PublishError::Configuration(format!(
            "destination {} is not accessible: {e}",
            destination.display()
        ))
    })?;
    if !meta.is_dir() {
        return Err(PublishError::Configuration(format!(
            "destination {} is not a directory",
            destination.display()
        )));
    }

    let destination = canonical(destination)?;
    let git_dir = vcs::open_destination(&destination)?.path().to_path_buf();

    let site_root = canonical(&cfg.site_root)?;
    if site_root.starts_with(&destination) {
        return Err(PublishError::Configuration(format!(
            "destination {} contains the site sources at {}",
            destination.display(),
            site_root.display()
        )));
    }

    Ok((destination, git_dir))
}

/// The build output must not overlap the destination in either direction.
fn check_output(destination: &Path, output: &Path) -> Result<()> {
    let output = canonical(output)?;
    if output.starts_with(destination) || destination.starts_with(&output) {
        return Err(PublishError::Configuration(format!(
            "build output {} overlaps destination {}",
            output.display(),
            destination.display()
        )));
    }
    Ok(())
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path)
        .map_err(|e| PublishError::io(format!("failed to resolve {}", path.display()), e))
}
