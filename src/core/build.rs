use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::{debug, info};

use crate::{
    config::PublishConfig,
    error::{PublishError, Result},
};

/// Run the site generator in the site root and return the build output path.
///
/// The generator setting is a whitespace-separated command line; the default
/// `hugo` runs without arguments. It inherits stdio so its own progress output
/// reaches the terminal.
///
/// # Errors
/// Returns [`PublishError::Generator`] on a non-zero exit and
/// [`PublishError::EmptyBuild`] when the output directory is missing or empty.
pub fn run_generator(cfg: &PublishConfig) -> Result<PathBuf> {
    info!(generator = %cfg.generator, root = %cfg.site_root.display(), "building site");

    let mut words = cfg.generator.split_whitespace();
    let program = words
        .next()
        .ok_or_else(|| PublishError::Configuration("site generator is empty".to_string()))?;

    let status = Command::new(program)
        .args(words)
        .current_dir(&cfg.site_root)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| PublishError::Spawn {
            tool: cfg.generator.clone(),
            source,
        })?;

    if !status.success() {
        return Err(PublishError::Generator {
            tool: cfg.generator.clone(),
            status,
        });
    }

    let output = cfg.output_path();
    if !has_entries(&output) {
        return Err(PublishError::EmptyBuild(output));
    }

    debug!(output = %output.display(), "build output ready");
    Ok(output)
}

// A lone `.git` does not count: it is never copied into the destination.
fn has_entries(dir: &Path) -> bool {
    fs::read_dir(dir).is_ok_and(|entries| {
        entries
            .filter_map(std::result::Result::ok)
            .any(|e| e.file_name() != ".git")
    })
}
