use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use git2::{Config, Repository};
use tracing::debug;

use crate::error::{PublishError, Result};

/// Environment variable holding the publish destination.
pub const DESTINATION_ENV: &str = "GHBLOG";

pub const DEFAULT_GENERATOR: &str = "hugo";
pub const DEFAULT_OUTPUT_DIR: &str = "public";
pub const DEFAULT_MESSAGE: &str = "publish blog";

/// Settings for one publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Absolute path of the git work tree that receives the build.
    pub destination: PathBuf,
    /// Absolute path of the site sources; the generator runs here.
    pub site_root: PathBuf,
    /// Site generator program, run without arguments.
    pub generator: String,
    /// Build output directory, relative to `site_root` unless absolute.
    pub output_dir: PathBuf,
    /// Commit message for the destination repo.
    pub message: String,
    pub push: bool,
    pub dry_run: bool,
}

/// Command-line values that take precedence over git config.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub generator: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub message: Option<String>,
    pub no_push: bool,
    pub dry_run: bool,
}

impl PublishConfig {
    /// Build a config from the raw destination value plus `sitepub.*` git config.
    ///
    /// Git config is read with the usual precedence (local → global → system),
    /// using the repository containing `site_root` when there is one.
    ///
    /// # Errors
    /// Returns [`PublishError::Configuration`] if the destination is missing or empty.
    pub fn load(site_root: &Path, raw_destination: Option<OsString>) -> Result<Self> {
        let destination = resolve_destination(raw_destination, site_root)?;

        let mut out = Self {
            destination,
            site_root: site_root.to_path_buf(),
            generator: DEFAULT_GENERATOR.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            message: DEFAULT_MESSAGE.to_string(),
            push: true,
            dry_run: false,
        };

        if let Some(cfg) = open_git_config(site_root) {
            if let Ok(v) = cfg.get_string("sitepub.generator")
                && !v.trim().is_empty()
            {
                out.generator = v.trim().to_string();
            }
            if let Ok(v) = cfg.get_path("sitepub.output-dir") {
                out.output_dir = v;
            }
            if let Ok(v) = cfg.get_string("sitepub.message")
                && !v.trim().is_empty()
            {
                out.message = v;
            }
        }

        Ok(out)
    }

    /// Apply command-line overrides on top of the loaded values.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(generator) = overrides.generator {
            self.generator = generator;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(message) = overrides.message {
            self.message = message;
        }
        if overrides.no_push {
            self.push = false;
        }
        self.dry_run = overrides.dry_run;
        self
    }

    /// Absolute path of the build output directory.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.site_root.join(&self.output_dir)
    }
}

/// Read the raw destination value from the process environment.
#[must_use]
pub fn destination_from_env() -> Option<OsString> {
    std::env::var_os(DESTINATION_ENV)
}

/// Turn the raw destination value into an absolute path.
///
/// # Errors
/// Returns [`PublishError::Configuration`] when the value is absent or blank.
pub fn resolve_destination(raw: Option<OsString>, base: &Path) -> Result<PathBuf> {
    let raw = raw.ok_or_else(|| {
        PublishError::Configuration(format!("{DESTINATION_ENV} is not set"))
    })?;
    if raw.to_string_lossy().trim().is_empty() {
        return Err(PublishError::Configuration(format!(
            "{DESTINATION_ENV} is empty"
        )));
    }

    let path = PathBuf::from(raw);
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(base.join(path))
    }
}

fn open_git_config(site_root: &Path) -> Option<Config> {
    match Repository::discover(site_root) {
        Ok(repo) => repo.config().ok(),
        Err(e) => {
            debug!(error = %e, "site root is not a git repository; using global git config");
            Config::open_default().ok()
        }
    }
}
