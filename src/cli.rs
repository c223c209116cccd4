use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::Overrides;

/// sitepub command-line interface
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sitepub",
    version,
    about = "Build a static site and publish it to a git-tracked destination ($GHBLOG)",
    long_about = None
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv). `RUST_LOG` overrides this.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Site generator to run (defaults to sitepub.generator, then `hugo`)
    #[arg(long, value_name = "PROGRAM")]
    pub generator: Option<String>,

    /// Build output directory relative to the site root (defaults to `public`)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Commit message for the destination repository (defaults to "publish blog")
    #[arg(short, long, value_name = "MESSAGE")]
    pub message: Option<String>,

    /// Commit but do not push
    #[arg(long)]
    pub no_push: bool,

    /// Build, then only report what would be replaced and committed
    #[arg(long)]
    pub dry_run: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Flags that override git config values.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            generator: self.generator.clone(),
            output_dir: self.output_dir.clone(),
            message: self.message.clone(),
            no_push: self.no_push,
            dry_run: self.dry_run,
        }
    }
}
