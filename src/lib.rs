pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod publish;

use anyhow::{Context, Result};

pub use error::PublishError;
pub use publish::{PublishReport, publish};

/// Entry point for the CLI: resolve configuration and run one publish.
///
/// # Errors
/// Returns the [`PublishError`] that ended the run, wrapped in `anyhow`.
pub fn run(cli: &cli::Cli) -> Result<()> {
    // The directory sitepub is started in is the site root.
    let site_root = std::env::current_dir().context("failed to read current directory")?;
    let cfg = config::PublishConfig::load(&site_root, config::destination_from_env())?
        .with_overrides(cli.overrides());
    let report = publish(&cfg)?;
    print_summary(&report);
    Ok(())
}

/// Exit code for an error returned by [`run`].
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<PublishError>()
        .map_or(1, |e| u8::try_from(e.exit_code()).unwrap_or(1))
}

fn print_summary(report: &PublishReport) {
    if report.dry_run {
        println!(
            "dry run: would remove {} entries and copy {} files into {}",
            report.removed,
            report.copied,
            report.destination.display()
        );
        return;
    }

    match &report.commit {
        Some(id) => println!("published {} ({} files)", id, report.copied),
        None => println!("nothing new to publish ({} files)", report.copied),
    }
    if !report.pushed {
        println!("push skipped");
    }
}
