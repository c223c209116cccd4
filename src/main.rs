use std::process::ExitCode;

use clap::Parser;
use sitepub::cli::Cli;
use sitepub::logging::init::{flush_logs, init_tracing};
use sitepub::{exit_code, run};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: {e:?}");
        return ExitCode::FAILURE;
    }

    let code = match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Printed directly so a quiet RUST_LOG never hides the failure
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    };
    flush_logs();
    code
}
