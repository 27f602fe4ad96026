use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use issueform_cli::cli::Cli;
use issueform_cli::runner::RunSummary;
use issueform_cli::{logging, runner, RunConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match RunConfig::from_cli(cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("ERROR: {err}");
            return ExitCode::from(err.exit_code());
        }
    };

    let _log_guard = logging::init(&cfg.artifacts_dir, cfg.verbose);

    match runner::run(cfg).await {
        Ok(RunSummary::AlreadySubmitted { number, url }) => {
            match (number, url) {
                (Some(number), Some(url)) => {
                    println!("Issue already submitted: #{number} ({url})")
                }
                (Some(number), None) => println!("Issue already submitted: #{number}"),
                (None, Some(url)) => println!("Issue already submitted: {url}"),
                (None, None) => unreachable!("guard requires at least one identifier"),
            }
            ExitCode::SUCCESS
        }
        Ok(RunSummary::Submitted { number, url }) => {
            println!("SUCCESS: issue #{number} created at {url}");
            ExitCode::SUCCESS
        }
        Ok(RunSummary::DryRun) => {
            println!("NO-SUBMIT: form filled, create action not clicked.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "run failed");
            eprintln!("ERROR: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
