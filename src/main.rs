mod app;
mod cli;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    rangefetch::observability::init_tracing();

    let cli = Cli::parse();

    match app::run(cli).await {
        Ok(report) => {
            info!(
                destination = %report.destination.display(),
                bytes = report.total_bytes,
                segments = report.segments,
                "Saved"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(stage = e.stage(), "{}", e);
            ExitCode::FAILURE
        }
    }
}
