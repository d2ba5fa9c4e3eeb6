//! genesis-gate: diagnostic entry point for the gateway authorization
//! pipeline.

use std::process::ExitCode;

use clap::Parser;
use genesis_commons::{DisplayErrorFormatter, ErrorFormatter};

mod cli;
mod main_helpers;

use cli::args::Cli;
use main_helpers::initialize_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    let rust_log = initialize_tracing(&args);
    tracing::debug!(rust_log, command = ?args.command, "starting genesis-gate");

    match cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", DisplayErrorFormatter.format_error(&err));
            ExitCode::FAILURE
        }
    }
}
