//! Binary crate for the `wxnorm` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly or JSON output formatting

use clap::Parser;

mod cli;
mod logger;
mod output;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    logger::init_cli_logger(cmd.verbose);
    cmd.run().await
}
