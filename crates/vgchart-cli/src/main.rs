//! Main entry point for vgchart.

use clap::Parser;
use std::process::ExitCode;
use vgchart_cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    run(Cli::parse()).await
}
