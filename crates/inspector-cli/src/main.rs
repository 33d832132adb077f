//! A2A Inspector CLI: validate agent cards and watch agent responses from the terminal.
//!
//! 🔍 `a2a-inspector` is the terminal front end of the A2A inspector.

mod commands;
mod render;

use clap::Parser;
use commands::{execute, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    execute(cli).await
}
