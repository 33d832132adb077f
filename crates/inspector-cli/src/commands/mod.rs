//! CLI command definitions and dispatch.

pub mod card;
pub mod chat;
pub mod send;
pub mod validate;

use std::path::PathBuf;

use a2a_inspector_core::config::CONFIG_ENV;
use a2a_inspector_core::telemetry::DEFAULT_FILTER;
use a2a_inspector_core::{init_telemetry_with_filter, InspectorConfig};
use clap::{Parser, Subcommand};

const BANNER: &str = r#"
   🔍 A2A Inspector
   See exactly what your agent says.
"#;

/// A2A Inspector: a debugging console for Agent-to-Agent agents.
#[derive(Parser)]
#[command(
    name = "a2a-inspector",
    version,
    about = "🔍 A2A Inspector: validate agent cards and watch agent responses",
    long_about = BANNER,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Also print the raw request/response records.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Extra HTTP header sent to the agent (repeatable).
    #[arg(long = "header", short = 'H', global = true, value_name = "NAME=VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Config file (defaults to ~/.a2a-inspector/config.toml).
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🪪 Fetch and validate an agent's card.
    Card(card::CardArgs),

    /// 📨 Send one message and print every response.
    Send(send::SendArgs),

    /// 💬 Chat with an agent interactively.
    Chat(chat::ChatArgs),

    /// ✅ Validate a card or protocol message stored in a JSON file.
    Validate(validate::ValidateArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Settings shared by every command.
pub struct Context {
    pub config: InspectorConfig,
    pub output: OutputFormat,
    pub debug: bool,
}

/// Execute the CLI command.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => InspectorConfig::load_from(path)?,
        None => InspectorConfig::load()?,
    };
    config.merge_headers(cli.headers);

    let default_filter = if cli.debug { DEFAULT_FILTER } else { "warn" };
    init_telemetry_with_filter(&config.telemetry, default_filter)?;

    let ctx = Context {
        config,
        output: cli.output,
        debug: cli.debug,
    };

    match cli.command {
        Commands::Card(args) => card::execute(args, &ctx).await,
        Commands::Send(args) => send::execute(args, &ctx).await,
        Commands::Chat(args) => chat::execute(args, &ctx).await,
        Commands::Validate(args) => validate::execute(args, &ctx),
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}
