//! `a2a-inspector send`: deliver one message and print every response.

use std::sync::Arc;

use a2a_inspector_core::{AgentConnector, Dispatcher, HttpConnector, OutboundMessage};
use clap::Args;
use colored::Colorize;

use super::{Context, OutputFormat};
use crate::render::ConsoleSink;

#[derive(Args)]
pub struct SendArgs {
    /// Base URL of the agent.
    pub url: String,
    /// Message text.
    #[arg(long, short)]
    pub message: String,
    /// Correlation id (generated when omitted).
    #[arg(long)]
    pub id: Option<String>,
    /// Use `message/send` even if the agent supports streaming.
    #[arg(long)]
    pub no_stream: bool,
}

pub async fn execute(args: SendArgs, ctx: &Context) -> anyhow::Result<()> {
    let text_output = ctx.output == OutputFormat::Text;
    let connection = match HttpConnector::new(&ctx.config).connect(&args.url).await {
        Ok(connection) => connection,
        Err(e) => {
            println!("  {} Failed to connect: {}", "✗".red().bold(), e.to_string().dimmed());
            anyhow::bail!("could not connect to {}", args.url);
        }
    };

    let streaming = connection.supports_streaming() && !args.no_stream;
    if text_output {
        let mode = if streaming { "streaming" } else { "synchronous" };
        println!(
            "\n  {} {} {}",
            "📨".to_string(),
            "Sending".bold(),
            format!("({mode})").dimmed()
        );
    }

    let dispatcher = Dispatcher::new(
        connection.transport,
        Arc::new(ConsoleSink::new(ctx.output, ctx.debug)),
    )
    .with_accepted_output_modes(ctx.config.accepted_output_modes.clone());

    let mut message = OutboundMessage::new(args.message, streaming);
    if let Some(id) = args.id {
        message = message.with_correlation_id(id);
    }
    let summary = dispatcher.dispatch(message).await;

    if text_output {
        println!(
            "\n  {} {} response(s), {} error(s)  {}",
            "→".dimmed(),
            summary.payloads,
            summary.errors,
            summary.correlation_id.dimmed()
        );
    }
    Ok(())
}
