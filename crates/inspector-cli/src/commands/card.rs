//! `a2a-inspector card`: fetch and validate an agent card.

use a2a_inspector_core::inspect_agent_card;
use a2a_wire::CardResolver;
use clap::Args;
use colored::Colorize;

use super::{Context, OutputFormat};
use crate::render::{self, ConsoleSink};

#[derive(Args)]
pub struct CardArgs {
    /// Base URL of the agent.
    pub url: String,
}

pub async fn execute(args: CardArgs, ctx: &Context) -> anyhow::Result<()> {
    if ctx.output == OutputFormat::Text {
        println!("\n  {} Fetching card from {}...", "🔍".to_string(), args.url.bold());
    }

    let resolver = CardResolver::new(ctx.config.card_timeout())?
        .with_headers(ctx.config.header_pairs())?;
    let sink = ConsoleSink::new(ctx.output, ctx.debug);

    match inspect_agent_card(&resolver, &args.url, None, &sink).await {
        Ok(inspection) => match ctx.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&inspection)?),
            OutputFormat::Text => render::print_card(&inspection),
        },
        Err(e) => {
            println!("  {} Failed: {}", "✗".red().bold(), e.to_string().dimmed());
            anyhow::bail!("could not inspect the agent card at {}", args.url);
        }
    }
    Ok(())
}
