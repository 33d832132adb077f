//! `a2a-inspector chat`: interactive session with one agent.

use std::sync::Arc;

use a2a_inspector_core::{validate_agent_card, CardInspection, HttpConnector, SessionRegistry};
use clap::Args;
use colored::Colorize;

use super::Context;
use crate::render::{self, ConsoleSink};

const SESSION: &str = "console";

#[derive(Args)]
pub struct ChatArgs {
    /// Base URL of the agent.
    pub url: String,
}

pub async fn execute(args: ChatArgs, ctx: &Context) -> anyhow::Result<()> {
    let registry = SessionRegistry::new(
        Arc::new(HttpConnector::new(&ctx.config)),
        ctx.config.accepted_output_modes.clone(),
    );
    registry
        .open(SESSION, Arc::new(ConsoleSink::new(ctx.output, ctx.debug)))
        .await;

    println!("\n  {} Connecting to {}...", "💬".to_string(), args.url.bold());
    if registry.initialize(SESSION, &args.url).await.is_err() {
        registry.close(SESSION).await;
        anyhow::bail!("could not connect to {}", args.url);
    }

    println!(
        "  {} Type your message ('/card' shows the agent card, Ctrl+D or 'quit' to exit)\n",
        "→".dimmed()
    );

    loop {
        let input = match tokio::task::spawn_blocking(read_line).await? {
            Some(input) => input,
            None => break,
        };

        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }
        if trimmed == "/card" {
            if let Some(card) = registry.card(SESSION).await {
                let validation_errors = validate_agent_card(&card);
                render::print_card(&CardInspection {
                    card,
                    validation_errors,
                });
                println!();
            }
            continue;
        }

        let task = registry.spawn_send_message(SESSION, trimmed, None).await?;
        tokio::select! {
            finished = task => {
                if let Ok(summary) = finished {
                    println!(
                        "\n  {} {} response(s), {} error(s)\n",
                        "→".dimmed(),
                        summary.payloads,
                        summary.errors
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\n  {} Interrupted.", "⚠".yellow().bold());
                break;
            }
        }
    }

    registry.close(SESSION).await;
    println!("\n  {} Session ended.", "→".dimmed());
    Ok(())
}

fn read_line() -> Option<String> {
    dialoguer::Input::<String>::new()
        .with_prompt(format!("  {}", "You".cyan().bold()))
        .allow_empty(false)
        .interact_text()
        .ok()
}
