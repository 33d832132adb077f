//! `a2a-inspector validate`: check a stored card or protocol message offline.

use std::path::PathBuf;

use a2a_inspector_core::{validate_agent_card, validate_message};
use anyhow::Context as _;
use clap::Args;
use colored::Colorize;
use serde_json::{json, Value};

use super::{Context, OutputFormat};
use crate::render;

#[derive(Args)]
pub struct ValidateArgs {
    /// JSON file to validate.
    pub file: PathBuf,
    /// What the document is; guessed from its `kind` field when omitted.
    #[arg(long = "as", value_name = "KIND")]
    pub kind: Option<DocumentKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DocumentKind {
    Card,
    Message,
}

impl DocumentKind {
    /// Protocol messages carry `kind`; cards never do.
    fn guess(document: &Value) -> Self {
        if document.get("kind").is_some() {
            DocumentKind::Message
        } else {
            DocumentKind::Card
        }
    }
}

pub fn execute(args: ValidateArgs, ctx: &Context) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let document: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", args.file.display()))?;

    let kind = args.kind.unwrap_or_else(|| DocumentKind::guess(&document));
    let violations = check(&document, kind);

    match ctx.output {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "file": args.file.display().to_string(),
                "as": format!("{kind:?}").to_lowercase(),
                "validation_errors": violations,
            })
        ),
        OutputFormat::Text => {
            println!(
                "\n  {} {} {}",
                "✅".to_string(),
                args.file.display().to_string().bold(),
                format!("({kind:?})").to_lowercase().dimmed()
            );
            render::print_violations(&violations);
        }
    }

    if !violations.is_empty() {
        anyhow::bail!("{} validation error(s)", violations.len());
    }
    Ok(())
}

fn check(document: &Value, kind: DocumentKind) -> Vec<String> {
    match kind {
        DocumentKind::Card => validate_agent_card(document),
        DocumentKind::Message => validate_message(document),
    }
}
