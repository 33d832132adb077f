//! Terminal rendering of inspector events.

use a2a_inspector_core::payload::str_at;
use a2a_inspector_core::{
    AgentResponse, CardInspection, ClientInitialized, DebugRecord, EventSink, InspectorEvent,
};
use colored::Colorize;
use serde_json::{json, Value};

use crate::commands::OutputFormat;

/// Prints events as they arrive.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    output: OutputFormat,
    debug: bool,
}

impl ConsoleSink {
    pub fn new(output: OutputFormat, debug: bool) -> Self {
        Self { output, debug }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: InspectorEvent) {
        if matches!(event, InspectorEvent::Debug(_)) && !self.debug {
            return;
        }
        match self.output {
            OutputFormat::Json => println!("{}", json_line(&event)),
            OutputFormat::Text => print_event(&event),
        }
    }
}

/// One event as a single JSON line: `{"event": <name>, "data": <event>}`.
pub fn json_line(event: &InspectorEvent) -> String {
    json!({ "event": event.name(), "data": event }).to_string()
}

fn print_event(event: &InspectorEvent) {
    match event {
        InspectorEvent::Debug(record) => print_debug(record),
        InspectorEvent::Response(response) => print_response(response),
        InspectorEvent::Initialized(ClientInitialized::Success) => {
            println!("  {} Connected", "✓".green().bold());
        }
        InspectorEvent::Initialized(ClientInitialized::Error { message }) => {
            println!("  {} Failed to connect: {}", "✗".red().bold(), message);
        }
    }
}

fn print_debug(record: &DebugRecord) {
    let kind = serde_json::to_value(record.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default();
    println!(
        "  {} {:<8} {}  {}",
        "·".dimmed(),
        kind.dimmed(),
        record.id.dimmed(),
        record.data.to_string().dimmed()
    );
}

fn print_response(response: &AgentResponse) {
    match response {
        AgentResponse::Error { error, id } => {
            println!("\n  {} {}  {}", "✗".red().bold(), error.red(), id.dimmed());
        }
        AgentResponse::Payload {
            payload,
            id,
            validation_errors,
        } => {
            let payload = Value::Object(payload.clone());
            let kind = str_at(&payload, "kind").unwrap_or("?");
            println!("\n  {} {}  {}", "🤖".to_string(), kind.green().bold(), id.dimmed());
            for line in summarize(&payload).lines() {
                println!("    {}", line);
            }
            print_violations(validation_errors);
        }
    }
}

pub fn print_violations(violations: &[String]) {
    if violations.is_empty() {
        println!("  {} valid", "✓".green());
    }
    for violation in violations {
        println!("  {} {}", "⚠".yellow().bold(), violation.yellow());
    }
}

/// Human-readable digest of a protocol payload.
pub fn summarize(payload: &Value) -> String {
    match str_at(payload, "kind") {
        Some("message") => parts_text(payload.get("parts")),
        Some("task") | Some("status-update") => {
            let state = str_at(payload, "status.state").unwrap_or("?");
            let text = parts_text(payload.pointer("/status/message/parts"));
            if text.is_empty() {
                format!("[{state}]")
            } else {
                format!("[{state}] {text}")
            }
        }
        Some("artifact-update") => {
            let text = parts_text(payload.pointer("/artifact/parts"));
            match str_at(payload, "artifact.name") {
                Some(name) => format!("{name}: {text}"),
                None => text,
            }
        }
        _ => payload.to_string(),
    }
}

/// Concatenated `text` of every text part.
fn parts_text(parts: Option<&Value>) -> String {
    parts
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

pub fn print_card(inspection: &CardInspection) {
    let card = &inspection.card;
    let field = |path: &str| str_at(card, path).unwrap_or("-").to_string();
    let streaming = if a2a_inspector_core::supports_streaming(card) {
        "yes".green()
    } else {
        "no".dimmed()
    };

    println!("\n  {} {}\n", "🪪".to_string(), field("name").bold());
    println!("  {:<14} {}", "Version:".bold(), field("version"));
    println!("  {:<14} {}", "URL:".bold(), field("url"));
    println!("  {:<14} {}", "Streaming:".bold(), streaming);
    println!("  {:<14} {}", "Description:".bold(), field("description"));

    if let Some(skills) = card.get("skills").and_then(Value::as_array) {
        println!("\n  {} ({}):", "Skills".bold(), skills.len());
        for skill in skills {
            let name = str_at(skill, "name").unwrap_or("<unnamed>");
            let description = str_at(skill, "description").unwrap_or("");
            println!("    {} {}  {}", "•".dimmed(), name, description.dimmed());
        }
    }

    println!();
    print_violations(&inspection.validation_errors);
}
