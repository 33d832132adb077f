//! Agent card validation.
//!
//! Checks a fetched card against the required-field and format rules and
//! reports every violation as a human-readable string. The card is never
//! modified and validation never fails.

use serde_json::Value;

use crate::payload::{lookup, Presence};

/// Top-level fields every agent card must carry.
pub const REQUIRED_CARD_FIELDS: [&str; 7] = [
    "name",
    "description",
    "url",
    "version",
    "defaultInputModes",
    "defaultOutputModes",
    "skills",
];

const MODE_FIELDS: [&str; 2] = ["defaultInputModes", "defaultOutputModes"];

/// Validate an agent card, returning violations in the order they were found.
///
/// Fields are checked in card order: name, description, url, version,
/// capabilities, modes, skills. An empty list means the card is well-formed.
pub fn validate_agent_card(card: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    require(card, "name", &mut errors);
    require(card, "description", &mut errors);
    require(card, "url", &mut errors);
    check_url(card, &mut errors);
    require(card, "version", &mut errors);
    check_capabilities(card, &mut errors);
    for field in MODE_FIELDS {
        check_modes(card, field, &mut errors);
    }
    check_skills(card, &mut errors);

    errors
}

fn require(card: &Value, field: &str, errors: &mut Vec<String>) {
    if lookup(card, field).is_absent() {
        errors.push(missing_field(field));
    }
}

fn check_url(card: &Value, errors: &mut Vec<String>) {
    let Some(url) = lookup(card, "url").value() else {
        return;
    };
    let absolute = url
        .as_str()
        .is_some_and(|u| u.starts_with("http://") || u.starts_with("https://"));
    if !absolute {
        errors.push("Field 'url' must be an absolute URL starting with http:// or https://.".into());
    }
}

fn check_capabilities(card: &Value, errors: &mut Vec<String>) {
    if let Some(capabilities) = lookup(card, "capabilities").value() {
        if !capabilities.is_object() {
            errors.push("Field 'capabilities' must be an object.".into());
        }
    }
}

// An empty mode list is reported as missing.
fn check_modes(card: &Value, field: &str, errors: &mut Vec<String>) {
    match lookup(card, field) {
        Presence::Absent | Presence::Empty(Value::Array(_)) => errors.push(missing_field(field)),
        Presence::Present(Value::Array(items)) => {
            if !items.iter().all(Value::is_string) {
                errors.push(format!("All items in '{field}' must be strings."));
            }
        }
        Presence::Empty(_) | Presence::Present(_) => {
            errors.push(format!("Field '{field}' must be an array of strings."))
        }
    }
}

fn check_skills(card: &Value, errors: &mut Vec<String>) {
    match lookup(card, "skills") {
        Presence::Absent => errors.push(missing_field("skills")),
        Presence::Empty(Value::Array(_)) => errors.push(
            "Field 'skills' array is empty. Agent must have at least one skill if it performs actions."
                .into(),
        ),
        Presence::Present(Value::Array(skills)) => {
            for (index, skill) in skills.iter().enumerate() {
                if lookup(skill, "name").is_absent() {
                    errors.push(format!(
                        "Skill at index {index} is missing required field: 'name'."
                    ));
                }
            }
        }
        Presence::Empty(_) | Presence::Present(_) => {
            errors.push("Field 'skills' must be an array of AgentSkill objects.".into())
        }
    }
}

/// Whether the card declares `capabilities.streaming: true`.
pub fn supports_streaming(card: &Value) -> bool {
    lookup(card, "capabilities.streaming").value() == Some(&Value::Bool(true))
}

fn missing_field(field: &str) -> String {
    format!("Required field is missing: '{field}'.")
}
