//! Protocol response validation.
//!
//! Every response unit from an agent (a whole reply, or one stream chunk) is
//! classified by its `kind` and checked against the rules for that kind.
//! Only necessary conditions are checked; unrelated fields are ignored.

use serde_json::Value;

use crate::payload::{has_non_empty_array, lookup, Presence};

/// The closed set of response kinds an agent may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Message,
    Task,
    StatusUpdate,
    ArtifactUpdate,
}

impl MessageKind {
    /// Parse a `kind` discriminator.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "message" => Some(Self::Message),
            "task" => Some(Self::Task),
            "status-update" => Some(Self::StatusUpdate),
            "artifact-update" => Some(Self::ArtifactUpdate),
            _ => None,
        }
    }

    /// The wire discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Task => "task",
            Self::StatusUpdate => "status-update",
            Self::ArtifactUpdate => "artifact-update",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a payload was classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Known(MessageKind),
    MissingKind,
    /// Carries the offending discriminator as it should be displayed.
    UnknownKind(String),
}

/// Classify a payload by its `kind` field.
pub fn classify(payload: &Value) -> Classification {
    match lookup(payload, "kind").value() {
        None => Classification::MissingKind,
        Some(Value::String(kind)) => match MessageKind::from_kind(kind) {
            Some(known) => Classification::Known(known),
            None => Classification::UnknownKind(kind.clone()),
        },
        Some(other) => Classification::UnknownKind(other.to_string()),
    }
}

/// Validate one response payload, returning its violations (empty if valid).
///
/// A missing or unknown `kind` yields exactly one violation and skips the
/// per-kind field checks.
pub fn validate_message(payload: &Value) -> Vec<String> {
    let kind = match classify(payload) {
        Classification::Known(kind) => kind,
        Classification::MissingKind => {
            return vec!["Response from agent is missing required 'kind' field.".into()]
        }
        Classification::UnknownKind(kind) => {
            return vec![format!("Unknown message kind received: '{kind}'.")]
        }
    };

    let mut errors = Vec::new();
    match kind {
        MessageKind::Message => {
            if !has_non_empty_array(payload, "parts") {
                errors.push("Message object must have a non-empty 'parts' array.".into());
            }
            if let Some(role) = lookup(payload, "role").value() {
                if role.as_str() != Some("agent") {
                    errors.push("Message from agent must have 'role' set to 'agent'.".into());
                }
            }
        }
        MessageKind::Task => {
            if lookup(payload, "status.state").is_absent() {
                errors.push("Task object missing required field: 'status.state'.".into());
            }
        }
        MessageKind::StatusUpdate => {
            if lookup(payload, "status.state").is_absent() {
                errors.push("StatusUpdate object missing required field: 'status.state'.".into());
            }
        }
        MessageKind::ArtifactUpdate => match lookup(payload, "artifact") {
            Presence::Absent => {
                errors.push("ArtifactUpdate object missing required field: 'artifact'.".into())
            }
            Presence::Empty(_) | Presence::Present(_) => {
                if !has_non_empty_array(payload, "artifact.parts") {
                    errors.push("Artifact object must have a non-empty 'parts' array.".into());
                }
            }
        },
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn with_kind(kind: &str, mut data: Value) -> Value {
        data["kind"] = json!(kind);
        data
    }

    #[test]
    fn test_missing_kind() {
        assert_eq!(
            validate_message(&json!({})),
            vec!["Response from agent is missing required 'kind' field.".to_string()]
        );
        assert_eq!(
            validate_message(&json!({"kind": null, "parts": []})),
            vec!["Response from agent is missing required 'kind' field.".to_string()]
        );
    }

    #[test]
    fn test_unknown_kind_short_circuits() {
        assert_eq!(
            validate_message(&json!({"kind": "bogus"})),
            vec!["Unknown message kind received: 'bogus'.".to_string()]
        );
        assert_eq!(
            validate_message(&json!({"kind": "unknown-kind", "parts": []})),
            vec!["Unknown message kind received: 'unknown-kind'.".to_string()]
        );
        assert_eq!(
            validate_message(&json!({"kind": 3})),
            vec!["Unknown message kind received: '3'.".to_string()]
        );
    }

    #[test]
    fn test_invalid_payloads() {
        let cases = [
            (
                "task",
                json!({"id": "123"}),
                "Task object missing required field: 'status.state'.",
            ),
            (
                "task",
                json!({"status": {}}),
                "Task object missing required field: 'status.state'.",
            ),
            (
                "status-update",
                json!({"status": {}}),
                "StatusUpdate object missing required field: 'status.state'.",
            ),
            (
                "status-update",
                json!({}),
                "StatusUpdate object missing required field: 'status.state'.",
            ),
            (
                "artifact-update",
                json!({}),
                "ArtifactUpdate object missing required field: 'artifact'.",
            ),
            (
                "artifact-update",
                json!({"artifact": {}}),
                "Artifact object must have a non-empty 'parts' array.",
            ),
            (
                "artifact-update",
                json!({"artifact": {"parts": []}}),
                "Artifact object must have a non-empty 'parts' array.",
            ),
            (
                "message",
                json!({"parts": []}),
                "Message object must have a non-empty 'parts' array.",
            ),
            (
                "message",
                json!({"parts": [{"text": "hi"}], "role": "user"}),
                "Message from agent must have 'role' set to 'agent'.",
            ),
        ];

        for (kind, data, expected) in cases {
            let errors = validate_message(&with_kind(kind, data.clone()));
            assert_eq!(errors, vec![expected.to_string()], "{kind} {data}");
        }
    }

    #[test]
    fn test_valid_payloads() {
        let cases = [
            ("task", json!({"id": "123", "status": {"state": "running"}})),
            ("status-update", json!({"status": {"state": "thinking"}})),
            ("artifact-update", json!({"artifact": {"parts": [{"text": "result"}]}})),
            ("message", json!({"parts": [{"text": "hello"}], "role": "agent"})),
            ("message", json!({"parts": [{"text": "no role given"}]})),
        ];

        for (kind, data) in cases {
            let errors = validate_message(&with_kind(kind, data.clone()));
            assert!(errors.is_empty(), "{kind} {data}: {errors:?}");
        }
    }

    #[test]
    fn test_message_rules_accumulate() {
        let errors = validate_message(&json!({"kind": "message", "parts": [], "role": "user"}));
        assert_eq!(
            errors,
            vec![
                "Message object must have a non-empty 'parts' array.".to_string(),
                "Message from agent must have 'role' set to 'agent'.".to_string(),
            ]
        );
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let payload = json!({
            "kind": "status-update",
            "status": {"state": "working", "message": 42},
            "final": "not-a-bool",
            "whatever": [null, {}]
        });
        assert!(validate_message(&payload).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let payload = json!({"kind": "artifact-update", "artifact": {"parts": []}});
        assert_eq!(validate_message(&payload), validate_message(&payload));
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(&json!({"kind": "status-update"})),
            Classification::Known(MessageKind::StatusUpdate)
        );
        assert_eq!(classify(&json!({})), Classification::MissingKind);
        assert_eq!(
            classify(&json!({"kind": "nope"})),
            Classification::UnknownKind("nope".into())
        );
        assert_eq!(MessageKind::ArtifactUpdate.to_string(), "artifact-update");
    }
}
