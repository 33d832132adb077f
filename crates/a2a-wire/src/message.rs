//! Message: the outbound communication unit sent to a remote agent.
//!
//! The inspector only ever *sends* user messages; everything coming back is
//! handled as untyped JSON so that malformed responses can still be inspected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message exchanged with the remote agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier for this message.
    pub message_id: String,

    /// Role of the sender.
    pub role: MessageRole,

    /// Content parts of the message.
    pub parts: Vec<Part>,

    /// Discriminator, always `"message"`.
    pub kind: String,

    /// Task this message continues, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Context grouping related tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// Optional metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Message {
    /// Create a message from the user (client side).
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            role: MessageRole::User,
            parts,
            kind: "message".into(),
            task_id: None,
            context_id: None,
            metadata: None,
        }
    }

    /// Convenience: create a user message with a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![Part::text(text)])
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The client (the inspector).
    User,
    /// The remote agent.
    Agent,
}

/// A part of a message, discriminated by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Part {
    /// Plain text content.
    #[serde(rename = "text")]
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },

    /// File content, by URI or inline bytes.
    #[serde(rename = "file")]
    File { file: serde_json::Value },

    /// Structured data.
    #[serde(rename = "data")]
    Data { data: serde_json::Value },
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            metadata: None,
        }
    }
}

/// Parameters of `message/send` and `message/stream`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendParams {
    /// The message to send.
    pub message: Message,

    /// Delivery configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<MessageSendConfiguration>,

    /// Optional metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl MessageSendParams {
    /// Wrap a message with the output modes the client is willing to render.
    pub fn new(message: Message, accepted_output_modes: Vec<String>) -> Self {
        Self {
            message,
            configuration: Some(MessageSendConfiguration {
                accepted_output_modes,
                blocking: None,
            }),
            metadata: None,
        }
    }
}

/// Client-side delivery preferences for a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendConfiguration {
    /// MIME types the client accepts in responses.
    #[serde(default)]
    pub accepted_output_modes: Vec<String>,

    /// Whether the agent should block until the task is finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_text_message() {
        let msg = Message::user_text("Hello, agent");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.kind, "message");
        assert!(matches!(&msg.parts[..], [Part::Text { text, .. }] if text == "Hello, agent"));
    }

    #[test]
    fn test_send_params_wire_shape() {
        let params = MessageSendParams::new(
            Message::user_text("ping"),
            vec!["text/plain".into(), "video/mp4".into()],
        );
        let json = serde_json::to_value(&params).unwrap();

        assert_eq!(json["message"]["role"], "user");
        assert_eq!(json["message"]["kind"], "message");
        assert_eq!(json["message"]["parts"][0]["kind"], "text");
        assert_eq!(json["message"]["parts"][0]["text"], "ping");
        assert!(json["message"]["messageId"].is_string());
        assert_eq!(
            json["configuration"]["acceptedOutputModes"],
            serde_json::json!(["text/plain", "video/mp4"])
        );
        assert!(json["configuration"].get("blocking").is_none());
    }
}
