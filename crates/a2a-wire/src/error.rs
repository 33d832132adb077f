//! A2A wire error types.

use thiserror::Error;

/// Errors raised while talking to a remote A2A agent.
#[derive(Debug, Error)]
pub enum A2AError {
    /// Failed to fetch the agent card from the well-known endpoint.
    #[error("agent discovery failed: {0}")]
    DiscoveryFailed(String),

    /// The agent card document could not be decoded as JSON.
    #[error("invalid agent card: {0}")]
    InvalidAgentCard(String),

    /// HTTP transport error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote endpoint answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// A JSON-RPC envelope carried neither `result` nor `error`.
    #[error("malformed JSON-RPC envelope: {0}")]
    MalformedEnvelope(String),

    /// Streaming error (SSE).
    #[error("streaming error: {0}")]
    StreamingError(String),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A custom header name or value was rejected.
    #[error("invalid header '{0}'")]
    InvalidHeader(String),
}

/// A2A Result type alias.
pub type A2AResult<T> = Result<T, A2AError>;
