//! Inspector error types.

use thiserror::Error;

use a2a_wire::A2AError;

/// Errors surfaced by the session layer and card inspection.
#[derive(Debug, Error)]
pub enum InspectorError {
    /// Talking to the agent failed.
    #[error(transparent)]
    Wire(#[from] A2AError),

    /// The session exists but no agent is connected to it yet.
    #[error("Client not initialized.")]
    NotInitialized(String),

    /// No session with this id was opened.
    #[error("Unknown session: {0}")]
    UnknownSession(String),
}

/// Inspector Result type alias.
pub type InspectorResult<T> = Result<T, InspectorError>;
