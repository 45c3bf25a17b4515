// Error taxonomy for negotiation sessions
//
// Application layers return anyhow::Result and attach context; callers that
// need to tell the categories apart downcast to NegotiationError.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal error categories surfaced to the operator.
///
/// Scoring never produces one of these: an invalid deal is worth zero points,
/// not an error.
#[derive(Error, Debug)]
pub enum NegotiationError {
    /// Malformed configuration, scores, or settings. Raised before any session
    /// state is created.
    #[error("Setup error: {0}")]
    Setup(String),

    /// Persisted history does not line up with a completed-round boundary.
    #[error("Corrupt session state at {path}: {reason}")]
    CorruptState { path: PathBuf, reason: String },

    /// The moderator broke the tagged-markup contract.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Writing session state to disk failed. The previous file is intact.
    #[error("Failed to persist session state to {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NegotiationError {
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup(message.into())
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptState {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolViolation(message.into())
    }

    pub fn is_setup(&self) -> bool {
        matches!(self, Self::Setup(_))
    }

    pub fn is_corrupt_state(&self) -> bool {
        matches!(self, Self::CorruptState { .. })
    }

    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::ProtocolViolation(_))
    }
}

/// Find a `NegotiationError` anywhere in an anyhow chain.
pub fn classify(err: &anyhow::Error) -> Option<&NegotiationError> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<NegotiationError>())
}
