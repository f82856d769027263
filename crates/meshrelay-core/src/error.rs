//! Shared error type across meshrelay crates.

use thiserror::Error;

use crate::dispatch::event::DecodeStage;

/// Stable error codes (logged and exposed in HTTP responses).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Channel key string could not be normalized.
    KeyFormat,
    /// Outer bytes are not a service envelope.
    EnvelopeParse,
    /// Inner or type-specific payload failed to decode.
    MalformedPayload,
    /// Configuration rejected at load time.
    BadConfig,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::KeyFormat => "KEY_FORMAT",
            ErrorCode::EnvelopeParse => "ENVELOPE_PARSE",
            ErrorCode::MalformedPayload => "MALFORMED_PAYLOAD",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeshRelayError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum MeshRelayError {
    #[error("key format: {0}")]
    KeyFormat(String),
    #[error("envelope parse: {0}")]
    EnvelopeParse(String),
    #[error("malformed payload at {stage}: {reason}")]
    MalformedPayload {
        stage: DecodeStage,
        portnum: Option<i32>,
        reason: String,
    },
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MeshRelayError {
    /// Map error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeshRelayError::KeyFormat(_) => ErrorCode::KeyFormat,
            MeshRelayError::EnvelopeParse(_) => ErrorCode::EnvelopeParse,
            MeshRelayError::MalformedPayload { .. } => ErrorCode::MalformedPayload,
            MeshRelayError::BadConfig(_) => ErrorCode::BadConfig,
            MeshRelayError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Errors that must abort session setup instead of dropping a single message.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MeshRelayError::KeyFormat(_) | MeshRelayError::BadConfig(_)
        )
    }

    pub(crate) fn malformed(stage: DecodeStage, portnum: Option<i32>, reason: impl Into<String>) -> Self {
        MeshRelayError::MalformedPayload {
            stage,
            portnum,
            reason: reason.into(),
        }
    }
}
