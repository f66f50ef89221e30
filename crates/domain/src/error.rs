//! Common error types used across the workspace.
//!
//! Each layer defines typed errors and converts into [`AppWakeError`] via
//! `#[from]`. Activation outcomes are *not* errors: a failed activation is a
//! [`ResultCode`](crate::activation::ResultCode) carried in the response.

/// Top-level error for fallible domain and port operations.
#[derive(Debug, thiserror::Error)]
pub enum AppWakeError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("malformed message")]
    Message(#[from] MessageError),

    #[error("collaborator failure")]
    Port(#[from] PortError),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("package name must not be empty")]
    EmptyPackageName,

    #[error("unsupported protocol version {0}")]
    UnknownProtocolVersion(u8),

    #[error("registered application must carry a non-zero app id")]
    MissingAppId,

    #[error("application must carry a non-zero hmi app id")]
    MissingHmiAppId,
}

/// Missing or mistyped sections in an inbound HMI message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    #[error("{0} section is absent in the message")]
    MissingSection(&'static str),

    #[error("{0} is not an unsigned integer")]
    NotAnInteger(&'static str),

    #[error("unknown function {0:?}")]
    UnknownFunction(String),
}

/// Failure reported by an injected collaborator (registry, policy, transport).
#[derive(Debug, thiserror::Error)]
#[error("{collaborator} unavailable: {reason}")]
pub struct PortError {
    pub collaborator: &'static str,
    pub reason: String,
}

impl PortError {
    /// Build a port error for the named collaborator.
    #[must_use]
    pub fn new(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self {
            collaborator,
            reason: reason.into(),
        }
    }
}
