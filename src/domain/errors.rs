//! Domain errors for the action bridge.
//!
//! Every stage of an invocation returns [`DomainResult`]. The error
//! translator in the stdio adapter turns a [`DomainError`] into an error
//! envelope; nothing here ever crosses the transport as a panic.

use thiserror::Error;

/// Render the upstream status/code pair that prefixes remote error messages.
fn upstream_suffix(status: &Option<u16>, code: &Option<String>) -> String {
    match (status, code) {
        (Some(status), Some(code)) => format!(" ({status} {code})"),
        (Some(status), None) => format!(" ({status})"),
        (None, Some(code)) => format!(" ({code})"),
        (None, None) => String::new(),
    }
}

/// Caller-side contract violations. These are detected before any network
/// call is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unknown capability `{0}`")]
    UnknownCapability(String),

    #[error("Capability `{0}` is not configured on this server")]
    CapabilityDisabled(String),

    #[error("Parameter `action` is required for capability `{capability}`")]
    MissingAction { capability: String },

    #[error("Unknown action `{action}` for capability `{capability}`")]
    UnknownAction { action: String, capability: String },

    #[error("Parameter `{parameter}` is required for action `{action}`")]
    MissingParameter { parameter: String, action: String },

    #[error("Invalid parameter `{parameter}` for action `{action}`: {reason}")]
    InvalidParameter {
        parameter: String,
        action: String,
        reason: String,
    },

    #[error("Invalid arguments for action `{action}`: {reason}")]
    InvalidArguments { action: String, reason: String },

    #[error("Action `{action}` blocked: {conflicts} overlapping busy interval(s)")]
    SchedulingConflict { action: String, conflicts: usize },
}

impl ValidationError {
    /// Shorthand for the most common failure.
    pub fn missing(parameter: impl Into<String>, action: impl Into<String>) -> Self {
        Self::MissingParameter {
            parameter: parameter.into(),
            action: action.into(),
        }
    }

    /// Shorthand for a parameter whose value has the wrong shape.
    pub fn invalid(
        parameter: impl Into<String>,
        action: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable reason, reported as `data.reason`.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::UnknownCapability(_) => "UnknownCapability",
            Self::CapabilityDisabled(_) => "CapabilityDisabled",
            Self::MissingAction { .. } => "MissingAction",
            Self::UnknownAction { .. } => "UnknownAction",
            Self::MissingParameter { .. } => "MissingParameter",
            Self::InvalidParameter { .. } => "InvalidParameter",
            Self::InvalidArguments { .. } => "InvalidArguments",
            Self::SchedulingConflict { .. } => "SchedulingConflict",
        }
    }
}

/// A failure reported by (or while talking to) an external service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{service} API error{}: {message}", upstream_suffix(.status, .code))]
pub struct RemoteError {
    /// Capability name of the service that failed.
    pub service: String,
    /// Upstream HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Upstream error code (e.g. `object_not_found`, `rateLimitExceeded`).
    pub code: Option<String>,
    /// Upstream message, verbatim.
    pub message: String,
}

impl RemoteError {
    /// Upstream error without status or code.
    pub fn new(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            status: None,
            code: None,
            message: message.into(),
        }
    }

    /// HTTP status reported by the service.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Service-specific error code or reason.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// The request exceeded the client's timeout.
    pub fn timeout(service: impl Into<String>) -> Self {
        Self::new(service, "request timed out").with_code("timeout")
    }
}

/// Coarse classification carried in every error envelope as `data.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationError,
    RemoteServiceError,
    TransportError,
    UnknownError,
}

impl ErrorKind {
    /// Stable label used in `error.data.kind`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "ValidationError",
            Self::RemoteServiceError => "RemoteServiceError",
            Self::TransportError => "TransportError",
            Self::UnknownError => "UnknownError",
        }
    }
}

/// Domain-level errors that can occur while handling one invocation.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not authenticated with {0}")]
    NotAuthenticated(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Coarse class of the error, which picks the JSON-RPC code.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Remote(_) | Self::NotAuthenticated(_) => ErrorKind::RemoteServiceError,
            Self::Transport(_) => ErrorKind::TransportError,
            Self::Internal(_) => ErrorKind::UnknownError,
        }
    }

    /// Finer-grained reason, when one exists.
    pub const fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Validation(err) => Some(err.reason()),
            Self::NotAuthenticated(_) => Some("NotAuthenticated"),
            Self::Remote(_) | Self::Transport(_) | Self::Internal(_) => None,
        }
    }
}

/// Result type for handlers and ports.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("Serialization error: {err}"))
    }
}
