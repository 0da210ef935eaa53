//! Error types for voteguard.

use crate::access::Reason;
use thiserror::Error;

/// Result type alias for engine configuration operations.
pub type Result<T> = std::result::Result<T, DecisionError>;

/// Errors a voter can report from `vote_on_attribute`.
///
/// The engine never inspects these beyond recording an attached reason;
/// every variant aborts the decision the same way.
#[derive(Error, Debug)]
pub enum VoterError {
    #[error("vote cancelled")]
    Cancelled,

    #[error("vote deadline exceeded")]
    DeadlineExceeded,

    #[error("vote failed: {message}")]
    Failed { message: String },

    #[error("{0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// An error that also carries a reason message for the audit trail.
    #[error("{source}")]
    WithReason {
        reason: String,
        #[source]
        source: Box<VoterError>,
    },
}

impl VoterError {
    /// Create a plain failure.
    pub fn failed(message: impl Into<String>) -> Self {
        VoterError::Failed {
            message: message.into(),
        }
    }

    /// Wrap any error type.
    pub fn source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        VoterError::Source(Box::new(err))
    }

    /// Attach a reason message to this error.
    pub fn with_reason(self, reason: impl Into<String>) -> Self {
        VoterError::WithReason {
            reason: reason.into(),
            source: Box::new(self),
        }
    }

    /// The reason message attached with [`VoterError::with_reason`], if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            VoterError::WithReason { reason, .. } => Some(reason.as_str()),
            _ => None,
        }
    }

    /// Whether the underlying cause is cancellation or an expired deadline.
    pub fn is_cancellation(&self) -> bool {
        match self {
            VoterError::Cancelled | VoterError::DeadlineExceeded => true,
            VoterError::WithReason { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }
}

/// Errors produced by the decision engine.
#[derive(Error, Debug)]
pub enum DecisionError {
    #[error("invalid strategy: {0}")]
    InvalidStrategy(String),

    #[error("invalid engine settings: {0}")]
    InvalidSettings(String),

    #[error("voter '{voter}' failed on attribute '{attribute}': {source}")]
    VoterFailure {
        voter: String,
        attribute: String,
        #[source]
        source: VoterError,
    },
}

impl From<serde_json::Error> for DecisionError {
    fn from(err: serde_json::Error) -> Self {
        DecisionError::InvalidSettings(err.to_string())
    }
}

/// A failed decision.
///
/// Carries every reason collected before and including the failing voter
/// call so the evaluation can still be audited.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct DecisionFailure {
    #[source]
    pub error: DecisionError,
    pub reasons: Vec<Reason>,
}

impl DecisionFailure {
    /// Create a failure with no reasons.
    pub fn new(error: DecisionError) -> Self {
        Self {
            error,
            reasons: Vec::new(),
        }
    }

    /// Create a failure carrying partial reasons.
    pub fn with_reasons(error: DecisionError, reasons: Vec<Reason>) -> Self {
        Self { error, reasons }
    }

    /// Failed decisions never grant access.
    pub fn granted(&self) -> bool {
        false
    }
}

impl From<DecisionError> for DecisionFailure {
    fn from(error: DecisionError) -> Self {
        Self::new(error)
    }
}
