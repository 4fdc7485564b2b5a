//! Error kinds shared by the channel, the dispatcher and the host client.

use crate::serializer::{Panicked, Preempted};

/// Reason string carried by error envelopes for superseded calls.
pub const PREEMPTED_REASON: &str = "Preempted";

/// A JSON value could not be validated into an envelope variant.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("envelope has no `type` field")]
    MissingType,
    #[error("`{kind}` envelope is missing `{field}`")]
    MissingField { kind: String, field: &'static str },
    #[error("`{kind}` envelope has an invalid payload: {reason}")]
    InvalidPayload { kind: String, reason: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failure reported by a language-service provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// A newer call replaced this one before it ran.
    #[error("Preempted")]
    Preempted,
    #[error("No quickinfo available")]
    NoInfo,
    #[error("language service does not implement {0}")]
    Unsupported(&'static str),
    #[error("language service panicked")]
    Panicked,
    #[error("{0}")]
    Failed(String),
}

impl ProviderError {
    /// The text placed in the `error` field of an outbound envelope.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    pub fn is_preempted(&self) -> bool {
        matches!(self, ProviderError::Preempted)
    }
}

impl From<Preempted> for ProviderError {
    fn from(_: Preempted) -> Self {
        ProviderError::Preempted
    }
}

impl From<Panicked> for ProviderError {
    fn from(_: Panicked) -> Self {
        ProviderError::Panicked
    }
}

/// Outcome of a correlated request seen from the host side.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The plugin answered with the preemption reason; a newer request owns the result.
    #[error("request was preempted by a newer one")]
    Preempted,
    #[error("plugin reported an error: {0}")]
    Plugin(String),
    #[error("no response before the request timeout")]
    Timeout,
    #[error("channel closed before a response arrived")]
    Closed,
}

impl RequestError {
    pub(crate) fn from_reason(reason: String) -> Self {
        if reason == PREEMPTED_REASON {
            RequestError::Preempted
        } else {
            RequestError::Plugin(reason)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
