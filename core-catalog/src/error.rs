//! Error types for the catalog client

use std::fmt;
use std::time::Duration;

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Message shown to users when a catalog call fails for good.
pub const CATALOG_UNAVAILABLE_MESSAGE: &str =
    "The music catalog is unavailable right now. Please try again.";

/// Failure of a single transport attempt.
///
/// These never reach callers on their own: the chain moves on to the next
/// transport and only reports them once every transport has failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("no response within {} ms", .0.as_millis())]
    Timeout(Duration),

    /// The injected script failed to load.
    #[error("script failed to load: {0}")]
    ScriptLoad(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// The response was not a JSON object.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// The catalog answered with an embedded `error` object.
    #[error("catalog error{}: {message}", .code.map(|c| format!(" {}", c)).unwrap_or_default())]
    Remote { code: Option<i64>, message: String },

    #[error("bridge failure: {0}")]
    Bridge(BridgeError),
}

impl From<BridgeError> for TransportError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Timeout(after) => TransportError::Timeout(after),
            other => TransportError::Bridge(other),
        }
    }
}

/// A transport failure tagged with the transport that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptFailure {
    pub transport: String,
    pub error: TransportError,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.transport, self.error)
    }
}

/// Catalog client errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// A parameter was missing or malformed; no transport was attempted.
    #[error("Invalid {param}: {reason}")]
    Validation { param: &'static str, reason: String },

    /// Every transport failed and the endpoint has no built-in data.
    #[error("Catalog unavailable for {endpoint} after {} attempt(s)", .failures.len())]
    Unavailable {
        endpoint: String,
        failures: Vec<AttemptFailure>,
    },

    /// The payload did not match the expected shape.
    #[error("Failed to decode {endpoint} response: {message}")]
    Decode { endpoint: String, message: String },

    /// No chart track carries a preview URL.
    #[error("No playable track available")]
    NoPlayableTrack,

    #[error("Catalog configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    pub(crate) fn validation(param: &'static str, reason: impl Into<String>) -> Self {
        CatalogError::Validation {
            param,
            reason: reason.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CatalogError::Validation { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, CatalogError::Unavailable { .. })
    }

    /// Text suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Unavailable { .. } | CatalogError::Decode { .. } => {
                CATALOG_UNAVAILABLE_MESSAGE.to_string()
            }
            CatalogError::NoPlayableTrack => {
                "No playable track is available right now. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
