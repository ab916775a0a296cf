//! Error types shared by the codec, the pager and the operations.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Error reported by a [`crate::transport::TableTransport`] when a request could not be
/// exchanged with the service at all (connection refused, timeout, TLS failure...).
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An EDM-tagged value's declared type disagrees with the shape of its value.
    #[error("type mismatch on property `{property}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// The offending property name.
        property: String,
        /// What the declared EDM type requires.
        expected: String,
        /// What was actually supplied.
        found: String,
    },
    /// A wire value cannot be decoded according to its type hint.
    #[error("cannot deserialize property `{property}` from {value}: {reason}")]
    Deserialization {
        /// The offending property name.
        property: String,
        /// The raw wire value, rendered as JSON.
        value: String,
        /// Why decoding failed.
        reason: String,
    },
    /// An entity cannot be addressed because a key property is missing or not a string.
    #[error("entity has no string `{property}` property")]
    MissingKey {
        /// `PartitionKey` or `RowKey`.
        property: &'static str,
    },
    /// Only one of the two continuation fields was supplied.
    #[error(
        "invalid continuation: next partition key {next_partition_key:?} and next row key {next_row_key:?} must be supplied together"
    )]
    InvalidContinuation {
        /// The next partition key, if any.
        next_partition_key: Option<String>,
        /// The next row key, if any.
        next_row_key: Option<String>,
    },
    /// The service answered with a non-success status.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),
    /// A success response whose body does not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A non-success response from the service.
///
/// The code and message are decoded from the OData error body when it has the usual
/// `{"odata.error": {"code": .., "message": {"lang": .., "value": ..}}}` shape; otherwise
/// the message carries the raw body.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceError {
    /// The HTTP status code.
    pub status: u16,
    /// The machine-readable error code, e.g. `ResourceNotFound`.
    pub code: Option<String>,
    /// The human-readable message.
    pub message: String,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "service error {} ({code}): {}", self.status, self.message),
            None => write!(f, "service error {}: {}", self.status, self.message),
        }
    }
}

impl std::error::Error for ServiceError {}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "odata.error")]
    odata_error: ODataError,
}

#[derive(Deserialize)]
struct ODataError {
    code: String,
    message: ODataErrorMessage,
}

#[derive(Deserialize)]
struct ODataErrorMessage {
    value: String,
}

impl ServiceError {
    /// Build a service error from a status code and an optional response body.
    pub fn from_body(status: u16, body: Option<&serde_json::Value>) -> Self {
        let Some(body) = body else {
            return Self {
                status,
                code: None,
                message: String::new(),
            };
        };
        match serde_json::from_value::<ErrorBody>(body.clone()) {
            Ok(error_body) => Self {
                status,
                code: Some(error_body.odata_error.code),
                message: error_body.odata_error.message.value,
            },
            Err(_error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(status, error = %_error, "undecodable service error body");
                let message = match body {
                    serde_json::Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                Self {
                    status,
                    code: None,
                    message,
                }
            }
        }
    }
}
