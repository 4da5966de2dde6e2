//! Error types for the student API client.
//!
//! # Design
//! The backend contract only distinguishes three failure classes: the request
//! never got a response (`Transport`), the server rejected the input
//! (`Validation`, HTTP 400, typically a duplicate email), and everything
//! else. `NotFound` keeps its own variant because lookups by id are common
//! enough that callers want to match on it.

use thiserror::Error;

/// Errors returned by `StudentClient` parse methods and transport round-trips.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404; the requested student does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned 400: duplicate email or a payload it refused.
    #[error("rejected by server: {body}")]
    Validation { body: String },

    /// The server returned a non-2xx status other than 400 or 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// No response was received at all.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ApiError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation { .. })
    }
}

/// Network-level failure: DNS, refused connection, reset, and so on.
#[derive(Debug, Clone, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// Problems found while turning form text into a `StudentPayload`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("GPA must be a number between 0.0 and 4.0, got {0:?}")]
    InvalidGpa(String),

    #[error("{field} must be a date formatted YYYY-MM-DD, got {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("unknown status {0:?}")]
    InvalidStatus(String),

    #[error("unknown form field {0:?}")]
    UnknownField(String),
}
