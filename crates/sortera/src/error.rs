//! Error types for the sortera library.
//!
//! This module provides a unified error type with explicit variants for
//! authentication, request rejection, transient service failures, protocol
//! errors, and input validation errors.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The unified error type for sortera operations.
///
/// This error type covers all possible failure modes in the library,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication errors (bad credentials, repeated 401).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The server rejected the request (4xx other than 401/429).
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] InvalidRequestError),

    /// Transient service errors (429/5xx after retries, network failures).
    #[error("transient service error: {0}")]
    Transient(#[from] TransientError),

    /// Protocol errors (unparseable response bodies).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (bad server URL, modality mismatch).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transient(TransientError::from(err))
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint rejected the credential exchange.
    #[error("token renewal rejected: HTTP {status}: {body}")]
    RenewalRejected { status: u16, body: String },

    /// The token renewal call failed before the server gave a verdict.
    #[error("token renewal failed: {source}")]
    RenewalFailed {
        #[source]
        source: Box<Error>,
    },

    /// The server rejected the request again after a fresh token.
    #[error("request rejected with 401 after token renewal")]
    TokenRejected,
}

/// A 4xx rejection (other than 401/429), with the response body attached
/// verbatim for diagnostics.
#[derive(Debug)]
pub struct InvalidRequestError {
    /// HTTP status code.
    pub status: u16,
    /// Response body as received.
    pub body: String,
}

impl InvalidRequestError {
    pub(crate) fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl fmt::Display for InvalidRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.body)
    }
}

impl std::error::Error for InvalidRequestError {}

/// Transient service errors. These are retried locally up to a bounded
/// attempt count before being surfaced.
#[derive(Debug, Error)]
pub enum TransientError {
    /// A retryable HTTP status (429 or 5xx) persisted through every attempt.
    #[error("HTTP {status} after {attempts} attempts: {body}")]
    RetriesExhausted {
        status: u16,
        attempts: u32,
        body: String,
    },

    /// Network-level failure (connect, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The function has no trained model to invoke yet.
    #[error("no trained model after waiting {waited:?}")]
    ModelNotReady { waited: Duration },

    /// A freshly created resource never became visible.
    #[error("{what} not visible after waiting {waited:?}")]
    ResourceUnavailable { what: String, waited: Duration },
}

/// A successful response whose body could not be parsed as the expected
/// JSON shape.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// What went wrong while parsing.
    pub detail: String,
}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.detail)
    }
}

impl std::error::Error for ProtocolError {}

/// Input validation errors, detected before any network call.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid server URL format.
    #[error("invalid server URL '{value}': {reason}")]
    ServerUrl { value: String, reason: String },

    /// The function does not match the wrapper type.
    #[error("function '{value}': {reason}")]
    Function { value: String, reason: String },

    /// A tabular sample referenced an unknown field name.
    #[error("unknown field '{value}': {reason}")]
    Field { value: String, reason: String },

    /// A label operation was missing required data.
    #[error("invalid label '{value}': {reason}")]
    Label { value: String, reason: String },

    /// A sample operation was missing required data.
    #[error("invalid sample: {reason}")]
    Sample { reason: String },
}
