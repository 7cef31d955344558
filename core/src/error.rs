//! Error taxonomy for the account-and-order API client.
//!
//! # Design
//! Variants follow what callers need to distinguish: `Blank` is a local
//! precondition failure raised before any I/O; `Auth` and `Validation`
//! carry server-supplied text for 401 and 422 responses; every
//! unrecognized status collapses into `Unknown` with a fixed message since
//! the cause cannot be classified. A missing order on delete is not an
//! error at all — that case surfaces as `Ok(None)` from the call itself.

use std::fmt;

/// Errors returned by [`User`](crate::User) operations.
#[derive(Debug)]
pub enum ApiError {
    /// A required argument was blank. No request was sent.
    Blank(&'static str),

    /// The server returned 401. Carries the server's error message.
    Auth(String),

    /// The server returned 422. Carries the aggregated field complaints.
    Validation(String),

    /// The server returned a status this client does not recognize.
    Unknown,

    /// The injected connection failed before producing a response.
    Transport(String),

    /// A success-status body did not match the expected shape.
    Deserialization(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Blank(field) => write!(f, "{field} cannot be blank"),
            ApiError::Auth(message) => write!(f, "{message}"),
            ApiError::Validation(message) => write!(f, "{message}"),
            ApiError::Unknown => write!(f, "Unknown response"),
            ApiError::Transport(message) => write!(f, "transport error: {message}"),
            ApiError::Deserialization(message) => {
                write!(f, "deserialization failed: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
