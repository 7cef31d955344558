//! HTTP transport boundary: plain-data request/response types and the
//! injectable connection trait.
//!
//! # Design
//! The core builds `HttpRequest` values and classifies `HttpResponse`
//! values; the actual round-trip is performed by whatever [`Connection`]
//! the caller injects at session construction. Bodies cross the boundary
//! as already-decoded JSON values, so wire-level encoding lives entirely
//! in the transport, and the core stays deterministic and free of I/O
//! dependencies.

use serde_json::Value;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

/// An HTTP request described as plain data.
///
/// `path` is relative to the transport's base URL. Authenticated calls
/// carry their `email`/`token` pairs in `query`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// An HTTP response reduced to what classification needs: the status code
/// and the decoded JSON body (`Value::Null` for bodyless responses).
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

/// Executes HTTP round-trips on behalf of the client.
///
/// Implementations own the base URL, default headers, JSON encoding, and
/// any timeout or cancellation policy, and report their own failures as
/// [`ApiError::Transport`]. An instance carries no per-session state and
/// may be shared by several `User`s; an implementation shared that way
/// must itself be safe for concurrent use.
pub trait Connection: Send + Sync {
    fn call(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}
