//! Synchronous API client core for the teachable account-and-order service.
//!
//! # Overview
//! Represents the remote service as in-process objects: a [`User`] session
//! that authenticates and manages orders, and immutable [`Order`] values
//! decoded from response bodies. Every HTTP round-trip goes through an
//! injected [`Connection`], so the core itself never touches the network.
//!
//! # Design
//! - `User` holds identity state and a shared `Connection` handle; its
//!   server-assigned fields change only on a successful
//!   authentication-class response, and all at once.
//! - Status classification is per operation: 401 maps to [`ApiError::Auth`],
//!   422 to [`ApiError::Validation`], unrecognized codes to
//!   [`ApiError::Unknown`]. Delete's 404 is a successful `None`, not an
//!   error.
//! - Nothing is cached, retried, or logged; every failure surfaces
//!   synchronously to the caller.

pub mod error;
pub mod http;
pub mod order;
pub mod user;

pub use error::ApiError;
pub use http::{Connection, HttpMethod, HttpRequest, HttpResponse};
pub use order::Order;
pub use user::User;
