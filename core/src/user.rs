//! Session state machine and request orchestration for the account API.
//!
//! # Design
//! `User` owns its identity state (`email`, optional `token` and other
//! server-assigned attributes) plus a shared [`Connection`] handle, taken
//! as an explicit constructor argument rather than read from process-wide
//! state. Each operation builds an `HttpRequest`, hands it to the
//! connection, and maps the returned status to a typed outcome. The
//! identity fields a server response assigns are parsed by one shared
//! `parse_identity` and applied atomically, on a success status only — a
//! failed call never leaves a partially updated session.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::http::{Connection, HttpMethod, HttpRequest};
use crate::order::Order;

/// Fallback for 401 bodies that carry no `error` field.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// A user session against the account-and-order API.
///
/// Freshly constructed sessions are unauthenticated: `token`, `id`, and
/// the timestamps are absent until a successful [`authenticate`],
/// [`refresh`], or [`register`] exchange replaces them from the response.
/// "Requires authentication" is enforced by the server, not locally — an
/// absent or stale token simply comes back as [`ApiError::Auth`].
///
/// [`authenticate`]: User::authenticate
/// [`refresh`]: User::refresh
/// [`register`]: User::register
pub struct User {
    connection: Arc<dyn Connection>,
    email: String,
    id: Option<u64>,
    token: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

/// Server-assigned identity fields carried by authentication-class
/// responses. The wire name of the token field is `tokens`, a quirk of
/// the service contract.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct Identity {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default, rename = "tokens")]
    token: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl User {
    /// Create an unauthenticated session for `email`.
    ///
    /// Fails with [`ApiError::Blank`] before any I/O if `email` is empty.
    pub fn new(connection: Arc<dyn Connection>, email: &str) -> Result<Self, ApiError> {
        require_present(email, "email")?;
        Ok(Self {
            connection,
            email: email.to_string(),
            id: None,
            token: None,
            created_at: None,
            updated_at: None,
        })
    }

    /// Register a new account and return an authenticated session for it.
    ///
    /// Arguments are checked for blankness before any I/O, in this order:
    /// email, password, confirmation; the first blank one wins. Status
    /// mapping: 201 populates the new session's identity; 422 is a
    /// [`ApiError::Validation`] aggregating the body's
    /// `errors.<field>: [messages]` pairs as `field messages`, fields
    /// joined by `; `; anything else is [`ApiError::Unknown`].
    pub fn register(
        connection: Arc<dyn Connection>,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<Self, ApiError> {
        require_present(email, "email")?;
        require_present(password, "password")?;
        require_present(password_confirmation, "password_confirmation")?;
        let request = HttpRequest {
            method: HttpMethod::Post,
            path: "users".to_string(),
            query: Vec::new(),
            body: Some(json!({
                "email": email,
                "password": password,
                "password_confirmation": password_confirmation,
            })),
        };
        let response = connection.call(&request)?;
        match response.status {
            201 => {
                let identity = parse_identity(&response.body)?;
                let mut user = Self::new(connection, email)?;
                user.apply_identity(identity);
                Ok(user)
            }
            422 => Err(ApiError::Validation(field_errors_message(&response.body))),
            _ => Err(ApiError::Unknown),
        }
    }

    /// Sign in with `password`.
    ///
    /// On 201 the session becomes authenticated; 401 surfaces the server's
    /// message as [`ApiError::Auth`]; anything else is
    /// [`ApiError::Unknown`].
    pub fn authenticate(&mut self, password: &str) -> Result<(), ApiError> {
        require_present(password, "password")?;
        let request = HttpRequest {
            method: HttpMethod::Post,
            path: "users/sign_in".to_string(),
            query: Vec::new(),
            body: Some(json!({
                "email": self.email,
                "password": password,
            })),
        };
        let response = self.connection.call(&request)?;
        match response.status {
            201 => {
                let identity = parse_identity(&response.body)?;
                self.apply_identity(identity);
                Ok(())
            }
            401 => Err(ApiError::Auth(auth_message(&response.body))),
            _ => Err(ApiError::Unknown),
        }
    }

    /// Re-fetch the current identity from the server.
    ///
    /// Idempotent and safe to repeat; never changes `email`. The `token`
    /// query pair is omitted while unauthenticated, in which case the
    /// server answers 401.
    pub fn refresh(&mut self) -> Result<(), ApiError> {
        let request = HttpRequest {
            method: HttpMethod::Get,
            path: "api/users/current_user/edit".to_string(),
            query: self.auth_query(),
            body: None,
        };
        let response = self.connection.call(&request)?;
        match response.status {
            200 => {
                let identity = parse_identity(&response.body)?;
                self.apply_identity(identity);
                Ok(())
            }
            401 => Err(ApiError::Auth(auth_message(&response.body))),
            _ => Err(ApiError::Unknown),
        }
    }

    /// List this user's orders.
    ///
    /// Returns a fresh `Vec` on every call, in the order the server
    /// returned the records; nothing is cached.
    pub fn orders(&self) -> Result<Vec<Order>, ApiError> {
        let request = HttpRequest {
            method: HttpMethod::Get,
            path: "api/orders".to_string(),
            query: self.auth_query(),
            body: None,
        };
        let response = self.connection.call(&request)?;
        match response.status {
            200 => serde_json::from_value(response.body)
                .map_err(|e| ApiError::Deserialization(e.to_string())),
            401 => Err(ApiError::Auth(auth_message(&response.body))),
            _ => Err(ApiError::Unknown),
        }
    }

    /// Create an order.
    ///
    /// An absent `special_instructions` is submitted as JSON `null` rather
    /// than omitted, so a server that requires the field rejects it with a
    /// 422 (surfaced as [`ApiError::Validation`] joining the body's error
    /// titles with `, `). This endpoint succeeds with 200, not 201 — the
    /// documented contract of the live service.
    pub fn add_order(
        &self,
        total: &str,
        total_quantity: u32,
        special_instructions: Option<&str>,
    ) -> Result<Order, ApiError> {
        let request = HttpRequest {
            method: HttpMethod::Post,
            path: "api/orders".to_string(),
            query: self.auth_query(),
            body: Some(json!({
                "total": total,
                "total_quantity": total_quantity,
                "special_instructions": special_instructions,
            })),
        };
        let response = self.connection.call(&request)?;
        match response.status {
            200 => serde_json::from_value(response.body)
                .map_err(|e| ApiError::Deserialization(e.to_string())),
            401 => Err(ApiError::Auth(auth_message(&response.body))),
            422 => Err(ApiError::Validation(error_titles_message(&response.body))),
            _ => Err(ApiError::Unknown),
        }
    }

    /// Delete `order` on the server.
    ///
    /// 204 echoes the order back as `Some`; 404 is `None` — deleting an
    /// order that is already gone is a no-op, not an error.
    pub fn remove_order(&self, order: &Order) -> Result<Option<Order>, ApiError> {
        let request = HttpRequest {
            method: HttpMethod::Delete,
            path: format!("api/orders/{}", order.id),
            query: self.auth_query(),
            body: None,
        };
        let response = self.connection.call(&request)?;
        match response.status {
            204 => Ok(Some(order.clone())),
            404 => Ok(None),
            401 => Err(ApiError::Auth(auth_message(&response.body))),
            _ => Err(ApiError::Unknown),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Replace every server-assigned field at once. `email` is untouched.
    fn apply_identity(&mut self, identity: Identity) {
        self.id = identity.id;
        self.token = identity.token;
        self.created_at = identity.created_at;
        self.updated_at = identity.updated_at;
    }

    /// Query pairs for authenticated endpoints. The `token` pair is left
    /// out while unauthenticated.
    fn auth_query(&self) -> Vec<(String, String)> {
        let mut query = vec![("email".to_string(), self.email.clone())];
        if let Some(token) = &self.token {
            query.push(("token".to_string(), token.clone()));
        }
        query
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("email", &self.email)
            .field("id", &self.id)
            .field("token", &self.token)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

fn require_present(value: &str, field: &'static str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::Blank(field));
    }
    Ok(())
}

/// Parse the identity fields out of an authentication-class response body.
/// Shared by `authenticate`, `refresh`, and `register`.
fn parse_identity(body: &Value) -> Result<Identity, ApiError> {
    serde_json::from_value(body.clone()).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// The server's message from a 401 body.
fn auth_message(body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .unwrap_or(INVALID_CREDENTIALS)
        .to_string()
}

/// 422 body shape for order creation: `{"errors": [{"title": ...}, ...]}`.
fn error_titles_message(body: &Value) -> String {
    body.get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("title").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

/// 422 body shape for registration: `{"errors": {field: [messages]}}`.
fn field_errors_message(body: &Value) -> String {
    body.get("errors")
        .and_then(Value::as_object)
        .map(|errors| {
            errors
                .iter()
                .map(|(field, messages)| {
                    let joined = messages
                        .as_array()
                        .map(|msgs| {
                            msgs.iter()
                                .filter_map(Value::as_str)
                                .collect::<Vec<_>>()
                                .join(", ")
                        })
                        .unwrap_or_default();
                    format!("{field} {joined}")
                })
                .collect::<Vec<_>>()
                .join("; ")
        })
        .unwrap_or_default()
}
