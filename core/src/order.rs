//! Order value object decoded from API responses.

use serde::{Deserialize, Serialize};

/// An order as returned by the API.
///
/// Immutable once decoded, with no back-reference to the session that
/// fetched it. `total` keeps the server's decimal-as-string representation
/// verbatim; fields the server omits decode to `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
    #[serde(default)]
    pub total_quantity: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
