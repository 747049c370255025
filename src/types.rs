//! Session domain types: token namespaces, roles, and the cached user record.
//!
//! SYSTEM CONTEXT
//! ==============
//! Key names match what the web client has always written to `localStorage`,
//! so a browser build and the native store read the same layout.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Storage key for the logout-in-progress deadline.
pub const LOGGING_OUT_KEY: &str = "loggingOut";

// =============================================================================
// TOKEN KIND
// =============================================================================

/// Credential namespace. Each kind has its own token and record keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    User,
    Seller,
    Delivery,
}

impl TokenKind {
    pub const ALL: [Self; 3] = [Self::User, Self::Seller, Self::Delivery];

    /// Storage key holding this kind's bearer token.
    #[must_use]
    pub fn token_key(self) -> &'static str {
        match self {
            Self::User => "token",
            Self::Seller => "sellerToken",
            Self::Delivery => "deliveryToken",
        }
    }

    /// Storage key holding this kind's serialized record.
    #[must_use]
    pub fn record_key(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Seller => "seller",
            Self::Delivery => "deliveryInfo",
        }
    }

    /// Login endpoint for this kind, relative to the API base URL.
    #[must_use]
    pub fn login_path(self) -> &'static str {
        match self {
            Self::User => "/auth/login",
            Self::Seller => "/seller/login",
            Self::Delivery => "/delivery/login",
        }
    }

    /// Response field that carries the record on a successful login,
    /// besides the generic `user` field.
    #[must_use]
    pub fn login_record_field(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Seller => "seller",
            Self::Delivery => "deliveryAgent",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Seller => "seller",
            Self::Delivery => "delivery",
        })
    }
}

// =============================================================================
// ROLE
// =============================================================================

/// Marketplace role as reported by the server.
///
/// Unrecognised role strings are kept verbatim in [`Role::Other`] so a cached
/// record round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Customer,
    Seller,
    Admin,
    DeliveryAgent,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Customer => "customer",
            Self::Seller => "seller",
            Self::Admin => "admin",
            Self::DeliveryAgent => "deliveryAgent",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        match raw {
            "customer" => Self::Customer,
            "seller" => Self::Seller,
            "admin" => Self::Admin,
            "deliveryAgent" => Self::DeliveryAgent,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CACHED USER
// =============================================================================

/// Last server-confirmed identity. Presentation hint only, never proof of
/// authorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedUser {
    #[serde(default, alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Role-specific fields (`restaurantName`, `isAvailable`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CachedUser {
    /// Role-specific field by its wire name.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
