//! Identifier value objects
//!
//! `UserId` is issued by the external identity service and is opaque to the engine.
//! `ConnectionId` names one transport session and is never reused while it is live.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Externally-issued user identifier
///
/// Stored verbatim. Clients may send it as a JSON string or a bare integer,
/// it is always serialized back as a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(String);

impl UserId {
    /// Create a new user ID from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the identifier is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct UserIdVisitor;

        impl Visitor<'_> for UserIdVisitor {
            type Value = UserId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer user ID")
            }

            fn visit_i64<E>(self, value: i64) -> Result<UserId, E>
            where
                E: de::Error,
            {
                Ok(UserId(value.to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> Result<UserId, E>
            where
                E: de::Error,
            {
                Ok(UserId(value.to_string()))
            }

            fn visit_str<E>(self, value: &str) -> Result<UserId, E>
            where
                E: de::Error,
            {
                Ok(UserId(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<UserId, E>
            where
                E: de::Error,
            {
                Ok(UserId(value))
            }
        }

        deserializer.deserialize_any(UserIdVisitor)
    }
}

/// Transport session identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Generate a fresh random connection ID (UUID v4)
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
