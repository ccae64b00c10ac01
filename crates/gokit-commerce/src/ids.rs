//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a ProductId where a LineItemId is expected.
//!
//! Stored carts written by older storefront code carry numeric ids
//! (`1`, `1718000000000.42`); the ids here deserialize from either a JSON
//! string or a JSON number and always serialize back as a string.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID.
            pub fn generate() -> Self {
                Self(generate_id())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                Self(n.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Wire form of an id: legacy numbers or strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

define_id!(ProductId);
define_id!(LineItemId);
define_id!(OrderId);
define_id!(ShippingOptionId);

/// Generate a unique ID using timestamp and a process-wide counter.
fn generate_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
    let salt: u16 = rand::random();

    format!("{:x}-{:x}-{:04x}", timestamp, counter, salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("prod-123");
        assert_eq!(id.as_str(), "prod-123");
    }

    #[test]
    fn test_id_generation() {
        let id1 = LineItemId::generate();
        let id2 = LineItemId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_id_from_number() {
        let id: ProductId = 101u64.into();
        assert_eq!(id.as_str(), "101");
    }

    #[test]
    fn test_id_display() {
        let id = ProductId::new("prod-789");
        assert_eq!(format!("{}", id), "prod-789");
    }

    #[test]
    fn test_deserialize_legacy_numeric_ids() {
        let id: LineItemId = serde_json::from_str("123").unwrap();
        assert_eq!(id.as_str(), "123");

        let id: LineItemId = serde_json::from_str("1718000000000.5").unwrap();
        assert_eq!(id.as_str(), "1718000000000.5");
    }

    #[test]
    fn test_serializes_as_string() {
        let id: ProductId = serde_json::from_str("1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""1""#);
    }
}
