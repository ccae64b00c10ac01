//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in cart and checkout operations.
///
/// None of these are fatal to a shopping session: every variant leaves the
/// persisted state as it was, so the user can correct the input and retry.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// A new line item was given a quantity below one.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Code matches neither the public registry nor the user's granted codes.
    #[error("Invalid or expired discount code: {0}")]
    InvalidDiscountCode(String),

    /// Code has been used at checkout as many times as allowed.
    #[error("This discount code has reached its usage limit: {0}")]
    DiscountUsageLimitReached(String),

    /// Checkout attempted with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Required checkout fields are missing or malformed.
    #[error("Please fill out all required fields: {}", fields.join(", "))]
    ValidationFailed { fields: Vec<&'static str> },

    /// The order store rejected or failed the write.
    #[error("Could not save your order: {0}")]
    OrderSubmission(String),

    /// Cache error.
    #[error("Cache error: {0}")]
    CacheError(#[from] gokit_cache::CacheError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

impl From<toml::de::Error> for CommerceError {
    fn from(e: toml::de::Error) -> Self {
        CommerceError::ConfigError(e.to_string())
    }
}
