//! Shipping options and selection.

use crate::cart::PricingRules;
use crate::error::CommerceError;
use crate::ids::ShippingOptionId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A shipping option offered at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingOption {
    /// Unique identifier (e.g., "standard").
    pub id: ShippingOptionId,
    /// Display name.
    pub name: String,
    /// Price before any free-shipping override.
    pub price: f64,
    /// Delivery estimate label (e.g., "1 - 4 WEEKS").
    pub eta: String,
}

impl ShippingOption {
    /// Create a new shipping option.
    pub fn new(
        id: impl Into<ShippingOptionId>,
        name: impl Into<String>,
        price: f64,
        eta: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            eta: eta.into(),
        }
    }

    /// Get delivery estimate string.
    pub fn delivery_estimate(&self) -> String {
        format!("Est. {}", self.eta)
    }
}

/// An option together with what it costs for the current cart.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingQuote {
    /// The option.
    pub option: ShippingOption,
    /// Price after the free-shipping override.
    pub cost: Money,
    /// Whether this option is the current selection.
    pub selected: bool,
}

impl ShippingQuote {
    /// Price label, `Free` when nothing is charged.
    pub fn price_label(&self) -> String {
        if self.cost.is_zero() {
            "Free".to_string()
        } else {
            self.cost.display()
        }
    }
}

/// The configured options. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingOptions {
    options: Vec<ShippingOption>,
}

impl ShippingOptions {
    /// Create the option set.
    ///
    /// Returns an error if `options` is empty, since a selection must
    /// always exist.
    pub fn new(options: Vec<ShippingOption>) -> Result<Self, CommerceError> {
        if options.is_empty() {
            return Err(CommerceError::ConfigError(
                "at least one shipping option is required".to_string(),
            ));
        }
        Ok(Self { options })
    }

    /// The default selection: the first configured option.
    pub fn default_option(&self) -> &ShippingOption {
        // `new` guarantees at least one option.
        &self.options[0]
    }

    /// Resolve a selection, falling back to the first option for unknown ids.
    pub fn select(&self, id: &ShippingOptionId) -> &ShippingOption {
        self.options
            .iter()
            .find(|o| &o.id == id)
            .unwrap_or_else(|| self.default_option())
    }

    /// Check if `id` is one of the configured options.
    pub fn contains(&self, id: &ShippingOptionId) -> bool {
        self.options.iter().any(|o| &o.id == id)
    }

    /// Iterate options in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &ShippingOption> {
        self.options.iter()
    }

    /// Price every option for a subtotal.
    pub fn quotes(
        &self,
        subtotal: f64,
        selected: &ShippingOptionId,
        rules: &PricingRules,
        currency: Currency,
    ) -> Vec<ShippingQuote> {
        self.options
            .iter()
            .map(|option| ShippingQuote {
                option: option.clone(),
                cost: Money::new(rules.shipping_cost(option, subtotal), currency),
                selected: &option.id == selected,
            })
            .collect()
    }
}
