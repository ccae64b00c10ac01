//! Storefront configuration.

use crate::cart::{DiscountCode, DiscountRegistry, PricingRules};
use crate::checkout::{ShippingOption, ShippingOptions};
use crate::error::CommerceError;
use crate::ids::ShippingOptionId;
use crate::money::Currency;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cart, discount and shipping settings.
///
/// Every field has a default matching the live storefront, so a config file
/// only needs the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommerceConfig {
    /// Currency all prices are in.
    pub currency: Currency,
    /// Subtotal at which standard shipping becomes free.
    pub free_shipping_threshold: f64,
    /// The shipping option eligible for free shipping.
    pub free_shipping_tier: ShippingOptionId,
    /// Checkout uses allowed per discount code.
    pub discount_usage_limit: u32,
    /// Percentage granted by per-user codes.
    pub granted_code_percent: f64,
    /// Number of products suggested on the cart page.
    pub recommendation_limit: usize,
    /// Shipping options, the first being the default selection.
    pub shipping_options: Vec<ShippingOption>,
    /// Codes anyone can redeem.
    pub public_codes: Vec<DiscountCode>,
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            currency: Currency::AED,
            free_shipping_threshold: 250.0,
            free_shipping_tier: ShippingOptionId::new("standard"),
            discount_usage_limit: 3,
            granted_code_percent: 10.0,
            recommendation_limit: 4,
            shipping_options: vec![ShippingOption::new(
                "standard",
                "Standard",
                25.0,
                "1 - 4 WEEKS",
            )],
            public_codes: vec![
                DiscountCode::percent("SALE10", 10.0),
                DiscountCode::fixed("GOKIT50", 50.0),
            ],
        }
    }
}

impl CommerceConfig {
    /// Load config from a file. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommerceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CommerceError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| CommerceError::ConfigError(format!("{}: {}", path.display(), e)))?
        } else {
            toml::from_str(&content)?
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded commerce config");
        Ok(config)
    }

    /// Parse TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, CommerceError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.shipping_options.is_empty() {
            return Err(CommerceError::ConfigError(
                "at least one shipping option is required".to_string(),
            ));
        }
        if !self.free_shipping_threshold.is_finite() || self.free_shipping_threshold < 0.0 {
            return Err(CommerceError::ConfigError(format!(
                "invalid free shipping threshold: {}",
                self.free_shipping_threshold
            )));
        }
        if let Some(option) = self.shipping_options.iter().find(|o| o.price < 0.0) {
            return Err(CommerceError::ConfigError(format!(
                "shipping option {} has a negative price",
                option.id
            )));
        }
        Ok(())
    }

    /// Free-shipping rules.
    pub fn pricing_rules(&self) -> PricingRules {
        PricingRules::new(self.free_shipping_threshold, self.free_shipping_tier.clone())
    }

    /// Discount lookup with this config's codes and limits.
    pub fn discount_registry(&self) -> DiscountRegistry {
        DiscountRegistry::new(
            self.public_codes.clone(),
            self.granted_code_percent,
            self.discount_usage_limit,
        )
    }

    /// Shipping option set.
    pub fn shipping(&self) -> Result<ShippingOptions, CommerceError> {
        ShippingOptions::new(self.shipping_options.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::DiscountKind;

    #[test]
    fn test_defaults_match_storefront() {
        let config = CommerceConfig::default();
        assert_eq!(config.free_shipping_threshold, 250.0);
        assert_eq!(config.discount_usage_limit, 3);
        assert_eq!(config.shipping_options[0].price, 25.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CommerceConfig::from_toml_str(
            r#"
            discount_usage_limit = 5

            [[shipping_options]]
            id = "standard"
            name = "Standard"
            price = 25
            eta = "1 - 4 WEEKS"

            [[shipping_options]]
            id = "express"
            name = "Express"
            price = 60
            eta = "3 - 5 DAYS"

            [[public_codes]]
            code = "summer20"
            type = "percent"
            value = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.discount_usage_limit, 5);
        assert_eq!(config.free_shipping_threshold, 250.0);
        assert_eq!(config.shipping_options.len(), 2);
        assert_eq!(config.public_codes[0].kind, DiscountKind::Percent);

        let registry = config.discount_registry();
        assert!(registry.resolve("SUMMER20", &[]).is_some());
    }

    #[test]
    fn test_empty_shipping_rejected() {
        let result = CommerceConfig::from_toml_str("shipping_options = []");
        assert!(matches!(result, Err(CommerceError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = CommerceConfig::from_toml_str("discount_usage_limit = \"lots\"");
        assert!(matches!(result, Err(CommerceError::ConfigError(_))));
    }

    #[test]
    fn test_load_json_file() {
        let dir = std::env::temp_dir().join(format!("gokit-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("commerce.json");
        std::fs::write(&path, r#"{"free_shipping_threshold": 300}"#).unwrap();

        let config = CommerceConfig::load(&path).unwrap();
        assert_eq!(config.free_shipping_threshold, 300.0);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
