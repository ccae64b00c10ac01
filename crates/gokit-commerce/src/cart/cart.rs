//! Cart and line item types.

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::{LineItemId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    /// Quantity changed to the contained value.
    Updated(u32),
    /// The change would drop the quantity below one; nothing changed.
    BelowMinimum,
    /// No line item with that id.
    NotFound,
}

impl QuantityUpdate {
    /// Whether the cart was modified.
    pub fn is_updated(&self) -> bool {
        matches!(self, QuantityUpdate::Updated(_))
    }
}

/// A shopping cart: line items in insertion order.
///
/// Serialized as a bare JSON array, the shape stored under the `cart` key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart from already validated items.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consume the cart and return its items.
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Append a line item.
    ///
    /// Returns an error if the quantity is zero or the price is negative or
    /// not a number.
    pub fn add_item(&mut self, item: LineItem) -> Result<LineItemId, CommerceError> {
        if item.quantity == 0 {
            return Err(CommerceError::InvalidQuantity(0));
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(CommerceError::ValidationFailed {
                fields: vec!["price"],
            });
        }

        let id = item.id.clone();
        self.items.push(item);
        Ok(id)
    }

    /// Apply `delta` to an item's quantity.
    ///
    /// Results below one are rejected and leave the cart untouched; increases
    /// are unbounded.
    pub fn adjust_quantity(&mut self, line_item_id: &LineItemId, delta: i64) -> QuantityUpdate {
        let Some(item) = self.items.iter_mut().find(|i| &i.id == line_item_id) else {
            return QuantityUpdate::NotFound;
        };

        let target = i64::from(item.quantity).saturating_add(delta);
        if target < 1 {
            return QuantityUpdate::BelowMinimum;
        }

        item.quantity = u32::try_from(target).unwrap_or(u32::MAX);
        QuantityUpdate::Updated(item.quantity)
    }

    /// Remove an item from the cart.
    pub fn remove_item(&mut self, line_item_id: &LineItemId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.id != line_item_id);
        self.items.len() < len_before
    }

    /// Clear all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Get number of line items.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an item by ID.
    pub fn get_item(&self, line_item_id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.id == line_item_id)
    }

    /// Products referenced by the cart.
    pub fn product_ids(&self) -> HashSet<&ProductId> {
        self.items.iter().map(|i| &i.product_id).collect()
    }

    /// Sum of unit price times quantity.
    pub fn subtotal(&self, currency: Currency) -> Money {
        Money::new(self.items.iter().map(LineItem::line_total).sum(), currency)
    }
}

/// A line item in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Unique line item identifier.
    pub id: LineItemId,
    /// Catalog product; may no longer resolve.
    pub product_id: ProductId,
    /// Quantity, at least one.
    pub quantity: u32,
    /// Unit price captured when the item was added.
    pub price: f64,
    /// Product name captured at add time, for items whose product left the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Image captured at add time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Shirt printing and patches.
    #[serde(flatten)]
    pub customization: Customization,
}

impl LineItem {
    /// Create a new line item with a fresh id.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32, price: f64) -> Self {
        Self {
            id: LineItemId::generate(),
            product_id: product_id.into(),
            quantity,
            price,
            name: None,
            image: None,
            customization: Customization::default(),
        }
    }

    /// Create a single, uncustomized unit of a catalog product.
    pub fn from_product(product: &Product) -> Self {
        let mut item = Self::new(product.id.clone(), 1, product.price);
        item.name = Some(product.name.clone());
        item.image = product.image.clone();
        item
    }

    /// Attach customization.
    pub fn with_customization(mut self, customization: Customization) -> Self {
        self.customization = customization;
        self
    }

    /// Unit price times quantity.
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Optional personalization of a jersey.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_number: Option<String>,
    /// Print style (e.g., "icon", "association").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization_style: Option<String>,
    #[serde(default)]
    pub patches: Vec<String>,
}

impl Customization {
    /// Human-readable lines for display next to the item.
    pub fn details(&self) -> Vec<String> {
        let mut lines = Vec::new();

        let name = non_blank(&self.player_name);
        let number = non_blank(&self.player_number);
        if name.is_some() || number.is_some() {
            lines.push(format!(
                "Name/Number: {} #{}",
                name.unwrap_or_default(),
                number.unwrap_or_default()
            ));
        }

        if let Some(style) = non_blank(&self.customization_style) {
            let mut chars = style.chars();
            let capitalized: String = chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect())
                .unwrap_or_default();
            lines.push(format!("Style: {}", capitalized));
        }

        if !self.patches.is_empty() {
            lines.push(format!("Patches: {}", self.patches.join(", ")));
        }

        lines
    }

    /// Check if nothing is customized.
    pub fn is_empty(&self) -> bool {
        self.details().is_empty()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart_with(items: &[(f64, u32)]) -> Cart {
        let mut cart = Cart::new();
        for (i, (price, qty)) in items.iter().enumerate() {
            cart.add_item(LineItem::new(i.to_string(), *qty, *price)).unwrap();
        }
        cart
    }

    #[test]
    fn test_add_item() {
        let cart = cart_with(&[(75.0, 2)]);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.unique_item_count(), 1);
    }

    #[test]
    fn test_add_same_product_appends() {
        let mut cart = Cart::new();
        cart.add_item(LineItem::new("1", 1, 75.0)).unwrap();
        cart.add_item(LineItem::new("1", 1, 75.0)).unwrap();
        assert_eq!(cart.unique_item_count(), 2);
    }

    #[test]
    fn test_invalid_quantity() {
        let mut cart = Cart::new();
        let result = cart.add_item(LineItem::new("1", 0, 75.0));
        assert!(matches!(result, Err(CommerceError::InvalidQuantity(0))));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut cart = Cart::new();
        assert!(cart.add_item(LineItem::new("1", 1, -5.0)).is_err());
    }

    #[test]
    fn test_adjust_quantity() {
        let mut cart = Cart::new();
        let id = cart.add_item(LineItem::new("1", 2, 75.0)).unwrap();

        assert_eq!(cart.adjust_quantity(&id, 1), QuantityUpdate::Updated(3));
        assert_eq!(cart.adjust_quantity(&id, -2), QuantityUpdate::Updated(1));
    }

    #[test]
    fn test_decrease_at_floor_is_noop() {
        let mut cart = Cart::new();
        let id = cart.add_item(LineItem::new("1", 1, 75.0)).unwrap();
        let before = cart.clone();

        assert_eq!(cart.adjust_quantity(&id, -1), QuantityUpdate::BelowMinimum);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrease_past_floor_rejected_not_clamped() {
        let mut cart = Cart::new();
        let id = cart.add_item(LineItem::new("1", 2, 75.0)).unwrap();

        assert_eq!(cart.adjust_quantity(&id, -5), QuantityUpdate::BelowMinimum);
        assert_eq!(cart.get_item(&id).unwrap().quantity, 2);
    }

    #[test]
    fn test_adjust_missing_item() {
        let mut cart = cart_with(&[(75.0, 1)]);
        let update = cart.adjust_quantity(&LineItemId::new("missing"), 1);
        assert_eq!(update, QuantityUpdate::NotFound);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        let id = cart.add_item(LineItem::new("1", 1, 75.0)).unwrap();

        assert!(cart.remove_item(&id));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_missing_item_leaves_cart() {
        let mut cart = cart_with(&[(75.0, 2), (85.0, 1)]);
        let before = cart.clone();

        assert!(!cart.remove_item(&LineItemId::new("missing")));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_subtotal_is_order_independent() {
        let forward = cart_with(&[(75.0, 2), (85.0, 1), (19.99, 3)]);
        let backward = cart_with(&[(19.99, 3), (85.0, 1), (75.0, 2)]);

        let a = forward.subtotal(Currency::AED).amount;
        let b = backward.subtotal(Currency::AED).amount;
        assert!((a - b).abs() < 1e-9);
        assert!((a - 294.97).abs() < 1e-9);
    }

    #[test]
    fn test_customization_details() {
        let customization = Customization {
            player_name: Some("BELLINGHAM".to_string()),
            player_number: Some("5".to_string()),
            customization_style: Some("icon".to_string()),
            patches: vec!["La Liga".to_string(), "UCL".to_string()],
        };

        assert_eq!(
            customization.details(),
            [
                "Name/Number: BELLINGHAM #5",
                "Style: Icon",
                "Patches: La Liga, UCL",
            ]
        );
    }

    #[test]
    fn test_blank_customization_is_empty() {
        let customization = Customization {
            player_name: Some(String::new()),
            player_number: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(customization.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let item = LineItem {
            id: LineItemId::new("123"),
            product_id: ProductId::new("1"),
            quantity: 2,
            price: 75.0,
            name: None,
            image: None,
            customization: Customization::default(),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "123",
                "productId": "1",
                "quantity": 2,
                "price": 75.0,
                "patches": []
            })
        );
    }
}
