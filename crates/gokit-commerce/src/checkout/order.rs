//! Order record written to the order store.

use crate::cart::{CartTotals, DiscountCode, LineItem};
use crate::checkout::{CustomerDetails, ShippingOption};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discount code recorded when none was applied.
pub const NO_DISCOUNT_CODE: &str = "None";

/// Customer block of an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

impl From<&CustomerDetails> for OrderCustomer {
    fn from(details: &CustomerDetails) -> Self {
        Self {
            name: details.full_name.trim().to_string(),
            email: details.email.trim().to_string(),
            phone: details.phone.trim().to_string(),
            address: details.address.trim().to_string(),
            city: details.city.trim().to_string(),
            postal_code: details.postal_code.trim().to_string(),
        }
    }
}

/// Discount block of an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDiscount {
    /// Applied code, or `"None"`.
    pub code: String,
    pub amount: f64,
}

impl OrderDiscount {
    /// Whether a code was applied.
    pub fn is_applied(&self) -> bool {
        self.code != NO_DISCOUNT_CODE
    }
}

/// Shipping block of an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderShipping {
    /// Display name of the chosen option.
    pub method: String,
    /// Cost after the free-shipping override.
    pub cost: f64,
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    pub customer: OrderCustomer,
    /// Cart items exactly as they were at checkout.
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub discount: OrderDiscount,
    pub shipping: OrderShipping,
    pub total: f64,
    pub timestamp: DateTime<Utc>,
}

impl OrderRecord {
    /// Build an order from the cart state at checkout.
    pub fn build(
        details: &CustomerDetails,
        items: Vec<LineItem>,
        discount: Option<&DiscountCode>,
        shipping: &ShippingOption,
        totals: &CartTotals,
    ) -> Self {
        Self {
            customer: OrderCustomer::from(details),
            items,
            subtotal: totals.subtotal.amount,
            discount: OrderDiscount {
                code: discount.map_or_else(|| NO_DISCOUNT_CODE.to_string(), |d| d.code.clone()),
                amount: totals.discount_amount.amount,
            },
            shipping: OrderShipping {
                method: shipping.name.clone(),
                cost: totals.shipping_cost.amount,
            },
            total: totals.total.amount,
            timestamp: Utc::now(),
        }
    }

    /// Total number of units ordered.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}
