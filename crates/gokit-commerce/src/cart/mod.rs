//! Shopping cart module.
//!
//! Contains types for cart, line items, pricing, discounts and
//! recommendations.

mod cart;
mod discount;
mod legacy;
mod pricing;
mod recommend;

pub use cart::{Cart, Customization, LineItem, QuantityUpdate};
pub use discount::{normalize_code, DiscountCode, DiscountKind, DiscountRegistry, UsageLedger};
pub(crate) use legacy::{repair_items, repair_ledger};
pub use pricing::{compute_totals, CartTotals, PricingRules};
pub use recommend::recommend;
