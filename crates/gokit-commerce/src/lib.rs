//! Cart, pricing and checkout engine for the GoKit storefront.
//!
//! - **Catalog**: read-only product records used for recommendations
//! - **Cart**: line items, totals, discount codes, recommendations
//! - **Checkout**: shipping options, customer details, order placement
//! - **Store**: [`CartStore`], the engine that persists cart state in a
//!   key-value store shared between tabs
//!
//! # Example
//!
//! ```rust,ignore
//! use gokit_commerce::prelude::*;
//! use gokit_cache::MemoryStore;
//!
//! let store = CartStore::open(MemoryStore::new(), CommerceConfig::default())?;
//!
//! store.add(LineItem::new("1", 2, 75.0))?;
//! store.add(LineItem::new("101", 1, 85.0))?;
//! store.apply_code("sale10")?;
//!
//! let totals = store.totals()?;
//! println!("Total: {}", totals.total.display()); // AED 236.50
//!
//! let request = CheckoutRequest::new(details, true);
//! let confirmation = place_order(&store, &request, &sink).await?;
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod store;

pub use config::CommerceConfig;
pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};
pub use store::{CartChange, CartFeed, CartStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::CommerceConfig;
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::store::{CartChange, CartFeed, CartStore};

    // Catalog
    pub use crate::catalog::{Catalog, Product};

    // Cart
    pub use crate::cart::{
        Cart, CartTotals, Customization, DiscountCode, DiscountKind, LineItem, QuantityUpdate,
        UsageLedger,
    };

    // Checkout
    pub use crate::checkout::{
        place_order, CheckoutRequest, CustomerDetails, MemoryOrderSink, OrderConfirmation,
        OrderRecord, OrderSink, ShippingOption, ShippingQuote,
    };
}
