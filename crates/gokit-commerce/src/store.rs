//! The cart engine: cart state persisted in a key-value store.
//!
//! Every read goes back to the store, so a write made by another tab is
//! visible on the next call. Every mutation is written before it returns.

use crate::cart::{
    compute_totals, normalize_code, recommend, repair_items, repair_ledger, Cart, CartTotals, DiscountCode,
    DiscountRegistry, LineItem, PricingRules, QuantityUpdate, UsageLedger,
};
use crate::catalog::{Catalog, Product};
use crate::checkout::{CustomerDetails, ShippingOption, ShippingOptions, ShippingQuote};
use crate::config::CommerceConfig;
use crate::error::CommerceError;
use crate::ids::{LineItemId, ShippingOptionId};
use gokit_cache::{Cache, CacheError, ChangeFeed, KeyValueStore};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Storage keys.
pub mod keys {
    /// Cart line items.
    pub const CART: &str = "cart";
    /// The applied discount code.
    pub const APPLIED_DISCOUNT: &str = "appliedDiscount";
    /// Checkout uses per discount code.
    pub const USED_CODES: &str = "usedCodes";
    /// Remembered checkout form details.
    pub const CHECKOUT_DETAILS: &str = "checkoutDetails";
    /// Codes granted to this user.
    pub const DISCOUNT_CODES: &str = "discountCodes";
    /// Selected shipping option id.
    pub const SELECTED_SHIPPING: &str = "selectedShipping";
}

/// Cart engine over a key-value store.
pub struct CartStore<S> {
    cache: Cache<S>,
    config: CommerceConfig,
    registry: DiscountRegistry,
    shipping: ShippingOptions,
    rules: PricingRules,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create an engine over `store`.
    ///
    /// Returns an error if the config is unusable.
    pub fn new(store: S, config: CommerceConfig) -> Result<Self, CommerceError> {
        config.validate()?;
        Ok(Self {
            cache: Cache::new(store),
            registry: config.discount_registry(),
            shipping: config.shipping()?,
            rules: config.pricing_rules(),
            config,
        })
    }

    /// Create an engine and repair any legacy cart data in the store.
    pub fn open(store: S, config: CommerceConfig) -> Result<Self, CommerceError> {
        let engine = Self::new(store, config)?;
        engine.migrate()?;
        Ok(engine)
    }

    /// Active configuration.
    pub fn config(&self) -> &CommerceConfig {
        &self.config
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        self.cache.store()
    }

    /// Repair stored cart items and write them back.
    ///
    /// Returns the number of entries that were repaired or dropped.
    pub fn migrate(&self) -> Result<usize, CommerceError> {
        let (_, repaired) = self.load_cart()?;
        Ok(repaired)
    }

    // -- Cart ---------------------------------------------------------------

    /// Load the cart.
    pub fn cart(&self) -> Result<Cart, CommerceError> {
        let (cart, _) = self.load_cart()?;
        Ok(cart)
    }

    /// Cart items in insertion order.
    pub fn items(&self) -> Result<Vec<LineItem>, CommerceError> {
        Ok(self.cart()?.into_items())
    }

    /// Total quantity across items, for the cart badge.
    pub fn item_count(&self) -> Result<u64, CommerceError> {
        Ok(self.cart()?.item_count())
    }

    /// Append a line item.
    pub fn add(&self, item: LineItem) -> Result<LineItemId, CommerceError> {
        let mut cart = self.cart()?;
        let product_id = item.product_id.clone();
        let id = cart.add_item(item)?;
        self.save_cart(&cart)?;
        tracing::debug!(%id, %product_id, "added cart item");
        Ok(id)
    }

    /// Add one unit of a catalog product without customization.
    pub fn add_product(&self, product: &Product) -> Result<LineItemId, CommerceError> {
        self.add(LineItem::from_product(product))
    }

    /// Remove an item. Returns `false`, without writing, if it is not there.
    pub fn remove(&self, id: &LineItemId) -> Result<bool, CommerceError> {
        let mut cart = self.cart()?;
        if !cart.remove_item(id) {
            tracing::debug!(%id, "remove ignored: no such cart item");
            return Ok(false);
        }
        self.save_cart(&cart)?;
        tracing::debug!(%id, "removed cart item");
        Ok(true)
    }

    /// Change an item's quantity by `delta`.
    ///
    /// Nothing is written unless the quantity changed.
    pub fn set_quantity(&self, id: &LineItemId, delta: i64) -> Result<QuantityUpdate, CommerceError> {
        let mut cart = self.cart()?;
        let update = cart.adjust_quantity(id, delta);
        match update {
            QuantityUpdate::Updated(quantity) => {
                self.save_cart(&cart)?;
                tracing::debug!(%id, quantity, "updated cart item quantity");
            }
            QuantityUpdate::BelowMinimum => {
                tracing::debug!(%id, delta, "quantity change rejected at minimum");
            }
            QuantityUpdate::NotFound => {
                tracing::debug!(%id, "quantity change ignored: no such cart item");
            }
        }
        Ok(update)
    }

    /// Empty the cart and drop the applied discount.
    ///
    /// Returns `false`, without writing, when the cart is already empty.
    pub fn clear(&self) -> Result<bool, CommerceError> {
        if self.cart()?.is_empty() {
            return Ok(false);
        }
        self.cache.delete(keys::CART)?;
        self.cache.delete(keys::APPLIED_DISCOUNT)?;
        tracing::info!("cleared cart");
        Ok(true)
    }

    // -- Discounts ----------------------------------------------------------

    /// The applied discount, if any.
    pub fn applied_discount(&self) -> Result<Option<DiscountCode>, CommerceError> {
        self.read_lenient::<Option<DiscountCode>>(keys::APPLIED_DISCOUNT)
    }

    /// Codes granted to this user.
    pub fn granted_codes(&self) -> Result<Vec<String>, CommerceError> {
        self.read_lenient(keys::DISCOUNT_CODES)
    }

    /// Checkout uses per code.
    ///
    /// Unreadable counts are repaired or dropped one entry at a time and the
    /// repaired ledger written back.
    pub fn usage_ledger(&self) -> Result<UsageLedger, CommerceError> {
        let raw: Map<String, Value> = self.read_lenient(keys::USED_CODES)?;
        let (ledger, repaired) = repair_ledger(raw);
        if repaired > 0 {
            self.cache.set(keys::USED_CODES, &ledger)?;
            tracing::info!(repaired, "repaired discount usage ledger");
        }
        Ok(ledger)
    }

    /// Grant a personal code to this user. Returns `false` if already held.
    pub fn grant_code(&self, code: &str) -> Result<bool, CommerceError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(CommerceError::InvalidDiscountCode(code));
        }
        let mut granted = self.granted_codes()?;
        if granted.iter().any(|g| normalize_code(g) == code) {
            return Ok(false);
        }
        granted.push(code.clone());
        self.cache.set(keys::DISCOUNT_CODES, &granted)?;
        tracing::debug!(%code, "granted discount code");
        Ok(true)
    }

    /// Apply a discount code, replacing any applied one.
    ///
    /// On rejection nothing is written and the error names the reason.
    pub fn apply_code(&self, raw: &str) -> Result<DiscountCode, CommerceError> {
        let granted = self.granted_codes()?;
        let ledger = self.usage_ledger()?;
        match self.registry.validate(raw, &granted, &ledger) {
            Ok(discount) => {
                self.cache.set(keys::APPLIED_DISCOUNT, &discount)?;
                tracing::info!(code = %discount.code, "applied discount code");
                Ok(discount)
            }
            Err(error) => {
                tracing::info!(input = raw, %error, "rejected discount code");
                Err(error)
            }
        }
    }

    /// Remove the applied discount. Returns `false` if none was applied.
    pub fn remove_code(&self) -> Result<bool, CommerceError> {
        if self.applied_discount()?.is_none() {
            return Ok(false);
        }
        self.cache.delete(keys::APPLIED_DISCOUNT)?;
        tracing::debug!("removed discount code");
        Ok(true)
    }

    // -- Shipping -----------------------------------------------------------

    /// Currently selected shipping option.
    pub fn selected_shipping(&self) -> Result<ShippingOption, CommerceError> {
        let selected: Option<ShippingOptionId> = self.read_lenient(keys::SELECTED_SHIPPING)?;
        Ok(match selected {
            Some(id) => self.shipping.select(&id).clone(),
            None => self.shipping.default_option().clone(),
        })
    }

    /// Select a shipping option. Unknown ids select the first option.
    pub fn select_shipping(&self, id: &ShippingOptionId) -> Result<ShippingOption, CommerceError> {
        if !self.shipping.contains(id) {
            tracing::warn!(%id, "unknown shipping option, using default");
        }
        let option = self.shipping.select(id).clone();
        self.cache.set(keys::SELECTED_SHIPPING, &option.id)?;
        tracing::debug!(id = %option.id, "selected shipping option");
        Ok(option)
    }

    /// Every shipping option priced for the current cart.
    pub fn shipping_quotes(&self) -> Result<Vec<ShippingQuote>, CommerceError> {
        let subtotal = self.cart()?.subtotal(self.config.currency).amount;
        let selected = self.selected_shipping()?;
        Ok(self
            .shipping
            .quotes(subtotal, &selected.id, &self.rules, self.config.currency))
    }

    // -- Derived ------------------------------------------------------------

    /// Price the current cart with the applied discount and selected shipping.
    pub fn totals(&self) -> Result<CartTotals, CommerceError> {
        let cart = self.cart()?;
        let discount = self.applied_discount()?;
        let shipping = self.selected_shipping()?;
        Ok(compute_totals(
            cart.items(),
            discount.as_ref(),
            &shipping,
            &self.rules,
            self.config.currency,
        ))
    }

    /// Products to suggest alongside the current cart.
    pub fn recommendations<'a, R>(
        &self,
        catalog: &'a Catalog,
        rng: &mut R,
    ) -> Result<Vec<&'a Product>, CommerceError>
    where
        R: Rng + ?Sized,
    {
        let cart = self.cart()?;
        Ok(recommend(
            cart.items(),
            catalog,
            self.config.recommendation_limit,
            rng,
        ))
    }

    // -- Checkout details ---------------------------------------------------

    /// Remembered checkout details, for pre-filling the form.
    pub fn saved_details(&self) -> Result<Option<CustomerDetails>, CommerceError> {
        self.read_lenient::<Option<CustomerDetails>>(keys::CHECKOUT_DETAILS)
    }

    /// Remember checkout details.
    pub fn save_details(&self, details: &CustomerDetails) -> Result<(), CommerceError> {
        self.cache.set(keys::CHECKOUT_DETAILS, details)?;
        tracing::debug!("saved checkout details");
        Ok(())
    }

    /// Forget remembered checkout details.
    pub fn forget_details(&self) -> Result<(), CommerceError> {
        self.cache.delete(keys::CHECKOUT_DETAILS)?;
        Ok(())
    }

    /// Count one checkout use of `code`.
    pub(crate) fn record_code_use(&self, code: &str) -> Result<u32, CommerceError> {
        let mut ledger = self.usage_ledger()?;
        let uses = ledger.record_use(code);
        self.cache.set(keys::USED_CODES, &ledger)?;
        tracing::debug!(%code, uses, "recorded discount code use");
        Ok(uses)
    }

    /// Reset cart state after a placed order.
    pub(crate) fn complete_checkout(&self) -> Result<(), CommerceError> {
        self.cache.set(keys::CART, &Cart::new())?;
        self.cache.delete(keys::APPLIED_DISCOUNT)?;
        Ok(())
    }

    // -- Change notifications -----------------------------------------------

    /// Subscribe to cart changes made in other tabs.
    pub fn subscribe(&self) -> CartFeed {
        CartFeed {
            inner: self.cache.subscribe(),
        }
    }

    /// Read the stored items, writing them back if any needed repair.
    fn load_cart(&self) -> Result<(Cart, usize), CommerceError> {
        let raw: Vec<Value> = self.read_lenient(keys::CART)?;
        let (items, repaired) = repair_items(raw);
        let cart = Cart::from_items(items);
        if repaired > 0 {
            self.save_cart(&cart)?;
            tracing::info!(repaired, "repaired legacy cart items");
        }
        Ok((cart, repaired))
    }

    fn save_cart(&self, cart: &Cart) -> Result<(), CommerceError> {
        self.cache.set(keys::CART, cart)?;
        Ok(())
    }

    /// Read a key, treating unreadable JSON like a missing key.
    fn read_lenient<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, CommerceError> {
        match self.cache.get_or_default::<T>(key) {
            Ok(value) => Ok(value),
            Err(CacheError::SerializeError(error)) => {
                tracing::warn!(key, %error, "ignoring unreadable stored value");
                Ok(T::default())
            }
            Err(error) => Err(error.into()),
        }
    }
}

/// Which part of the cart state another tab changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Items,
    Discount,
    UsageLedger,
    GrantedCodes,
    Shipping,
    Details,
}

impl CartChange {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            keys::CART => Some(CartChange::Items),
            keys::APPLIED_DISCOUNT => Some(CartChange::Discount),
            keys::USED_CODES => Some(CartChange::UsageLedger),
            keys::DISCOUNT_CODES => Some(CartChange::GrantedCodes),
            keys::SELECTED_SHIPPING => Some(CartChange::Shipping),
            keys::CHECKOUT_DETAILS => Some(CartChange::Details),
            _ => None,
        }
    }
}

/// Cart changes written by other tabs. Listeners re-query the store.
pub struct CartFeed {
    inner: ChangeFeed,
}

impl CartFeed {
    /// Wait for the next change. Returns `None` once the store is gone.
    pub async fn next(&mut self) -> Option<CartChange> {
        loop {
            let event = self.inner.next().await?;
            if let Some(change) = CartChange::from_key(&event.key) {
                return Some(change);
            }
        }
    }

    /// Take the next pending change without waiting.
    pub fn try_next(&mut self) -> Option<CartChange> {
        loop {
            let event = self.inner.try_next()?;
            if let Some(change) = CartChange::from_key(&event.key) {
                return Some(change);
            }
        }
    }
}
