//! Order placement.

use crate::checkout::{CustomerDetails, OrderRecord, OrderSink};
use crate::error::CommerceError;
use crate::ids::OrderId;
use crate::store::CartStore;
use gokit_cache::KeyValueStore;
use serde::{Deserialize, Serialize};

/// A submitted checkout form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Contact and delivery details.
    pub details: CustomerDetails,
    /// Keep the details for the next visit.
    pub remember_details: bool,
}

impl CheckoutRequest {
    /// Create a checkout request.
    pub fn new(details: CustomerDetails, remember_details: bool) -> Self {
        Self {
            details,
            remember_details,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation {
    /// Id assigned by the order store.
    pub order_id: OrderId,
    /// The order as submitted.
    pub order: OrderRecord,
}

/// Place an order for the current cart.
///
/// The cart, applied discount and usage ledger change only once the sink has
/// accepted the order. On success the cart is emptied, the applied discount
/// removed and one use of its code recorded. On any error the cart and
/// discount are left as they were so the customer can retry. Once the sink
/// has accepted the order the confirmation is always returned, even if the
/// store cannot be updated afterwards.
pub async fn place_order<S, K>(
    store: &CartStore<S>,
    request: &CheckoutRequest,
    sink: &K,
) -> Result<OrderConfirmation, CommerceError>
where
    S: KeyValueStore,
    K: OrderSink + ?Sized,
{
    let cart = store.cart()?;
    if cart.is_empty() {
        tracing::info!("checkout rejected: cart is empty");
        return Err(CommerceError::EmptyCart);
    }

    if let Err(error) = request.details.validate() {
        tracing::info!(%error, "checkout rejected: invalid details");
        return Err(error);
    }

    if request.remember_details {
        store.save_details(&request.details)?;
    } else {
        store.forget_details()?;
    }

    let discount = store.applied_discount()?;
    let shipping = store.selected_shipping()?;
    let totals = store.totals()?;
    let order = OrderRecord::build(
        &request.details,
        cart.into_items(),
        discount.as_ref(),
        &shipping,
        &totals,
    );

    let order_id = match sink.submit(&order).await {
        Ok(id) => id,
        Err(error) => {
            tracing::warn!(%error, total = order.total, "order submission failed");
            return Err(match error {
                CommerceError::OrderSubmission(_) => error,
                other => CommerceError::OrderSubmission(other.to_string()),
            });
        }
    };

    // The order is placed. Store failures past this point are logged only.
    if let Some(discount) = &discount {
        if let Err(error) = store.record_code_use(&discount.code) {
            tracing::error!(%order_id, code = %discount.code, %error, "failed to record discount use");
        }
    }
    if let Err(error) = store.complete_checkout() {
        tracing::error!(%order_id, %error, "failed to reset cart after order");
    }

    tracing::info!(
        %order_id,
        total = order.total,
        discount = %order.discount.code,
        items = order.item_count(),
        "order placed"
    );

    Ok(OrderConfirmation { order_id, order })
}
