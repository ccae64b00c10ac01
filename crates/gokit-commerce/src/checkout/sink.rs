//! Order store seam.

use crate::checkout::OrderRecord;
use crate::error::CommerceError;
use crate::ids::OrderId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Destination for placed orders, such as a remote document collection.
///
/// A submission is a single write. Implementations do not retry; a failed
/// write is reported as [`CommerceError::OrderSubmission`].
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Store an order and return the id the store assigned to it.
    async fn submit(&self, order: &OrderRecord) -> Result<OrderId, CommerceError>;
}

/// In-process order sink for development and tests.
#[derive(Debug, Default)]
pub struct MemoryOrderSink {
    orders: Mutex<Vec<(OrderId, OrderRecord)>>,
    failing: AtomicBool,
}

impl MemoryOrderSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent submissions fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Orders received so far.
    pub fn orders(&self) -> Vec<(OrderId, OrderRecord)> {
        self.orders
            .lock()
            .map(|orders| orders.clone())
            .unwrap_or_default()
    }

    /// Number of orders received.
    pub fn len(&self) -> usize {
        self.orders.lock().map(|orders| orders.len()).unwrap_or(0)
    }

    /// Check if no order has been received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderSink for MemoryOrderSink {
    async fn submit(&self, order: &OrderRecord) -> Result<OrderId, CommerceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CommerceError::OrderSubmission(
                "order store unavailable".to_string(),
            ));
        }

        let id = OrderId::generate();
        let mut orders = self
            .orders
            .lock()
            .map_err(|_| CommerceError::OrderSubmission("order store poisoned".to_string()))?;
        orders.push((id.clone(), order.clone()));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{compute_totals, LineItem, PricingRules};
    use crate::checkout::{CustomerDetails, ShippingOption};
    use crate::money::Currency;

    fn order() -> OrderRecord {
        let items = vec![LineItem::new("1", 1, 75.0)];
        let standard = ShippingOption::new("standard", "Standard", 25.0, "1 - 4 WEEKS");
        let totals = compute_totals(
            &items,
            None,
            &standard,
            &PricingRules::new(250.0, "standard"),
            Currency::AED,
        );
        OrderRecord::build(&CustomerDetails::default(), items, None, &standard, &totals)
    }

    #[tokio::test]
    async fn test_records_orders() {
        let sink = MemoryOrderSink::new();
        let id = sink.submit(&order()).await.unwrap();

        let orders = sink.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].0, id);
    }

    #[tokio::test]
    async fn test_failing_sink() {
        let sink = MemoryOrderSink::new();
        sink.set_failing(true);

        let result = sink.submit(&order()).await;
        assert!(matches!(result, Err(CommerceError::OrderSubmission(_))));
        assert!(sink.is_empty());

        sink.set_failing(false);
        assert!(sink.submit(&order()).await.is_ok());
    }
}
