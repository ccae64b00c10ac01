//! Checkout module.
//!
//! Contains types for shipping, customer details, orders and order
//! placement.

mod customer;
mod flow;
mod order;
mod shipping;
mod sink;

pub use customer::CustomerDetails;
pub use flow::{place_order, CheckoutRequest, OrderConfirmation};
pub use order::{OrderCustomer, OrderDiscount, OrderRecord, OrderShipping, NO_DISCOUNT_CODE};
pub use shipping::{ShippingOption, ShippingOptions, ShippingQuote};
pub use sink::{MemoryOrderSink, OrderSink};
