//! Cart pricing calculations.

use crate::cart::{DiscountCode, LineItem};
use crate::checkout::ShippingOption;
use crate::ids::ShippingOptionId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Free-shipping policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingRules {
    /// Subtotal at or above which the free tier ships for nothing.
    pub free_shipping_threshold: f64,
    /// The only option the free-shipping override applies to.
    pub free_shipping_tier: ShippingOptionId,
}

impl PricingRules {
    /// Create pricing rules.
    pub fn new(free_shipping_threshold: f64, free_shipping_tier: impl Into<ShippingOptionId>) -> Self {
        Self {
            free_shipping_threshold,
            free_shipping_tier: free_shipping_tier.into(),
        }
    }

    /// Whether `subtotal` qualifies for free standard shipping.
    pub fn qualifies_for_free_shipping(&self, subtotal: f64) -> bool {
        subtotal >= self.free_shipping_threshold
    }

    /// What `option` costs at `subtotal`.
    pub fn shipping_cost(&self, option: &ShippingOption, subtotal: f64) -> f64 {
        if option.id == self.free_shipping_tier && self.qualifies_for_free_shipping(subtotal) {
            0.0
        } else {
            option.price
        }
    }
}

/// Complete pricing breakdown for a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Subtotal before discounts.
    pub subtotal: Money,
    /// Discount taken off the subtotal.
    pub discount_amount: Money,
    /// Shipping charged.
    pub shipping_cost: Money,
    /// Final total (subtotal - discount + shipping).
    pub total: Money,
    /// Subtotal reached the free standard shipping threshold.
    pub free_shipping_eligible: bool,
}

impl CartTotals {
    /// All-zero totals.
    pub fn zero(currency: Currency) -> Self {
        Self {
            subtotal: Money::zero(currency),
            discount_amount: Money::zero(currency),
            shipping_cost: Money::zero(currency),
            total: Money::zero(currency),
            free_shipping_eligible: false,
        }
    }

    /// Check if a discount reduced the subtotal.
    pub fn has_discount(&self) -> bool {
        self.discount_amount.is_positive()
    }

    /// Shipping label for the summary, `Free` when nothing is charged.
    pub fn shipping_label(&self) -> String {
        if self.shipping_cost.is_zero() {
            "Free".to_string()
        } else {
            self.shipping_cost.display()
        }
    }
}

/// Price a cart.
///
/// An empty cart prices to all zeros, shipping included.
pub fn compute_totals(
    items: &[LineItem],
    discount: Option<&DiscountCode>,
    shipping: &ShippingOption,
    rules: &PricingRules,
    currency: Currency,
) -> CartTotals {
    if items.is_empty() {
        return CartTotals::zero(currency);
    }

    let subtotal: f64 = items.iter().map(LineItem::line_total).sum();
    let discount_amount = discount.map_or(0.0, |d| d.amount_for(subtotal));
    let shipping_cost = rules.shipping_cost(shipping, subtotal);
    let total = subtotal - discount_amount + shipping_cost;

    CartTotals {
        subtotal: Money::new(subtotal, currency),
        discount_amount: Money::new(discount_amount, currency),
        shipping_cost: Money::new(shipping_cost, currency),
        total: Money::new(total, currency),
        free_shipping_eligible: rules.qualifies_for_free_shipping(subtotal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> PricingRules {
        PricingRules::new(250.0, "standard")
    }

    fn standard() -> ShippingOption {
        ShippingOption::new("standard", "Standard", 25.0, "1 - 4 WEEKS")
    }

    fn express() -> ShippingOption {
        ShippingOption::new("express", "Express", 60.0, "3 - 5 DAYS")
    }

    fn items(lines: &[(f64, u32)]) -> Vec<LineItem> {
        lines
            .iter()
            .enumerate()
            .map(|(i, (price, qty))| LineItem::new(i.to_string(), *qty, *price))
            .collect()
    }

    #[test]
    fn test_reference_cart_without_discount() {
        let totals = compute_totals(
            &items(&[(75.0, 2), (85.0, 1)]),
            None,
            &standard(),
            &rules(),
            Currency::AED,
        );

        assert_eq!(totals.subtotal.display_amount(), "235.00");
        assert_eq!(totals.shipping_cost.display_amount(), "25.00");
        assert_eq!(totals.total.display_amount(), "260.00");
        assert!(!totals.has_discount());
        assert!(!totals.free_shipping_eligible);
    }

    #[test]
    fn test_reference_cart_with_sale10() {
        let sale10 = DiscountCode::percent("SALE10", 10.0);
        let totals = compute_totals(
            &items(&[(75.0, 2), (85.0, 1)]),
            Some(&sale10),
            &standard(),
            &rules(),
            Currency::AED,
        );

        assert_eq!(totals.discount_amount.display_amount(), "23.50");
        assert_eq!(totals.total.display_amount(), "236.50");
    }

    #[test]
    fn test_free_standard_shipping_over_threshold() {
        let totals = compute_totals(
            &items(&[(100.0, 3)]),
            None,
            &standard(),
            &rules(),
            Currency::AED,
        );

        assert!(totals.shipping_cost.is_zero());
        assert_eq!(totals.shipping_label(), "Free");
        assert_eq!(totals.total.display_amount(), "300.00");
    }

    #[test]
    fn test_free_shipping_boundary() {
        let at = compute_totals(&items(&[(250.0, 1)]), None, &standard(), &rules(), Currency::AED);
        assert!(at.shipping_cost.is_zero());
        assert!(at.free_shipping_eligible);

        let below = compute_totals(&items(&[(249.99, 1)]), None, &standard(), &rules(), Currency::AED);
        assert_eq!(below.shipping_cost.amount, 25.0);
        assert!(!below.free_shipping_eligible);
    }

    #[test]
    fn test_non_standard_tier_never_free() {
        let totals = compute_totals(&items(&[(500.0, 1)]), None, &express(), &rules(), Currency::AED);
        assert_eq!(totals.shipping_cost.amount, 60.0);
        assert!(totals.free_shipping_eligible);
    }

    #[test]
    fn test_discount_never_exceeds_subtotal() {
        let big = DiscountCode::fixed("GOKIT50", 50.0);
        let totals = compute_totals(&items(&[(20.0, 1)]), Some(&big), &standard(), &rules(), Currency::AED);

        assert_eq!(totals.discount_amount.amount, 20.0);
        assert!(totals.total.amount >= totals.shipping_cost.amount);
        assert_eq!(totals.total.amount, 25.0);
    }

    #[test]
    fn test_discount_bounds_hold_for_many_carts() {
        let codes = [
            DiscountCode::percent("SALE10", 10.0),
            DiscountCode::percent("ALL", 100.0),
            DiscountCode::fixed("GOKIT50", 50.0),
            DiscountCode::fixed("HUGE", 10_000.0),
        ];
        let carts = [
            vec![(0.0, 1)],
            vec![(9.99, 1)],
            vec![(75.0, 2), (85.0, 1)],
            vec![(49.5, 7), (12.25, 3)],
        ];

        for lines in &carts {
            for code in &codes {
                let totals =
                    compute_totals(&items(lines), Some(code), &standard(), &rules(), Currency::AED);
                assert!(totals.discount_amount.amount <= totals.subtotal.amount);
                assert!(totals.total.amount >= totals.shipping_cost.amount);
            }
        }
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let sale10 = DiscountCode::percent("SALE10", 10.0);
        let totals = compute_totals(&[], Some(&sale10), &standard(), &rules(), Currency::AED);
        assert_eq!(totals, CartTotals::zero(Currency::AED));
    }
}
