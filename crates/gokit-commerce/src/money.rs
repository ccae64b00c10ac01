//! Money type for representing monetary values.
//!
//! Amounts are plain decimals (`f64`) in the currency's major unit. The
//! storefront never rounds during arithmetic; two decimals are applied only
//! when formatting for display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    AED,
    SAR,
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// Get the currency code (e.g., "AED").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::AED => "AED",
            Currency::SAR => "SAR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "AED" => Some(Currency::AED),
            "SAR" => Some(Currency::SAR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in major units (e.g., dirhams).
    pub amount: f64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value.
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0.0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0.0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount > 0.0
    }

    /// Format as a display string (e.g., "AED 49.99").
    pub fn display(&self) -> String {
        format!("{} {:.2}", self.currency.code(), self.amount)
    }

    /// Format as a display string without currency (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        format!("{:.2}", self.amount)
    }

    /// Try to add another Money value, returning None if currencies don't match.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        Some(Money::new(self.amount + other.amount, self.currency))
    }

    /// Multiply by a quantity.
    pub fn times(&self, quantity: u32) -> Money {
        Money::new(self.amount * f64::from(quantity), self.currency)
    }

    /// Calculate a percentage of this amount.
    pub fn percentage(&self, percent: f64) -> Money {
        Money::new(self.amount * percent / 100.0, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        let m = Money::new(235.0, Currency::AED);
        assert_eq!(m.display(), "AED 235.00");
        assert_eq!(m.display_amount(), "235.00");
    }

    #[test]
    fn test_display_rounds_only_at_the_end() {
        let m = Money::new(23.456, Currency::AED);
        assert_eq!(m.amount, 23.456);
        assert_eq!(m.display_amount(), "23.46");
    }

    #[test]
    fn test_money_addition() {
        let a = Money::new(10.5, Currency::AED);
        let b = Money::new(4.5, Currency::AED);
        assert_eq!(a.try_add(&b).unwrap().amount, 15.0);
    }

    #[test]
    fn test_money_currency_mismatch() {
        let aed = Money::new(10.0, Currency::AED);
        let usd = Money::new(10.0, Currency::USD);
        assert!(aed.try_add(&usd).is_none());
    }

    #[test]
    fn test_money_times() {
        let m = Money::new(75.0, Currency::AED);
        assert_eq!(m.times(2).amount, 150.0);
    }

    #[test]
    fn test_money_percentage() {
        let m = Money::new(235.0, Currency::AED);
        assert_eq!(m.percentage(10.0).amount, 23.5);
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("AED"), Some(Currency::AED));
        assert_eq!(Currency::from_code(" usd "), Some(Currency::USD));
        assert_eq!(Currency::from_code("INVALID"), None);
    }
}
