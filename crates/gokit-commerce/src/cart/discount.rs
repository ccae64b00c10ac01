//! Discount codes, the code registry and the usage ledger.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// Percentage of the subtotal.
    Percent,
    /// Fixed amount off.
    Fixed,
}

/// A discount code, as stored under `appliedDiscount`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscountCode {
    /// Normalized (uppercase) code.
    pub code: String,
    /// Percent or fixed.
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    /// Percentage points or currency amount, depending on `kind`.
    pub value: f64,
}

impl DiscountCode {
    /// Create a percentage discount.
    pub fn percent(code: impl Into<String>, percent: f64) -> Self {
        Self {
            code: normalize_code(&code.into()),
            kind: DiscountKind::Percent,
            value: percent,
        }
    }

    /// Create a fixed amount discount.
    pub fn fixed(code: impl Into<String>, amount: f64) -> Self {
        Self {
            code: normalize_code(&code.into()),
            kind: DiscountKind::Fixed,
            value: amount,
        }
    }

    /// Calculate the discount for a subtotal.
    ///
    /// Never exceeds the subtotal, so a discount cannot make an order
    /// negative.
    pub fn amount_for(&self, subtotal: f64) -> f64 {
        let raw = match self.kind {
            DiscountKind::Percent => subtotal * self.value / 100.0,
            DiscountKind::Fixed => self.value,
        };
        raw.min(subtotal).max(0.0)
    }
}

/// Trim and uppercase user input.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// How many times each code has been consumed at checkout.
///
/// Persisted under `usedCodes` as a `{ "CODE": count }` object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct UsageLedger {
    uses: HashMap<String, u32>,
}

impl UsageLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses recorded for `code`.
    pub fn uses(&self, code: &str) -> u32 {
        self.uses.get(code).copied().unwrap_or(0)
    }

    /// Record one checkout use of `code`.
    pub fn record_use(&mut self, code: &str) -> u32 {
        let count = self.uses.entry(code.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Check if `code` has reached `limit`.
    pub fn is_exhausted(&self, code: &str, limit: u32) -> bool {
        self.uses(code) >= limit
    }
}

impl FromIterator<(String, u32)> for UsageLedger {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self {
            uses: iter.into_iter().collect(),
        }
    }
}

/// Resolves user input to a [`DiscountCode`].
///
/// Lookup order is the public registry first, then the codes granted to
/// this user (at sign-up, for instance), which are always percentage codes.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountRegistry {
    public_codes: Vec<DiscountCode>,
    granted_percent: f64,
    usage_limit: u32,
}

impl DiscountRegistry {
    /// Create a registry.
    pub fn new(public_codes: Vec<DiscountCode>, granted_percent: f64, usage_limit: u32) -> Self {
        let public_codes = public_codes
            .into_iter()
            .map(|mut c| {
                c.code = normalize_code(&c.code);
                c
            })
            .collect();
        Self {
            public_codes,
            granted_percent,
            usage_limit,
        }
    }

    /// Maximum checkout uses per code.
    pub fn usage_limit(&self) -> u32 {
        self.usage_limit
    }

    /// Find a code without checking usage. `code` must already be normalized.
    pub fn resolve(&self, code: &str, granted: &[String]) -> Option<DiscountCode> {
        if let Some(public) = self.public_codes.iter().find(|c| c.code == code) {
            return Some(public.clone());
        }

        granted
            .iter()
            .any(|g| normalize_code(g) == code)
            .then(|| DiscountCode::percent(code, self.granted_percent))
    }

    /// Validate user input against the registry and the ledger.
    ///
    /// The usage limit is checked before the lookup: an exhausted code is
    /// reported as such whether or not it still exists.
    pub fn validate(
        &self,
        raw: &str,
        granted: &[String],
        ledger: &UsageLedger,
    ) -> Result<DiscountCode, CommerceError> {
        let code = normalize_code(raw);
        if code.is_empty() {
            return Err(CommerceError::InvalidDiscountCode(code));
        }

        if ledger.is_exhausted(&code, self.usage_limit) {
            return Err(CommerceError::DiscountUsageLimitReached(code));
        }

        self.resolve(&code, granted)
            .ok_or(CommerceError::InvalidDiscountCode(code))
    }
}
