//! Customer contact and delivery details.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};

/// Details entered in the checkout form.
///
/// Stored as-is under `checkoutDetails` when the customer asks to be
/// remembered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerDetails {
    /// Full name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
}

impl CustomerDetails {
    /// Create customer details.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            phone: phone.into(),
            address: address.into(),
            city: city.into(),
            postal_code: postal_code.into(),
        }
    }

    /// Names of the fields that are missing or malformed, in form order.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.full_name.trim().is_empty() {
            fields.push("fullName");
        }
        if !is_plausible_email(&self.email) {
            fields.push("email");
        }
        if self.phone.trim().is_empty() {
            fields.push("phone");
        }
        if self.address.trim().is_empty() {
            fields.push("address");
        }
        if self.city.trim().is_empty() {
            fields.push("city");
        }
        if self.postal_code.trim().is_empty() {
            fields.push("postalCode");
        }
        fields
    }

    /// Check every required field.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let fields = self.invalid_fields();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::ValidationFailed { fields })
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
