//! Shipping profile domain type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A mandatory shipping field was left empty.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0} is required")]
pub struct ShippingValidationError(pub &'static str);

/// A user's shipping address. At most one per user; saving overwrites the
/// existing profile in place (no history).
///
/// The same shape is copied verbatim onto orders at purchase time, so past
/// orders keep the address that was current when they were placed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingProfile {
    pub full_name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
}

impl ShippingProfile {
    /// Validate that every mandatory field is non-empty after trimming.
    ///
    /// Address line 3 is the only optional field.
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    pub fn validate(&self) -> Result<(), ShippingValidationError> {
        let mandatory = [
            ("full name", &self.full_name),
            ("address line 1", &self.address_line1),
            ("address line 2", &self.address_line2),
            ("city", &self.city),
            ("state", &self.state),
            ("zip code", &self.zip_code),
            ("phone", &self.phone),
        ];
        for (field, value) in mandatory {
            if value.trim().is_empty() {
                return Err(ShippingValidationError(field));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ShippingProfile {
        ShippingProfile {
            full_name: "Asha Patel".to_owned(),
            address_line1: "14 Orchard Row".to_owned(),
            address_line2: "Flat 2".to_owned(),
            address_line3: None,
            city: "Pune".to_owned(),
            state: "MH".to_owned(),
            zip_code: "411001".to_owned(),
            phone: "+91 98000 00000".to_owned(),
        }
    }

    #[test]
    fn test_valid_profile() {
        assert!(profile().validate().is_ok());
    }

    #[test]
    fn test_line3_is_optional() {
        let mut p = profile();
        p.address_line3 = Some(String::new());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_blank_mandatory_field_rejected() {
        let mut p = profile();
        p.city = "   ".to_owned();
        assert_eq!(p.validate(), Err(ShippingValidationError("city")));
    }
}
