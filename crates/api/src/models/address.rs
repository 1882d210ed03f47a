//! Saved customer addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hearthside_core::{AddressId, AddressType, UserId};

/// A saved shipping or billing address.
///
/// At most one address per `(user, address_type)` carries `is_default`;
/// the repository flips the flag transactionally on create/update.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    #[serde(skip)]
    pub user_id: UserId,
    pub address_type: AddressType,
    pub first_name: String,
    pub last_name: String,
    pub street_address: String,
    pub apartment: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating or replacing an address.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub address_type: AddressType,
    pub first_name: String,
    pub last_name: String,
    pub street_address: String,
    #[serde(default)]
    pub apartment: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressInput {
    /// Reject inputs with blank required fields.
    ///
    /// # Errors
    ///
    /// Returns the name of the first missing field.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("streetAddress", &self.street_address),
            ("city", &self.city),
            ("state", &self.state),
            ("postalCode", &self.postal_code),
            ("country", &self.country),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{name} is required"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> AddressInput {
        AddressInput {
            address_type: AddressType::Shipping,
            first_name: "Maya".to_string(),
            last_name: "Roussel".to_string(),
            street_address: "12 Alder Lane".to_string(),
            apartment: None,
            city: "Portland".to_string(),
            state: "OR".to_string(),
            postal_code: "97201".to_string(),
            country: "US".to_string(),
            phone: None,
            is_default: false,
        }
    }

    #[test]
    fn test_valid_input() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_blank_field_rejected() {
        let mut bad = input();
        bad.city = "   ".to_string();
        assert_eq!(bad.validate().unwrap_err(), "city is required");
    }
}
