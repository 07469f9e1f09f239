//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmlink_core::{Email, Role, UserId};

/// A registered user.
///
/// The password hash never leaves the repository layer; this type is safe
/// to serialize into API responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address (unique).
    pub email: Email,
    /// Role assigned at registration. Immutable afterwards.
    pub role: Role,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Default shipping address.
    pub address: Option<Address>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A postal address, used both on user profiles and as an order's
/// shipping address snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serializes_without_password_fields() {
        let user = User {
            id: UserId::generate(),
            name: "Asha".to_string(),
            email: Email::parse("asha@example.com").unwrap(),
            role: Role::Seller,
            phone: Some("9800000000".to_string()),
            address: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "seller");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_address_serde_roundtrip() {
        let address = Address {
            street: "12 Lazimpat Road".to_string(),
            city: "Kathmandu".to_string(),
            state: "Bagmati".to_string(),
            postal_code: "44600".to_string(),
        };
        let json = serde_json::to_string(&address).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
