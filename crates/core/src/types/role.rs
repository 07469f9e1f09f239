//! User roles and the permissions they imply.

use serde::{Deserialize, Serialize};

/// Role assigned to a user at registration.
///
/// Immutable after assignment. Every gated operation dispatches on this
/// closed enum rather than on per-user permission rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular shopper. Can browse the approved catalog and place orders.
    #[default]
    Customer,
    /// Can create products (unapproved until an admin reviews them) and
    /// see orders containing their own products.
    Seller,
    /// Full access: product approval, all products, all orders.
    Admin,
}

impl Role {
    /// Whether this role may manage products (create, upload images,
    /// list their own).
    #[must_use]
    pub const fn is_seller_or_admin(self) -> bool {
        matches!(self, Self::Seller | Self::Admin)
    }

    /// Whether this role has administrative access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Seller => write!(f, "seller"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_str_roundtrip() {
        for role in [Role::Customer, Role::Seller, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_permission_helpers() {
        assert!(!Role::Customer.is_seller_or_admin());
        assert!(Role::Seller.is_seller_or_admin());
        assert!(Role::Admin.is_seller_or_admin());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Seller.is_admin());
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("superuser".parse::<Role>().is_err());
    }
}
