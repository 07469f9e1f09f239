//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use farmlink_core::{Category, ProductId, UserId};

/// A catalog product.
///
/// Created unapproved by a seller; only an admin can flip `is_approved`,
/// and only approved products appear in public listings.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Owning seller.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Hosted image URL.
    pub image: String,
    /// Brand or farm name.
    pub brand: String,
    /// Catalog category.
    pub category: Category,
    /// Long-form description.
    pub description: String,
    /// Unit price. Non-negative.
    pub price: Decimal,
    /// Units available. Non-negative; decremented atomically on order
    /// submission.
    pub count_in_stock: i32,
    /// Percentage discount shown on the listing.
    pub discount: Decimal,
    /// Whether an admin has approved this product for public listing.
    pub is_approved: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether `quantity` units can currently be ordered.
    ///
    /// Quantities beyond `i32::MAX` can never be satisfied; the lossy
    /// cast must not wrap them into small numbers.
    #[must_use]
    pub fn has_stock(&self, quantity: u32) -> bool {
        i32::try_from(quantity).is_ok_and(|q| self.count_in_stock >= q)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(count_in_stock: i32) -> Product {
        Product {
            id: ProductId::generate(),
            user_id: UserId::generate(),
            name: "Organic Tomatoes".to_string(),
            image: "https://res.cloudinary.com/demo/tomatoes.jpg".to_string(),
            brand: "Valley Farm".to_string(),
            category: Category::Vegetables,
            description: "Vine ripened".to_string(),
            price: Decimal::new(5000, 2),
            count_in_stock,
            discount: Decimal::ZERO,
            is_approved: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_stock() {
        assert!(product(3).has_stock(3));
        assert!(!product(3).has_stock(4));
        assert!(!product(0).has_stock(1));
    }

    #[test]
    fn test_has_stock_rejects_quantities_beyond_i32() {
        // u32 values above i32::MAX must read as out of stock, not wrap
        assert!(!product(1).has_stock(u32::MAX));
        assert!(!product(i32::MAX).has_stock(u32::try_from(i32::MAX).unwrap() + 1));
    }

    #[test]
    fn test_serializes_category_display_name() {
        let mut p = product(1);
        p.category = Category::MeatAndPoultry;
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["category"], "Meat & Poultry");
    }
}
