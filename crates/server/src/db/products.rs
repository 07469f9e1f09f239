//! Product repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use farmlink_core::{Category, ProductId, UserId};

use super::RepositoryError;
use crate::models::Product;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    user_id: UserId,
    name: String,
    image: String,
    brand: String,
    category: String,
    description: String,
    price: Decimal,
    count_in_stock: i32,
    discount: Decimal,
    is_approved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str = "id, user_id, name, image, brand, category, description, \
     price, count_in_stock, discount, is_approved, created_at, updated_at";

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let category: Category = self.category.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("invalid category in database: {e}"))
        })?;

        Ok(Product {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            image: self.image,
            brand: self.brand,
            category,
            description: self.description,
            price: self.price,
            count_in_stock: self.count_in_stock,
            discount: self.discount,
            is_approved: self.is_approved,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Fields needed to create a product. Products are always created
/// unapproved; approval is a separate admin action.
pub struct NewProduct<'a> {
    pub user_id: UserId,
    pub name: &'a str,
    pub image: &'a str,
    pub brand: &'a str,
    pub category: Category,
    pub description: &'a str,
    pub price: Decimal,
    pub count_in_stock: i32,
    pub discount: Decimal,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List approved products, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_approved(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_approved AND ($1::text IS NULL OR category = $1) \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&query)
            .bind(category.map(Category::as_str))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// List every product regardless of approval (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let query =
            format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, ProductRow>(&query)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// List a seller's own products, all approval states.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_seller(&self, seller: UserId) -> Result<Vec<Product>, RepositoryError> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE user_id = $1 \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&query)
            .bind(seller)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Fetch one product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Insert a new (unapproved) product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new_product: NewProduct<'_>) -> Result<Product, RepositoryError> {
        let query = format!(
            "INSERT INTO products (user_id, name, image, brand, category, \
                 description, price, count_in_stock, discount) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&query)
            .bind(new_product.user_id)
            .bind(new_product.name)
            .bind(new_product.image)
            .bind(new_product.brand)
            .bind(new_product.category.as_str())
            .bind(new_product.description)
            .bind(new_product.price)
            .bind(new_product.count_in_stock)
            .bind(new_product.discount)
            .fetch_one(self.pool)
            .await?;

        row.into_product()
    }

    /// Set the approval flag (admin action). Returns the updated product,
    /// or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_approval(
        &self,
        id: ProductId,
        is_approved: bool,
    ) -> Result<Option<Product>, RepositoryError> {
        let query = format!(
            "UPDATE products SET is_approved = $2, updated_at = now() \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .bind(is_approved)
            .fetch_optional(self.pool)
            .await?;

        row.map(ProductRow::into_product).transpose()
    }
}

/// Atomically reserve stock inside an open transaction.
///
/// The decrement only happens when enough stock remains
/// (`count_in_stock >= quantity`), so two concurrent orders against the
/// same low-stock product can never both succeed. Returns `false` when
/// the guard rejected the decrement.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn reserve_stock(
    tx: &mut Transaction<'_, Postgres>,
    id: ProductId,
    quantity: u32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        "UPDATE products \
         SET count_in_stock = count_in_stock - $2, updated_at = now() \
         WHERE id = $1 AND count_in_stock >= $2",
    )
    .bind(id)
    .bind(i32::try_from(quantity).map_err(|e| RepositoryError::DataCorruption(e.to_string()))?)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}
