//! Order ledger repository.
//!
//! Order creation and voiding are transactional: the stock reservation,
//! the order row, and the line-item snapshots commit or roll back as one.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use farmlink_core::{OrderId, OrderItemId, OrderStatus, OrderTotals, ProductId, UserId};

use super::{RepositoryError, products};
use crate::models::{Address, Order, OrderItem, PaymentResult};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    payment_method: String,
    street: String,
    city: String,
    state: String,
    postal_code: String,
    items_price: Decimal,
    shipping_price: Decimal,
    tax_price: Decimal,
    total_price: Decimal,
    status: String,
    payment_intent_id: Option<String>,
    payment_result_id: Option<String>,
    payment_result_status: Option<String>,
    payment_update_time: Option<DateTime<Utc>>,
    payer_email: Option<String>,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    name: String,
    image: String,
    unit_price: Decimal,
    quantity: i32,
}

const ORDER_COLUMNS: &str = "id, user_id, payment_method, street, city, state, postal_code, \
     items_price, shipping_price, tax_price, total_price, status, \
     payment_intent_id, payment_result_id, payment_result_status, \
     payment_update_time, payer_email, is_paid, paid_at, is_delivered, \
     delivered_at, created_at";

const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, name, image, unit_price, quantity";

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let status: OrderStatus = self.status.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        let payment_result = match (self.payment_result_id, self.payment_result_status) {
            (Some(id), Some(result_status)) => Some(PaymentResult {
                id,
                status: result_status,
                update_time: self.payment_update_time.unwrap_or(self.created_at),
                payer_email: self.payer_email,
            }),
            _ => None,
        };

        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            items,
            shipping_address: Address {
                street: self.street,
                city: self.city,
                state: self.state,
                postal_code: self.postal_code,
            },
            payment_method: self.payment_method,
            items_price: self.items_price,
            shipping_price: self.shipping_price,
            tax_price: self.tax_price,
            total_price: self.total_price,
            status,
            payment_intent_id: self.payment_intent_id,
            payment_result,
            is_paid: self.is_paid,
            paid_at: self.paid_at,
            is_delivered: self.is_delivered,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
        })
    }
}

impl OrderItemRow {
    fn into_item(self) -> Result<OrderItem, RepositoryError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative quantity {} on order item {}",
                self.quantity, self.id
            ))
        })?;

        Ok(OrderItem {
            id: self.id,
            product_id: self.product_id,
            name: self.name,
            image: self.image,
            unit_price: self.unit_price,
            quantity,
        })
    }
}

/// Line-item snapshot captured at submission time.
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// Outcome of [`OrderRepository::create_pending`].
pub enum CreatePending {
    /// Order persisted and stock reserved.
    Created(Order),
    /// The conditional decrement rejected this product; nothing was
    /// persisted.
    OutOfStock(ProductId),
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new order in `pending_payment` state, reserving stock for
    /// every line in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction rolls back in full.
    pub async fn create_pending(
        &self,
        purchaser: UserId,
        items: &[NewOrderItem],
        shipping_address: &Address,
        payment_method: &str,
        totals: OrderTotals,
    ) -> Result<CreatePending, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Reserve stock first: a failed guard aborts before the order row
        // ever exists.
        for item in items {
            if !products::reserve_stock(&mut tx, item.product_id, item.quantity).await? {
                // Dropping the transaction rolls back prior reservations.
                return Ok(CreatePending::OutOfStock(item.product_id));
            }
        }

        let order_query = format!(
            "INSERT INTO orders (user_id, payment_method, street, city, state, \
                 postal_code, items_price, shipping_price, tax_price, total_price, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ORDER_COLUMNS}"
        );
        let order_row = sqlx::query_as::<_, OrderRow>(&order_query)
            .bind(purchaser)
            .bind(payment_method)
            .bind(&shipping_address.street)
            .bind(&shipping_address.city)
            .bind(&shipping_address.state)
            .bind(&shipping_address.postal_code)
            .bind(totals.items_price)
            .bind(totals.shipping_price)
            .bind(totals.tax_price)
            .bind(totals.total_price)
            .bind(OrderStatus::PendingPayment.to_string())
            .fetch_one(&mut *tx)
            .await?;

        let item_query = format!(
            "INSERT INTO order_items (order_id, product_id, name, image, unit_price, quantity) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ORDER_ITEM_COLUMNS}"
        );
        let mut stored_items = Vec::with_capacity(items.len());
        for item in items {
            let quantity = i32::try_from(item.quantity)
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
            let row = sqlx::query_as::<_, OrderItemRow>(&item_query)
                .bind(order_row.id)
                .bind(item.product_id)
                .bind(&item.name)
                .bind(&item.image)
                .bind(item.unit_price)
                .bind(quantity)
                .fetch_one(&mut *tx)
                .await?;
            stored_items.push(row.into_item()?);
        }

        tx.commit().await?;

        Ok(CreatePending::Created(order_row.into_order(stored_items)?))
    }

    /// Record the payment intent reserved for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_payment_intent(
        &self,
        id: OrderId,
        intent_id: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE orders SET payment_intent_id = $2 WHERE id = $1")
            .bind(id)
            .bind(intent_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Mark an order paid and store the verified processor result.
    ///
    /// Guarded on `pending_payment`, so a second confirmation changes
    /// nothing and `paid_at` is never overwritten. Returns `true` when
    /// this call performed the transition.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_paid(
        &self,
        id: OrderId,
        result: &PaymentResult,
    ) -> Result<bool, RepositoryError> {
        let updated = sqlx::query(
            "UPDATE orders \
             SET status = $2, is_paid = TRUE, paid_at = now(), \
                 payment_result_id = $3, payment_result_status = $4, \
                 payment_update_time = $5, payer_email = $6 \
             WHERE id = $1 AND status = $7",
        )
        .bind(id)
        .bind(OrderStatus::Paid.to_string())
        .bind(&result.id)
        .bind(&result.status)
        .bind(result.update_time)
        .bind(result.payer_email.as_deref())
        .bind(OrderStatus::PendingPayment.to_string())
        .execute(self.pool)
        .await?;

        Ok(updated.rows_affected() == 1)
    }

    /// Void an unpaid order and restore the stock its lines reserved.
    ///
    /// Only `pending_payment` orders can be voided; returns `false` when
    /// the order was already paid, voided, or missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn void_unpaid(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let voided = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1 AND status = $3")
            .bind(id)
            .bind(OrderStatus::Voided.to_string())
            .bind(OrderStatus::PendingPayment.to_string())
            .execute(&mut *tx)
            .await?;

        if voided.rows_affected() != 1 {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE products p \
             SET count_in_stock = p.count_in_stock + oi.quantity, updated_at = now() \
             FROM order_items oi \
             WHERE oi.order_id = $1 AND oi.product_id = p.id",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Fetch one order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(self.attach_items(vec![r]).await?.remove(0))),
            None => Ok(None),
        }
    }

    /// List a purchaser's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let query = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&query)
            .bind(user)
            .fetch_all(self.pool)
            .await?;

        self.attach_items(rows).await
    }

    /// List every order (admin view), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&query)
            .fetch_all(self.pool)
            .await?;

        self.attach_items(rows).await
    }

    /// List orders containing at least one of the seller's products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_seller(&self, seller: UserId) -> Result<Vec<Order>, RepositoryError> {
        let query = format!(
            "SELECT DISTINCT o.id, o.user_id, o.payment_method, o.street, o.city, \
                 o.state, o.postal_code, o.items_price, o.shipping_price, o.tax_price, \
                 o.total_price, o.status, o.payment_intent_id, o.payment_result_id, \
                 o.payment_result_status, o.payment_update_time, o.payer_email, \
                 o.is_paid, o.paid_at, o.is_delivered, o.delivered_at, o.created_at \
             FROM orders o \
             JOIN order_items oi ON oi.order_id = o.id \
             JOIN products p ON p.id = oi.product_id \
             WHERE p.user_id = $1 \
             ORDER BY o.created_at DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&query)
            .bind(seller)
            .fetch_all(self.pool)
            .await?;

        self.attach_items(rows).await
    }

    /// List `pending_payment` orders created before `cutoff`, for the
    /// reconciler sweep.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let query = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE status = $1 AND created_at < $2 \
             ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&query)
            .bind(OrderStatus::PendingPayment.to_string())
            .bind(cutoff)
            .fetch_all(self.pool)
            .await?;

        self.attach_items(rows).await
    }

    /// Load items for a batch of order rows and assemble domain orders.
    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let order_ids: Vec<Uuid> = rows.iter().map(|r| r.id.as_uuid()).collect();

        let item_query = format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1)"
        );
        let item_rows = sqlx::query_as::<_, OrderItemRow>(&item_query)
            .bind(&order_ids)
            .fetch_all(self.pool)
            .await?;

        let mut items_by_order: std::collections::HashMap<OrderId, Vec<OrderItem>> =
            std::collections::HashMap::new();
        for row in item_rows {
            let order_id = row.order_id;
            items_by_order
                .entry(order_id)
                .or_default()
                .push(row.into_item()?);
        }

        rows.into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }
}
