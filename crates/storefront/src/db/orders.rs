//! Order repository.
//!
//! Orders are written exactly once, at checkout, and never mutated here
//! afterwards; the only later write is flipping `reminder_sent` during the
//! expiry-reminder sweep. The header and its items always land in a single
//! transaction, so a committed order is never missing its lines.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use cirrus_core::{Email, OrderId};

use super::RepositoryError;
use crate::checkout::{NewOrder, NewOrderItem, OrderStore};

/// Repository for order persistence.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

/// An order due an expiry reminder.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReminderOrder {
    pub id: OrderId,
    pub billing_name: String,
    pub billing_email: Email,
    pub total_amount: Decimal,
    pub expires_at: DateTime<Utc>,
}

/// A line of an order, joined with the product name for emails.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReminderItem {
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find completed orders expiring within `window` of `now` that have
    /// not been reminded yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_expiring(
        &self,
        now: DateTime<Utc>,
        window: TimeDelta,
    ) -> Result<Vec<ReminderOrder>, RepositoryError> {
        let orders = sqlx::query_as::<_, ReminderOrder>(
            r"
            SELECT id, billing_name, billing_email, total_amount, expires_at
            FROM orders
            WHERE status = 'completed'
              AND reminder_sent = FALSE
              AND expires_at >= $1
              AND expires_at < $2
            ORDER BY expires_at
            ",
        )
        .bind(now)
        .bind(now + window)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// The items of an order, with product names, for reminder emails.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reminder_items(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<ReminderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, ReminderItem>(
            r"
            SELECT p.name AS product_name, oi.quantity, oi.price
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Mark an order as reminded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such order exists, or
    /// `RepositoryError::Database` if the update fails.
    pub async fn mark_reminder_sent(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET reminder_sent = TRUE
            WHERE id = $1
            ",
        )
        .bind(order_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl OrderStore for OrderRepository<'_> {
    /// Insert the order header and all items in one transaction.
    ///
    /// If any item insert fails, the transaction rolls back and no header
    /// row survives, so the caller can safely let the customer retry.
    async fn insert_order(
        &self,
        order: &NewOrder,
        items: &[NewOrderItem],
    ) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO orders
                (billing_name, billing_email, billing_address, total_amount,
                 payment_id, status, expires_at, reminder_sent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE)
            RETURNING id
            ",
        )
        .bind(&order.billing_name)
        .bind(&order.billing_email)
        .bind(&order.billing_address)
        .bind(order.total_amount)
        .bind(&order.payment_id)
        .bind(order.status)
        .bind(order.expires_at)
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!(
                    "order item quantity {} out of range",
                    item.quantity
                ))
            })?;

            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, variation_id, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(id)
            .bind(item.product_id)
            .bind(item.variation_id)
            .bind(quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }
}
