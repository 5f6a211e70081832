//! # Order Repository
//!
//! Database operations for orders and order items.
//!
//! ## Checkout Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   commit_checkout (one transaction)                     │
//! │                                                                         │
//! │  1. INSERT INTO orders        ← totals + customer_type fixed here      │
//! │  2. INSERT INTO order_items   ← price/cost snapshots, one per line     │
//! │  3. DELETE FROM cart_items    ← clears the user's cart                 │
//! │  4. COMMIT                                                             │
//! │                                                                         │
//! │  Either the order exists and the cart is gone, or neither happened.    │
//! │  The service layer still re-reads the cart afterwards and refuses      │
//! │  to report success if anything survived.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Report Queries
//! Orders are append-only facts for the reporting pipeline: window scans
//! return full rows for in-process folds, while the grouped queries
//! (per-type and per-location revenue, window sums) push the aggregation
//! into SQL.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::{CustomerType, Order, OrderItem};

const ORDER_COLUMNS: &str =
    "id, user_id, total_cents, status, customer_type, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, quantity, unit_price_cents, cost_cents, created_at";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Counts every order a user has ever placed, regardless of status.
    ///
    /// Checkout calls this *before* inserting the new order to decide the
    /// customer type: zero prior orders means a new customer.
    pub async fn count_for_user(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Persists an order with its items and clears the user's cart, all in
    /// one transaction.
    pub async fn commit_checkout(&self, order: &Order, items: &[OrderItem]) -> DbResult<()> {
        debug!(order_id = %order.id, user_id = %order.user_id, items = items.len(), "Committing checkout");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders ( \
                id, user_id, total_cents, status, customer_type, created_at, updated_at \
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.total_cents)
        .bind(order.status)
        .bind(order.customer_type)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO order_items ( \
                    id, order_id, product_id, quantity, unit_price_cents, cost_cents, created_at \
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.cost_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(&order.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Gets all items for an order.
    pub async fn items_for_order(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let sql = format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY created_at, id",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Completed orders inside an inclusive window, oldest first.
    pub async fn completed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM orders \
             WHERE status = 'completed' AND created_at >= ?1 AND created_at <= ?2 \
             ORDER BY created_at, id",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Completed orders inside an inclusive window, each with its items.
    pub async fn completed_with_items_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<(Order, Vec<OrderItem>)>> {
        let orders = self.completed_between(start, end).await?;

        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.items_for_order(&order.id).await?;
            result.push((order, items));
        }

        Ok(result)
    }

    /// A user's completed orders, each with its items.
    pub async fn completed_with_items_for_user(
        &self,
        user_id: &str,
    ) -> DbResult<Vec<(Order, Vec<OrderItem>)>> {
        let sql = format!(
            "SELECT {} FROM orders \
             WHERE user_id = ?1 AND status = 'completed' \
             ORDER BY created_at, id",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.items_for_order(&order.id).await?;
            result.push((order, items));
        }

        Ok(result)
    }

    /// Sum of completed order totals in a half-open window `[start, end)`.
    pub async fn sum_completed_half_open(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_cents), 0) FROM orders \
             WHERE status = 'completed' AND created_at >= ?1 AND created_at < ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// A user's completed-order revenue grouped by stored customer type.
    pub async fn revenue_by_customer_type(
        &self,
        user_id: &str,
    ) -> DbResult<Vec<(CustomerType, i64)>> {
        let rows = sqlx::query_as::<_, (CustomerType, i64)>(
            "SELECT customer_type, COALESCE(SUM(total_cents), 0) \
             FROM orders \
             WHERE user_id = ?1 AND status = 'completed' \
             GROUP BY customer_type",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Completed-order revenue grouped by the order owner's location.
    ///
    /// With `user_id` given this degenerates to the segments of a single
    /// customer; with `None` it aggregates every customer — the same query
    /// serves both callers.
    pub async fn revenue_by_location(
        &self,
        user_id: Option<&str>,
    ) -> DbResult<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT u.location, COALESCE(SUM(o.total_cents), 0) \
             FROM orders o \
             INNER JOIN users u ON u.id = o.user_id \
             WHERE o.status = 'completed' AND (?1 IS NULL OR o.user_id = ?1) \
             GROUP BY u.location \
             ORDER BY u.location",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::generate_id;
    use bazaar_core::{Category, OrderStatus, Product, Role, User};
    use chrono::TimeZone;

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let now = Utc::now();
        for (id, location) in [("u1", "Lahore"), ("u2", "Karachi")] {
            db.users()
                .insert(&User {
                    id: id.to_string(),
                    username: id.to_string(),
                    email: format!("{}@example.com", id),
                    location: location.to_string(),
                    role: Role::Buyer,
                    created_at: now,
                })
                .await
                .unwrap();
        }

        db.products()
            .insert(&Product {
                id: "p1".to_string(),
                name: "Stout".to_string(),
                description: None,
                price_cents: 800,
                cost_price_cents: 500,
                category: Category::Liquor,
                quantity: 20,
                seller_id: "u2".to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        db
    }

    fn order_at(
        user_id: &str,
        total_cents: i64,
        customer_type: CustomerType,
        created_at: DateTime<Utc>,
    ) -> Order {
        Order {
            id: generate_id(),
            user_id: user_id.to_string(),
            total_cents,
            status: OrderStatus::Completed,
            customer_type,
            created_at,
            updated_at: created_at,
        }
    }

    fn item_for(order: &Order, quantity: i64, unit_price_cents: i64) -> OrderItem {
        OrderItem {
            id: generate_id(),
            order_id: order.id.clone(),
            product_id: "p1".to_string(),
            quantity,
            unit_price_cents,
            cost_cents: 500 * quantity,
            created_at: order.created_at,
        }
    }

    #[tokio::test]
    async fn test_commit_checkout_is_atomic_and_clears_cart() {
        let db = seeded_db().await;
        db.carts().add_units("u1", "p1", 2, 1000).await.unwrap();

        let order = order_at("u1", 1600, CustomerType::New, Utc::now());
        let items = vec![item_for(&order, 2, 800)];
        db.orders().commit_checkout(&order, &items).await.unwrap();

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.total_cents, 1600);
        assert_eq!(stored.customer_type, CustomerType::New);
        assert_eq!(stored.status, OrderStatus::Completed);

        let stored_items = db.orders().items_for_order(&order.id).await.unwrap();
        assert_eq!(stored_items.len(), 1);
        assert_eq!(stored_items[0].unit_price_cents, 800);

        assert_eq!(db.carts().count_for_user("u1").await.unwrap(), 0);
        assert_eq!(db.orders().count_for_user("u1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_completed_between_respects_window() {
        let db = seeded_db().await;

        let inside = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let outside = Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 1).unwrap();

        let o1 = order_at("u1", 500, CustomerType::New, inside);
        let o2 = order_at("u1", 700, CustomerType::Repeat, outside);
        db.orders().commit_checkout(&o1, &[]).await.unwrap();
        db.orders().commit_checkout(&o2, &[]).await.unwrap();

        let start = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap();
        let found = db.orders().completed_between(start, end).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, o1.id);
    }

    #[tokio::test]
    async fn test_sum_completed_half_open_excludes_end() {
        let db = seeded_db().await;

        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let feb_first = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        db.orders()
            .commit_checkout(&order_at("u1", 1000, CustomerType::New, jan), &[])
            .await
            .unwrap();
        db.orders()
            .commit_checkout(&order_at("u1", 9999, CustomerType::Repeat, feb_first), &[])
            .await
            .unwrap();

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let total = db
            .orders()
            .sum_completed_half_open(start, feb_first)
            .await
            .unwrap();
        // The order exactly at the end boundary is excluded.
        assert_eq!(total, 1000);

        let empty = db
            .orders()
            .sum_completed_half_open(feb_first, feb_first)
            .await
            .unwrap();
        assert_eq!(empty, 0);
    }

    #[tokio::test]
    async fn test_revenue_grouping_queries() {
        let db = seeded_db().await;
        let now = Utc::now();

        db.orders()
            .commit_checkout(&order_at("u1", 1000, CustomerType::New, now), &[])
            .await
            .unwrap();
        db.orders()
            .commit_checkout(&order_at("u1", 2500, CustomerType::Repeat, now), &[])
            .await
            .unwrap();
        db.orders()
            .commit_checkout(&order_at("u2", 400, CustomerType::New, now), &[])
            .await
            .unwrap();

        let by_type = db.orders().revenue_by_customer_type("u1").await.unwrap();
        let mut by_type_sorted = by_type.clone();
        by_type_sorted.sort_by_key(|(_, total)| *total);
        assert_eq!(by_type_sorted[0], (CustomerType::New, 1000));
        assert_eq!(by_type_sorted[1], (CustomerType::Repeat, 2500));

        let u1_segments = db.orders().revenue_by_location(Some("u1")).await.unwrap();
        assert_eq!(u1_segments, vec![("Lahore".to_string(), 3500)]);

        let all_segments = db.orders().revenue_by_location(None).await.unwrap();
        assert_eq!(
            all_segments,
            vec![
                ("Karachi".to_string(), 400),
                ("Lahore".to_string(), 3500),
            ]
        );
    }
}
