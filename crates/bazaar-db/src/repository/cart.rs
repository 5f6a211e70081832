//! # Cart Repository
//!
//! Database operations for cart lines.
//!
//! ## Cart Shape
//! A user's cart is the set of their `cart_items` rows — there is no cart
//! header document. The cart comes into existence with the first line and
//! disappears when the last line is removed or checkout clears it. The
//! `(user_id, product_id)` unique index guarantees at most one line per
//! distinct product.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use bazaar_core::CartLine;

const CART_COLUMNS: &str =
    "id, user_id, product_id, quantity, cost_cents, created_at, updated_at";

/// Repository for cart line operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Returns all cart lines for a user, oldest first.
    pub async fn lines_for_user(&self, user_id: &str) -> DbResult<Vec<CartLine>> {
        let sql = format!(
            "SELECT {} FROM cart_items WHERE user_id = ?1 ORDER BY created_at, id",
            CART_COLUMNS
        );
        let lines = sqlx::query_as::<_, CartLine>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(lines)
    }

    /// Returns the line for a (user, product) pair, if present.
    pub async fn get_line(&self, user_id: &str, product_id: &str) -> DbResult<Option<CartLine>> {
        let sql = format!(
            "SELECT {} FROM cart_items WHERE user_id = ?1 AND product_id = ?2",
            CART_COLUMNS
        );
        let line = sqlx::query_as::<_, CartLine>(&sql)
            .bind(user_id)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(line)
    }

    /// Adds units to a cart line, creating the line if absent.
    ///
    /// ## Merging
    /// The `(user_id, product_id)` conflict target turns a second add of
    /// the same product into an increment of the existing line rather than
    /// a duplicate row.
    pub async fn add_units(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
        cost_cents: i64,
    ) -> DbResult<CartLine> {
        debug!(user_id = %user_id, product_id = %product_id, quantity = %quantity, "Adding cart units");

        let now = Utc::now();
        let id = generate_id();

        sqlx::query(
            "INSERT INTO cart_items ( \
                id, user_id, product_id, quantity, cost_cents, created_at, updated_at \
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) \
            ON CONFLICT (user_id, product_id) DO UPDATE SET \
                quantity = quantity + excluded.quantity, \
                cost_cents = cost_cents + excluded.cost_cents, \
                updated_at = excluded.updated_at",
        )
        .bind(&id)
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(cost_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_line(user_id, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart item", product_id))
    }

    /// Deletes the line for a (user, product) pair.
    pub async fn delete_line(&self, user_id: &str, product_id: &str) -> DbResult<()> {
        let result =
            sqlx::query("DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2")
                .bind(user_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart item", product_id));
        }

        Ok(())
    }

    /// Removes every line of a user's cart, returning how many were
    /// deleted.
    pub async fn clear_user(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts a user's cart lines.
    pub async fn count_for_user(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use bazaar_core::{Category, Product, Role, User};
    use chrono::Utc;

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let now = Utc::now();
        for (id, role) in [("buyer-1", Role::Buyer), ("seller-1", Role::Seller)] {
            db.users()
                .insert(&User {
                    id: id.to_string(),
                    username: id.to_string(),
                    email: format!("{}@example.com", id),
                    location: "Lahore".to_string(),
                    role,
                    created_at: now,
                })
                .await
                .unwrap();
        }

        db.products()
            .insert(&Product {
                id: "p1".to_string(),
                name: "Rye Loaf".to_string(),
                description: None,
                price_cents: 500,
                cost_price_cents: 300,
                category: Category::Bakery,
                quantity: 10,
                seller_id: "seller-1".to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        db
    }

    #[tokio::test]
    async fn test_add_units_merges_lines() {
        let db = seeded_db().await;

        let line = db.carts().add_units("buyer-1", "p1", 2, 600).await.unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.cost_cents, 600);

        // Second add merges instead of duplicating.
        let line = db.carts().add_units("buyer-1", "p1", 3, 900).await.unwrap();
        assert_eq!(line.quantity, 5);
        assert_eq!(line.cost_cents, 1500);

        assert_eq!(db.carts().count_for_user("buyer-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_line() {
        let db = seeded_db().await;
        db.carts().add_units("buyer-1", "p1", 1, 300).await.unwrap();

        db.carts().delete_line("buyer-1", "p1").await.unwrap();
        assert!(db.carts().get_line("buyer-1", "p1").await.unwrap().is_none());

        // Deleting again reports the missing line.
        assert!(db.carts().delete_line("buyer-1", "p1").await.is_err());
    }

    #[tokio::test]
    async fn test_clear_user_only_touches_that_user() {
        let db = seeded_db().await;
        db.carts().add_units("buyer-1", "p1", 2, 600).await.unwrap();
        db.carts()
            .add_units("seller-1", "p1", 1, 300)
            .await
            .unwrap();

        let removed = db.carts().clear_user("buyer-1").await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(db.carts().count_for_user("buyer-1").await.unwrap(), 0);
        assert_eq!(db.carts().count_for_user("seller-1").await.unwrap(), 1);
    }
}
