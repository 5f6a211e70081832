//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Lookups by id and seller
//! - Name search (case-insensitive substring match)
//! - Seller ownership sets for report scoping
//! - Stock adjustments

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::Product;

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, cost_price_cents, category, \
     quantity, seller_id, is_active, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists all active products, sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE is_active = 1 ORDER BY name",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists a seller's active products, sorted by name.
    pub async fn list_by_seller(&self, seller_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE seller_id = ?1 AND is_active = 1 ORDER BY name",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(seller_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Returns the set of product ids a seller owns (active or not).
    ///
    /// Report scoping uses this set; historical orders may reference
    /// soft-deleted products, which still belong to the seller.
    pub async fn seller_product_ids(&self, seller_id: &str) -> DbResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT id FROM products WHERE seller_id = ?1 ORDER BY id",
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Searches active products by name (case-insensitive substring).
    pub async fn search_by_name(&self, term: &str, limit: i64) -> DbResult<Vec<Product>> {
        debug!(term = %term, limit = %limit, "Searching products");

        let sql = format!(
            "SELECT {} FROM products \
             WHERE is_active = 1 AND name LIKE '%' || ?1 || '%' \
             ORDER BY name LIMIT ?2",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(term)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            "INSERT INTO products ( \
                id, name, description, price_cents, cost_price_cents, category, \
                quantity, seller_id, is_active, created_at, updated_at \
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_price_cents)
        .bind(product.category)
        .bind(product.quantity)
        .bind(&product.seller_id)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a product's selling price.
    pub async fn update_price(&self, id: &str, price_cents: i64) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET price_cents = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Adjusts stock by a delta (negative for sales, positive for
    /// restocking). The schema rejects adjustments that would take stock
    /// below zero.
    pub async fn update_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Updating stock");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET quantity = quantity + ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical orders still reference the product, so rows are never
    /// physically removed.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
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
    use crate::repository::generate_id;
    use bazaar_core::{Category, Product, Role, User};
    use chrono::Utc;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_seller(db: &Database, id: &str) {
        let user = User {
            id: id.to_string(),
            username: format!("seller-{}", id),
            email: format!("{}@example.com", id),
            location: "Lahore".to_string(),
            role: Role::Seller,
            created_at: Utc::now(),
        };
        db.users().insert(&user).await.unwrap();
    }

    fn test_product(id: &str, seller_id: &str, name: &str, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            price_cents,
            cost_price_cents: price_cents * 60 / 100,
            category: Category::Grocery,
            quantity: 10,
            seller_id: seller_id.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_product() {
        let db = test_db().await;
        seed_seller(&db, "s1").await;

        let product = test_product(&generate_id(), "s1", "Rye Loaf", 500);
        db.products().insert(&product).await.unwrap();

        let fetched = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Rye Loaf");
        assert_eq!(fetched.price_cents, 500);
        assert_eq!(fetched.category, Category::Grocery);

        assert!(db.products().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seller_product_ids() {
        let db = test_db().await;
        seed_seller(&db, "s1").await;
        seed_seller(&db, "s2").await;

        for (pid, seller) in [("p1", "s1"), ("p2", "s1"), ("p3", "s2")] {
            db.products()
                .insert(&test_product(pid, seller, pid, 100))
                .await
                .unwrap();
        }

        let ids = db.products().seller_product_ids("s1").await.unwrap();
        assert_eq!(ids, vec!["p1".to_string(), "p2".to_string()]);

        let none = db.products().seller_product_ids("nobody").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_search_by_name_is_substring_match() {
        let db = test_db().await;
        seed_seller(&db, "s1").await;
        db.products()
            .insert(&test_product("p1", "s1", "Sourdough Loaf", 700))
            .await
            .unwrap();
        db.products()
            .insert(&test_product("p2", "s1", "Stout", 900))
            .await
            .unwrap();

        let hits = db.products().search_by_name("loaf", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sourdough Loaf");

        let all = db.products().search_by_name("", 10).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_update_stock_and_price() {
        let db = test_db().await;
        seed_seller(&db, "s1").await;
        db.products()
            .insert(&test_product("p1", "s1", "Candle", 300))
            .await
            .unwrap();

        db.products().update_stock("p1", -4).await.unwrap();
        db.products().update_price("p1", 350).await.unwrap();

        let product = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.quantity, 6);
        assert_eq!(product.price_cents, 350);

        assert!(db.products().update_stock("missing", 1).await.is_err());
    }
}
