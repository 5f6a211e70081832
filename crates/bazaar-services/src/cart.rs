//! # Cart Service
//!
//! Per-user cart mutation with stock-aware capping.
//!
//! ## Add Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     add_item(user, product, qty)                        │
//! │                                                                         │
//! │  stock = product.quantity          in_cart = existing line qty (or 0)  │
//! │                                                                         │
//! │  max_addable = stock − in_cart                                         │
//! │       │                                                                 │
//! │       ├── max_addable <= 0 ──► StockExceeded (names the held count)    │
//! │       │                                                                 │
//! │       └── applied = min(qty, max_addable)                              │
//! │           rejected = qty − applied                                     │
//! │           line.quantity += applied                                     │
//! │           line.cost     += cost_price × applied                        │
//! │                                                                         │
//! │  Asking for 4 with 2 addable applies 2 and reports rejected = 2 —      │
//! │  a partial fulfillment, not an error. Callers see both counts.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two concurrent adds for the same user/product can both read the same
//! line and overshoot the cap — a read-modify-write race accepted here,
//! matching the storage model (no cross-request locking).

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use bazaar_core::validation::validate_quantity;
use bazaar_core::{CartLine, CoreError};
use bazaar_db::Database;

/// Result of an add-to-cart call: the full cart plus how much of the
/// request was actually applied.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemOutcome {
    pub cart: Vec<CartLine>,
    /// Units actually added to the line.
    pub applied: i64,
    /// Units turned away because stock would be exceeded.
    pub rejected: i64,
}

/// Cart mutation service.
#[derive(Debug, Clone)]
pub struct CartService {
    db: Database,
}

impl CartService {
    pub fn new(db: Database) -> Self {
        CartService { db }
    }

    /// Adds units of a product to a user's cart, capping at available
    /// stock.
    pub async fn add_item(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<AddItemOutcome, ApiError> {
        debug!(user_id = %user_id, product_id = %product_id, quantity = %quantity, "add_item");

        validate_quantity(quantity)?;

        if !self.db.users().exists(user_id).await? {
            return Err(CoreError::UserNotFound(user_id.to_string()).into());
        }

        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let in_cart = self
            .db
            .carts()
            .get_line(user_id, product_id)
            .await?
            .map(|line| line.quantity)
            .unwrap_or(0);

        let max_addable = product.quantity - in_cart;
        if max_addable <= 0 {
            return Err(CoreError::StockExceeded {
                product_id: product_id.to_string(),
                available: product.quantity,
                in_cart,
            }
            .into());
        }

        let applied = quantity.min(max_addable);
        let rejected = quantity - applied;

        self.db
            .carts()
            .add_units(
                user_id,
                product_id,
                applied,
                product.cost_price_cents * applied,
            )
            .await?;

        if rejected > 0 {
            info!(
                user_id = %user_id,
                product_id = %product_id,
                applied = %applied,
                rejected = %rejected,
                "Add capped at available stock"
            );
        }

        let cart = self.db.carts().lines_for_user(user_id).await?;

        Ok(AddItemOutcome {
            cart,
            applied,
            rejected,
        })
    }

    /// Removes a product's line from the user's cart.
    pub async fn remove_item(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<Vec<CartLine>, ApiError> {
        debug!(user_id = %user_id, product_id = %product_id, "remove_item");

        if !self.db.users().exists(user_id).await? {
            return Err(CoreError::UserNotFound(user_id.to_string()).into());
        }

        if self.db.carts().get_line(user_id, product_id).await?.is_none() {
            return Err(CoreError::CartItemNotFound {
                product_id: product_id.to_string(),
            }
            .into());
        }

        self.db.carts().delete_line(user_id, product_id).await?;

        Ok(self.db.carts().lines_for_user(user_id).await?)
    }

    /// Returns the user's cart lines (empty if the cart was never
    /// created).
    pub async fn cart_for_user(&self, user_id: &str) -> Result<Vec<CartLine>, ApiError> {
        if !self.db.users().exists(user_id).await? {
            return Err(CoreError::UserNotFound(user_id.to_string()).into());
        }

        Ok(self.db.carts().lines_for_user(user_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use bazaar_core::{Category, Product, Role, User};
    use bazaar_db::DbConfig;
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
                quantity: 5,
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
    async fn test_add_item_caps_at_stock() {
        let db = seeded_db().await;
        let carts = CartService::new(db);

        // stock = 5, cart empty: adding 3 applies all 3
        let outcome = carts.add_item("buyer-1", "p1", 3).await.unwrap();
        assert_eq!(outcome.applied, 3);
        assert_eq!(outcome.rejected, 0);
        assert_eq!(outcome.cart[0].quantity, 3);

        // adding 4 more caps at the 2 remaining: line holds 5, not 7
        let outcome = carts.add_item("buyer-1", "p1", 4).await.unwrap();
        assert_eq!(outcome.applied, 2);
        assert_eq!(outcome.rejected, 2);
        assert_eq!(outcome.cart.len(), 1);
        assert_eq!(outcome.cart[0].quantity, 5);

        // nothing addable left
        let err = carts.add_item("buyer-1", "p1", 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StockExceeded);
        assert!(err.message.contains("holds 5"));
    }

    #[tokio::test]
    async fn test_add_item_accumulates_cost() {
        let db = seeded_db().await;
        let carts = CartService::new(db);

        carts.add_item("buyer-1", "p1", 2).await.unwrap();
        let outcome = carts.add_item("buyer-1", "p1", 1).await.unwrap();

        // cost_price 300 × 3 units added across two calls
        assert_eq!(outcome.cart[0].cost_cents, 900);
    }

    #[tokio::test]
    async fn test_add_item_rejects_bad_input() {
        let db = seeded_db().await;
        let carts = CartService::new(db);

        let err = carts.add_item("buyer-1", "p1", 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = carts.add_item("buyer-1", "missing", 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = carts.add_item("missing", "p1", 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_remove_item() {
        let db = seeded_db().await;
        let carts = CartService::new(db);

        carts.add_item("buyer-1", "p1", 2).await.unwrap();
        let cart = carts.remove_item("buyer-1", "p1").await.unwrap();
        assert!(cart.is_empty());

        let err = carts.remove_item("buyer-1", "p1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_cart_for_user_empty_is_ok() {
        let db = seeded_db().await;
        let carts = CartService::new(db);

        let cart = carts.cart_for_user("buyer-1").await.unwrap();
        assert!(cart.is_empty());

        let err = carts.cart_for_user("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
