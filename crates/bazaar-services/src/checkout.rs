//! # Checkout Service
//!
//! Converts a cart into an immutable order.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         checkout(user)                                  │
//! │                                                                         │
//! │  1. Load cart lines           ──► EmptyCart if none                    │
//! │  2. Snapshot per line:                                                 │
//! │       unit_price = product.price_cents        (frozen)                 │
//! │       cost       = cost_price × quantity      (frozen)                 │
//! │  3. total = Σ unit_price × quantity                                    │
//! │  4. customer_type: any prior order? ──► repeat, else new               │
//! │     (decided BEFORE the new order is inserted)                         │
//! │  5. commit_checkout: order + items + cart clear, one transaction       │
//! │  6. Re-read cart ──► CheckoutInconsistency if anything survived        │
//! │                                                                         │
//! │  The post-commit verification is deliberate: a checkout that leaves    │
//! │  cart lines behind is reported as a server error, never as success.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is not decremented here — the stock ceiling is enforced when
//! items enter the cart. Two concurrent checkouts of the same cart remain
//! a known race; the transaction protects order/cart consistency, not
//! cross-request stock accounting.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use bazaar_core::{CoreError, CustomerType, Order, OrderItem, OrderStatus};
use bazaar_db::Database;

/// The order produced by a successful checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Cart-to-order transition service.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
}

impl CheckoutService {
    pub fn new(db: Database) -> Self {
        CheckoutService { db }
    }

    /// Converts the user's cart into a completed order.
    pub async fn checkout(&self, user_id: &str) -> Result<CheckoutReceipt, ApiError> {
        debug!(user_id = %user_id, "checkout");

        if !self.db.users().exists(user_id).await? {
            return Err(CoreError::UserNotFound(user_id.to_string()).into());
        }

        let lines = self.db.carts().lines_for_user(user_id).await?;
        if lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();

        let mut items = Vec::with_capacity(lines.len());
        let mut total_cents = 0;
        for line in &lines {
            let product = self
                .db
                .products()
                .get_by_id(&line.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            total_cents += product.price_cents * line.quantity;
            items.push(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price_cents: product.price_cents,
                cost_cents: product.cost_price_cents * line.quantity,
                created_at: now,
            });
        }

        // Must run before the new order is inserted, or every checkout
        // would see itself and come out "repeat".
        let prior_orders = self.db.orders().count_for_user(user_id).await?;
        let customer_type = if prior_orders == 0 {
            CustomerType::New
        } else {
            CustomerType::Repeat
        };

        let order = Order {
            id: order_id,
            user_id: user_id.to_string(),
            total_cents,
            status: OrderStatus::Completed,
            customer_type,
            created_at: now,
            updated_at: now,
        };

        self.db.orders().commit_checkout(&order, &items).await?;

        // Verify the clear actually emptied the cart.
        let remaining = self.db.carts().count_for_user(user_id).await?;
        if remaining > 0 {
            return Err(CoreError::CheckoutInconsistency {
                user_id: user_id.to_string(),
                remaining,
            }
            .into());
        }

        if let Err(e) = self.db.activity().record(user_id, "checkout").await {
            warn!(user_id = %user_id, error = %e, "Failed to record checkout activity");
        }

        info!(
            order_id = %order.id,
            user_id = %user_id,
            total_cents = %total_cents,
            items = items.len(),
            customer_type = ?customer_type,
            "Checkout complete"
        );

        Ok(CheckoutReceipt { order, items })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartService;
    use crate::error::ErrorCode;
    use bazaar_core::{Category, Product, Role, User};
    use bazaar_db::DbConfig;

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

        for (id, name, price, cost, stock) in [
            ("p1", "Rye Loaf", 500i64, 300i64, 10i64),
            ("p2", "Stout", 800, 500, 10),
        ] {
            db.products()
                .insert(&Product {
                    id: id.to_string(),
                    name: name.to_string(),
                    description: None,
                    price_cents: price,
                    cost_price_cents: cost,
                    category: Category::Grocery,
                    quantity: stock,
                    seller_id: "seller-1".to_string(),
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        db
    }

    #[tokio::test]
    async fn test_checkout_totals_and_clears_cart() {
        let db = seeded_db().await;
        let carts = CartService::new(db.clone());
        let checkout = CheckoutService::new(db.clone());

        carts.add_item("buyer-1", "p1", 2).await.unwrap();
        carts.add_item("buyer-1", "p2", 3).await.unwrap();

        let receipt = checkout.checkout("buyer-1").await.unwrap();

        // total = Σ price × qty exactly
        assert_eq!(receipt.order.total_cents, 2 * 500 + 3 * 800);
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.order.status, OrderStatus::Completed);

        // the cart has zero lines afterwards
        assert_eq!(db.carts().count_for_user("buyer-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_checkout_snapshots_survive_price_change() {
        let db = seeded_db().await;
        let carts = CartService::new(db.clone());
        let checkout = CheckoutService::new(db.clone());

        carts.add_item("buyer-1", "p1", 1).await.unwrap();
        let receipt = checkout.checkout("buyer-1").await.unwrap();
        assert_eq!(receipt.items[0].unit_price_cents, 500);
        assert_eq!(receipt.items[0].cost_cents, 300);

        // Later price change must not rewrite the stored snapshot.
        db.products().update_price("p1", 999).await.unwrap();
        let stored = db
            .orders()
            .items_for_order(&receipt.order.id)
            .await
            .unwrap();
        assert_eq!(stored[0].unit_price_cents, 500);
    }

    #[tokio::test]
    async fn test_customer_type_new_then_repeat() {
        let db = seeded_db().await;
        let carts = CartService::new(db.clone());
        let checkout = CheckoutService::new(db.clone());

        carts.add_item("buyer-1", "p1", 1).await.unwrap();
        let first = checkout.checkout("buyer-1").await.unwrap();
        assert_eq!(first.order.customer_type, CustomerType::New);

        carts.add_item("buyer-1", "p2", 1).await.unwrap();
        let second = checkout.checkout("buyer-1").await.unwrap();
        assert_eq!(second.order.customer_type, CustomerType::Repeat);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_and_missing_user() {
        let db = seeded_db().await;
        let checkout = CheckoutService::new(db);

        let err = checkout.checkout("buyer-1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);

        let err = checkout.checkout("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
