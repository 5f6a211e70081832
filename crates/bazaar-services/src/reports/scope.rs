//! # Report Scoping
//!
//! One predicate for the seller-ownership / product filtering shared by
//! every sales report. Keeping it in a single type means the daily, range
//! and trend reports cannot drift apart in how they scope orders.
//!
//! ## Matching Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ReportScope                                      │
//! │                                                                         │
//! │  Admin:                                                                 │
//! │    order matches  ⇔ some item carries the filtered product             │
//! │                     (every order, if no product filter)                │
//! │    item counts    ⇔ always                                             │
//! │                                                                         │
//! │  Seller:                                                                │
//! │    order matches  ⇔ some SINGLE item is owned by the seller AND        │
//! │                     carries the filtered product (conjunctive —        │
//! │                     both conditions on the same item)                  │
//! │    item counts    ⇔ the item's product belongs to the seller           │
//! │                                                                         │
//! │  Seller with no products: nothing matches; reports short-circuit       │
//! │  to their zero value without scanning orders.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use bazaar_core::{Caller, CoreError, OrderItem, Role};

/// Order/item scoping for sales reports.
#[derive(Debug, Clone)]
pub enum ReportScope {
    /// Admin view: everything, optionally narrowed to one product.
    All { product_filter: Option<String> },

    /// Seller view: only orders touching the seller's products.
    Seller {
        product_filter: Option<String>,
        owned: HashSet<String>,
    },

    /// A seller who owns no products. Matches nothing.
    Empty,
}

impl ReportScope {
    /// Builds the scope for a caller.
    ///
    /// `owned_product_ids` must be the caller's product-id set when the
    /// caller is a seller (it is ignored for admins). Buyers and guests
    /// cannot request reports.
    pub fn for_caller(
        caller: &Caller,
        product_filter: Option<String>,
        owned_product_ids: Vec<String>,
    ) -> Result<ReportScope, CoreError> {
        match caller.role {
            Role::Admin => Ok(ReportScope::All { product_filter }),
            Role::Seller => {
                if owned_product_ids.is_empty() {
                    Ok(ReportScope::Empty)
                } else {
                    Ok(ReportScope::Seller {
                        product_filter,
                        owned: owned_product_ids.into_iter().collect(),
                    })
                }
            }
            Role::Buyer | Role::Guest => Err(CoreError::Forbidden {
                role: caller.role.as_str().to_string(),
                action: "generate sales reports".to_string(),
            }),
        }
    }

    /// True when no order can possibly match (zero-report short circuit).
    pub fn is_empty(&self) -> bool {
        matches!(self, ReportScope::Empty)
    }

    /// Whether an order belongs in the report, judged by its items.
    pub fn order_matches(&self, items: &[OrderItem]) -> bool {
        match self {
            ReportScope::All { product_filter } => match product_filter {
                Some(product_id) => items.iter().any(|item| &item.product_id == product_id),
                None => true,
            },
            ReportScope::Seller {
                product_filter,
                owned,
            } => items.iter().any(|item| {
                owned.contains(&item.product_id)
                    && product_filter
                        .as_ref()
                        .map_or(true, |product_id| &item.product_id == product_id)
            }),
            ReportScope::Empty => false,
        }
    }

    /// Whether an individual item of a matching order is accumulated.
    ///
    /// Sellers only count their own items; the product filter selects
    /// which orders are in view, not which of their items accumulate.
    pub fn item_counts(&self, item: &OrderItem) -> bool {
        match self {
            ReportScope::All { .. } => true,
            ReportScope::Seller { owned, .. } => owned.contains(&item.product_id),
            ReportScope::Empty => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(product_id: &str) -> OrderItem {
        OrderItem {
            id: format!("item-{}", product_id),
            order_id: "o1".to_string(),
            product_id: product_id.to_string(),
            quantity: 1,
            unit_price_cents: 100,
            cost_cents: 60,
            created_at: Utc::now(),
        }
    }

    fn seller_scope(filter: Option<&str>, owned: &[&str]) -> ReportScope {
        ReportScope::for_caller(
            &Caller::new("s1", Role::Seller),
            filter.map(String::from),
            owned.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_buyers_cannot_build_a_scope() {
        let err = ReportScope::for_caller(&Caller::new("b1", Role::Buyer), None, vec![]);
        assert!(matches!(err, Err(CoreError::Forbidden { .. })));
    }

    #[test]
    fn test_seller_without_products_is_empty() {
        let scope = seller_scope(None, &[]);
        assert!(scope.is_empty());
        assert!(!scope.order_matches(&[item("p1")]));
    }

    #[test]
    fn test_admin_matches_all_unless_filtered() {
        let scope = ReportScope::All {
            product_filter: None,
        };
        assert!(scope.order_matches(&[item("anything")]));

        let filtered = ReportScope::All {
            product_filter: Some("p2".to_string()),
        };
        assert!(!filtered.order_matches(&[item("p1")]));
        assert!(filtered.order_matches(&[item("p1"), item("p2")]));
        assert!(filtered.item_counts(&item("p1")));
    }

    #[test]
    fn test_seller_product_filter_is_conjunctive_on_one_item() {
        // Seller owns p1; filter asks for p2. An order holding p1 (owned,
        // wrong product) and p2 (right product, not owned) must NOT match:
        // no single item satisfies both conditions.
        let scope = seller_scope(Some("p2"), &["p1"]);
        assert!(!scope.order_matches(&[item("p1"), item("p2")]));

        // Owning the filtered product matches.
        let scope = seller_scope(Some("p1"), &["p1"]);
        assert!(scope.order_matches(&[item("p1"), item("p2")]));
    }

    #[test]
    fn test_seller_items_accumulate_only_when_owned() {
        let scope = seller_scope(None, &["p1"]);
        assert!(scope.order_matches(&[item("p1"), item("p9")]));
        assert!(scope.item_counts(&item("p1")));
        assert!(!scope.item_counts(&item("p9")));
    }
}
