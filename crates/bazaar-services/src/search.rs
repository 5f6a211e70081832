//! # Search Service
//!
//! Product search with append-only query logging. Every executed search is
//! logged — before the lookup, with the caller's role (or "guest") — so
//! the top-terms report sees misses as well as hits. A failed log write is
//! reported via `warn!` and never fails the search itself.

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use bazaar_core::validation::validate_search_query;
use bazaar_core::{Caller, Product, Role, SearchEntry};
use bazaar_db::Database;

/// How many products a search returns at most.
const SEARCH_RESULT_LIMIT: i64 = 50;

/// Product search with query logging.
#[derive(Debug, Clone)]
pub struct SearchService {
    db: Database,
}

impl SearchService {
    pub fn new(db: Database) -> Self {
        SearchService { db }
    }

    /// Searches products by name. `caller` is None for anonymous traffic,
    /// which logs under the "guest" role.
    pub async fn search_products(
        &self,
        query: &str,
        caller: Option<&Caller>,
    ) -> Result<Vec<Product>, ApiError> {
        let term = validate_search_query(query)?;

        debug!(term = %term, "search_products");

        let entry = SearchEntry {
            id: Uuid::new_v4().to_string(),
            term: term.clone(),
            user_id: caller.map(|c| c.id.clone()),
            role: caller.map(|c| c.role).unwrap_or(Role::Guest),
            timestamp: Utc::now(),
        };
        if let Err(e) = self.db.searches().log(&entry).await {
            warn!(term = %term, error = %e, "Failed to log search");
        }

        Ok(self
            .db
            .products()
            .search_by_name(&term, SEARCH_RESULT_LIMIT)
            .await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{Category, User};
    use bazaar_db::DbConfig;
    use chrono::Duration;

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        db.users()
            .insert(&User {
                id: "seller-1".to_string(),
                username: "seller-1".to_string(),
                email: "seller-1@example.com".to_string(),
                location: "Lahore".to_string(),
                role: Role::Seller,
                created_at: now,
            })
            .await
            .unwrap();

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
    async fn test_search_logs_even_when_nothing_matches() {
        let db = seeded_db().await;
        let search = SearchService::new(db.clone());

        let hits = search.search_products("rye", None).await.unwrap();
        assert_eq!(hits.len(), 1);

        let misses = search.search_products("unobtainium", None).await.unwrap();
        assert!(misses.is_empty());

        let start = Utc::now() - Duration::hours(1);
        let end = Utc::now() + Duration::hours(1);
        let terms = db.searches().top_terms(start, end, None, 10).await.unwrap();
        let logged: Vec<&str> = terms.iter().map(|t| t.term.as_str()).collect();
        assert!(logged.contains(&"rye"));
        assert!(logged.contains(&"unobtainium"));
    }

    #[tokio::test]
    async fn test_search_records_caller_role_or_guest() {
        let db = seeded_db().await;
        let search = SearchService::new(db.clone());

        let caller = Caller::new("seller-1", Role::Seller);
        search.search_products("rye", Some(&caller)).await.unwrap();
        search.search_products("rye", None).await.unwrap();

        let start = Utc::now() - Duration::hours(1);
        let end = Utc::now() + Duration::hours(1);

        let sellers = db
            .searches()
            .top_terms(start, end, Some(Role::Seller), 10)
            .await
            .unwrap();
        assert_eq!(sellers.len(), 1);
        assert_eq!(sellers[0].count, 1);

        let guests = db
            .searches()
            .top_terms(start, end, Some(Role::Guest), 10)
            .await
            .unwrap();
        assert_eq!(guests.len(), 1);
    }
}
