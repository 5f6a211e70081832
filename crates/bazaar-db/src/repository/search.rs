//! # Search Log Repository
//!
//! Append-only search logging plus the top-terms aggregation.
//!
//! ## Aggregation
//! `top_terms` is the SQL shape of "group by term, count, sort descending,
//! keep ten": the store does the grouping so the window can grow without
//! pulling every log row into memory.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::analytics::TermCount;
use bazaar_core::{Role, SearchEntry};

/// Repository for search log operations.
#[derive(Debug, Clone)]
pub struct SearchRepository {
    pool: SqlitePool,
}

impl SearchRepository {
    /// Creates a new SearchRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SearchRepository { pool }
    }

    /// Appends one search log entry.
    pub async fn log(&self, entry: &SearchEntry) -> DbResult<()> {
        debug!(term = %entry.term, role = entry.role.as_str(), "Logging search");

        sqlx::query(
            "INSERT INTO search_logs (id, term, user_id, role, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&entry.id)
        .bind(&entry.term)
        .bind(&entry.user_id)
        .bind(entry.role)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Top searched terms inside an inclusive window, optionally restricted
    /// to one role, most searched first. Ties break on the term itself so
    /// rankings are stable.
    pub async fn top_terms(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        role: Option<Role>,
        limit: i64,
    ) -> DbResult<Vec<TermCount>> {
        let terms = sqlx::query_as::<_, TermCount>(
            "SELECT term, COUNT(*) AS count FROM search_logs \
             WHERE timestamp >= ?1 AND timestamp <= ?2 \
               AND (?3 IS NULL OR role = ?3) \
             GROUP BY term \
             ORDER BY count DESC, term ASC \
             LIMIT ?4",
        )
        .bind(start)
        .bind(end)
        .bind(role)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(terms)
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
    use chrono::{Duration, TimeZone};

    fn entry(term: &str, role: Role, timestamp: DateTime<Utc>) -> SearchEntry {
        SearchEntry {
            id: generate_id(),
            term: term.to_string(),
            user_id: None,
            role,
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_top_terms_ranks_counts_and_limits() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let base = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();

        for _ in 0..3 {
            db.searches()
                .log(&entry("stout", Role::Buyer, base))
                .await
                .unwrap();
        }
        for _ in 0..2 {
            db.searches()
                .log(&entry("rye", Role::Buyer, base))
                .await
                .unwrap();
        }
        db.searches()
            .log(&entry("candle", Role::Guest, base))
            .await
            .unwrap();
        // Outside the window; never counted.
        db.searches()
            .log(&entry("stout", Role::Buyer, base + Duration::days(40)))
            .await
            .unwrap();

        let start = base - Duration::days(1);
        let end = base + Duration::days(1);

        let top = db.searches().top_terms(start, end, None, 2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].term, "stout");
        assert_eq!(top[0].count, 3);
        assert_eq!(top[1].term, "rye");

        let guests = db
            .searches()
            .top_terms(start, end, Some(Role::Guest), 10)
            .await
            .unwrap();
        assert_eq!(guests.len(), 1);
        assert_eq!(guests[0].term, "candle");
    }
}
