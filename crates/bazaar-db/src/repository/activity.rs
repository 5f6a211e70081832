//! # Activity Log Repository
//!
//! Append-only record of user actions. The userActivity report reads the
//! most recent entries plus a total count.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::generate_id;
use bazaar_core::ActivityEntry;

/// Repository for activity log operations.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    /// Creates a new ActivityRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ActivityRepository { pool }
    }

    /// Records one user action.
    pub async fn record(&self, user_id: &str, action: &str) -> DbResult<()> {
        debug!(user_id = %user_id, action = %action, "Recording activity");

        sqlx::query(
            "INSERT INTO activity_logs (id, user_id, action, timestamp) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(generate_id())
        .bind(user_id)
        .bind(action)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The user's most recent actions, newest first.
    pub async fn recent(&self, user_id: &str, limit: i64) -> DbResult<Vec<ActivityEntry>> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            "SELECT id, user_id, action, timestamp FROM activity_logs \
             WHERE user_id = ?1 \
             ORDER BY timestamp DESC, id DESC \
             LIMIT ?2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Total number of recorded actions for a user.
    pub async fn count(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
