//! # Scheduled Report Repository
//!
//! Subscription rows polled by the report dispatcher.
//!
//! ## Dispatch Contract
//! `due(now)` returns active subscriptions whose `next_run` has passed;
//! `mark_dispatched` advances a subscription only after a successful
//! delivery. A subscription that keeps failing therefore stays due and is
//! retried on the next tick.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::ScheduledReport;

const SCHEDULE_COLUMNS: &str =
    "id, user_id, frequency, report_type, email, last_sent, next_run, is_active";

/// Repository for scheduled report subscriptions.
#[derive(Debug, Clone)]
pub struct ScheduleRepository {
    pool: SqlitePool,
}

impl ScheduleRepository {
    /// Creates a new ScheduleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ScheduleRepository { pool }
    }

    /// Inserts a new subscription.
    pub async fn insert(&self, report: &ScheduledReport) -> DbResult<()> {
        debug!(id = %report.id, user_id = %report.user_id, "Inserting scheduled report");

        sqlx::query(
            "INSERT INTO scheduled_reports ( \
                id, user_id, frequency, report_type, email, last_sent, next_run, is_active \
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&report.id)
        .bind(&report.user_id)
        .bind(report.frequency)
        .bind(report.report_type)
        .bind(&report.email)
        .bind(report.last_sent)
        .bind(report.next_run)
        .bind(report.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a subscription by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ScheduledReport>> {
        let sql = format!(
            "SELECT {} FROM scheduled_reports WHERE id = ?1",
            SCHEDULE_COLUMNS
        );
        let report = sqlx::query_as::<_, ScheduledReport>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(report)
    }

    /// Active subscriptions whose next run time has passed.
    pub async fn due(&self, now: DateTime<Utc>) -> DbResult<Vec<ScheduledReport>> {
        let sql = format!(
            "SELECT {} FROM scheduled_reports \
             WHERE is_active = 1 AND next_run <= ?1 \
             ORDER BY next_run, id",
            SCHEDULE_COLUMNS
        );
        let due = sqlx::query_as::<_, ScheduledReport>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        Ok(due)
    }

    /// Records a successful delivery: sets `last_sent` and the advanced
    /// `next_run`.
    pub async fn mark_dispatched(
        &self,
        id: &str,
        last_sent: DateTime<Utc>,
        next_run: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE scheduled_reports SET last_sent = ?2, next_run = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(last_sent)
        .bind(next_run)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Scheduled report", id));
        }

        Ok(())
    }

    /// Enables or disables a subscription.
    pub async fn set_active(&self, id: &str, is_active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE scheduled_reports SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Scheduled report", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
