//! # Scheduled Report Dispatcher
//!
//! Polls report subscriptions and emails each due report.
//!
//! ## Dispatcher Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ReportScheduler                                    │
//! │                                                                         │
//! │  start() ──► background task                                           │
//! │                  │                                                      │
//! │                  ▼ every poll_interval (missed ticks are skipped,      │
//! │                    so passes never overlap or burst)                   │
//! │              due = scheduled_reports WHERE is_active AND next_run<=now │
//! │                  │                                                      │
//! │                  ▼ for each subscription                               │
//! │              generate body ──► email ──► advance next_run, last_sent   │
//! │                  │                                                      │
//! │                  └── one failure: warn! and continue with the rest     │
//! │                                                                         │
//! │  stop() ──► shutdown channel ──► task exits                            │
//! │                                                                         │
//! │  INJECTED SEAMS:                                                       │
//! │  • Mailer — SMTP in production, a recording fake in tests              │
//! │  • Clock  — wall clock in production, a manual clock in tests          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A subscription is advanced only after a successful delivery, so a
//! failing one stays due and is retried on the next pass.

pub mod mailer;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::SchedulerConfig;
use crate::error::ApiError;
use crate::reports::generate::ReportGenerator;
use crate::scheduler::mailer::{EmailMessage, Mailer};
use bazaar_core::dates::next_run_after;
use bazaar_core::ScheduledReport;
use bazaar_db::Database;

// =============================================================================
// Clock
// =============================================================================

/// Time source seam, injected so tests can pin "now".
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Periodic report dispatcher with `start()`/`stop()` lifecycle.
pub struct ReportScheduler<M: Mailer, C: Clock = SystemClock> {
    db: Database,
    generator: ReportGenerator,
    mailer: Arc<M>,
    clock: Arc<C>,
    config: SchedulerConfig,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl<M: Mailer> ReportScheduler<M, SystemClock> {
    /// Creates a dispatcher on the wall clock.
    pub fn new(db: Database, mailer: M, config: SchedulerConfig) -> Self {
        Self::with_clock(db, mailer, SystemClock, config)
    }
}

impl<M: Mailer, C: Clock> ReportScheduler<M, C> {
    /// Creates a dispatcher with an explicit clock.
    pub fn with_clock(db: Database, mailer: M, clock: C, config: SchedulerConfig) -> Self {
        let generator = ReportGenerator::new(db.clone());
        ReportScheduler {
            db,
            generator,
            mailer: Arc::new(mailer),
            clock: Arc::new(clock),
            config,
            shutdown_tx: None,
        }
    }

    /// Starts the polling loop as a background task.
    ///
    /// The first pass runs immediately; after that, one pass per poll
    /// interval. Passes are serialized by the loop itself and missed
    /// ticks are skipped, so a slow pass never causes overlap or a
    /// catch-up burst.
    pub fn start(&mut self) {
        if self.shutdown_tx.is_some() {
            warn!("Report dispatcher already running");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        let db = self.db.clone();
        let generator = self.generator.clone();
        let mailer = self.mailer.clone();
        let clock = self.clock.clone();
        let poll_interval = self.config.poll_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(
                interval_secs = poll_interval.as_secs(),
                "Report dispatcher started"
            );

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let delivered =
                            Self::dispatch_due(&db, &generator, &mailer, &clock).await;
                        if delivered > 0 {
                            info!(delivered, "Dispatched scheduled reports");
                        }
                    }

                    _ = shutdown_rx.recv() => {
                        info!("Report dispatcher received shutdown");
                        break;
                    }
                }
            }

            info!("Report dispatcher stopped");
        });
    }

    /// Signals the background task to stop.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
    }

    /// Runs one dispatch pass inline (the same pass the loop runs).
    /// Returns how many subscriptions were delivered.
    pub async fn run_once(&self) -> usize {
        Self::dispatch_due(&self.db, &self.generator, &self.mailer, &self.clock).await
    }

    /// One polling pass: deliver everything due, isolating per-report
    /// failures.
    async fn dispatch_due(
        db: &Database,
        generator: &ReportGenerator,
        mailer: &Arc<M>,
        clock: &Arc<C>,
    ) -> usize {
        let now = clock.now();

        let due = match db.schedules().due(now).await {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "Failed to poll due report subscriptions");
                return 0;
            }
        };

        if due.is_empty() {
            return 0;
        }
        debug!(count = due.len(), "Processing due report subscriptions");

        let mut delivered = 0;
        for report in due {
            match Self::deliver(db, generator, mailer, clock, &report).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    // One broken subscription must not block the rest.
                    warn!(
                        report_id = %report.id,
                        email = %report.email,
                        error = %e,
                        "Failed to deliver scheduled report, continuing"
                    );
                }
            }
        }

        delivered
    }

    /// Generates, emails and reschedules a single subscription.
    async fn deliver(
        db: &Database,
        generator: &ReportGenerator,
        mailer: &Arc<M>,
        clock: &Arc<C>,
        report: &ScheduledReport,
    ) -> Result<(), ApiError> {
        let body = generator.generate(&report.user_id, report.report_type).await?;
        let json = serde_json::to_string_pretty(&body)
            .map_err(|e| ApiError::internal(format!("Failed to encode report body: {}", e)))?;

        let message = EmailMessage {
            to: report.email.clone(),
            subject: format!("Scheduled {} Report", report.report_type.as_str()),
            text: format!(
                "Here is your {} {} report.",
                report.frequency.as_str(),
                report.report_type.as_str()
            ),
            html: format!("<pre>{}</pre>", json),
        };
        mailer
            .send(message)
            .await
            .map_err(|e| ApiError::internal(format!("Mail delivery failed: {}", e)))?;

        // Only a delivered report is rescheduled.
        let now = clock.now();
        db.schedules()
            .mark_dispatched(&report.id, now, next_run_after(now, report.frequency))
            .await?;

        info!(report_id = %report.id, to = %report.email, "Scheduled report delivered");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
