//! # Service Configuration
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, mirroring how the host process is deployed.

use std::env;
use std::time::Duration;

/// SMTP delivery configuration for the report dispatcher.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP relay host
    pub smtp_host: String,

    /// SMTP relay port
    pub smtp_port: u16,

    /// SMTP username
    pub smtp_username: String,

    /// SMTP password
    pub smtp_password: String,

    /// From address on outgoing reports
    pub from_address: String,
}

impl MailConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(MailConfig {
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),

            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SMTP_PORT".to_string()))?,

            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),

            // In production this MUST come from the environment; the
            // default only keeps local development from failing fast.
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),

            from_address: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "reports@bazaar.local".to_string()),
        })
    }
}

/// Report dispatcher configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often the dispatcher polls for due subscriptions.
    /// Production default: hourly. Tests use much shorter intervals.
    pub poll_interval: Duration,
}

impl SchedulerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let secs: u64 = env::var("REPORT_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("REPORT_POLL_INTERVAL_SECS".to_string()))?;

        Ok(SchedulerConfig {
            poll_interval: Duration::from_secs(secs),
        })
    }

    /// Overrides the poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            poll_interval: Duration::from_secs(3600),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
