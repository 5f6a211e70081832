//! # bazaar-services: Service Layer for Bazaar
//!
//! The orchestration layer of the Bazaar commerce backend. Each service
//! receives already-authenticated caller identity and validated input
//! from the host HTTP layer, talks to `bazaar-db`, and folds rows through
//! the pure logic in `bazaar-core`.
//!
//! ## Service Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        bazaar-services                                  │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────────────┐  │
//! │  │ CartService  │  │ CheckoutService  │  │ SearchService            │  │
//! │  │ add/remove/  │  │ cart → order     │  │ name search + query log  │  │
//! │  │ get, stock   │  │ snapshots, new/  │  │                          │  │
//! │  │ capping      │  │ repeat, commit   │  │                          │  │
//! │  └──────────────┘  └──────────────────┘  └──────────────────────────┘  │
//! │                                                                         │
//! │  ┌──────────────────────────────────────┐  ┌──────────────────────┐    │
//! │  │ reports::*                           │  │ ReportScheduler      │    │
//! │  │ daily / range / trend / growth       │  │ due-subscription     │    │
//! │  │ profitability • segmentation         │  │ polling + email      │    │
//! │  │ export (csv / xlsx / pdf)            │  │ (Mailer + Clock      │    │
//! │  │ subscription bodies                  │  │  injected)           │    │
//! │  └──────────────────────────────────────┘  └──────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod reports;
pub mod scheduler;
pub mod search;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{AddItemOutcome, CartService};
pub use checkout::{CheckoutReceipt, CheckoutService};
pub use config::{MailConfig, SchedulerConfig};
pub use error::{ApiError, ErrorCode};
pub use reports::export::{render_total_report, ExportFormat, ReportArtifact};
pub use reports::generate::ReportGenerator;
pub use reports::profitability::ProfitabilityService;
pub use reports::sales::SalesReportService;
pub use reports::segments::SegmentationService;
pub use scheduler::mailer::{Mailer, RecordingMailer, SmtpMailer};
pub use scheduler::{Clock, ReportScheduler, SystemClock};
pub use search::SearchService;
