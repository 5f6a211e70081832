//! # Customer Segmentation
//!
//! Revenue splits over completed orders: first-time vs returning customers
//! (from the customer type stored at checkout) and geographic segments
//! (from the order owner's location).

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::ApiError;
use bazaar_core::analytics::{customer_sales, segment_revenue, CustomerSales};
use bazaar_db::Database;

/// Customer segmentation analysis.
#[derive(Debug, Clone)]
pub struct SegmentationService {
    db: Database,
}

impl SegmentationService {
    pub fn new(db: Database) -> Self {
        SegmentationService { db }
    }

    /// Revenue split by the customer type stored on each completed order.
    ///
    /// The new/repeat parts always sum to the total.
    pub async fn customer_sales(&self, user_id: &str) -> Result<CustomerSales, ApiError> {
        debug!(user_id = %user_id, "customer_sales");

        let rows = self.db.orders().revenue_by_customer_type(user_id).await?;
        Ok(customer_sales(&rows))
    }

    /// Revenue grouped by the order owner's location.
    ///
    /// Pass a user id for that customer's segments (a single segment in
    /// practice) or `None` to aggregate across every customer — the same
    /// grouping serves both shapes.
    pub async fn top_customer_segments(
        &self,
        user_id: Option<&str>,
    ) -> Result<BTreeMap<String, i64>, ApiError> {
        debug!(user_id = ?user_id, "top_customer_segments");

        let rows = self.db.orders().revenue_by_location(user_id).await?;
        Ok(segment_revenue(&rows))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
