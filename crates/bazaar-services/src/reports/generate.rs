//! # Subscription Report Bodies
//!
//! Builds the per-user report delivered by the scheduled dispatcher:
//! sales totals for the subscriber's orders, an inventory summary of the
//! subscriber's products, or their recent activity.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use bazaar_core::analytics::{ProductSales, SalesSummary};
use bazaar_core::{ReportType, LOW_STOCK_THRESHOLD, TOP_RESULTS_LIMIT};
use bazaar_db::Database;

/// Sales body: totals over the subscriber's completed orders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSalesReport {
    pub total_revenue_cents: i64,
    pub total_products_sold: i64,
    pub product_breakdown: HashMap<String, ProductSales>,
}

/// One inventory line of the subscriber's catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLine {
    pub name: String,
    pub quantity: i64,
    pub low_stock: bool,
}

/// Inventory body: the subscriber's products with low-stock flags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub total_products: usize,
    pub inventory_summary: Vec<InventoryLine>,
}

/// One recent action of the subscriber.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLine {
    pub action: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Activity body: total count plus the latest actions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    pub total_activities: i64,
    pub recent_activities: Vec<ActivityLine>,
}

/// The generated body, serialized into the delivery email.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportBody {
    Sales(UserSalesReport),
    Inventory(InventoryReport),
    UserActivity(ActivityReport),
}

/// Builds report bodies for subscriptions.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    db: Database,
}

impl ReportGenerator {
    pub fn new(db: Database) -> Self {
        ReportGenerator { db }
    }

    /// Generates the body for one subscription.
    pub async fn generate(
        &self,
        user_id: &str,
        report_type: ReportType,
    ) -> Result<ReportBody, ApiError> {
        debug!(user_id = %user_id, report_type = report_type.as_str(), "Generating report body");

        match report_type {
            ReportType::Sales => Ok(ReportBody::Sales(self.sales_body(user_id).await?)),
            ReportType::Inventory => Ok(ReportBody::Inventory(self.inventory_body(user_id).await?)),
            ReportType::UserActivity => {
                Ok(ReportBody::UserActivity(self.activity_body(user_id).await?))
            }
        }
    }

    async fn sales_body(&self, user_id: &str) -> Result<UserSalesReport, ApiError> {
        let orders = self.db.orders().completed_with_items_for_user(user_id).await?;

        let mut summary = SalesSummary::new();
        let mut names: HashMap<String, String> = HashMap::new();

        for (_, items) in &orders {
            for item in items {
                let name = match names.get(&item.product_id) {
                    Some(name) => name.clone(),
                    None => {
                        let name = self
                            .db
                            .products()
                            .get_by_id(&item.product_id)
                            .await?
                            .map(|p| p.name)
                            .unwrap_or_else(|| "Unknown Product".to_string());
                        names.insert(item.product_id.clone(), name.clone());
                        name
                    }
                };
                summary.record(&item.product_id, &name, item.quantity, item.unit_price_cents);
            }
        }

        Ok(UserSalesReport {
            total_revenue_cents: summary.total_revenue_cents,
            total_products_sold: summary.total_products_sold,
            product_breakdown: summary.product_breakdown,
        })
    }

    async fn inventory_body(&self, user_id: &str) -> Result<InventoryReport, ApiError> {
        let products = self.db.products().list_by_seller(user_id).await?;

        let inventory_summary: Vec<InventoryLine> = products
            .iter()
            .map(|product| InventoryLine {
                name: product.name.clone(),
                quantity: product.quantity,
                low_stock: product.quantity < LOW_STOCK_THRESHOLD,
            })
            .collect();

        Ok(InventoryReport {
            total_products: products.len(),
            inventory_summary,
        })
    }

    async fn activity_body(&self, user_id: &str) -> Result<ActivityReport, ApiError> {
        let total_activities = self.db.activity().count(user_id).await?;
        let recent = self
            .db
            .activity()
            .recent(user_id, TOP_RESULTS_LIMIT as i64)
            .await?;

        Ok(ActivityReport {
            total_activities,
            recent_activities: recent
                .into_iter()
                .map(|entry| ActivityLine {
                    action: entry.action,
                    timestamp: entry.timestamp,
                })
                .collect(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
