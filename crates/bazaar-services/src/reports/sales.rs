//! # Sales Reports
//!
//! The time-windowed, role-scoped sales aggregation pipeline: daily
//! report, arbitrary-range report (with rankings), monthly trends and
//! period-over-period growth.
//!
//! ## Shared Shape
//! Every report follows the same steps:
//! 1. Validate dates and build a UTC window
//! 2. Build the caller's [`ReportScope`] (zero-report short circuit for
//!    sellers without products)
//! 3. Scan completed orders in the window with their items
//! 4. Fold in-scope items through the pure accumulators in bazaar-core

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::reports::export::{render_total_report, ExportFormat, ReportArtifact};
use crate::reports::scope::ReportScope;
use bazaar_core::analytics::{
    growth_percent, record_by_name, top_selling, MonthTrend, NameSalesMap, ProductSales,
    SalesSummary, TermCount, TopProduct, TrendAccumulator,
};
use bazaar_core::dates::{
    day_window, half_open_window, month_of, month_window, parse_month, parse_report_date,
    parse_year, range_window, year_window,
};
use bazaar_core::{Caller, CoreError, Role, TOP_RESULTS_LIMIT};
use bazaar_db::Database;

/// Fallback name for items whose product row no longer resolves.
const UNKNOWN_PRODUCT: &str = "Unknown Product";

// =============================================================================
// Report DTOs
// =============================================================================

/// One day of completed sales.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySalesReport {
    pub date: String,
    pub total_products_sold: i64,
    pub total_revenue_cents: i64,
    /// Keyed by product id.
    pub product_breakdown: HashMap<String, ProductSales>,
}

/// Sales over an arbitrary inclusive day range, with rankings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalSalesReport {
    /// "{start} to {end}".
    pub period: String,
    pub total_revenue_cents: i64,
    pub total_products_sold: i64,
    /// Keyed by product name.
    pub product_breakdown: NameSalesMap,
    pub top_selling_products: Vec<TopProduct>,
    pub top_searched_products: Vec<TermCount>,
}

/// Month-by-month revenue and quantities for a year or a single month.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    pub monthly_trends: Vec<MonthTrend>,
}

/// Two-window revenue comparison.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthReport {
    pub current_total_cents: i64,
    pub compare_total_cents: i64,
    /// Formatted percentage, e.g. "25.00%".
    pub growth: String,
}

// =============================================================================
// Service
// =============================================================================

/// Sales report generation.
#[derive(Debug, Clone)]
pub struct SalesReportService {
    db: Database,
}

impl SalesReportService {
    pub fn new(db: Database) -> Self {
        SalesReportService { db }
    }

    /// Builds the caller's scope, fetching the seller's ownership set when
    /// needed.
    async fn scope_for(
        &self,
        caller: &Caller,
        product_filter: Option<&str>,
    ) -> Result<ReportScope, ApiError> {
        let owned = if caller.role == Role::Seller {
            self.db.products().seller_product_ids(&caller.id).await?
        } else {
            Vec::new()
        };

        Ok(ReportScope::for_caller(
            caller,
            product_filter.map(String::from),
            owned,
        )?)
    }

    /// Resolves a product name, caching lookups for the duration of one
    /// report scan.
    async fn product_name(
        &self,
        cache: &mut HashMap<String, String>,
        product_id: &str,
    ) -> Result<String, ApiError> {
        if let Some(name) = cache.get(product_id) {
            return Ok(name.clone());
        }

        let name = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string());
        cache.insert(product_id.to_string(), name.clone());
        Ok(name)
    }

    /// Completed sales for one UTC day, optionally narrowed to a product.
    ///
    /// A day with no matching orders produces the all-zero report rather
    /// than an error.
    pub async fn daily_report(
        &self,
        date: &str,
        product_id: Option<&str>,
        caller: &Caller,
    ) -> Result<DailySalesReport, ApiError> {
        let day = parse_report_date(date)?;
        let scope = self.scope_for(caller, product_id).await?;

        let mut summary = SalesSummary::new();

        if !scope.is_empty() {
            let (start, end) = day_window(day);
            debug!(date = %date, "daily report window");

            let orders = self
                .db
                .orders()
                .completed_with_items_between(start, end)
                .await?;

            let mut names = HashMap::new();
            for (_, items) in &orders {
                if !scope.order_matches(items) {
                    continue;
                }
                for item in items {
                    if !scope.item_counts(item) {
                        continue;
                    }
                    let name = self.product_name(&mut names, &item.product_id).await?;
                    summary.record(&item.product_id, &name, item.quantity, item.unit_price_cents);
                }
            }
        }

        Ok(DailySalesReport {
            date: date.to_string(),
            total_products_sold: summary.total_products_sold,
            total_revenue_cents: summary.total_revenue_cents,
            product_breakdown: summary.product_breakdown,
        })
    }

    /// Sales over an inclusive day range, with top-ten rankings.
    ///
    /// A range in which no order matches the scope reports "no sales found
    /// for this period" — except for a seller with no products, who gets
    /// the zero report without orders ever being scanned.
    pub async fn total_report(
        &self,
        start_date: &str,
        end_date: &str,
        product_id: Option<&str>,
        caller: &Caller,
    ) -> Result<TotalSalesReport, ApiError> {
        let start_day = parse_report_date(start_date)?;
        let end_day = parse_report_date(end_date)?;
        let (start, end) = range_window(start_day, end_day)?;
        let period = format!("{} to {}", start_date, end_date);

        let scope = self.scope_for(caller, product_id).await?;
        if scope.is_empty() {
            return Ok(TotalSalesReport {
                period,
                total_revenue_cents: 0,
                total_products_sold: 0,
                product_breakdown: NameSalesMap::new(),
                top_selling_products: Vec::new(),
                top_searched_products: Vec::new(),
            });
        }

        let orders = self
            .db
            .orders()
            .completed_with_items_between(start, end)
            .await?;

        let mut total_revenue_cents = 0;
        let mut total_products_sold = 0;
        let mut breakdown = NameSalesMap::new();
        let mut names = HashMap::new();
        let mut matched_any = false;

        for (_, items) in &orders {
            if !scope.order_matches(items) {
                continue;
            }
            matched_any = true;
            for item in items {
                if !scope.item_counts(item) {
                    continue;
                }
                total_revenue_cents += item.revenue_cents();
                total_products_sold += item.quantity;

                let name = self.product_name(&mut names, &item.product_id).await?;
                record_by_name(&mut breakdown, &name, item.quantity, item.unit_price_cents);
            }
        }

        if !matched_any {
            return Err(CoreError::NoSalesInPeriod.into());
        }

        let top_selling_products = top_selling(&breakdown, TOP_RESULTS_LIMIT);

        // Sellers see only searches made under their role; admins see all.
        let role_filter = (caller.role == Role::Seller).then_some(Role::Seller);
        let top_searched_products = self
            .db
            .searches()
            .top_terms(start, end, role_filter, TOP_RESULTS_LIMIT as i64)
            .await?;

        Ok(TotalSalesReport {
            period,
            total_revenue_cents,
            total_products_sold,
            product_breakdown: breakdown,
            top_selling_products,
            top_searched_products,
        })
    }

    /// The range report rendered as a downloadable artifact instead of
    /// JSON — the same computation, re-encoded.
    pub async fn total_report_export(
        &self,
        start_date: &str,
        end_date: &str,
        product_id: Option<&str>,
        caller: &Caller,
        format: ExportFormat,
    ) -> Result<ReportArtifact, ApiError> {
        let report = self
            .total_report(start_date, end_date, product_id, caller)
            .await?;
        render_total_report(&report, format)
    }

    /// Month-by-month sales for a year, or a single month of it.
    pub async fn trend_report(
        &self,
        year: &str,
        month: Option<&str>,
        product_id: Option<&str>,
        caller: &Caller,
    ) -> Result<TrendReport, ApiError> {
        let year = parse_year(year)?;
        let month = month.map(parse_month).transpose()?;

        let (start, end) = match month {
            Some(m) => month_window(year, m)?,
            None => year_window(year)?,
        };

        let scope = self.scope_for(caller, product_id).await?;

        let mut trends = TrendAccumulator::new();

        if !scope.is_empty() {
            let orders = self
                .db
                .orders()
                .completed_with_items_between(start, end)
                .await?;

            let mut names = HashMap::new();
            for (order, items) in &orders {
                if !scope.order_matches(items) {
                    continue;
                }
                let (month_number, label) = month_of(order.created_at);
                for item in items {
                    if !scope.item_counts(item) {
                        continue;
                    }
                    let name = self.product_name(&mut names, &item.product_id).await?;
                    trends.record(
                        month_number,
                        &label,
                        &name,
                        item.quantity,
                        item.unit_price_cents,
                    );
                }
            }
        }

        Ok(TrendReport {
            year,
            month,
            monthly_trends: trends.into_months(),
        })
    }

    /// Compares completed-order revenue between two half-open windows.
    pub async fn growth_report(
        &self,
        start_date: &str,
        end_date: &str,
        compare_start_date: &str,
        compare_end_date: &str,
    ) -> Result<GrowthReport, ApiError> {
        let (start, end) = half_open_window(
            parse_report_date(start_date)?,
            parse_report_date(end_date)?,
        )?;
        let (compare_start, compare_end) = half_open_window(
            parse_report_date(compare_start_date)?,
            parse_report_date(compare_end_date)?,
        )?;

        let current_total_cents = self.db.orders().sum_completed_half_open(start, end).await?;
        let compare_total_cents = self
            .db
            .orders()
            .sum_completed_half_open(compare_start, compare_end)
            .await?;

        Ok(GrowthReport {
            current_total_cents,
            compare_total_cents,
            growth: growth_percent(current_total_cents, compare_total_cents),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use bazaar_core::{
        Category, CustomerType, Order, OrderItem, OrderStatus, Product, Role, User,
    };
    use bazaar_db::{generate_id, DbConfig};
    use chrono::{DateTime, TimeZone, Utc};

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        let users = [
            ("admin-1", Role::Admin),
            ("seller-1", Role::Seller),
            ("seller-empty", Role::Seller),
            ("buyer-1", Role::Buyer),
        ];
        for (id, role) in users {
            db.users()
                .insert(&User {
                    id: id.to_string(),
                    username: id.to_string(),
                    email: format!("{}@example.com", id),
                    location: "Lahore".to_string(),
                    role,
                    created_at: now,
                })
                .await
                .unwrap();
        }

        // seller-1 owns p1; buyer-1 (as a second seller stand-in would) —
        // p2 belongs to another catalog owner entirely.
        for (id, name, price, seller) in [
            ("p1", "Rye Loaf", 500i64, "seller-1"),
            ("p2", "Stout", 800, "admin-1"),
        ] {
            db.products()
                .insert(&Product {
                    id: id.to_string(),
                    name: name.to_string(),
                    description: None,
                    price_cents: price,
                    cost_price_cents: price * 60 / 100,
                    category: Category::Grocery,
                    quantity: 50,
                    seller_id: seller.to_string(),
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        db
    }

    async fn place_order(
        db: &Database,
        created_at: DateTime<Utc>,
        lines: &[(&str, i64, i64)], // (product_id, quantity, unit_price)
    ) {
        let order_id = generate_id();
        let total = lines.iter().map(|(_, q, p)| q * p).sum();
        let order = Order {
            id: order_id.clone(),
            user_id: "buyer-1".to_string(),
            total_cents: total,
            status: OrderStatus::Completed,
            customer_type: CustomerType::New,
            created_at,
            updated_at: created_at,
        };
        let items: Vec<OrderItem> = lines
            .iter()
            .map(|(pid, quantity, price)| OrderItem {
                id: generate_id(),
                order_id: order_id.clone(),
                product_id: (*pid).to_string(),
                quantity: *quantity,
                unit_price_cents: *price,
                cost_cents: price * 60 / 100 * quantity,
                created_at,
            })
            .collect();
        db.orders().commit_checkout(&order, &items).await.unwrap();
    }

    fn admin() -> Caller {
        Caller::new("admin-1", Role::Admin)
    }

    #[tokio::test]
    async fn test_daily_report_zero_when_no_orders() {
        let db = seeded_db().await;
        let reports = SalesReportService::new(db);

        let report = reports
            .daily_report("2024-03-15", None, &admin())
            .await
            .unwrap();
        assert_eq!(report.total_products_sold, 0);
        assert_eq!(report.total_revenue_cents, 0);
        assert!(report.product_breakdown.is_empty());
    }

    #[tokio::test]
    async fn test_daily_report_accumulates_in_window_only() {
        let db = seeded_db().await;

        let in_window = Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 1).unwrap();
        place_order(&db, in_window, &[("p1", 2, 500), ("p2", 1, 800)]).await;
        place_order(&db, next_day, &[("p1", 9, 500)]).await;

        let reports = SalesReportService::new(db);
        let report = reports
            .daily_report("2024-03-15", None, &admin())
            .await
            .unwrap();

        assert_eq!(report.total_products_sold, 3);
        assert_eq!(report.total_revenue_cents, 2 * 500 + 800);
        assert_eq!(report.product_breakdown["p1"].name, "Rye Loaf");
        assert_eq!(report.product_breakdown["p1"].quantity_sold, 2);
    }

    #[tokio::test]
    async fn test_daily_report_invalid_date_and_role() {
        let db = seeded_db().await;
        let reports = SalesReportService::new(db);

        let err = reports
            .daily_report("2024-3-15", None, &admin())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let buyer = Caller::new("buyer-1", Role::Buyer);
        let err = reports
            .daily_report("2024-03-15", None, &buyer)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_seller_scoping_counts_only_owned_items() {
        let db = seeded_db().await;
        let when = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        // Mixed order: rye (seller-1's) and stout (someone else's).
        place_order(&db, when, &[("p1", 2, 500), ("p2", 4, 800)]).await;

        let reports = SalesReportService::new(db);
        let seller = Caller::new("seller-1", Role::Seller);
        let report = reports
            .daily_report("2024-03-15", None, &seller)
            .await
            .unwrap();

        // The order matches (it touches p1), but only p1 accumulates.
        assert_eq!(report.total_products_sold, 2);
        assert_eq!(report.total_revenue_cents, 1000);
        assert!(!report.product_breakdown.contains_key("p2"));
    }

    #[tokio::test]
    async fn test_total_report_short_circuits_for_productless_seller() {
        let db = seeded_db().await;
        let when = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        place_order(&db, when, &[("p1", 2, 500)]).await;

        let reports = SalesReportService::new(db);
        let seller = Caller::new("seller-empty", Role::Seller);
        let report = reports
            .total_report("2024-03-01", "2024-03-31", None, &seller)
            .await
            .unwrap();

        assert_eq!(report.total_revenue_cents, 0);
        assert_eq!(report.total_products_sold, 0);
        assert!(report.product_breakdown.is_empty());
        assert!(report.top_selling_products.is_empty());
        assert!(report.top_searched_products.is_empty());
    }

    #[tokio::test]
    async fn test_total_report_rankings_and_period() {
        let db = seeded_db().await;
        let when = Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap();
        place_order(&db, when, &[("p1", 5, 500)]).await;
        place_order(&db, when, &[("p2", 2, 800)]).await;

        let reports = SalesReportService::new(db);
        let report = reports
            .total_report("2024-03-01", "2024-03-31", None, &admin())
            .await
            .unwrap();

        assert_eq!(report.period, "2024-03-01 to 2024-03-31");
        assert_eq!(report.total_products_sold, 7);
        assert_eq!(report.top_selling_products[0].name, "Rye Loaf");
        assert_eq!(report.product_breakdown["Stout"].revenue_cents, 1600);
    }

    #[tokio::test]
    async fn test_total_report_without_sales_is_not_found() {
        let db = seeded_db().await;
        let reports = SalesReportService::new(db);

        let err = reports
            .total_report("2024-03-01", "2024-03-31", None, &admin())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        // Reversed range is a validation failure, not an empty report.
        let err = reports
            .total_report("2024-03-31", "2024-03-01", None, &admin())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_total_report_export_renders_csv() {
        let db = seeded_db().await;
        let when = Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap();
        place_order(&db, when, &[("p1", 5, 500)]).await;

        let reports = SalesReportService::new(db);
        let artifact = reports
            .total_report_export(
                "2024-03-01",
                "2024-03-31",
                None,
                &admin(),
                ExportFormat::Csv,
            )
            .await
            .unwrap();

        assert_eq!(artifact.content_type, "text/csv");
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert!(text.contains("2024-03-01 to 2024-03-31"));
        assert!(text.contains("25.00")); // 5 × $5.00
    }

    #[tokio::test]
    async fn test_trend_report_groups_by_month() {
        let db = seeded_db().await;
        place_order(
            &db,
            Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap(),
            &[("p1", 2, 500)],
        )
        .await;
        place_order(
            &db,
            Utc.with_ymd_and_hms(2024, 11, 2, 10, 0, 0).unwrap(),
            &[("p2", 1, 800)],
        )
        .await;

        let reports = SalesReportService::new(db);
        let report = reports
            .trend_report("2024", None, None, &admin())
            .await
            .unwrap();

        assert_eq!(report.year, 2024);
        assert_eq!(report.month, None);
        assert_eq!(report.monthly_trends.len(), 2);
        assert_eq!(report.monthly_trends[0].label, "March 2024");
        assert_eq!(report.monthly_trends[0].products["Rye Loaf"], 2);
        assert_eq!(report.monthly_trends[1].label, "November 2024");

        // Single-month window by name, case-insensitive.
        let march = reports
            .trend_report("2024", Some("march"), None, &admin())
            .await
            .unwrap();
        assert_eq!(march.month, Some(3));
        assert_eq!(march.monthly_trends.len(), 1);

        let err = reports
            .trend_report("2024", Some("Smarch"), None, &admin())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_growth_report_half_open_windows() {
        let db = seeded_db().await;
        place_order(
            &db,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            &[("p1", 2, 500)], // 1000 in January
        )
        .await;
        place_order(
            &db,
            Utc.with_ymd_and_hms(2024, 2, 15, 10, 0, 0).unwrap(),
            &[("p1", 1, 500)], // 500 in February
        )
        .await;

        let reports = SalesReportService::new(db);
        let report = reports
            .growth_report("2024-02-01", "2024-03-01", "2024-01-01", "2024-02-01")
            .await
            .unwrap();

        assert_eq!(report.current_total_cents, 500);
        assert_eq!(report.compare_total_cents, 1000);
        assert_eq!(report.growth, "-50.00%");

        let err = reports
            .growth_report("2024-02-01", "2024-02-01", "2024-01-01", "2024-02-01")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
