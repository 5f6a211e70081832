//! # Analytics Folds
//!
//! Pure accumulation logic behind the reporting pipeline. Repositories
//! fetch rows; everything in this module is a deterministic fold over
//! them, so every report calculation is testable without a database.
//!
//! ## Pipeline Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Reporting Data Flow                                 │
//! │                                                                         │
//! │  bazaar-db (rows)                bazaar-core (THIS MODULE)              │
//! │  ───────────────                 ─────────────────────────              │
//! │  orders + items in window  ────► SalesSummary / name breakdown          │
//! │  orders in window          ────► TrendAccumulator (per month)           │
//! │  window total sums         ────► growth_percent                         │
//! │  products                  ────► analyze_product (margins)              │
//! │  per-type revenue rows     ────► CustomerSales                          │
//! │  per-location revenue rows ────► segment_revenue                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::CustomerType;

// =============================================================================
// Sales Summary (per product id)
// =============================================================================

/// Per-product slice of a sales summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub name: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
}

/// Totals and per-product breakdown over a set of order items.
///
/// Used by the daily report and the subscription sales report. The
/// breakdown is keyed by product id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_products_sold: i64,
    pub total_revenue_cents: i64,
    pub product_breakdown: HashMap<String, ProductSales>,
}

impl SalesSummary {
    pub fn new() -> Self {
        SalesSummary::default()
    }

    /// Folds one order item into the summary.
    pub fn record(&mut self, product_id: &str, name: &str, quantity: i64, unit_price_cents: i64) {
        let revenue = unit_price_cents * quantity;
        self.total_products_sold += quantity;
        self.total_revenue_cents += revenue;

        let entry = self
            .product_breakdown
            .entry(product_id.to_string())
            .or_insert_with(|| ProductSales {
                name: name.to_string(),
                ..ProductSales::default()
            });
        entry.quantity_sold += quantity;
        entry.revenue_cents += revenue;
    }

    pub fn is_empty(&self) -> bool {
        self.product_breakdown.is_empty()
    }
}

// =============================================================================
// Name-Keyed Breakdown (range report)
// =============================================================================

/// Per-product-name slice of a range report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameSales {
    pub quantity: i64,
    pub revenue_cents: i64,
    /// Unit price of the first item folded in for this name.
    pub unit_price_cents: i64,
}

/// Breakdown keyed by product name, as used by the range report.
pub type NameSalesMap = HashMap<String, NameSales>;

/// Folds one order item into a name-keyed breakdown.
pub fn record_by_name(map: &mut NameSalesMap, name: &str, quantity: i64, unit_price_cents: i64) {
    let entry = map.entry(name.to_string()).or_insert_with(|| NameSales {
        unit_price_cents,
        ..NameSales::default()
    });
    entry.quantity += quantity;
    entry.revenue_cents += unit_price_cents * quantity;
}

/// One row of the top-selling-products ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
    pub unit_price_cents: i64,
}

/// Ranks a name-keyed breakdown by quantity sold, descending, and keeps
/// the first `limit` entries. Ties break on name so the ranking is
/// deterministic.
pub fn top_selling(map: &NameSalesMap, limit: usize) -> Vec<TopProduct> {
    let mut ranked: Vec<TopProduct> = map
        .iter()
        .map(|(name, sales)| TopProduct {
            name: name.clone(),
            quantity: sales.quantity,
            revenue_cents: sales.revenue_cents,
            unit_price_cents: sales.unit_price_cents,
        })
        .collect();

    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}

/// One ranked search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TermCount {
    pub term: String,
    pub count: i64,
}

// =============================================================================
// Monthly Trends
// =============================================================================

/// Revenue and per-product quantities for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTrend {
    /// Month number (1-12), for chronological ordering.
    pub month: u32,
    /// Calendar label, e.g. "March 2024".
    pub label: String,
    pub revenue_cents: i64,
    /// Quantity sold per product name.
    pub products: HashMap<String, i64>,
}

/// Accumulates order items into chronologically ordered month buckets.
#[derive(Debug, Default)]
pub struct TrendAccumulator {
    months: BTreeMap<u32, MonthTrend>,
}

impl TrendAccumulator {
    pub fn new() -> Self {
        TrendAccumulator::default()
    }

    /// Folds one order item into its month bucket.
    pub fn record(
        &mut self,
        month: u32,
        label: &str,
        product_name: &str,
        quantity: i64,
        unit_price_cents: i64,
    ) {
        let bucket = self.months.entry(month).or_insert_with(|| MonthTrend {
            month,
            label: label.to_string(),
            revenue_cents: 0,
            products: HashMap::new(),
        });
        bucket.revenue_cents += unit_price_cents * quantity;
        *bucket.products.entry(product_name.to_string()).or_insert(0) += quantity;
    }

    /// Returns the buckets in calendar order.
    pub fn into_months(self) -> Vec<MonthTrend> {
        self.months.into_values().collect()
    }
}

// =============================================================================
// Growth
// =============================================================================

/// Period-over-period growth as a percentage string with two decimals.
///
/// `(current − compare) / (compare or 1) × 100`. The `or 1` guard keeps a
/// zero-revenue comparison window from dividing by zero; growth against an
/// empty baseline reports the current total directly as percent.
pub fn growth_percent(current_cents: i64, compare_cents: i64) -> String {
    let base = if compare_cents == 0 { 1 } else { compare_cents };
    let growth = (current_cents - compare_cents) as f64 / base as f64 * 100.0;
    format!("{:.2}%", growth)
}

// =============================================================================
// Profitability
// =============================================================================

/// Margin classification relative to a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarginCategory {
    #[serde(rename = "High-Margin")]
    HighMargin,
    #[serde(rename = "Low-Margin")]
    LowMargin,
}

/// Derived profitability figures for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profitability {
    pub gross_profit_cents: i64,
    /// Gross profit as a percentage of the selling price. `None` when the
    /// price is zero — the margin is undefined rather than infinite.
    pub profit_margin: Option<f64>,
    pub margin_category: MarginCategory,
}

/// Computes gross profit and margin category for one product.
///
/// A margin is High-Margin only when strictly greater than the threshold;
/// a margin exactly at the threshold, or undefined (zero price), is
/// Low-Margin.
pub fn analyze_product(price_cents: i64, cost_price_cents: i64, threshold: f64) -> Profitability {
    let gross_profit_cents = price_cents - cost_price_cents;

    let profit_margin = if price_cents == 0 {
        None
    } else {
        Some(gross_profit_cents as f64 / price_cents as f64 * 100.0)
    };

    let margin_category = match profit_margin {
        Some(margin) if margin > threshold => MarginCategory::HighMargin,
        _ => MarginCategory::LowMargin,
    };

    Profitability {
        gross_profit_cents,
        profit_margin,
        margin_category,
    }
}

// =============================================================================
// Customer Segmentation
// =============================================================================

/// Revenue split between first-time and returning customers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSales {
    pub new_customer_revenue_cents: i64,
    pub repeat_customer_revenue_cents: i64,
    pub total_revenue_cents: i64,
}

/// Folds `(customer_type, revenue)` rows into a split summary.
///
/// The two parts always sum to the total by construction.
pub fn customer_sales(rows: &[(CustomerType, i64)]) -> CustomerSales {
    let mut summary = CustomerSales::default();
    for (customer_type, revenue_cents) in rows {
        match customer_type {
            CustomerType::New => summary.new_customer_revenue_cents += revenue_cents,
            CustomerType::Repeat => summary.repeat_customer_revenue_cents += revenue_cents,
        }
        summary.total_revenue_cents += revenue_cents;
    }
    summary
}

/// Folds `(location, revenue)` rows into per-segment revenue.
///
/// Duplicate locations are summed, so the fold accepts either pre-grouped
/// rows or one row per order. With a single user this degenerates to one
/// segment; the fold itself is caller-count agnostic.
pub fn segment_revenue(rows: &[(String, i64)]) -> BTreeMap<String, i64> {
    let mut segments = BTreeMap::new();
    for (location, revenue_cents) in rows {
        *segments.entry(location.clone()).or_insert(0) += revenue_cents;
    }
    segments
}

// =============================================================================
// Unit Tests
// =============================================================================
