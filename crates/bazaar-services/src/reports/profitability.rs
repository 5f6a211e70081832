//! # Profitability Analysis
//!
//! Derives gross profit and a margin category for every active product.
//! The arithmetic lives in `bazaar_core::analytics::analyze_product`; this
//! service only joins it with the catalog.

use serde::Serialize;

use crate::error::ApiError;
use bazaar_core::analytics::{analyze_product, Profitability};
use bazaar_core::{Product, DEFAULT_MARGIN_THRESHOLD};
use bazaar_db::Database;

/// A product together with its derived profitability figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductProfitability {
    #[serde(flatten)]
    pub product: Product,
    #[serde(flatten)]
    pub profitability: Profitability,
}

/// Profitability analysis over the catalog.
#[derive(Debug, Clone)]
pub struct ProfitabilityService {
    db: Database,
}

impl ProfitabilityService {
    pub fn new(db: Database) -> Self {
        ProfitabilityService { db }
    }

    /// Analyzes every active product against a margin threshold (percent).
    /// `None` uses the default threshold of 30.
    pub async fn analyze(
        &self,
        threshold: Option<f64>,
    ) -> Result<Vec<ProductProfitability>, ApiError> {
        let threshold = threshold.unwrap_or(DEFAULT_MARGIN_THRESHOLD);

        let products = self.db.products().list_active().await?;

        Ok(products
            .into_iter()
            .map(|product| {
                let profitability =
                    analyze_product(product.price_cents, product.cost_price_cents, threshold);
                ProductProfitability {
                    product,
                    profitability,
                }
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
