//! # Reporting Pipeline
//!
//! Role-scoped sales aggregation, profitability, customer segmentation,
//! export encodings, and the per-subscription body generator used by the
//! scheduled dispatcher.

pub mod export;
pub mod generate;
pub mod profitability;
pub mod sales;
pub mod scope;
pub mod segments;
