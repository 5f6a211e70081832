//! # Report Export
//!
//! Alternate encodings of the range report: the same report object
//! rendered as CSV, a spreadsheet, or a PDF summary page. Every encoding
//! renders to in-memory bytes — nothing touches the filesystem, so there
//! is no artifact to clean up after the response is sent.

use std::str::FromStr;

use printpdf::{BuiltinFont, Mm, PdfDocument};
use rust_xlsxwriter::Workbook;

use crate::error::ApiError;
use crate::reports::sales::TotalSalesReport;
use bazaar_core::{Money, ValidationError};

/// Requested export encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(ValidationError::InvalidExportFormat {
                value: value.to_string(),
            }),
        }
    }
}

/// A rendered report ready to hand to the host response layer.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Renders a range report in the requested encoding.
///
/// All three encodings carry the same summary columns: period, total
/// revenue, total products sold.
pub fn render_total_report(
    report: &TotalSalesReport,
    format: ExportFormat,
) -> Result<ReportArtifact, ApiError> {
    match format {
        ExportFormat::Csv => Ok(render_csv(report)),
        ExportFormat::Excel => render_excel(report),
        ExportFormat::Pdf => render_pdf(report),
    }
}

/// Plain decimal rendering of a cent amount ("123.45", no currency sign).
fn decimal(cents: i64) -> String {
    let money = Money::from_cents(cents);
    format!("{}.{:02}", money.dollars(), money.cents_part())
}

/// Maps a renderer failure to a generic internal error, logging the
/// detail.
fn render_err<E: std::fmt::Display>(e: E) -> ApiError {
    tracing::error!("Report export failed: {}", e);
    ApiError::internal("Failed to render report export")
}

fn render_csv(report: &TotalSalesReport) -> ReportArtifact {
    let mut csv = String::from("Period,Total Revenue,Total Products Sold\n");
    csv.push_str(&format!(
        "{},{},{}\n",
        report.period,
        decimal(report.total_revenue_cents),
        report.total_products_sold
    ));

    ReportArtifact {
        filename: "report.csv".to_string(),
        content_type: "text/csv",
        bytes: csv.into_bytes(),
    }
}

fn render_excel(report: &TotalSalesReport) -> Result<ReportArtifact, ApiError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Sales Report").map_err(render_err)?;

    worksheet.write_string(0, 0, "Period").map_err(render_err)?;
    worksheet
        .write_string(0, 1, "Total Revenue")
        .map_err(render_err)?;
    worksheet
        .write_string(0, 2, "Total Products Sold")
        .map_err(render_err)?;

    worksheet
        .write_string(1, 0, &report.period)
        .map_err(render_err)?;
    worksheet
        .write_number(1, 1, report.total_revenue_cents as f64 / 100.0)
        .map_err(render_err)?;
    worksheet
        .write_number(1, 2, report.total_products_sold as f64)
        .map_err(render_err)?;

    let bytes = workbook.save_to_buffer().map_err(render_err)?;

    Ok(ReportArtifact {
        filename: "report.xlsx".to_string(),
        content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        bytes,
    })
}

fn render_pdf(report: &TotalSalesReport) -> Result<ReportArtifact, ApiError> {
    // A4 portrait, single summary page.
    let (doc, page, layer) = PdfDocument::new("Sales Report", Mm(210.0), Mm(297.0), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_err)?;
    let current = doc.get_page(page).get_layer(layer);

    current.use_text("Sales Report", 16.0, Mm(20.0), Mm(270.0), &font);
    current.use_text(
        format!("Period: {}", report.period),
        12.0,
        Mm(20.0),
        Mm(258.0),
        &font,
    );
    current.use_text(
        format!("Revenue: {}", Money::from_cents(report.total_revenue_cents)),
        12.0,
        Mm(20.0),
        Mm(250.0),
        &font,
    );
    current.use_text(
        format!("Products Sold: {}", report.total_products_sold),
        12.0,
        Mm(20.0),
        Mm(242.0),
        &font,
    );

    let bytes = doc.save_to_bytes().map_err(render_err)?;

    Ok(ReportArtifact {
        filename: "report.pdf".to_string(),
        content_type: "application/pdf",
        bytes,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
