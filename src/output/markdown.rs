//! Markdown audit report
//!
//! This module renders a crawl report as markdown: run counters, failed
//! categories and every skipped item, so an operator can judge how complete
//! the extracted catalog is.

use crate::output::stats::CrawlReport;
use crate::output::traits::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report of a crawl
///
/// # Arguments
///
/// * `report` - The crawl report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn write_markdown_report(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
///
/// # Arguments
///
/// * `report` - The crawl report
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Catalog Crawl Report: {}\n\n", report.site));

    let status = if report.cancelled {
        "cancelled"
    } else if report.is_complete() {
        "complete"
    } else {
        "partial"
    };

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Status**: {}\n", status));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    md.push_str(&format!(
        "- **Categories**: {} discovered, {} completed, {} failed\n",
        report.categories_discovered,
        report.categories_completed,
        report.failed_categories.len()
    ));
    md.push_str(&format!("- **Listing Pages**: {}\n", report.pages_fetched));
    md.push_str(&format!(
        "- **Detail Pages**: {}\n",
        report.detail_pages_fetched
    ));
    md.push_str(&format!(
        "- **Products Emitted**: {}\n",
        report.products_emitted
    ));
    md.push_str(&format!(
        "- **Duplicates Dropped**: {}\n",
        report.duplicates_dropped
    ));
    md.push_str(&format!("- **Items Skipped**: {}\n", report.skipped_count()));
    md.push_str(&format!(
        "- **Empty SKU After Lookup Failure**: {}\n",
        report.sku_unavailable
    ));
    md.push_str(&format!("- **Yield**: {:.2}%\n\n", report.yield_rate()));

    if !report.failed_categories.is_empty() {
        md.push_str("## Failed Categories\n\n");
        md.push_str("| Category | Failed Page | Pages Done | Error |\n");
        md.push_str("|----------|-------------|------------|-------|\n");

        for failure in &report.failed_categories {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                cell(&failure.category_url),
                cell(&failure.page_url),
                failure.pages_completed,
                cell(&failure.message)
            ));
        }
        md.push('\n');
    }

    if !report.skipped.is_empty() {
        md.push_str("## Skipped Items\n\n");
        md.push_str("| Product | Title | Page | Reason |\n");
        md.push_str("|---------|-------|------|--------|\n");

        for skip in &report.skipped {
            let id = skip
                .product_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                id,
                cell(skip.title.as_deref().unwrap_or("-")),
                cell(&skip.page_url),
                cell(&skip.reason.to_string())
            ));
        }
        md.push('\n');
    }

    md
}

/// Escapes a value for use inside a table cell
fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
