//! Output module for crawl results
//!
//! This module handles:
//! - Writing products as newline-delimited JSON
//! - Archiving runs, products and skip diagnostics in SQLite
//! - Printing and exporting the crawl report

mod jsonl;
mod markdown;
mod schema;
mod sqlite_output;
pub mod stats;
mod traits;

pub use jsonl::JsonLinesSink;
pub use markdown::{format_markdown_report, write_markdown_report};
pub use sqlite_output::{RunStatus, SqliteSink};
pub use stats::{print_report, CategoryFailure, CrawlReport, SkipDiagnostic};
pub use traits::{OutputError, OutputResult, ProductSink, SinkSet};
