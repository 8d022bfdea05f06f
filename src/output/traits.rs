//! Output sink traits and types
//!
//! This module defines the trait interface for product sinks. The crawl engine
//! itself only calls a closure per product; sinks are the collaborators that
//! closure forwards to.

use crate::catalog::Product;
use crate::output::stats::CrawlReport;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize product: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for the products of one crawl run
pub trait ProductSink {
    /// Records one accepted product
    ///
    /// # Arguments
    ///
    /// * `product` - The product, in emission order
    fn write_product(&mut self, product: &Product) -> OutputResult<()>;

    /// Finalizes the output after the engine returned a report
    ///
    /// # Arguments
    ///
    /// * `report` - The final crawl report
    fn finish(&mut self, report: &CrawlReport) -> OutputResult<()>;

    /// Finalizes the output after the run failed
    ///
    /// Products already written stay written.
    fn abandon(&mut self, reason: &str) -> OutputResult<()> {
        let _ = reason;
        Ok(())
    }
}

impl<S: ProductSink + ?Sized> ProductSink for Box<S> {
    fn write_product(&mut self, product: &Product) -> OutputResult<()> {
        (**self).write_product(product)
    }

    fn finish(&mut self, report: &CrawlReport) -> OutputResult<()> {
        (**self).finish(report)
    }

    fn abandon(&mut self, reason: &str) -> OutputResult<()> {
        (**self).abandon(reason)
    }
}

/// Forwards every call to several sinks, in order
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn ProductSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl ProductSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ProductSink for SinkSet {
    fn write_product(&mut self, product: &Product) -> OutputResult<()> {
        for sink in &mut self.sinks {
            sink.write_product(product)?;
        }
        Ok(())
    }

    fn finish(&mut self, report: &CrawlReport) -> OutputResult<()> {
        for sink in &mut self.sinks {
            sink.finish(report)?;
        }
        Ok(())
    }

    /// Abandons every sink, even if an earlier one fails
    fn abandon(&mut self, reason: &str) -> OutputResult<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.abandon(reason) {
                tracing::error!("Failed to finalize output: {}", e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
