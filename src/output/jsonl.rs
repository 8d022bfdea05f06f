//! Newline-delimited JSON output
//!
//! One JSON object per product, one product per line, in emission order.

use crate::catalog::Product;
use crate::output::stats::CrawlReport;
use crate::output::traits::{OutputError, OutputResult, ProductSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct JsonLinesSink<W: Write = File> {
    writer: BufWriter<W>,
    written: usize,
}

impl JsonLinesSink<File> {
    /// Creates (or truncates) the destination file
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            written: 0,
        }
    }

    /// Number of products written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))
    }
}

impl<W: Write> ProductSink for JsonLinesSink<W> {
    fn write_product(&mut self, product: &Product) -> OutputResult<()> {
        let line = product.to_json_line()?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self, report: &CrawlReport) -> OutputResult<()> {
        self.writer.flush()?;
        tracing::debug!(
            "Wrote {} of {} emitted products as JSON lines",
            self.written,
            report.products_emitted
        );
        Ok(())
    }

    fn abandon(&mut self, _reason: &str) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::NamedTempFile;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            url: format!("https://shop.example/p/{}", id),
            price: 15000,
            category_id: 12,
            category_url: "https://shop.example/c/12".to_string(),
            per_kilogram: id % 2 == 0,
            sku: "AB-1".to_string(),
        }
    }

    #[test]
    fn test_one_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write_product(&product(1, "Yerba")).unwrap();
        sink.write_product(&product(2, "Café \"especial\"")).unwrap();
        sink.finish(&CrawlReport::new("test")).unwrap();
        assert_eq!(sink.written(), 2);

        let bytes = sink.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(text.ends_with('\n'));

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(first["categoryId"], 12);
        assert_eq!(first["categoryUrl"], "https://shop.example/c/12");
        assert_eq!(first["perKilogram"], false);

        let second: Product = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second, product(2, "Café \"especial\""));
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"stale content\nfrom an older run\n").unwrap();
        file.flush().unwrap();

        let mut sink = JsonLinesSink::create(file.path()).unwrap();
        sink.write_product(&product(5, "Sal")).unwrap();
        sink.finish(&CrawlReport::new("test")).unwrap();
        drop(sink);

        let mut content = String::new();
        File::open(file.path())
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("{\"id\":5,"));
    }
}
