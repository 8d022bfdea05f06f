//! SQLite product archive
//!
//! Each crawl run becomes one row in `runs`; its products, skip diagnostics
//! and failed categories are stored against that run id. Re-running a site
//! never overwrites an earlier run.

use crate::catalog::Product;
use crate::output::schema::initialize_schema;
use crate::output::stats::CrawlReport;
use crate::output::traits::{OutputResult, ProductSink};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Product sink writing to a SQLite database
pub struct SqliteSink {
    conn: Connection,
    run_id: i64,
}

impl SqliteSink {
    /// Opens (or creates) the database and starts a new run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `site` - Site identifier recorded with the run
    /// * `config_hash` - Hash of the configuration file used for the run
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteSink)` - Database ready, run row created
    /// * `Err(OutputError)` - Failed to open or initialize the database
    pub fn open(path: &Path, site: &str, config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Self::start(conn, site, config_hash)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory(site: &str, config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::start(conn, site, config_hash)
    }

    fn start(conn: Connection, site: &str, config_hash: &str) -> OutputResult<Self> {
        initialize_schema(&conn)?;

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO runs (site, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![site, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        let run_id = conn.last_insert_rowid();

        tracing::debug!("Recording run {} for {} in SQLite", run_id, site);

        Ok(Self { conn, run_id })
    }

    /// Id of the run this sink records
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Current status of this sink's run
    pub fn status(&self) -> OutputResult<Option<RunStatus>> {
        let status: String = self.conn.query_row(
            "SELECT status FROM runs WHERE id = ?1",
            params![self.run_id],
            |row| row.get(0),
        )?;
        Ok(RunStatus::from_db_string(&status))
    }

    /// Number of products stored for this sink's run
    pub fn product_count(&self) -> OutputResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE run_id = ?1",
            params![self.run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl ProductSink for SqliteSink {
    fn write_product(&mut self, product: &Product) -> OutputResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR IGNORE INTO products
                (run_id, product_id, name, url, price, category_id, category_url, per_kilogram, sku, scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                self.run_id,
                product.id,
                product.name,
                product.url,
                product.price,
                product.category_id,
                product.category_url,
                product.per_kilogram,
                product.sku,
                now
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self, report: &CrawlReport) -> OutputResult<()> {
        let status = if report.cancelled {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        };
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.transaction()?;

        for skip in &report.skipped {
            tx.execute(
                "INSERT INTO skipped_items (run_id, category_url, page_url, product_id, title, reason)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    self.run_id,
                    skip.category_url,
                    skip.page_url,
                    skip.product_id,
                    skip.title,
                    skip.reason.to_string()
                ],
            )?;
        }

        for failure in &report.failed_categories {
            tx.execute(
                "INSERT INTO failed_categories (run_id, category_url, page_url, pages_completed, message)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    self.run_id,
                    failure.category_url,
                    failure.page_url,
                    failure.pages_completed as i64,
                    failure.message
                ],
            )?;
        }

        tx.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2,
                categories_discovered = ?3, categories_completed = ?4, pages_fetched = ?5,
                products_emitted = ?6, items_skipped = ?7, duplicates_dropped = ?8
             WHERE id = ?9",
            params![
                status.to_db_string(),
                now,
                report.categories_discovered as i64,
                report.categories_completed as i64,
                report.pages_fetched as i64,
                report.products_emitted as i64,
                report.skipped.len() as i64,
                report.duplicates_dropped as i64,
                self.run_id
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn abandon(&mut self, reason: &str) -> OutputResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, error_message = ?3 WHERE id = ?4",
            params![RunStatus::Failed.to_db_string(), now, reason, self.run_id],
        )?;
        Ok(())
    }
}
