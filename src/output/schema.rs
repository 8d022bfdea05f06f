//! Database schema definitions
//!
//! This module contains the SQL schema of the optional SQLite product archive.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    categories_discovered INTEGER NOT NULL DEFAULT 0,
    categories_completed INTEGER NOT NULL DEFAULT 0,
    pages_fetched INTEGER NOT NULL DEFAULT 0,
    products_emitted INTEGER NOT NULL DEFAULT 0,
    items_skipped INTEGER NOT NULL DEFAULT 0,
    duplicates_dropped INTEGER NOT NULL DEFAULT 0,
    error_message TEXT
);

CREATE INDEX IF NOT EXISTS idx_runs_site ON runs(site);

-- Products emitted by a run
CREATE TABLE IF NOT EXISTS products (
    run_id INTEGER NOT NULL REFERENCES runs(id),
    product_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    price INTEGER NOT NULL,
    category_id INTEGER NOT NULL,
    category_url TEXT NOT NULL,
    per_kilogram INTEGER NOT NULL,
    sku TEXT NOT NULL,
    scraped_at TEXT NOT NULL,
    PRIMARY KEY (run_id, product_id)
);

CREATE INDEX IF NOT EXISTS idx_products_sku ON products(sku);

-- Items skipped with a diagnostic
CREATE TABLE IF NOT EXISTS skipped_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    category_url TEXT NOT NULL,
    page_url TEXT NOT NULL,
    product_id INTEGER,
    title TEXT,
    reason TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_skipped_run ON skipped_items(run_id);

-- Categories abandoned after a fetch failure
CREATE TABLE IF NOT EXISTS failed_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    category_url TEXT NOT NULL,
    page_url TEXT NOT NULL,
    pages_completed INTEGER NOT NULL,
    message TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["runs", "products", "skipped_items", "failed_categories"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }
}
