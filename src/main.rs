//! Catalog Crawler main entry point
//!
//! This is the command-line interface for the product catalog crawler.

use anyhow::Context;
use catalog_crawler::config::{load_config_with_hash, Config};
use catalog_crawler::crawler::{Crawler, HttpProvider, NextMarker, SiteRules, SkuRule};
use catalog_crawler::output::{
    print_report, write_markdown_report, JsonLinesSink, ProductSink, SinkSet, SqliteSink,
};
use catalog_crawler::SiteId;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Catalog Crawler: a product catalog extractor
///
/// Walks a shop's category menu, paginates every category and writes one
/// JSON object per product to the output file.
#[derive(Parser, Debug)]
#[command(name = "catalog-crawler")]
#[command(version)]
#[command(about = "Extracts product catalogs from e-commerce sites", long_about = None)]
struct Cli {
    /// Site to crawl (s6, stock, casarica, arete)
    #[arg(value_name = "SITE")]
    site: String,

    /// Path of the newline-delimited JSON output file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the site's rule set without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Unknown sites fail before anything else is touched
    let site: SiteId = cli.site.parse()?;

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            (Config::default(), "default".to_string())
        }
    };

    let rules = site.configured_rules(&config);

    if cli.dry_run {
        handle_dry_run(&config, &rules)
    } else {
        handle_crawl(&config, &config_hash, &rules, &cli.output).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_crawler=info,warn"),
            1 => EnvFilter::new("catalog_crawler=debug,info"),
            2 => EnvFilter::new("catalog_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: compiles the rule set and prints it
fn handle_dry_run(config: &Config, rules: &SiteRules) -> anyhow::Result<()> {
    let provider = HttpProvider::from_config(&config.user_agent, &config.http)
        .context("Failed to build HTTP client")?;
    Crawler::new(&provider, rules).context("Site rule set is invalid")?;

    println!("=== Catalog Crawler Dry Run: {} ===\n", rules.name);

    println!("Start page: {}", rules.start_url);

    println!("\nCategories:");
    println!("  Links: {}", rules.categories.link_selector);
    println!("  Required in href: {:?}", rules.categories.filter.require);
    println!("  Excluded from href: {:?}", rules.categories.filter.exclude);
    if let Some(pattern) = &rules.categories.id_pattern {
        println!("  Id pattern: {}", pattern);
    }

    println!("\nListing:");
    println!("  Items: {}", rules.item_selector);
    let marker = match &rules.pagination.next {
        NextMarker::Rel(token) => format!("rel contains '{}'", token),
        NextMarker::Text(label) => format!("text contains '{}'", label),
    };
    println!(
        "  Next page: {} {} ({})",
        rules.pagination.container, rules.pagination.links, marker
    );

    let sku = match &rules.sku {
        SkuRule::None => "not available".to_string(),
        SkuRule::ImageFilename { selector, attr, .. } => {
            format!("image filename from {}[{}]", selector, attr)
        }
        SkuRule::DetailPage {
            selector, label, ..
        } => format!("'{}' in {} on the detail page", label, selector),
    };
    println!("  SKU: {}", sku);

    println!("\nCrawler:");
    println!("  On category error: {}", config.crawler.on_category_error);
    println!("  Timeout: {}s", config.http.timeout_secs);

    println!("\nOutput:");
    match &config.output.sqlite_path {
        Some(path) => println!("  Database: {}", path),
        None => println!("  Database: (disabled)"),
    }
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path),
        None => println!("  Summary: (disabled)"),
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Rule set for {} compiles", rules.name);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    config_hash: &str,
    rules: &SiteRules,
    output: &Path,
) -> anyhow::Result<()> {
    let provider = HttpProvider::from_config(&config.user_agent, &config.http)
        .context("Failed to build HTTP client")?;

    let mut sinks = SinkSet::new();
    sinks.push(
        JsonLinesSink::create(output)
            .with_context(|| format!("Failed to create {}", output.display()))?,
    );
    if let Some(path) = &config.output.sqlite_path {
        tracing::info!("Archiving run in {}", path);
        sinks.push(
            SqliteSink::open(Path::new(path), &rules.name, config_hash)
                .with_context(|| format!("Failed to open database {}", path))?,
        );
    }

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            signal_token.cancel();
        }
    });

    let crawler = Crawler::new(&provider, rules)?
        .with_policy(config.crawler.on_category_error)
        .with_cancellation(cancel);

    let result = crawler
        .run(|product| sinks.write_product(&product))
        .await;

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            if let Err(abandon_err) = sinks.abandon(&e.to_string()) {
                tracing::error!("Failed to close outputs: {}", abandon_err);
            }
            return Err(e).context(format!("Crawl of {} failed", rules.name));
        }
    };

    sinks
        .finish(&report)
        .context("Failed to finalize outputs")?;

    print_report(&report);

    if let Some(path) = &config.output.summary_path {
        write_markdown_report(&report, Path::new(path))
            .with_context(|| format!("Failed to write report {}", path))?;
        tracing::info!("Report written to {}", path);
    }

    Ok(())
}
