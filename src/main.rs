//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the Catalog-Harvest scraper.

use anyhow::{bail, Context};
use catalog_harvest::config::{load_config_with_hash, validate, Config, Overrides};
use catalog_harvest::crawler::{run_crawl, select_categories, Coordinator, CrawlSettings, Fetcher};
use catalog_harvest::output::{print_statistics, CsvSink};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: a category-by-category catalog scraper
///
/// Catalog-Harvest discovers the categories of a catalog site, walks their
/// listing pages, and writes one CSV file per category under the output
/// directory, downloading product images alongside.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version)]
#[command(about = "A category-by-category catalog scraper", long_about = None)]
struct Cli {
    /// Exact category names to crawl (case-insensitive); all categories if omitted
    #[arg(long, value_name = "NAME", num_args = 1..)]
    categories: Option<Vec<String>>,

    /// Maximum listing pages per category
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Pause after every request, in seconds
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Output directory root
    #[arg(long, value_name = "DIR")]
    outdir: Option<String>,

    /// Do not download product images
    #[arg(long)]
    no_images: bool,

    /// Site root to crawl
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Path to an optional TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// List the categories that would be crawled without crawling them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            return Err(e);
        }
    };

    if cli.dry_run {
        handle_dry_run(config).await
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the file config (if any), layers the CLI flags on top, and validates
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let delay_ms = match cli.delay {
        Some(seconds) if !seconds.is_finite() || seconds < 0.0 => {
            bail!("--delay must be a non-negative number of seconds, got {}", seconds)
        }
        Some(seconds) => Some((seconds * 1000.0).round() as u64),
        None => None,
    };

    config.apply_overrides(Overrides {
        base_url: cli.base_url.clone(),
        categories: cli.categories.clone(),
        max_pages: cli.max_pages,
        delay_ms,
        output_dir: cli.outdir.clone(),
        no_images: cli.no_images,
    });

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: shows which categories would be crawled
async fn handle_dry_run(config: Config) -> anyhow::Result<()> {
    let settings = CrawlSettings::from_config(&config)?;
    let fetcher = Fetcher::from_config(&config.http)?;
    let sink = CsvSink::new(settings.output.clone());
    let wanted = settings.categories.clone();
    let max_pages = settings.max_pages;
    let layout = settings.output.clone();

    let mut coordinator = Coordinator::new(fetcher, sink, settings);
    let found = coordinator.discover_categories().await?;
    let found_count = found.len();
    let selected = select_categories(found, &wanted);

    println!("=== Catalog-Harvest Dry Run ===\n");
    println!("Site: {}", config.site.base_url);
    println!("Output: {}", layout.root().display());
    println!(
        "Images: {}",
        if config.output.download_images { "enabled" } else { "disabled" }
    );
    match max_pages {
        Some(n) => println!("Max pages per category: {}", n),
        None => println!("Max pages per category: unlimited"),
    }

    println!("\nCategories ({} of {} found):", selected.len(), found_count);
    for category in &selected {
        println!("  - {} -> {}", category.name, layout.csv_path(&category.slug).display());
    }

    if selected.is_empty() {
        println!("\nNo category to crawl.");
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} into {} (images: {}, delay: {}ms)",
        config.site.base_url,
        config.output.directory,
        config.output.download_images,
        config.http.delay_ms
    );

    match run_crawl(config).await {
        Ok(stats) => {
            if stats.categories.is_empty() {
                println!("No category to crawl.");
            } else {
                print_statistics(&stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
