//! Run statistics
//!
//! Counters collected by the crawl driver while it walks the catalog, and
//! their end-of-run report.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Counters for one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryStats {
    pub name: String,
    pub slug: String,

    /// Listing pages fetched
    pub pages: u32,

    /// Product records appended to the sink
    pub products: u64,

    /// Images written to disk
    pub images_saved: u64,

    /// Images already on disk from an earlier run, not fetched again
    pub images_existing: u64,

    /// Image downloads that failed and were skipped
    pub images_failed: u64,
}

impl CategoryStats {
    pub fn new(name: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            ..Self::default()
        }
    }
}

/// Statistics for a whole run
#[derive(Debug, Clone)]
pub struct CrawlStats {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,

    /// Categories found on the homepage before filtering
    pub categories_found: usize,

    /// One entry per crawled category, in crawl order
    pub categories: Vec<CategoryStats>,
}

impl CrawlStats {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            elapsed: Duration::ZERO,
            categories_found: 0,
            categories: Vec::new(),
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.categories.iter().map(|c| c.pages as u64).sum()
    }

    pub fn total_products(&self) -> u64 {
        self.categories.iter().map(|c| c.products).sum()
    }

    pub fn total_images_saved(&self) -> u64 {
        self.categories.iter().map(|c| c.images_saved).sum()
    }

    pub fn total_images_existing(&self) -> u64 {
        self.categories.iter().map(|c| c.images_existing).sum()
    }

    pub fn total_images_failed(&self) -> u64 {
        self.categories.iter().map(|c| c.images_failed).sum()
    }
}

/// Formats statistics as a plain-text report
pub fn format_statistics(stats: &CrawlStats) -> String {
    let mut out = String::new();

    out.push_str("=== Harvest Statistics ===\n\n");
    out.push_str(&format!(
        "Started: {}\n",
        stats.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Duration: {:.1}s\n", stats.elapsed.as_secs_f64()));
    out.push_str(&format!(
        "Categories: {} crawled of {} found\n\n",
        stats.categories.len(),
        stats.categories_found
    ));

    for category in &stats.categories {
        out.push_str(&format!(
            "  {:<30} {:>4} pages {:>6} products {:>6} images",
            category.name, category.pages, category.products, category.images_saved
        ));
        if category.images_failed > 0 {
            out.push_str(&format!(" ({} failed)", category.images_failed));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "\nTotal: {} pages, {} products, {} images saved, {} already present, {} image failures\n",
        stats.total_pages(),
        stats.total_products(),
        stats.total_images_saved(),
        stats.total_images_existing(),
        stats.total_images_failed()
    ));

    out
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CrawlStats) {
    print!("{}", format_statistics(stats));
}
