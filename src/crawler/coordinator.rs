//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties fetching, extraction and
//! persistence together:
//! - Discovering and filtering categories from the homepage
//! - Walking each category's listing pages until pagination ends
//! - Extracting one record per product page
//! - Downloading images without letting their failures stop the crawl
//! - Appending each page's records to the category sink

use crate::config::Config;
use crate::crawler::parser::{extract_categories, extract_listing, extract_product};
use crate::crawler::{Category, Fetcher, ProductRecord};
use crate::output::{CategoryStats, CrawlStats, CsvSink, OutputLayout, RecordSink};
use crate::state::{CrawlPhase, PageCursor};
use crate::HarvestError;
use chrono::Utc;
use std::collections::HashSet;
use std::time::Instant;
use url::Url;

/// What to crawl and where the output goes
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Site root holding the category navigation
    pub base_url: Url,

    /// Category names to keep (case-insensitive exact match); empty keeps all
    pub categories: Vec<String>,

    /// Maximum listing pages per category
    pub max_pages: Option<u32>,

    pub download_images: bool,

    pub output: OutputLayout,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        Ok(Self {
            base_url: Url::parse(&config.site.base_url)?,
            categories: config.crawl.categories.clone(),
            max_pages: config.crawl.max_pages,
            download_images: config.output.download_images,
            output: OutputLayout::new(&config.output.directory),
        })
    }
}

/// Keeps the categories whose name matches one of `wanted`, ignoring case
///
/// Homepage order is preserved. An empty `wanted` list keeps everything.
pub fn select_categories(categories: Vec<Category>, wanted: &[String]) -> Vec<Category> {
    if wanted.is_empty() {
        return categories;
    }

    let wanted: HashSet<String> = wanted.iter().map(|w| w.trim().to_lowercase()).collect();

    categories
        .into_iter()
        .filter(|c| wanted.contains(&c.name.to_lowercase()))
        .collect()
}

/// Main crawl driver
///
/// Owns the transport handle and the record sink for the duration of a run.
/// Every step moves the driver through `CrawlPhase`; an out-of-order step is
/// reported as `HarvestError::InvalidTransition`.
pub struct Coordinator<S: RecordSink> {
    fetcher: Fetcher,
    sink: S,
    settings: CrawlSettings,
    phase: CrawlPhase,
}

impl<S: RecordSink> Coordinator<S> {
    pub fn new(fetcher: Fetcher, sink: S, settings: CrawlSettings) -> Self {
        Self {
            fetcher,
            sink,
            settings,
            phase: CrawlPhase::Idle,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Fetches the homepage and returns every category it lists
    ///
    /// A failed homepage fetch is fatal.
    pub async fn discover_categories(&mut self) -> Result<Vec<Category>, HarvestError> {
        let base_url = self.settings.base_url.clone();
        tracing::info!("Fetching homepage {}", base_url);

        let html = self.fetcher.get_text(&base_url).await?;
        let categories = extract_categories(&html, &base_url);

        self.transition(CrawlPhase::CategoriesDiscovered)?;
        tracing::info!("Found {} categories", categories.len());

        Ok(categories)
    }

    /// Runs the whole crawl
    ///
    /// 1. Discover categories and apply the name filter
    /// 2. For each selected category, walk its listing pages
    /// 3. Extract every product, download its image if enabled
    /// 4. Append each page's records to the sink
    ///
    /// An empty selection ends the run successfully without crawling.
    pub async fn run(&mut self) -> Result<CrawlStats, HarvestError> {
        let start_time = Instant::now();
        let mut stats = CrawlStats::new(Utc::now());

        let found = self.discover_categories().await?;
        stats.categories_found = found.len();

        let selected = select_categories(found, &self.settings.categories);

        if selected.is_empty() {
            tracing::info!("No category to crawl");
        }

        for category in &selected {
            let category_stats = self.crawl_category(category).await?;
            stats.categories.push(category_stats);
        }

        self.transition(CrawlPhase::AllDone)?;
        stats.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl completed: {} products from {} categories in {:?}",
            stats.total_products(),
            stats.categories.len(),
            stats.elapsed
        );

        Ok(stats)
    }

    /// Walks one category's pagination until it ends or the page limit is hit
    async fn crawl_category(
        &mut self,
        category: &Category,
    ) -> Result<CategoryStats, HarvestError> {
        tracing::info!("[{}] -> {}", category.name, category.url);

        let mut stats = CategoryStats::new(&category.name, &category.slug);
        let mut cursor = PageCursor::new(category.url.clone(), self.settings.max_pages);

        while let Some(page_url) = cursor.current().cloned() {
            let html = self.fetcher.get_text(&page_url).await?;
            let listing = extract_listing(&html, &page_url);
            self.transition(CrawlPhase::PageFetched)?;

            tracing::debug!(
                "{}: {} products, next page {:?}",
                page_url,
                listing.product_urls.len(),
                listing.next_page.as_ref().map(Url::as_str)
            );

            let mut records = Vec::with_capacity(listing.product_urls.len());
            for product_url in &listing.product_urls {
                let record = self.fetch_product(product_url, category).await?;

                if self.settings.download_images {
                    self.save_image(category, &record, &mut stats).await;
                }

                records.push(record);
            }
            self.transition(CrawlPhase::RecordsExtracted)?;

            if !records.is_empty() {
                self.sink.append_batch(category, &records)?;
                stats.products += records.len() as u64;
                tracing::info!(
                    "  + {} products (page {})",
                    records.len(),
                    cursor.pages_seen() + 1
                );
            }
            self.transition(CrawlPhase::Persisted)?;

            stats.pages += 1;
            cursor.advance(listing.next_page);
        }

        if cursor.pages_seen() > 0 {
            self.transition(CrawlPhase::CategoryDone)?;
        }

        Ok(stats)
    }

    async fn fetch_product(
        &self,
        product_url: &Url,
        category: &Category,
    ) -> Result<ProductRecord, HarvestError> {
        let html = self.fetcher.get_text(product_url).await?;
        let record = extract_product(&html, product_url, &category.name);
        tracing::debug!("Extracted {:?} (upc {:?})", record.title, record.upc);
        Ok(record)
    }

    /// Downloads a product image; failures are logged and counted, never returned
    ///
    /// Products without an image URL or a UPC are skipped, and so are images
    /// already present on disk. A UPC with nothing file-safe left in it counts
    /// as a failure.
    async fn save_image(
        &self,
        category: &Category,
        record: &ProductRecord,
        stats: &mut CategoryStats,
    ) {
        if record.image_url.is_empty() || record.upc.is_empty() {
            tracing::debug!("No image to fetch for {}", record.product_url);
            return;
        }

        let dest = match self
            .settings
            .output
            .image_path(&category.slug, &record.upc, &record.title)
        {
            Some(dest) => dest,
            None => {
                tracing::warn!(
                    "(image) unusable UPC {:?} for {}",
                    record.upc,
                    record.product_url
                );
                stats.images_failed += 1;
                return;
            }
        };

        if dest.exists() {
            tracing::debug!("Image already present: {}", dest.display());
            stats.images_existing += 1;
            return;
        }

        let image_url = match Url::parse(&record.image_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("(image) invalid URL {}: {}", record.image_url, e);
                stats.images_failed += 1;
                return;
            }
        };

        match self.fetcher.download(&image_url, &dest).await {
            Ok(bytes) => {
                tracing::debug!("Saved {} ({} bytes)", dest.display(), bytes);
                stats.images_saved += 1;
            }
            Err(e) => {
                tracing::warn!("(image) {}", e);
                stats.images_failed += 1;
            }
        }
    }

    fn transition(&mut self, to: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(to) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to,
            });
        }

        tracing::trace!("Phase {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }
}

/// Runs the main crawl operation
///
/// Builds the transport handle and the CSV sink from the configuration,
/// creates the output root, and drives the crawl to completion.
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::Config;
/// use catalog_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stats = run_crawl(Config::default()).await?;
/// println!("{} products", stats.total_products());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlStats, HarvestError> {
    let settings = CrawlSettings::from_config(&config)?;
    let fetcher = Fetcher::from_config(&config.http)?;

    std::fs::create_dir_all(settings.output.root())?;
    let sink = CsvSink::new(settings.output.clone());

    let mut coordinator = Coordinator::new(fetcher, sink, settings);
    coordinator.run().await
}
