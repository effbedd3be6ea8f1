//! Crawler module for catalog fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through a shared transport handle
//! - HTML extraction of categories, listing pages and product pages
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, select_categories, Coordinator, CrawlSettings};
pub use fetcher::{build_http_client, Fetcher};
pub use parser::{
    extract_categories, extract_listing, extract_product, rating_from_class, Category,
    ListingPage, ProductRecord,
};
