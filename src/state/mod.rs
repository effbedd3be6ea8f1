//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: Tracks where the driver is in its per-category walk
//! - `PageCursor`: Tracks the pagination position and page limit of one category

mod crawl_phase;
mod cursor;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use cursor::PageCursor;
