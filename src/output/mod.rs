//! Output module for Catalog-Harvest
//!
//! This module handles everything a run leaves on disk:
//! - Record sinks (CSV files, one per category)
//! - The output directory layout, including image file names
//! - Run statistics and their report

mod csv_sink;
mod layout;
mod stats;
mod traits;

pub use csv_sink::{CsvSink, CSV_COLUMNS};
pub use layout::{image_file_name, OutputLayout};
pub use stats::{format_statistics, print_statistics, CategoryStats, CrawlStats};
pub use traits::{OutputError, OutputResult, RecordSink};
