//! Output sink traits and types
//!
//! This module defines the trait interface for record sinks and the errors
//! they report.

use crate::crawler::{Category, ProductRecord};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only destination for product records, keyed by category
///
/// Each category owns its own output stream. A sink only ever grows: batches
/// are appended in the order they are handed over.
pub trait RecordSink {
    /// Appends one batch of records to the category's output
    ///
    /// Called once per listing page that produced at least one record.
    fn append_batch(
        &mut self,
        category: &Category,
        records: &[ProductRecord],
    ) -> OutputResult<()>;
}
