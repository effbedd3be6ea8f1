//! CSV record sink
//!
//! One CSV file per category under `<root>/csv/`. The header row is written
//! by whichever append creates the file; every later append, in this run or a
//! later one, only adds rows.

use crate::crawler::{Category, ProductRecord};
use crate::output::layout::OutputLayout;
use crate::output::traits::{OutputResult, RecordSink};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Column order of every category file
pub const CSV_COLUMNS: [&str; 8] = [
    "title",
    "price",
    "availability",
    "rating",
    "product_url",
    "image_url",
    "upc",
    "category",
];

/// Per-category output stream, set up on its first write
#[derive(Debug)]
struct CategoryStream {
    path: PathBuf,
    rows_written: u64,
}

impl CategoryStream {
    /// Opens the file for one batch, creating it with a header if it is new
    ///
    /// Returns the open file and whether the header still has to be written.
    fn open(path: &Path) -> OutputResult<(File, bool)> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => Ok((file, true)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let file = OpenOptions::new().append(true).open(path)?;
                Ok((file, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn append(&mut self, records: &[ProductRecord]) -> OutputResult<()> {
        let (file, write_header) = Self::open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        self.rows_written += records.len() as u64;
        Ok(())
    }
}

/// Filesystem-backed sink writing `category_<slug>.csv` files
#[derive(Debug)]
pub struct CsvSink {
    layout: OutputLayout,
    streams: HashMap<String, CategoryStream>,
}

impl CsvSink {
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            layout,
            streams: HashMap::new(),
        }
    }

    /// Rows appended to a category during this run
    pub fn rows_written(&self, category_slug: &str) -> u64 {
        self.streams
            .get(category_slug)
            .map(|s| s.rows_written)
            .unwrap_or(0)
    }

    /// Path of a category's file, if that category has been written to
    pub fn path_for(&self, category_slug: &str) -> Option<&Path> {
        self.streams.get(category_slug).map(|s| s.path.as_path())
    }
}

impl RecordSink for CsvSink {
    fn append_batch(
        &mut self,
        category: &Category,
        records: &[ProductRecord],
    ) -> OutputResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let layout = &self.layout;
        let stream = self
            .streams
            .entry(category.slug.clone())
            .or_insert_with(|| CategoryStream {
                path: layout.csv_path(&category.slug),
                rows_written: 0,
            });

        stream.append(records)?;

        tracing::debug!(
            "Appended {} rows to {}",
            records.len(),
            stream.path.display()
        );

        Ok(())
    }
}
