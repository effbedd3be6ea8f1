use crate::url::slugify;
use std::path::{Path, PathBuf};

/// Directory layout of a run's output
///
/// ```text
/// <root>/csv/category_<slug>.csv
/// <root>/images/<slug>/<upc>_<slugified-title>.jpg
/// ```
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn csv_dir(&self) -> PathBuf {
        self.root.join("csv")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// CSV file holding every record of one category
    pub fn csv_path(&self, category_slug: &str) -> PathBuf {
        self.csv_dir().join(format!("category_{}.csv", category_slug))
    }

    /// Image file for one product, named after its UPC and title
    ///
    /// The name is deterministic, so the same product always maps to the same
    /// file, and always lies directly under `images/<category_slug>/`.
    /// `None` when the UPC has no usable characters.
    pub fn image_path(&self, category_slug: &str, upc: &str, title: &str) -> Option<PathBuf> {
        let file_name = image_file_name(upc, title)?;
        Some(self.images_dir().join(slugify(category_slug)).join(file_name))
    }
}

/// `<slugified-upc>_<slugified-title>.jpg`
///
/// Both parts come from scraped text, so both are reduced to `[a-z0-9-]`.
pub fn image_file_name(upc: &str, title: &str) -> Option<String> {
    let upc = slugify(upc);
    if upc.is_empty() {
        return None;
    }
    Some(format!("{}_{}.jpg", upc, slugify(title)))
}
