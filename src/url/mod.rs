//! URL handling module for Catalog-Harvest
//!
//! This module provides href resolution against the page an href was found on,
//! and the slug normalization used for output file names.

mod slug;

pub use slug::slugify;

use url::Url;

/// Resolves an href to an absolute URL against the given base
///
/// Resolution follows standard URL-joining semantics, so `../` segments are
/// applied relative to the base path and absolute hrefs replace the base
/// entirely.
///
/// Returns None for empty or whitespace-only hrefs and for hrefs that cannot
/// be joined.
///
/// # Examples
///
/// ```
/// use catalog_harvest::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://x/y/").unwrap();
/// let resolved = resolve_href(&base, "../z").unwrap();
/// assert_eq!(resolved.as_str(), "https://x/z");
/// ```
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    match base.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Failed to resolve href {:?} against {}: {}", href, base, e);
            None
        }
    }
}
