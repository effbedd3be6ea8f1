/// Normalizes a display name into a filesystem and URL safe identifier
///
/// The name is lowercased, every run of characters outside `[a-z0-9]` is
/// collapsed into a single `-`, and leading or trailing dashes are removed.
///
/// # Examples
///
/// ```
/// use catalog_harvest::url::slugify;
///
/// assert_eq!(slugify("Historical Fiction"), "historical-fiction");
/// assert_eq!(slugify("  Sequential Art!! "), "sequential-art");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}
