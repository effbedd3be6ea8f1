use url::Url;

/// Pagination cursor for one category's listing walk
///
/// Holds the page to fetch next and how many pages were already consumed.
/// A cursor with no current page is exhausted.
#[derive(Debug, Clone)]
pub struct PageCursor {
    current: Option<Url>,
    pages_seen: u32,
    max_pages: Option<u32>,
}

impl PageCursor {
    /// Creates a cursor starting at the category's first listing page
    pub fn new(start: Url, max_pages: Option<u32>) -> Self {
        Self {
            current: Some(start),
            pages_seen: 0,
            max_pages,
        }
    }

    /// Returns the page to fetch, or None once the walk is over
    ///
    /// The walk is over when there is no next page or the page limit was hit.
    pub fn current(&self) -> Option<&Url> {
        match self.max_pages {
            Some(limit) if self.pages_seen >= limit => None,
            _ => self.current.as_ref(),
        }
    }

    /// Moves to the next page found on the page just processed
    pub fn advance(&mut self, next: Option<Url>) {
        self.current = next;
        self.pages_seen += 1;
    }

    /// Number of pages consumed so far
    pub fn pages_seen(&self) -> u32 {
        self.pages_seen
    }
}
