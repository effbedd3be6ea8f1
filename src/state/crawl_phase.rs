/// Crawl phase definitions for tracking driver progress
///
/// The driver walks one linear path per category: fetch a listing page,
/// extract its records, persist them, then either fetch the next page or
/// finish the category.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Nothing has been fetched yet
    Idle,

    /// The homepage was parsed and the category selection is known
    CategoriesDiscovered,

    /// A listing page was fetched and parsed
    PageFetched,

    /// Product pages for the current listing page were extracted
    RecordsExtracted,

    /// The current batch was appended to the category sink
    Persisted,

    /// The pagination walk for the current category ended
    CategoryDone,

    /// Every selected category was processed (or none was selected)
    AllDone,
}

impl CrawlPhase {
    /// Returns true if moving from this phase to `next` is a legal step
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        matches!(
            (self, next),
            (Idle, CategoriesDiscovered)
                | (CategoriesDiscovered, PageFetched)
                | (CategoriesDiscovered, AllDone)
                | (PageFetched, RecordsExtracted)
                | (RecordsExtracted, Persisted)
                | (Persisted, PageFetched)
                | (Persisted, CategoryDone)
                | (CategoryDone, PageFetched)
                | (CategoryDone, AllDone)
        )
    }

    /// Returns true once the run has nothing left to do
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AllDone)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CategoriesDiscovered => "categories_discovered",
            Self::PageFetched => "page_fetched",
            Self::RecordsExtracted => "records_extracted",
            Self::Persisted => "persisted",
            Self::CategoryDone => "category_done",
            Self::AllDone => "all_done",
        }
    }

    /// Returns all phases in run order
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::CategoriesDiscovered,
            Self::PageFetched,
            Self::RecordsExtracted,
            Self::Persisted,
            Self::CategoryDone,
            Self::AllDone,
        ]
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
