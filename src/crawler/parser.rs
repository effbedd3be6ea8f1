//! HTML extractors for catalog pages
//!
//! This module maps the three kinds of catalog documents to structured data:
//! - The homepage → the ordered list of categories
//! - A listing page → product links plus the next listing page
//! - A product page → one `ProductRecord`
//!
//! Every extractor is a pure function of its inputs. Missing elements are
//! never errors: they show up as skipped entries or empty fields.

use crate::url::{resolve_href, slugify};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

/// Category links inside the sidebar navigation
const CATEGORY_LINKS: &str = "ul.nav-list ul li a";

/// Product title links on a listing page
const LISTING_PRODUCT_LINKS: &str = "article.product_pod h3 a";

/// Pagination "next" link on a listing page
const LISTING_NEXT_LINK: &str = "li.next a";

const PRODUCT_TITLE: &str = ".product_main h1";
const PRODUCT_PRICE: &str = ".product_main .price_color";
const PRODUCT_AVAILABILITY: &str = ".availability";
const PRODUCT_RATING: &str = ".product_main .star-rating";
const PRODUCT_INFO_ROWS: &str = "table.table.table-striped tr";
const PRODUCT_IMAGE: &str = "#product_gallery img";

/// Rating class tokens, checked in this order
const RATING_WORDS: [(&str, u8); 5] = [
    ("One", 1),
    ("Two", 2),
    ("Three", 3),
    ("Four", 4),
    ("Five", 5),
];

/// A named grouping of products with its own paginated listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Display name as shown in the navigation
    pub name: String,

    /// Absolute URL of the first listing page
    pub url: Url,

    /// Normalized identifier derived from the name
    pub slug: String,
}

/// Product links and pagination extracted from one listing page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingPage {
    /// Absolute product page URLs, in document order
    pub product_urls: Vec<Url>,

    /// Absolute URL of the next listing page, if any
    pub next_page: Option<Url>,
}

/// The fixed-schema representation of one product page
///
/// Field order matches the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    /// Product heading text; empty when the heading is missing
    pub title: String,

    /// Price as displayed (currency symbol included); empty when missing
    pub price: String,

    /// Stock text such as "In stock (22 available)"; empty when missing
    pub availability: String,

    /// Star rating in 0..=5; 0 when the rating cannot be read
    pub rating: u8,

    /// Absolute URL of the product page itself
    pub product_url: String,

    /// Absolute URL of the main image; empty when the page has no gallery image
    pub image_url: String,

    /// Universal product code from the information table; empty when missing
    pub upc: String,

    /// Category label the product was reached from
    pub category: String,
}

/// Extracts the category list from the homepage
///
/// Hrefs are resolved against `base_url` right away. Anchors without a
/// non-empty name or href are skipped, as they are navigation nodes rather
/// than categories.
///
/// # Example
///
/// ```
/// use catalog_harvest::crawler::extract_categories;
/// use url::Url;
///
/// let html = r#"<ul class="nav-list"><li><a href="books_1/index.html">Books</a>
///     <ul><li><a href="travel_2/index.html"> Travel </a></li></ul></li></ul>"#;
/// let base = Url::parse("https://books.toscrape.com/").unwrap();
/// let categories = extract_categories(html, &base);
/// assert_eq!(categories.len(), 1);
/// assert_eq!(categories[0].name, "Travel");
/// assert_eq!(categories[0].url.as_str(), "https://books.toscrape.com/travel_2/index.html");
/// ```
pub fn extract_categories(html: &str, base_url: &Url) -> Vec<Category> {
    let document = Html::parse_document(html);
    let mut categories = Vec::new();

    let Some(links) = selector(CATEGORY_LINKS) else {
        return categories;
    };

    for anchor in document.select(&links) {
        let name = own_text(anchor)
            .first()
            .map(|text| normalize_space(text))
            .unwrap_or_default();
        let href = anchor.value().attr("href").unwrap_or_default();

        if name.is_empty() || href.trim().is_empty() {
            tracing::debug!("Skipping navigation node without name or href");
            continue;
        }

        let Some(url) = resolve_href(base_url, href) else {
            continue;
        };

        let slug = slugify(&name);
        categories.push(Category { name, url, slug });
    }

    categories
}

/// Extracts product links and the next page link from a listing page
///
/// Links are resolved against `page_url`, since listing pages live at deeper
/// paths than the site root. `next_page` is None exactly when the page has
/// no pagination "next" link.
pub fn extract_listing(html: &str, page_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    let product_urls = selector(LISTING_PRODUCT_LINKS)
        .map(|sel| {
            document
                .select(&sel)
                .filter_map(|a| a.value().attr("href"))
                .filter_map(|href| resolve_href(page_url, href))
                .collect()
        })
        .unwrap_or_default();

    let next_page = select_first(&document, LISTING_NEXT_LINK)
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve_href(page_url, href));

    ListingPage {
        product_urls,
        next_page,
    }
}

/// Extracts a product record from a product page
///
/// Never fails: every missing piece of the page maps to the field's default
/// (see the field docs on `ProductRecord`). The image URL is resolved against
/// `product_url`.
pub fn extract_product(html: &str, product_url: &Url, category: &str) -> ProductRecord {
    let document = Html::parse_document(html);

    let title = select_first(&document, PRODUCT_TITLE)
        .map(|el| normalize_space(&own_text(el).join(" ")))
        .unwrap_or_default();

    let price = select_first(&document, PRODUCT_PRICE)
        .map(|el| normalize_space(&own_text(el).join(" ")))
        .unwrap_or_default();

    let availability = extract_availability(&document);

    let rating = select_first(&document, PRODUCT_RATING)
        .and_then(|el| el.value().attr("class"))
        .map(rating_from_class)
        .unwrap_or(0);

    let upc = extract_upc(&document);

    let image_url = select_first(&document, PRODUCT_IMAGE)
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| resolve_href(product_url, src))
        .map(|url| url.to_string())
        .unwrap_or_default();

    ProductRecord {
        title,
        price,
        availability,
        rating,
        product_url: product_url.to_string(),
        image_url,
        upc,
        category: category.to_string(),
    }
}

/// Maps a rating element's class attribute to a star count
///
/// Tokens are matched case-sensitively against One..Five, in that order.
/// Returns 0 when none of them is present.
pub fn rating_from_class(class_attr: &str) -> u8 {
    let tokens: Vec<&str> = class_attr.split_whitespace().collect();

    RATING_WORDS
        .iter()
        .find(|(word, _)| tokens.contains(word))
        .map(|(_, stars)| *stars)
        .unwrap_or(0)
}

fn extract_availability(document: &Html) -> String {
    let Some(sel) = selector(PRODUCT_AVAILABILITY) else {
        return String::new();
    };

    document
        .select(&sel)
        .flat_map(own_text)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Finds the first information table row labelled exactly "UPC"
///
/// The label is the header cell's first text node, compared as-is.
fn extract_upc(document: &Html) -> String {
    let (Some(rows), Some(th), Some(td)) = (
        selector(PRODUCT_INFO_ROWS),
        selector("th"),
        selector("td"),
    ) else {
        return String::new();
    };

    for row in document.select(&rows) {
        let label = row
            .select(&th)
            .next()
            .and_then(|el| own_text(el).into_iter().next());

        if label == Some("UPC") {
            return row
                .select(&td)
                .next()
                .map(|el| own_text(el).join("").trim().to_string())
                .unwrap_or_default();
        }
    }

    String::new()
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    document.select(&sel).next()
}

/// Text nodes that are direct children of the element
fn own_text(element: ElementRef<'_>) -> Vec<&str> {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect()
}

fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
