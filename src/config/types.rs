use serde::Deserialize;

/// Site crawled when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "https://books.toscrape.com/";

/// Main configuration structure for Catalog-Harvest
///
/// Every section and key is optional in the TOML file; missing values fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root; the homepage is fetched from here and category links are
    /// resolved against it
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Pause after every request (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "{}/{} (+https://github.com/catalog-harvest/catalog-harvest)",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
            timeout_secs: 20,
            delay_ms: 500,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for `csv/` and `images/`
    pub directory: String,

    /// Whether product images are downloaded
    #[serde(rename = "download-images")]
    pub download_images: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "outputs".to_string(),
            download_images: true,
        }
    }
}

/// Crawl scope configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Category names to crawl (case-insensitive exact match); empty means all
    pub categories: Vec<String>,

    /// Maximum listing pages per category; unset means follow pagination to the end
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u32>,
}

/// Values supplied on the command line, applied on top of the file config
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub categories: Option<Vec<String>>,
    pub max_pages: Option<u32>,
    pub delay_ms: Option<u64>,
    pub output_dir: Option<String>,
    pub no_images: bool,
}

impl Config {
    /// Applies command-line overrides; set values always win
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(base_url) = overrides.base_url {
            self.site.base_url = base_url;
        }
        if let Some(categories) = overrides.categories {
            self.crawl.categories = categories;
        }
        if let Some(max_pages) = overrides.max_pages {
            self.crawl.max_pages = Some(max_pages);
        }
        if let Some(delay_ms) = overrides.delay_ms {
            self.http.delay_ms = delay_ms;
        }
        if let Some(directory) = overrides.output_dir {
            self.output.directory = directory;
        }
        if overrides.no_images {
            self.output.download_images = false;
        }
    }
}
