use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Main configuration structure for SiteSift
///
/// Every section is optional; missing sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub filters: ContentFilters,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawl limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages to scrape in one run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Maximum BFS depth; the start URL is depth 1
    #[serde(rename = "page-depth")]
    pub page_depth: u32,

    /// Only follow links sharing the start URL's origin
    #[serde(rename = "same-domain-only")]
    pub same_domain_only: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            page_depth: 1,
            same_domain_only: true,
        }
    }
}

/// Which kinds of content to extract from each page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContentFilters {
    /// Extract `h1`..`h6` text
    pub headings: bool,

    /// Extract `p` text
    pub paragraphs: bool,

    /// Extract `img[src]` targets
    pub images: bool,

    /// Extract `a[href]` targets
    pub links: bool,

    /// Data-type selector; see [`EffectiveFilters`] for how it combines with
    /// the booleans above
    #[serde(rename = "data-type")]
    pub data_type: DataTypeSelector,
}

impl Default for ContentFilters {
    fn default() -> Self {
        Self {
            headings: true,
            paragraphs: true,
            images: false,
            links: false,
            data_type: DataTypeSelector::Text,
        }
    }
}

impl ContentFilters {
    /// Resolves the booleans and the selector into the passes that will run
    pub fn effective(&self) -> EffectiveFilters {
        EffectiveFilters::from(*self)
    }
}

/// Data-type selector offered next to the per-filter booleans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataTypeSelector {
    #[default]
    Text,
    Images,
    Links,
    Tables,
    All,
}

impl DataTypeSelector {
    /// Returns the lowercase name used in configuration and history records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Images => "images",
            Self::Links => "links",
            Self::Tables => "tables",
            Self::All => "all",
        }
    }

    /// Parses a selector name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "images" => Some(Self::Images),
            "links" => Some(Self::Links),
            "tables" => Some(Self::Tables),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

impl fmt::Display for DataTypeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The extraction passes that actually run for a request
///
/// Precedence rule: the selector can only switch a pass on, never off.
///
/// | Pass | Enabled when |
/// |------|--------------|
/// | headings | `headings` |
/// | paragraphs | `paragraphs` |
/// | images | `images` or selector is `images` |
/// | links | `links` or selector is `links` |
/// | tables | selector is `tables`, `all` or `text` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveFilters {
    pub headings: bool,
    pub paragraphs: bool,
    pub images: bool,
    pub links: bool,
    pub tables: bool,
}

impl From<ContentFilters> for EffectiveFilters {
    fn from(filters: ContentFilters) -> Self {
        let selector = filters.data_type;
        Self {
            headings: filters.headings,
            paragraphs: filters.paragraphs,
            images: filters.images || selector == DataTypeSelector::Images,
            links: filters.links || selector == DataTypeSelector::Links,
            tables: matches!(
                selector,
                DataTypeSelector::Tables | DataTypeSelector::All | DataTypeSelector::Text
            ),
        }
    }
}

/// Fetch transport tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Strategy names in the order they are tried
    pub strategies: Vec<String>,

    /// Attempts per strategy before moving to the next one
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Timeout for a single attempt (milliseconds)
    #[serde(rename = "attempt-timeout-ms")]
    pub attempt_timeout_ms: u64,

    /// Linear backoff step between attempts (milliseconds); attempt `n`
    /// waits `n * backoff-step-ms` after failing
    #[serde(rename = "backoff-step-ms")]
    pub backoff_step_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            strategies: vec![
                "direct".to_string(),
                "allorigins".to_string(),
                "jina".to_string(),
            ],
            max_attempts: 2,
            attempt_timeout_ms: 5000,
            backoff_step_ms: 300,
        }
    }
}

impl TransportConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SiteSift".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}
