use crate::config::types::{Config, ContentFilters, EffectiveFilters};
use crate::url::normalize_start_url;
use crate::{ConfigError, SiftError};
use url::Url;

/// Parameters of a single crawl run
///
/// Built once before the run starts and shared read-only with the
/// coordinator; nothing mutates it while a crawl is in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlRequest {
    /// Normalized absolute start URL
    pub start_url: Url,

    /// Page budget (positive)
    pub max_pages: u32,

    /// Depth budget (positive); the start URL is depth 1
    pub page_depth: u32,

    /// Restrict expansion to the start URL's origin
    pub same_domain_only: bool,

    /// Requested content filters
    pub filters: ContentFilters,
}

impl CrawlRequest {
    /// Creates a request with default limits and filters
    ///
    /// The start URL goes through [`normalize_start_url`], so a bare host such
    /// as `example.com` becomes `https://example.com/`.
    ///
    /// # Errors
    ///
    /// Returns `SiftError::UrlError` if the URL cannot be used; no page is
    /// fetched in that case.
    pub fn new(start_url: &str) -> Result<Self, SiftError> {
        Self::from_config(start_url, &Config::default())
    }

    /// Creates a request taking limits and filters from a configuration
    pub fn from_config(start_url: &str, config: &Config) -> Result<Self, SiftError> {
        let request = Self {
            start_url: normalize_start_url(start_url)?,
            max_pages: config.crawler.max_pages,
            page_depth: config.crawler.page_depth,
            same_domain_only: config.crawler.same_domain_only,
            filters: config.filters,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_page_depth(mut self, page_depth: u32) -> Self {
        self.page_depth = page_depth;
        self
    }

    pub fn with_same_domain_only(mut self, same_domain_only: bool) -> Self {
        self.same_domain_only = same_domain_only;
        self
    }

    pub fn with_filters(mut self, filters: ContentFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Checks the numeric limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages == 0 {
            return Err(ConfigError::Validation(
                "max_pages must be a positive integer".to_string(),
            ));
        }
        if self.page_depth == 0 {
            return Err(ConfigError::Validation(
                "page_depth must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the extraction passes that will run for this request
    pub fn effective_filters(&self) -> EffectiveFilters {
        self.filters.effective()
    }
}
