//! Configuration module for SiteSift
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and turning a configuration plus a start URL into a
//! [`CrawlRequest`].
//!
//! # Example
//!
//! ```no_run
//! use sitesift::config::{load_config, CrawlRequest};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitesift.toml")).unwrap();
//! let request = CrawlRequest::from_config("example.com", &config).unwrap();
//! println!("Crawling {} (max {} pages)", request.start_url, request.max_pages);
//! ```

mod parser;
mod request;
mod types;
mod validation;

// Re-export types
pub use request::CrawlRequest;
pub use types::{
    Config, ContentFilters, CrawlerConfig, DataTypeSelector, EffectiveFilters, TransportConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
