//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The fetch transport with its strategy chain and retry loop
//! - Response classification and HTML parsing
//! - Content extraction and link expansion
//! - The breadth-first frontier
//! - Overall crawl coordination

mod context;
mod coordinator;
mod expander;
mod extractor;
mod fetcher;
mod frontier;
mod parser;

pub use context::{CrawlEvent, RunContext};
pub use coordinator::{run_crawl, Coordinator};
pub use expander::{expand, ExpansionPolicy};
pub use extractor::extract;
pub use fetcher::{
    build_http_client, FetchError, FetchStrategy, HttpStrategy, RedirectScope, StrategyKind,
    Transport, TransportError,
};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{
    classify_and_parse, has_markup_signature, Classified, ParseError, TextSample,
    TEXT_SAMPLE_CHARS,
};
