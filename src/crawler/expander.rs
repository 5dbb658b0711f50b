//! Link expansion
//!
//! Turns the anchors of a crawled page into new frontier entries one level
//! deeper, applying the crawl policy.

use crate::config::CrawlRequest;
use crate::crawler::extractor::anchor_selector;
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::url::{frontier_key, is_crawlable, resolve_reference, same_origin};
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// The parts of a crawl request that decide which links are followed
#[derive(Debug, Clone)]
pub struct ExpansionPolicy {
    pub start_url: Url,
    pub same_domain_only: bool,
    pub page_depth: u32,
}

impl ExpansionPolicy {
    pub fn from_request(request: &CrawlRequest) -> Self {
        Self {
            start_url: request.start_url.clone(),
            same_domain_only: request.same_domain_only,
            page_depth: request.page_depth,
        }
    }

    /// True if pages at `depth` may have their links followed
    pub fn allows_expansion(&self, depth: u32) -> bool {
        depth < self.page_depth
    }

    /// True if `url` passes the scheme and origin rules
    fn admits(&self, url: &Url) -> bool {
        is_crawlable(url) && (!self.same_domain_only || same_origin(url, &self.start_url))
    }
}

/// Collects follow-up entries from a page's anchors
///
/// Links are resolved against `page_url` and dropped when they fail to
/// resolve, use a scheme other than http/https, were already visited, or
/// (under the same-domain policy) point at another origin. Repeated links on
/// the same page collapse into one entry. The frontier is only read here;
/// the caller enqueues the returned entries.
///
/// Returns nothing when `current_depth` has reached the depth limit.
pub fn expand(
    document: &Html,
    page_url: &Url,
    current_depth: u32,
    policy: &ExpansionPolicy,
    frontier: &Frontier,
) -> Vec<FrontierEntry> {
    if !policy.allows_expansion(current_depth) {
        return Vec::new();
    }
    let Some(anchors) = anchor_selector() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    document
        .select(anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_reference(href, page_url))
        .filter(|url| policy.admits(url) && !frontier.is_visited(url))
        .filter(|url| seen.insert(frontier_key(url)))
        .map(|url| FrontierEntry::new(url, current_depth + 1))
        .collect()
}
