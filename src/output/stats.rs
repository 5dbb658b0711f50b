//! Statistics derived from a finished crawl
//!
//! This module summarizes a [`CrawlResult`] for display: item counts per
//! data type and per source page.

use crate::output::types::{CrawlResult, DataType};
use std::collections::{BTreeMap, HashMap};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Pages that produced a document
    pub pages_scraped: u32,

    /// Total number of items
    pub total_items: usize,

    /// Count of items by data type
    pub items_by_type: BTreeMap<DataType, usize>,

    /// Count of items by source page
    pub items_by_page: HashMap<String, usize>,

    /// Number of log lines emitted
    pub log_lines: usize,

    /// Terminal state label
    pub state: String,
}

impl CrawlStatistics {
    /// Builds statistics from a crawl result
    pub fn from_result(result: &CrawlResult) -> Self {
        let mut items_by_type = BTreeMap::new();
        let mut items_by_page = HashMap::new();

        for item in &result.items {
            *items_by_type.entry(item.data_type).or_insert(0) += 1;
            *items_by_page.entry(item.source_url.clone()).or_insert(0) += 1;
        }

        Self {
            pages_scraped: result.pages_scraped,
            total_items: result.items.len(),
            items_by_type,
            items_by_page,
            log_lines: result.logs.len(),
            state: result.state.to_string(),
        }
    }

    /// Returns the count for one data type (zero if absent)
    pub fn count(&self, data_type: DataType) -> usize {
        self.items_by_type.get(&data_type).copied().unwrap_or(0)
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Run state: {}", stats.state);
    println!("  Pages scraped: {}", stats.pages_scraped);
    println!("  Items collected: {}", stats.total_items);
    println!("  Log lines: {}", stats.log_lines);
    println!();

    if stats.total_items > 0 {
        println!("Items by Type:");
        for data_type in DataType::all() {
            let count = stats.count(data_type);
            if count == 0 {
                continue;
            }
            let percentage = (count as f64 / stats.total_items as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", data_type, count, percentage);
        }
        println!();

        println!("Items by Page:");
        // Sort pages by count (descending)
        let mut page_counts: Vec<_> = stats.items_by_page.iter().collect();
        page_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (page, count) in page_counts {
            println!("  {}: {}", page, count);
        }
        println!();
    }
}
