//! Output module for crawl results
//!
//! This module handles:
//! - The item, log and result types handed back by a crawl
//! - The history boundary every finished run is reported to
//! - Summary statistics for display

mod history;
pub mod stats;
mod types;

pub use history::{
    HistoryEntry, HistoryError, HistoryResult, HistoryStore, MemoryHistory, MAX_HISTORY,
};
pub use stats::{print_statistics, CrawlStatistics};
pub use types::{CrawlResult, DataType, ExtractedItem, LogEntry};
