//! Result types produced by a crawl run
//!
//! These are what downstream consumers (display, export, history) receive:
//! the ordered item list, the log lines and the final counters.

use crate::state::RunState;
use chrono::{DateTime, Utc};
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Kind of an extracted item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    Heading,
    Paragraph,
    Image,
    Link,
    Table,
    Text,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heading => "Heading",
            Self::Paragraph => "Paragraph",
            Self::Image => "Image",
            Self::Link => "Link",
            Self::Table => "Table",
            Self::Text => "Text",
        }
    }

    /// Returns all data types in extraction order
    pub fn all() -> [Self; 6] {
        [
            Self::Heading,
            Self::Paragraph,
            Self::Image,
            Self::Link,
            Self::Table,
            Self::Text,
        ]
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of content found on a page
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedItem {
    /// Unique id: `<unix-millis>-<6 hex chars>`
    pub id: String,

    /// Item text; see the extractor for the per-type format
    pub content: String,

    /// The page the item was found on (never the resolved target)
    pub source_url: String,

    pub data_type: DataType,

    pub timestamp: DateTime<Utc>,
}

impl ExtractedItem {
    /// Creates an item stamped with a fresh id and the current time
    pub fn new(content: impl Into<String>, source_url: &Url, data_type: DataType) -> Self {
        let timestamp = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("{}-{}", timestamp.timestamp_millis(), &suffix[..6]),
            content: content.into(),
            source_url: source_url.to_string(),
            data_type,
            timestamp,
        }
    }
}

/// A timestamped log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Everything a crawl run hands back to its caller
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Items in discovery order
    pub items: Vec<ExtractedItem>,

    /// Pages that produced a document (markup or text)
    pub pages_scraped: u32,

    /// Log lines in emission order
    pub logs: Vec<LogEntry>,

    /// Final progress value in `[0, 100]`
    pub progress: f64,

    /// Terminal state of the run
    pub state: RunState,
}

impl CrawlResult {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the items of one data type, in discovery order
    pub fn items_of(&self, data_type: DataType) -> impl Iterator<Item = &ExtractedItem> {
        self.items
            .iter()
            .filter(move |item| item.data_type == data_type)
    }

    /// Returns true if any log line contains `needle`
    pub fn has_log_containing(&self, needle: &str) -> bool {
        self.logs.iter().any(|entry| entry.message.contains(needle))
    }
}
