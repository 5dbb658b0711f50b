//! Run history boundary
//!
//! The coordinator reports every finished run to a [`HistoryStore`]. Keeping,
//! ordering and evicting records is the store's job; [`MemoryHistory`] is the
//! in-process implementation that keeps the most recent
//! [`MAX_HISTORY`] runs, newest first.

use crate::config::{ContentFilters, DataTypeSelector};
use crate::state::RunState;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// Number of records kept by [`MemoryHistory`]
pub const MAX_HISTORY: usize = 20;

/// Errors that can occur while recording history
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History store is unavailable: {0}")]
    Unavailable(String),

    #[error("History record rejected: {0}")]
    Rejected(String),
}

/// Result type for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Summary of one finished run
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Store-assigned id (empty until the store accepts the record)
    pub id: String,
    pub url: String,
    pub data_type: DataTypeSelector,
    pub content_filters: ContentFilters,
    pub pages_scraped: u32,
    pub items_found: usize,
    /// Terminal state of the run (`completed` or `cancelled`)
    pub status: RunState,
    pub created_at: DateTime<Utc>,
}

/// Receives a summary of every finished run
pub trait HistoryStore: Send + Sync {
    /// Records a finished run
    fn record(&self, entry: HistoryEntry) -> HistoryResult<()>;
}

/// In-memory history capped at [`MAX_HISTORY`] entries, newest first
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<VecDeque<HistoryEntry>>,
    next_id: AtomicU64,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the stored records, most recent first
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes one record; returns true if it existed
    pub fn delete(&self, id: &str) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    /// Removes every record
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<HistoryEntry>> {
        // A poisoned lock only means a reader panicked; the deque is still usable
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HistoryStore for MemoryHistory {
    fn record(&self, mut entry: HistoryEntry) -> HistoryResult<()> {
        if entry.url.is_empty() {
            return Err(HistoryError::Rejected("record has no URL".to_string()));
        }

        let seq = self.next_id.fetch_add(1, Ordering::Relaxed);
        entry.id = format!("{}-{}", entry.created_at.timestamp_millis(), seq);

        let mut entries = self.lock();
        entries.push_front(entry);
        entries.truncate(MAX_HISTORY);
        Ok(())
    }
}
