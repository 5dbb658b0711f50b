//! Breadth-first crawl frontier
//!
//! A FIFO queue of `(url, depth)` entries plus the visited set. An entry is
//! never queued twice and never queued once its URL has been visited; keys
//! ignore the URL fragment.

use crate::url::frontier_key;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be crawled, with the depth it was discovered at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,

    /// 1 for the start URL, parent depth + 1 for discovered links
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }
}

/// FIFO frontier with visited/queued bookkeeping
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier seeded with the start URL at depth 1
    pub fn seeded(start_url: Url) -> Self {
        let mut frontier = Self::new();
        frontier.enqueue(start_url, 1);
        frontier
    }

    /// Adds an entry to the back of the queue
    ///
    /// Returns false (and does nothing) if the URL is already visited or
    /// already waiting in the queue.
    pub fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        let key = frontier_key(&url);
        if self.visited.contains(&key) || !self.queued.insert(key) {
            return false;
        }

        self.queue.push_back(FrontierEntry::new(url, depth));
        true
    }

    /// Removes and returns the oldest entry
    pub fn dequeue(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.queued.remove(&frontier_key(&entry.url));
        Some(entry)
    }

    /// Records that a URL has been taken for fetching
    pub fn mark_visited(&mut self, url: &Url) {
        self.visited.insert(frontier_key(url));
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(&frontier_key(url))
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
