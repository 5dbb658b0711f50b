//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunState`: lifecycle of a whole crawl run (idle, running, terminal states)
//! - `PageOutcome`: what happened to an individual dequeued page

mod page_outcome;
mod run_state;

// Re-export main types
pub use page_outcome::PageOutcome;
pub use run_state::RunState;
