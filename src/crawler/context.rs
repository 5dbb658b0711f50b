//! Per-run context shared with every crawl component
//!
//! Holds the append-only log list and the progress value of one run, and
//! forwards both to an optional event channel as they change. Each log line
//! is mirrored to `tracing` at the matching level.

use crate::output::LogEntry;
use crate::state::RunState;
use tokio::sync::mpsc::UnboundedSender;

/// Live event emitted while a crawl runs
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    /// A log line was appended
    Log(LogEntry),

    /// Progress changed (0 to 100)
    Progress(f64),

    /// The run entered a new state
    State(RunState),
}

/// Log and progress state for one run
#[derive(Debug, Default)]
pub struct RunContext {
    logs: Vec<LogEntry>,
    progress: f64,
    events: Option<UnboundedSender<CrawlEvent>>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context that also streams events to `events`
    pub fn with_events(events: UnboundedSender<CrawlEvent>) -> Self {
        Self {
            events: Some(events),
            ..Self::default()
        }
    }

    /// Clears logs and progress for a fresh run; the event channel is kept
    pub fn reset(&mut self) {
        self.logs.clear();
        self.progress = 0.0;
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("{}", message);
        self.push(message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.push(message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.push(message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.push(message);
    }

    /// Sets progress, clamped to `[0, 100]`
    pub fn set_progress(&mut self, progress: f64) {
        self.progress = progress.clamp(0.0, 100.0);
        self.emit(CrawlEvent::Progress(self.progress));
    }

    /// Announces a state change to the event channel
    pub fn announce_state(&self, state: RunState) {
        self.emit(CrawlEvent::State(state));
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    fn push(&mut self, message: String) {
        let entry = LogEntry::new(message);
        self.emit(CrawlEvent::Log(entry.clone()));
        self.logs.push(entry);
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(events) = &self.events {
            // Receiver may have gone away; the run continues regardless
            let _ = events.send(event);
        }
    }
}
