//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the other components
//! together:
//! - Resetting run state and seeding the frontier
//! - Fetching pages through the transport
//! - Classifying, extracting and expanding each page
//! - Tracking progress, cancellation and the terminal state
//! - Handing a summary of the run to the history store

use crate::config::{Config, CrawlRequest, EffectiveFilters};
use crate::crawler::context::{CrawlEvent, RunContext};
use crate::crawler::expander::{expand, ExpansionPolicy};
use crate::crawler::extractor::extract;
use crate::crawler::fetcher::{panic_message, RedirectScope, Transport, TransportError};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::{classify_and_parse, Classified, ParseError};
use crate::output::{CrawlResult, DataType, ExtractedItem, HistoryEntry, HistoryStore};
use crate::state::{PageOutcome, RunState};
use crate::SiftError;
use chrono::Utc;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// What one page contributed, computed synchronously from its body
enum Digest {
    Markup {
        items: Vec<ExtractedItem>,
        links: Vec<FrontierEntry>,
    },
    Text(Option<ExtractedItem>),
}

/// A page outcome, or the message of a fault that ends the run
type PageStep = std::result::Result<PageOutcome, String>;

/// Main crawler coordinator structure
pub struct Coordinator {
    request: Arc<CrawlRequest>,
    transport: Transport,
    history: Option<Arc<dyn HistoryStore>>,
    cancel: CancellationToken,
    ctx: RunContext,
    state: RunState,
    frontier: Frontier,
    items: Vec<ExtractedItem>,
    pages_scraped: u32,
}

impl Coordinator {
    /// Creates a new coordinator in the `Idle` state
    ///
    /// # Arguments
    ///
    /// * `request` - The crawl parameters; fixed for the coordinator's lifetime
    /// * `transport` - The fetch strategy chain
    pub fn new(request: CrawlRequest, transport: Transport) -> Self {
        let frontier = Frontier::seeded(request.start_url.clone());
        Self {
            request: Arc::new(request),
            transport,
            history: None,
            cancel: CancellationToken::new(),
            ctx: RunContext::new(),
            state: RunState::Idle,
            frontier,
            items: Vec::new(),
            pages_scraped: 0,
        }
    }

    /// Reports every completed or cancelled run to `history`
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    /// Streams log lines, progress and state changes to `events`
    pub fn with_events(mut self, events: UnboundedSender<CrawlEvent>) -> Self {
        self.ctx = RunContext::with_events(events);
        self
    }

    /// Uses `token` to stop the run early
    ///
    /// A cancelled token stays cancelled, so install a fresh one before
    /// running the same coordinator again.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns a handle that cancels the run when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn request(&self) -> &CrawlRequest {
        &self.request
    }

    /// Runs one crawl to a terminal state
    ///
    /// This never fails: fetch and parse faults skip the page, cancellation
    /// and fatal faults end the run early, and whatever was collected is
    /// returned in the result.
    pub async fn run(&mut self) -> CrawlResult {
        if let Err(e) = self.enter(RunState::Running) {
            // A previous run future was dropped before reaching a terminal state
            tracing::warn!("{}; starting a fresh run", e);
            self.state = RunState::Running;
            self.ctx.announce_state(RunState::Running);
        }
        self.reset();

        let request = Arc::clone(&self.request);
        if let Err(e) = request.validate() {
            self.ctx.error(format!("Invalid crawl request: {}", e));
            return self.finish(RunState::Fatal);
        }

        self.ctx.info(format!(
            "Starting crawl of {} (max {} page(s), depth {}, {})",
            request.start_url,
            request.max_pages,
            request.page_depth,
            if request.same_domain_only {
                "same domain only"
            } else {
                "all domains"
            }
        ));

        let filters = request.effective_filters();
        let policy = ExpansionPolicy::from_request(&request);

        let terminal = loop {
            if self.cancel.is_cancelled() {
                break RunState::Cancelled;
            }
            if self.pages_scraped >= request.max_pages {
                break RunState::Completed;
            }
            let Some(entry) = self.frontier.dequeue() else {
                break RunState::Completed;
            };
            if self.frontier.is_visited(&entry.url) {
                continue;
            }
            self.frontier.mark_visited(&entry.url);

            match self.process_page(&entry, &filters, &policy).await {
                Ok(PageOutcome::Cancelled) => break RunState::Cancelled,
                Ok(outcome) if outcome.counts_as_scraped() => {
                    self.pages_scraped += 1;
                    self.ctx.info(format!("Page {} {}", entry.url, outcome));
                    self.ctx
                        .set_progress(progress_for(self.pages_scraped, request.max_pages));
                }
                Ok(outcome) => {
                    self.ctx.warn(format!("Skipped {}: {}", entry.url, outcome));
                }
                Err(message) => {
                    self.ctx
                        .error(format!("Fatal error while crawling {}: {}", entry.url, message));
                    break RunState::Fatal;
                }
            }
        };

        self.finish(terminal)
    }

    /// Fetches and digests one page
    async fn process_page(
        &mut self,
        entry: &FrontierEntry,
        filters: &EffectiveFilters,
        policy: &ExpansionPolicy,
    ) -> PageStep {
        self.ctx
            .debug(format!("Fetching {} (depth {})", entry.url, entry.depth));

        let body = match self
            .transport
            .fetch(&entry.url, &mut self.ctx, &self.cancel)
            .await
        {
            Ok(body) => body,
            Err(e) if e.is_fatal() => return Err(e.to_string()),
            Err(TransportError::Exhausted { attempts }) => {
                return Ok(PageOutcome::FetchFailed { attempts })
            }
            Err(_) => return Ok(PageOutcome::Cancelled),
        };

        let frontier = &self.frontier;
        let digested = std::panic::catch_unwind(AssertUnwindSafe(|| {
            digest_page(&body, entry, filters, policy, frontier)
        }));

        match digested {
            Err(payload) => Err(format!(
                "panic while processing page: {}",
                panic_message(payload.as_ref())
            )),
            Ok(Err(e)) => Ok(PageOutcome::ParseFailed {
                reason: e.to_string(),
            }),
            Ok(Ok(Digest::Text(sample))) => {
                let recorded = sample.is_some();
                self.items.extend(sample);
                Ok(PageOutcome::TextSample { recorded })
            }
            Ok(Ok(Digest::Markup { items, links })) => {
                let item_count = items.len();
                self.items.extend(items);

                let enqueued = links
                    .into_iter()
                    .filter(|link| self.frontier.enqueue(link.url.clone(), link.depth))
                    .count();

                Ok(PageOutcome::Scraped {
                    items: item_count,
                    enqueued,
                })
            }
        }
    }

    /// Clears everything a previous run left behind
    fn reset(&mut self) {
        self.ctx.reset();
        self.ctx.set_progress(0.0);
        self.frontier = Frontier::seeded(self.request.start_url.clone());
        self.items.clear();
        self.pages_scraped = 0;
    }

    /// Moves to `next`, announcing the change
    fn enter(&mut self, next: RunState) -> Result<(), SiftError> {
        if !self.state.can_transition_to(next) {
            return Err(SiftError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        self.ctx.announce_state(next);
        Ok(())
    }

    /// Enters the terminal state and assembles the result
    fn finish(&mut self, terminal: RunState) -> CrawlResult {
        let item_count = self.items.len();
        match terminal {
            RunState::Completed => {
                self.ctx.set_progress(100.0);
                self.ctx.info(format!(
                    "Crawl finished: {} page(s), {} item(s) collected",
                    self.pages_scraped, item_count
                ));
            }
            RunState::Cancelled => {
                self.ctx.warn(format!(
                    "Crawl cancelled: {} page(s), {} item(s) collected",
                    self.pages_scraped, item_count
                ));
            }
            _ => {}
        }

        if terminal.is_success() {
            self.record_history(terminal);
        }

        if let Err(e) = self.enter(terminal) {
            tracing::error!("{}", e);
        }

        CrawlResult {
            items: std::mem::take(&mut self.items),
            pages_scraped: self.pages_scraped,
            logs: self.ctx.logs().to_vec(),
            progress: self.ctx.progress(),
            state: self.state,
        }
    }

    /// Hands the run summary to the history store, if one is attached
    fn record_history(&mut self, status: RunState) {
        let Some(history) = &self.history else {
            return;
        };

        let entry = HistoryEntry {
            id: String::new(),
            url: self.request.start_url.to_string(),
            data_type: self.request.filters.data_type,
            content_filters: self.request.filters,
            pages_scraped: self.pages_scraped,
            items_found: self.items.len(),
            status,
            created_at: Utc::now(),
        };

        if let Err(e) = history.record(entry) {
            self.ctx.warn(format!("Could not save history: {}", e));
        }
    }
}

/// Classifies a body and runs extraction and expansion on it
///
/// Kept synchronous so the parsed document never lives across an await.
fn digest_page(
    body: &str,
    entry: &FrontierEntry,
    filters: &EffectiveFilters,
    policy: &ExpansionPolicy,
    frontier: &Frontier,
) -> Result<Digest, ParseError> {
    match classify_and_parse(body)? {
        Classified::Markup(document) => Ok(Digest::Markup {
            items: extract(&document, filters, &entry.url),
            links: expand(&document, &entry.url, entry.depth, policy, frontier),
        }),
        Classified::Text(sample) => Ok(Digest::Text(
            sample.map(|s| ExtractedItem::new(s.content, &entry.url, DataType::Text)),
        )),
    }
}

/// Progress after `pages` of `max_pages`, capped at 100
fn progress_for(pages: u32, max_pages: u32) -> f64 {
    if max_pages == 0 {
        return 100.0;
    }
    (f64::from(pages) / f64::from(max_pages) * 100.0).min(100.0)
}

/// Convenience function to run a crawl from a request and configuration
///
/// Builds the transport from the `[transport]` and `[user-agent]` sections
/// and runs a single crawl without history or event streaming.
///
/// # Returns
///
/// * `Ok(CrawlResult)` - The crawl ran (whatever its terminal state)
/// * `Err(SiftError)` - The transport could not be built
///
/// # Example
///
/// ```no_run
/// use sitesift::config::{load_config, CrawlRequest};
/// use sitesift::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("sitesift.toml"))?;
/// let request = CrawlRequest::from_config("example.com", &config)?;
/// let result = run_crawl(request, &config).await?;
/// println!("{} items", result.item_count());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(request: CrawlRequest, config: &Config) -> Result<CrawlResult, SiftError> {
    let redirects = RedirectScope::for_crawl(request.same_domain_only);
    let transport = Transport::from_config_scoped(config, redirects)?;
    let mut coordinator = Coordinator::new(request, transport);
    Ok(coordinator.run().await)
}
