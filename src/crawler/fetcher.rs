//! Fetch transport
//!
//! This module turns a page URL into a response body, including:
//! - Building the HTTP client with a proper user agent string
//! - The built-in fetch strategies (direct request and two public proxies)
//! - A bounded retry loop per strategy with linear backoff
//! - Falling through to the next strategy once one is exhausted
//! - Per-attempt timeouts and cancellation
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | 2xx with a body | Return the body |
//! | Non-2xx, network error, timeout, empty body | Log, back off, retry |
//! | Redirect off the requested origin (same-origin scope) | Give up on the page |
//! | Retries for a strategy exhausted | Move to the next strategy |
//! | Every strategy exhausted | `TransportError::Exhausted` |
//! | Cancellation requested | `TransportError::Cancelled` immediately |
//! | Strategy panicked | `TransportError::StrategyPanicked` (fatal for the run) |

use crate::config::{Config, UserAgentConfig};
use crate::crawler::context::RunContext;
use crate::url::same_origin;
use crate::SiftError;
use async_trait::async_trait;
use futures::FutureExt;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Default public endpoint of the allorigins proxy
const ALLORIGINS_ENDPOINT: &str = "https://api.allorigins.win/raw";

/// Default public endpoint of the jina reader proxy
const JINA_ENDPOINT: &str = "https://r.jina.ai/";

/// Redirect hops followed before a request fails
const MAX_REDIRECTS: usize = 10;

/// Why a single fetch attempt failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("empty response body")]
    EmptyBody,

    #[error("cannot build request URL: {0}")]
    InvalidTarget(String),

    #[error("redirect to another origin not followed: {0}")]
    ForeignRedirect(String),
}

impl FetchError {
    /// Returns false when another attempt cannot change the answer
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ForeignRedirect(_))
    }
}

/// Why a whole transport call failed
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("all {attempts} fetch attempts failed")]
    Exhausted { attempts: u32 },

    #[error("fetch cancelled")]
    Cancelled,

    #[error("fetch strategy '{strategy}' panicked: {message}")]
    StrategyPanicked { strategy: String, message: String },
}

impl TransportError {
    /// Returns true for faults that must stop the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StrategyPanicked { .. })
    }
}

/// Which redirects the HTTP client follows on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectScope {
    /// Follow any redirect up to the hop limit
    Any,
    /// Stop at the first hop that leaves the origin of the requested URL
    SameOrigin,
}

impl RedirectScope {
    /// The scope matching a crawl's domain policy
    pub fn for_crawl(same_domain_only: bool) -> Self {
        if same_domain_only {
            Self::SameOrigin
        } else {
            Self::Any
        }
    }

    fn policy(self) -> Policy {
        match self {
            Self::Any => Policy::limited(MAX_REDIRECTS),
            Self::SameOrigin => Policy::custom(|attempt| {
                if attempt.previous().len() >= MAX_REDIRECTS {
                    return attempt.error("too many redirects");
                }
                let leaves_origin = attempt
                    .previous()
                    .first()
                    .map_or(false, |requested| !same_origin(requested, attempt.url()));
                if leaves_origin {
                    attempt.stop()
                } else {
                    attempt.follow()
                }
            }),
        }
    }
}

/// One way of retrieving a page body
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Fetches the body for `target`; timeouts are enforced by the caller
    async fn fetch(&self, target: &Url) -> Result<String, FetchError>;
}

/// The built-in strategy kinds, addressable by name from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Plain GET of the target URL
    Direct,
    /// `https://api.allorigins.win/raw?url=<target>`
    AllOrigins,
    /// `https://r.jina.ai/http://<target without scheme>`
    Jina,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::AllOrigins => "allorigins",
            Self::Jina => "jina",
        }
    }

    /// Parses a strategy name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "direct" => Some(Self::Direct),
            "allorigins" => Some(Self::AllOrigins),
            "jina" => Some(Self::Jina),
            _ => None,
        }
    }

    fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            Self::Direct => None,
            Self::AllOrigins => Some(ALLORIGINS_ENDPOINT),
            Self::Jina => Some(JINA_ENDPOINT),
        }
    }
}

/// HTTP-backed strategy: direct or through one of the named proxies
#[derive(Debug, Clone)]
pub struct HttpStrategy {
    kind: StrategyKind,
    client: Client,
    endpoint: Option<String>,
}

impl HttpStrategy {
    pub fn new(kind: StrategyKind, client: Client) -> Self {
        Self {
            kind,
            client,
            endpoint: kind.default_endpoint().map(str::to_string),
        }
    }

    pub fn direct(client: Client) -> Self {
        Self::new(StrategyKind::Direct, client)
    }

    pub fn all_origins(client: Client) -> Self {
        Self::new(StrategyKind::AllOrigins, client)
    }

    pub fn jina(client: Client) -> Self {
        Self::new(StrategyKind::Jina, client)
    }

    /// Points a proxy strategy at a different endpoint (ignored for `Direct`)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        if self.kind != StrategyKind::Direct {
            self.endpoint = Some(endpoint.into());
        }
        self
    }

    /// Builds the URL actually requested for `target`
    pub fn request_url(&self, target: &Url) -> Result<Url, FetchError> {
        let endpoint = match (&self.kind, &self.endpoint) {
            (StrategyKind::Direct, _) => return Ok(target.clone()),
            (_, Some(endpoint)) => endpoint.as_str(),
            (kind, None) => {
                return Err(FetchError::InvalidTarget(format!(
                    "no endpoint configured for {}",
                    kind.as_str()
                )))
            }
        };

        match self.kind {
            StrategyKind::AllOrigins => Url::parse_with_params(endpoint, &[("url", target.as_str())])
                .map_err(|e| FetchError::InvalidTarget(e.to_string())),
            StrategyKind::Jina => {
                let without_scheme = target
                    .as_str()
                    .strip_prefix("https://")
                    .or_else(|| target.as_str().strip_prefix("http://"))
                    .unwrap_or(target.as_str());
                let separator = if endpoint.ends_with('/') { "" } else { "/" };
                Url::parse(&format!("{}{}http://{}", endpoint, separator, without_scheme))
                    .map_err(|e| FetchError::InvalidTarget(e.to_string()))
            }
            StrategyKind::Direct => Ok(target.clone()),
        }
    }
}

#[async_trait]
impl FetchStrategy for HttpStrategy {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    async fn fetch(&self, target: &Url) -> Result<String, FetchError> {
        let request_url = self.request_url(target)?;

        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        // A redirect only reaches us when the client policy refused to follow it
        if status.is_redirection() {
            if let Some(location) = response.headers().get(LOCATION) {
                let location = location.to_str().unwrap_or("<non-ascii location>");
                return Err(FetchError::ForeignRedirect(location.to_string()));
            }
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(classify_reqwest_error)?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        Ok(body)
    }
}

/// Maps a reqwest error onto the attempt error taxonomy
fn classify_reqwest_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if let Some(status) = error.status() {
        FetchError::Status(status.as_u16())
    } else {
        FetchError::Network(error.to_string())
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Overall request timeout; the transport also enforces its
///   own per-attempt timeout around every strategy call
/// * `redirects` - Which redirects the client may follow
///
/// # Example
///
/// ```no_run
/// use sitesift::config::UserAgentConfig;
/// use sitesift::crawler::{build_http_client, RedirectScope};
/// use std::time::Duration;
///
/// let client = build_http_client(
///     &UserAgentConfig::default(),
///     Duration::from_secs(5),
///     RedirectScope::SameOrigin,
/// )
/// .unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
    redirects: RedirectScope,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(redirects.policy())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Outcome of one guarded attempt
enum AttemptError {
    Failed(FetchError),
    Panicked(String),
}

/// Ordered chain of fetch strategies with bounded retry
pub struct Transport {
    strategies: Vec<Box<dyn FetchStrategy>>,
    max_attempts: u32,
    attempt_timeout: Duration,
    backoff_step: Duration,
}

impl Transport {
    /// Creates a transport with 2 attempts per strategy, a 5s attempt
    /// timeout and a 300ms backoff step
    pub fn new(strategies: Vec<Box<dyn FetchStrategy>>) -> Self {
        Self {
            strategies,
            max_attempts: 2,
            attempt_timeout: Duration::from_secs(5),
            backoff_step: Duration::from_millis(300),
        }
    }

    /// Builds the HTTP strategies named in the configuration, in order
    ///
    /// Redirects follow the configured `same_domain_only` policy.
    pub fn from_config(config: &Config) -> Result<Self, SiftError> {
        Self::from_config_scoped(
            config,
            RedirectScope::for_crawl(config.crawler.same_domain_only),
        )
    }

    /// Same as [`Transport::from_config`] with an explicit redirect scope
    pub fn from_config_scoped(config: &Config, redirects: RedirectScope) -> Result<Self, SiftError> {
        let transport_config = &config.transport;
        let client = build_http_client(
            &config.user_agent,
            transport_config.attempt_timeout(),
            redirects,
        )?;

        let strategies = transport_config
            .strategies
            .iter()
            .map(|name| {
                StrategyKind::from_name(name)
                    .map(|kind| Box::new(HttpStrategy::new(kind, client.clone())) as Box<dyn FetchStrategy>)
                    .ok_or_else(|| crate::ConfigError::UnknownStrategy(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(strategies)
            .with_max_attempts(transport_config.max_attempts)
            .with_attempt_timeout(transport_config.attempt_timeout())
            .with_backoff_step(transport_config.backoff_step()))
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    /// Strategy names in the order they are tried
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Fetches `url`, walking the strategy chain until one attempt succeeds
    ///
    /// Every attempt logs one line to `ctx` naming the strategy, the attempt
    /// number and the outcome.
    pub async fn fetch(
        &self,
        url: &Url,
        ctx: &mut RunContext,
        cancel: &CancellationToken,
    ) -> Result<String, TransportError> {
        let mut attempts_made = 0;

        for (index, strategy) in self.strategies.iter().enumerate() {
            let last_strategy = index + 1 == self.strategies.len();

            for attempt in 1..=self.max_attempts {
                if cancel.is_cancelled() {
                    return Err(TransportError::Cancelled);
                }
                attempts_made += 1;

                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                    outcome = self.attempt(strategy.as_ref(), url) => outcome,
                };

                match outcome {
                    Ok(body) => {
                        ctx.debug(format!(
                            "Fetch attempt {}/{} via {} succeeded ({} bytes)",
                            attempt,
                            self.max_attempts,
                            strategy.name(),
                            body.len()
                        ));
                        return Ok(body);
                    }
                    Err(AttemptError::Panicked(message)) => {
                        return Err(TransportError::StrategyPanicked {
                            strategy: strategy.name().to_string(),
                            message,
                        });
                    }
                    Err(AttemptError::Failed(error)) => {
                        ctx.warn(format!(
                            "Fetch attempt {}/{} via {} failed: {}",
                            attempt,
                            self.max_attempts,
                            strategy.name(),
                            error
                        ));
                        if !error.is_retryable() {
                            return Err(TransportError::Exhausted {
                                attempts: attempts_made,
                            });
                        }

                        let final_attempt = last_strategy && attempt == self.max_attempts;
                        if !final_attempt {
                            let delay = self.backoff_step * attempt;
                            tokio::select! {
                                biased;
                                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                                _ = tokio::time::sleep(delay) => {}
                            }
                        }
                    }
                }
            }
        }

        Err(TransportError::Exhausted {
            attempts: attempts_made,
        })
    }

    /// Runs one strategy call under the attempt timeout, catching panics
    async fn attempt(&self, strategy: &dyn FetchStrategy, url: &Url) -> Result<String, AttemptError> {
        let guarded = AssertUnwindSafe(strategy.fetch(url)).catch_unwind();

        match tokio::time::timeout(self.attempt_timeout, guarded).await {
            Err(_) => Err(AttemptError::Failed(FetchError::Timeout)),
            Ok(Err(payload)) => Err(AttemptError::Panicked(panic_message(payload.as_ref()))),
            Ok(Ok(result)) => result.map_err(AttemptError::Failed),
        }
    }
}

/// Extracts a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
