//! SiteSift main entry point
//!
//! This is the command-line interface for the SiteSift site crawler.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use sitesift::config::{load_config_with_hash, validate, Config, CrawlRequest, DataTypeSelector};
use sitesift::crawler::{Coordinator, Transport};
use sitesift::output::{print_statistics, CrawlStatistics, MemoryHistory};
use sitesift::RunState;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// SiteSift: a bounded breadth-first site crawler
///
/// SiteSift walks a website from a start URL, fetching pages directly or
/// through public proxies, and collects headings, paragraphs, images, links
/// and tables from every page it visits.
#[derive(Parser, Debug)]
#[command(name = "sitesift")]
#[command(version)]
#[command(about = "A bounded breadth-first site crawler", long_about = None)]
struct Cli {
    /// Start URL (a bare host such as `example.com` gets `https://`)
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of pages to scrape
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Maximum link depth (the start page is depth 1)
    #[arg(long, value_name = "N")]
    depth: Option<u32>,

    /// Follow links to other origins
    #[arg(long)]
    all_domains: bool,

    /// Data type focus: text, images, links, tables or all
    #[arg(long, value_name = "TYPE", value_parser = parse_data_type)]
    data_type: Option<DataTypeSelector>,

    /// Extract headings
    #[arg(long, overrides_with = "no_headings")]
    headings: bool,

    /// Do not extract headings
    #[arg(long, overrides_with = "headings")]
    no_headings: bool,

    /// Extract paragraphs
    #[arg(long, overrides_with = "no_paragraphs")]
    paragraphs: bool,

    /// Do not extract paragraphs
    #[arg(long, overrides_with = "paragraphs")]
    no_paragraphs: bool,

    /// Extract images
    #[arg(long, overrides_with = "no_images")]
    images: bool,

    /// Do not extract images
    #[arg(long, overrides_with = "images")]
    no_images: bool,

    /// Extract links
    #[arg(long, overrides_with = "no_links")]
    links: bool,

    /// Do not extract links
    #[arg(long, overrides_with = "links")]
    no_links: bool,

    /// Fetch strategies to try, in order (comma separated)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    strategies: Option<Vec<String>>,

    /// Validate configuration and show the crawl plan without fetching
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(max_pages) = self.max_pages {
            config.crawler.max_pages = max_pages;
        }
        if let Some(depth) = self.depth {
            config.crawler.page_depth = depth;
        }
        if self.all_domains {
            config.crawler.same_domain_only = false;
        }
        if let Some(data_type) = self.data_type {
            config.filters.data_type = data_type;
        }
        if let Some(on) = toggle(self.headings, self.no_headings) {
            config.filters.headings = on;
        }
        if let Some(on) = toggle(self.paragraphs, self.no_paragraphs) {
            config.filters.paragraphs = on;
        }
        if let Some(on) = toggle(self.images, self.no_images) {
            config.filters.images = on;
        }
        if let Some(on) = toggle(self.links, self.no_links) {
            config.filters.links = on;
        }
        if let Some(strategies) = &self.strategies {
            config.transport.strategies = strategies.clone();
        }
    }
}

/// Resolves a `--flag/--no-flag` pair
fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn parse_data_type(value: &str) -> Result<DataTypeSelector, String> {
    DataTypeSelector::from_name(value).ok_or_else(|| {
        format!(
            "unknown data type '{}' (expected text, images, links, tables or all)",
            value
        )
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load configuration, then layer the command line on top
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("invalid configuration after command-line overrides")?;

    let request = CrawlRequest::from_config(&cli.url, &config)?;

    if cli.dry_run {
        handle_dry_run(&config, &request);
        return Ok(());
    }

    handle_crawl(&config, request).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitesift=info,warn"),
            1 => EnvFilter::new("sitesift=debug,info"),
            2 => EnvFilter::new("sitesift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, request: &CrawlRequest) {
    println!("=== SiteSift Dry Run ===\n");

    println!("Crawl:");
    println!("  Start URL: {}", request.start_url);
    println!("  Max pages: {}", request.max_pages);
    println!("  Page depth: {}", request.page_depth);
    println!("  Same domain only: {}", request.same_domain_only);

    let filters = request.effective_filters();
    println!("\nExtraction (data type: {}):", request.filters.data_type);
    println!("  Headings: {}", filters.headings);
    println!("  Paragraphs: {}", filters.paragraphs);
    println!("  Images: {}", filters.images);
    println!("  Links: {}", filters.links);
    println!("  Tables: {}", filters.tables);

    println!("\nTransport:");
    println!("  Strategies: {}", config.transport.strategies.join(", "));
    println!("  Attempts per strategy: {}", config.transport.max_attempts);
    println!("  Attempt timeout: {}ms", config.transport.attempt_timeout_ms);
    println!("  Backoff step: {}ms", config.transport.backoff_step_ms);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, request: CrawlRequest) -> anyhow::Result<()> {
    let transport = Transport::from_config(config)?;
    tracing::info!("Fetch strategies: {}", transport.strategy_names().join(" -> "));

    let history = Arc::new(MemoryHistory::new());
    let cancel = CancellationToken::new();

    // Ctrl-C stops the crawl but keeps what was collected
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            interrupt.cancel();
        }
    });

    let mut coordinator = Coordinator::new(request, transport)
        .with_history(history.clone())
        .with_cancellation(cancel);
    let result = coordinator.run().await;

    println!();
    for item in &result.items {
        println!("[{}] {}", item.data_type, item.content);
        println!("    from {}", item.source_url);
    }
    println!();

    print_statistics(&CrawlStatistics::from_result(&result));

    if let Some(entry) = history.entries().first() {
        tracing::info!("Recorded run {} ({})", entry.id, entry.status);
    }

    if result.state == RunState::Fatal {
        bail!("crawl stopped after a fatal error");
    }

    Ok(())
}
