use crate::config::types::{Config, CrawlerConfig, TransportConfig, UserAgentConfig};
use crate::crawler::StrategyKind;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Upper bound on the page budget of a single run
const MAX_PAGES_LIMIT: u32 = 1000;

/// Upper bound on the crawl depth
const MAX_DEPTH_LIMIT: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_transport_config(&config.transport)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawl limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 || config.max_pages > MAX_PAGES_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and {}, got {}",
            MAX_PAGES_LIMIT, config.max_pages
        )));
    }

    if config.page_depth < 1 || config.page_depth > MAX_DEPTH_LIMIT {
        return Err(ConfigError::Validation(format!(
            "page_depth must be between 1 and {}, got {}",
            MAX_DEPTH_LIMIT, config.page_depth
        )));
    }

    Ok(())
}

/// Validates transport tuning and the strategy list
fn validate_transport_config(config: &TransportConfig) -> Result<(), ConfigError> {
    if config.strategies.is_empty() {
        return Err(ConfigError::Validation(
            "at least one fetch strategy must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for name in &config.strategies {
        let kind = StrategyKind::from_name(name)
            .ok_or_else(|| ConfigError::UnknownStrategy(name.clone()))?;
        if !seen.insert(kind) {
            return Err(ConfigError::Validation(format!(
                "fetch strategy '{}' is listed more than once",
                name
            )));
        }
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.attempt_timeout_ms < 50 {
        return Err(ConfigError::Validation(format!(
            "attempt_timeout_ms must be >= 50ms, got {}ms",
            config.attempt_timeout_ms
        )));
    }

    if config.backoff_step_ms > 10_000 {
        return Err(ConfigError::Validation(format!(
            "backoff_step_ms must be <= 10000ms, got {}ms",
            config.backoff_step_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| ConfigError::Validation(format!("Invalid email format: '{}'", email)))?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
