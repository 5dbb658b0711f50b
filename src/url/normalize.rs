use crate::UrlError;
use url::Url;

/// Normalizes a user-supplied start URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject if empty
/// 2. Prefix `https://` when no `http://` or `https://` scheme is present
///    (case-insensitive check)
/// 3. Parse the URL; reject if malformed
/// 4. Reject URLs without a host
///
/// Nothing else is rewritten: the host, path, query and fragment are kept as
/// the `url` crate serializes them, so the start origin matches what the
/// crawl will compare child links against.
///
/// # Arguments
///
/// * `input` - The raw URL string as typed by the user
///
/// # Returns
///
/// * `Ok(Url)` - Absolute http(s) URL
/// * `Err(UrlError)` - The input cannot be used as a start URL
///
/// # Examples
///
/// ```
/// use sitesift::url::normalize_start_url;
///
/// let url = normalize_start_url("example.com/docs").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
/// ```
pub fn normalize_start_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let candidate = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}

/// Returns true if the string already starts with `http://` or `https://`
fn has_http_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
