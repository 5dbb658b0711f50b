//! URL handling module for SiteSift
//!
//! This module provides start-URL normalization, reference resolution,
//! origin comparison for the same-domain policy, and the key used to
//! deduplicate frontier entries.

mod normalize;
mod resolve;

use url::Url;

// Re-export main functions
pub use normalize::normalize_start_url;
pub use resolve::{is_crawlable, resolve_reference};

/// Returns true if both URLs share the same origin (scheme, host and port)
///
/// Opaque origins (e.g. `mailto:` or `data:` URLs) never match anything,
/// including themselves.
///
/// # Examples
///
/// ```
/// use sitesift::url::same_origin;
/// use url::Url;
///
/// let a = Url::parse("https://example.com/a").unwrap();
/// let b = Url::parse("https://example.com:443/b?x=1").unwrap();
/// let c = Url::parse("http://example.com/a").unwrap();
/// assert!(same_origin(&a, &b));
/// assert!(!same_origin(&a, &c));
/// ```
pub fn same_origin(a: &Url, b: &Url) -> bool {
    let (origin_a, origin_b) = (a.origin(), b.origin());
    origin_a.is_tuple() && origin_a == origin_b
}

/// Returns the key used for visited/queued bookkeeping
///
/// The fragment is dropped because it never changes the fetched document;
/// everything else is kept verbatim.
pub fn frontier_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.into()
}
