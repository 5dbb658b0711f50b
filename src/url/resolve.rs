use url::Url;

/// Resolves a reference (href/src attribute value) against a base URL
///
/// This is the single resolution routine used for image sources, anchor
/// targets and crawl expansion, so all three agree on what a reference points
/// to. Absolute references are returned as parsed; relative ones are joined
/// onto `base` following the WHATWG URL rules.
///
/// # Arguments
///
/// * `reference` - The raw attribute value (surrounding whitespace is ignored)
/// * `base` - The URL of the page the reference was found on
///
/// # Returns
///
/// * `Some(Url)` - The absolute URL
/// * `None` - The reference cannot be resolved
///
/// # Examples
///
/// ```
/// use sitesift::url::resolve_reference;
/// use url::Url;
///
/// let base = Url::parse("https://x.test/p").unwrap();
/// let resolved = resolve_reference("/img/a.png", &base).unwrap();
/// assert_eq!(resolved.as_str(), "https://x.test/img/a.png");
/// ```
pub fn resolve_reference(reference: &str, base: &Url) -> Option<Url> {
    base.join(reference.trim()).ok()
}

/// Returns true if the URL can be fetched by the crawler (http or https)
pub fn is_crawlable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
