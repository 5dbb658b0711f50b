//! Response classification and HTML parsing
//!
//! This module decides what a fetched body is:
//! - Markup (an HTML document) is parsed into a `scraper::Html` tree
//! - Anything else becomes a short plain-text sample
//! - A body that looks like markup but carries NUL bytes is rejected

use scraper::Html;
use thiserror::Error;

/// Maximum number of characters kept from a non-markup body
pub const TEXT_SAMPLE_CHARS: usize = 200;

/// Errors that reject a fetched body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response looks like HTML but contains binary data")]
    BinaryContent,
}

/// Leading excerpt of a non-markup response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSample {
    pub content: String,
}

impl TextSample {
    /// Takes the first [`TEXT_SAMPLE_CHARS`] characters of the trimmed body
    ///
    /// Returns `None` when the body is blank.
    pub fn from_body(body: &str) -> Option<Self> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(Self {
            content: trimmed.chars().take(TEXT_SAMPLE_CHARS).collect(),
        })
    }
}

/// A classified response body
#[derive(Debug)]
pub enum Classified {
    /// Parsed HTML document
    Markup(Html),

    /// Plain text, with a sample unless the body was blank
    Text(Option<TextSample>),
}

/// Returns true if the body carries an HTML signature
///
/// The signature is `<!doctype html` (one or more whitespace characters
/// between the two words) or `<html` not followed by a word character,
/// matched case-insensitively anywhere in the body.
pub fn has_markup_signature(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();

    let doctype = lower.match_indices("<!doctype").any(|(index, needle)| {
        let rest = &lower[index + needle.len()..];
        let after_space = rest.trim_start();
        after_space.len() < rest.len() && after_space.starts_with("html")
    });
    if doctype {
        return true;
    }

    lower.match_indices("<html").any(|(index, needle)| {
        lower[index + needle.len()..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'))
    })
}

/// Classifies a response body and parses it if it is markup
///
/// # Arguments
///
/// * `body` - The raw response body
///
/// # Returns
///
/// * `Ok(Classified::Markup(_))` - The parsed document
/// * `Ok(Classified::Text(_))` - A text sample (or none for a blank body)
/// * `Err(ParseError)` - The body cannot be treated as a document
///
/// # Example
///
/// ```
/// use sitesift::crawler::{classify_and_parse, Classified};
///
/// let classified = classify_and_parse("<html><body><p>Hi</p></body></html>").unwrap();
/// assert!(matches!(classified, Classified::Markup(_)));
/// ```
pub fn classify_and_parse(body: &str) -> Result<Classified, ParseError> {
    if !has_markup_signature(body) {
        return Ok(Classified::Text(TextSample::from_body(body)));
    }

    if body.contains('\0') {
        return Err(ParseError::BinaryContent);
    }

    Ok(Classified::Markup(Html::parse_document(body)))
}
