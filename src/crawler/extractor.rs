//! Content extraction from parsed pages
//!
//! Runs the enabled extraction passes over a document, always in the same
//! order: headings, paragraphs, images, links, tables. Items within a pass
//! appear in document order.

use crate::config::EffectiveFilters;
use crate::output::{DataType, ExtractedItem};
use crate::url::resolve_reference;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Compiled selectors shared by every extraction pass
struct Selectors {
    headings: Selector,
    paragraphs: Selector,
    images: Selector,
    anchors: Selector,
    tables: Selector,
    rows: Selector,
    cells: Selector,
}

impl Selectors {
    fn compile() -> Option<Self> {
        Some(Self {
            headings: Selector::parse("h1, h2, h3, h4, h5, h6").ok()?,
            paragraphs: Selector::parse("p").ok()?,
            images: Selector::parse("img[src]").ok()?,
            anchors: Selector::parse("a[href]").ok()?,
            tables: Selector::parse("table").ok()?,
            rows: Selector::parse("tr").ok()?,
            cells: Selector::parse("th, td").ok()?,
        })
    }
}

fn selectors() -> Option<&'static Selectors> {
    static SELECTORS: OnceLock<Option<Selectors>> = OnceLock::new();
    SELECTORS.get_or_init(Selectors::compile).as_ref()
}

/// Selector matching every anchor with an `href`, shared with link expansion
pub(crate) fn anchor_selector() -> Option<&'static Selector> {
    selectors().map(|s| &s.anchors)
}

/// Extracts items from a document according to the effective filters
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `filters` - Which passes to run
/// * `page_url` - The page URL; used as `source_url` and as the base for
///   resolving image and link references
///
/// # Returns
///
/// Items in pass order (headings, paragraphs, images, links, tables)
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use sitesift::config::ContentFilters;
/// use sitesift::crawler::extract;
/// use url::Url;
///
/// let doc = Html::parse_document("<html><body><h1>Hi</h1><p>There</p></body></html>");
/// let page = Url::parse("https://x.test/").unwrap();
/// let items = extract(&doc, &ContentFilters::default().effective(), &page);
/// assert_eq!(items.len(), 2);
/// ```
pub fn extract(document: &Html, filters: &EffectiveFilters, page_url: &Url) -> Vec<ExtractedItem> {
    let Some(selectors) = selectors() else {
        return Vec::new();
    };
    let mut items = Vec::new();

    if filters.headings {
        items.extend(
            document
                .select(&selectors.headings)
                .map(|h| ExtractedItem::new(trimmed_text(h), page_url, DataType::Heading)),
        );
    }

    if filters.paragraphs {
        items.extend(
            document
                .select(&selectors.paragraphs)
                .map(|p| ExtractedItem::new(trimmed_text(p), page_url, DataType::Paragraph)),
        );
    }

    if filters.images {
        items.extend(
            document
                .select(&selectors.images)
                .filter_map(|img| image_content(img, page_url))
                .map(|content| ExtractedItem::new(content, page_url, DataType::Image)),
        );
    }

    if filters.links {
        items.extend(
            document
                .select(&selectors.anchors)
                .filter_map(|a| link_content(a, page_url))
                .map(|content| ExtractedItem::new(content, page_url, DataType::Link)),
        );
    }

    if filters.tables {
        items.extend(
            document
                .select(&selectors.tables)
                .map(|table| table_content(table, selectors))
                .filter(|content| !content.is_empty())
                .map(|content| ExtractedItem::new(content, page_url, DataType::Table)),
        );
    }

    items
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// `<absolute src>` plus ` | alt: <alt>` when the alt text is non-empty
fn image_content(img: ElementRef<'_>, page_url: &Url) -> Option<String> {
    let src = img.value().attr("src")?;
    let resolved = resolve_reference(src, page_url)
        .map(String::from)
        .unwrap_or_else(|| src.to_string());

    Some(match img.value().attr("alt") {
        Some(alt) if !alt.is_empty() => format!("{} | alt: {}", resolved, alt),
        _ => resolved,
    })
}

/// `<absolute href>` plus ` | text: <anchor text>` when the text is non-empty
///
/// Returns `None` for hrefs that cannot be resolved.
fn link_content(anchor: ElementRef<'_>, page_url: &Url) -> Option<String> {
    let href = anchor.value().attr("href")?;
    let resolved = resolve_reference(href, page_url)?;
    let text = trimmed_text(anchor);

    Some(if text.is_empty() {
        resolved.into()
    } else {
        format!("{} | text: {}", resolved, text)
    })
}

/// Rows joined by newlines, cells trimmed and joined by ` | `
fn table_content(table: ElementRef<'_>, selectors: &Selectors) -> String {
    table
        .select(&selectors.rows)
        .map(|row| {
            row.select(&selectors.cells)
                .map(trimmed_text)
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
