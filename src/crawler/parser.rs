//! HTML anchor extraction
//!
//! This module turns a fetched HTML document into the shape the traversal
//! engine consumes:
//! - Every `<a href>` as a raw `(href, text)` pair, in document order
//! - The document language from `<html lang>`
//!
//! Hrefs are returned exactly as written. Resolution, classification and
//! scope decisions all happen in the engine.

use scraper::{ElementRef, Html, Selector};

/// One anchor as written in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The raw `href` attribute value
    pub href: String,

    /// The first non-blank text node inside the anchor, trimmed; empty if none
    pub text: String,
}

impl Anchor {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Value of the root element's `lang` attribute, if present and non-blank
    pub lang: Option<String>,

    /// All anchors carrying an `href`, in document order
    pub anchors: Vec<Anchor>,
}

/// Parses HTML content and extracts anchors and the page language
///
/// # Example
///
/// ```
/// use broken_links::crawler::parse_html;
///
/// let html = r#"<html lang="fr"><body><a href="/fr/contact">Contact</a></body></html>"#;
/// let page = parse_html(html);
/// assert_eq!(page.lang.as_deref(), Some("fr"));
/// assert_eq!(page.anchors[0].href, "/fr/contact");
/// assert_eq!(page.anchors[0].text, "Contact");
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        lang: extract_lang(&document),
        anchors: extract_anchors(&document),
    }
}

/// Reads `<html lang="...">`
fn extract_lang(document: &Html) -> Option<String> {
    document
        .root_element()
        .value()
        .attr("lang")
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

/// Extracts every anchor with an href attribute
fn extract_anchors(document: &Html) -> Vec<Anchor> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            Some(Anchor {
                href: href.to_string(),
                text: first_text(&element),
            })
        })
        .collect()
}

/// An anchor may hold several text nodes; keep only the first meaningful one
fn first_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
}
