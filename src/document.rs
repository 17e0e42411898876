//! The queryable-document seam.
//!
//! Extraction and ranking never touch a parser or a browser directly; they
//! see a [`Queryable`] and plain [`DomNode`] values. The HTTP strategy feeds
//! [`StaticDocument`] the response body, the browser strategy feeds it a
//! snapshot of the live rendered DOM, so one heuristic serves both paths.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::warn;

/// A detached view of one element: everything extraction needs, nothing that
/// ties it to the parser's lifetimes.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub tag: String,
    pub css_class: String,
    /// Concatenated text of the element and all descendants, trimmed.
    pub full_text: String,
    /// Text of direct child text nodes only.
    pub own_text: String,
    pub inner_html: String,
    attrs: HashMap<String, String>,
}

impl DomNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// CSS-selector matching, whole-document element walking, and raw markup
/// access over some parsed page.
pub trait Queryable {
    /// Elements matching `selector`, in document order. Invalid selectors
    /// yield an empty match set.
    fn select(&self, selector: &str) -> Vec<DomNode>;

    /// Every element of the document, in document order.
    fn elements(&self) -> Vec<DomNode>;

    /// The unparsed page markup, for embedded-script payload extraction.
    fn raw_html(&self) -> &str;
}

/// Production [`Queryable`] over the `scraper` crate's parsed HTML.
pub struct StaticDocument {
    html: Html,
    raw: String,
}

impl StaticDocument {
    pub fn parse(raw: &str) -> Self {
        Self {
            html: Html::parse_document(raw),
            raw: raw.to_string(),
        }
    }
}

impl Queryable for StaticDocument {
    fn select(&self, selector: &str) -> Vec<DomNode> {
        let Ok(parsed) = Selector::parse(selector) else {
            warn!("invalid selector skipped: {selector}");
            return Vec::new();
        };
        self.html.select(&parsed).map(detach).collect()
    }

    fn elements(&self) -> Vec<DomNode> {
        self.select("*")
    }

    fn raw_html(&self) -> &str {
        &self.raw
    }
}

fn detach(element: ElementRef) -> DomNode {
    let full_text = element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    let own_text = element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    DomNode {
        tag: element.value().name().to_string(),
        css_class: element.value().attr("class").unwrap_or_default().to_string(),
        full_text,
        own_text,
        inner_html: element.inner_html(),
        attrs: element
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <html>
            <head><title>Test Ürünü</title></head>
            <body>
                <div class="price" data-price="99.90">99,90<span>TL</span></div>
                <p>Some long prose paragraph.</p>
            </body>
        </html>
    "#;

    #[test]
    fn test_select_returns_detached_nodes() {
        let doc = StaticDocument::parse(SAMPLE);
        let nodes = doc.select(".price");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag, "div");
        assert_eq!(nodes[0].css_class, "price");
        assert_eq!(nodes[0].attr("data-price"), Some("99.90"));
        assert_eq!(nodes[0].full_text, "99,90 TL");
    }

    #[test]
    fn test_own_text_excludes_descendants() {
        let doc = StaticDocument::parse(SAMPLE);
        let nodes = doc.select(".price");
        assert_eq!(nodes[0].own_text, "99,90");
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = StaticDocument::parse(SAMPLE);
        assert!(doc.select(">>>").is_empty());
    }

    #[test]
    fn test_elements_walks_whole_document() {
        let doc = StaticDocument::parse(SAMPLE);
        let tags: Vec<_> = doc.elements().into_iter().map(|n| n.tag).collect();
        assert!(tags.contains(&"title".to_string()));
        assert!(tags.contains(&"div".to_string()));
        assert!(tags.contains(&"p".to_string()));
    }
}
