//! Two-pass price candidate extraction over a queryable document.
//!
//! The targeted pass walks a priority-ordered selector list (site profile
//! first, generic fallbacks after). The broad pass only runs when the
//! targeted pass found nothing, walks every short-text element, and filters
//! matches through the exclusion table.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::document::{DomNode, Queryable};
use crate::models::{PriceCandidate, Priority};
use crate::normalize::normalize_amount;
use crate::profiles::{
    EXCLUSION_PATTERNS, GENERIC_PRICE_SELECTORS, MAX_BROAD_TEXT_CHARS, NOT_FOUND_BODY_MARKERS,
    NOT_FOUND_TITLE_MARKERS, PRICE_PATTERNS, ScriptData, SiteProfile,
};

/// Domestic VAT markup applied to tax-exclusive script-data fields.
static VAT_MULTIPLIER: LazyLock<Decimal> = LazyLock::new(|| Decimal::new(120, 2));

/// Quantities and other incidental small numbers are not prices.
static MIN_CANDIDATE: LazyLock<Decimal> = LazyLock::new(|| Decimal::ONE);

/// Locate every plausible monetary mention in the document.
///
/// An empty result is a normal negative outcome, not an error.
pub fn extract_candidates<D: Queryable + ?Sized>(
    doc: &D,
    profile: Option<&SiteProfile>,
) -> Vec<PriceCandidate> {
    let mut candidates = targeted_pass(doc, profile);

    if candidates.is_empty() {
        if let Some(script) = profile.and_then(|p| p.script_data) {
            if let Some(candidate) = script_data_candidate(doc.raw_html(), &script) {
                debug!(
                    "script data yielded {} from {}",
                    candidate.value, candidate.source_text
                );
                candidates.push(candidate);
            }
        }
    }

    if candidates.is_empty() {
        candidates = broad_pass(doc);
    }

    debug!("{} price candidate(s) extracted", candidates.len());
    candidates
}

fn targeted_pass<D: Queryable + ?Sized>(
    doc: &D,
    profile: Option<&SiteProfile>,
) -> Vec<PriceCandidate> {
    let mut selectors: Vec<&str> = profile.map(|p| p.selectors.to_vec()).unwrap_or_default();
    selectors.extend_from_slice(GENERIC_PRICE_SELECTORS);

    let mut candidates = Vec::new();
    for selector in selectors {
        for node in doc.select(selector) {
            // A machine-readable attribute is authoritative: take it and stop.
            if let Some((value, source)) = structured_value(&node) {
                debug!("structured attribute match via {selector}: {value}");
                return vec![
                    PriceCandidate::new(value, &source, Priority::High)
                        .with_hints(&node.css_class, &node.tag)
                        .with_selector(selector),
                ];
            }

            for raw in pattern_matches(&node.full_text) {
                let Some(value) = normalize_amount(&raw) else {
                    continue;
                };
                if value < *MIN_CANDIDATE {
                    continue;
                }
                candidates.push(
                    PriceCandidate::new(value, &node.full_text, Priority::High)
                        .with_hints(&node.css_class, &node.tag)
                        .with_selector(selector),
                );
            }
        }
    }
    candidates
}

fn broad_pass<D: Queryable + ?Sized>(doc: &D) -> Vec<PriceCandidate> {
    let mut candidates = Vec::new();
    for node in doc.elements() {
        let text = node.own_text.as_str();
        if text.is_empty() || text.chars().count() > MAX_BROAD_TEXT_CHARS {
            continue;
        }

        let matches = pattern_matches(text);
        if matches.is_empty() {
            continue;
        }
        if is_excluded(&node) {
            debug!("excluded by context: \"{}\"", &node.own_text);
            continue;
        }

        for raw in matches {
            let Some(value) = normalize_amount(&raw) else {
                continue;
            };
            if value < *MIN_CANDIDATE {
                continue;
            }
            candidates
                .push(PriceCandidate::new(value, text, Priority::Normal)
                    .with_hints(&node.css_class, &node.tag));
        }
    }
    candidates
}

/// All pattern-family matches in `text`, family order preserved.
fn pattern_matches(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    for pattern in PRICE_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                found.push(m.as_str().to_string());
            }
        }
    }
    found
}

fn is_excluded(node: &DomNode) -> bool {
    EXCLUSION_PATTERNS
        .iter()
        .any(|p| p.is_match(&node.own_text) || p.is_match(&node.inner_html))
}

/// A `content` attribute on a price-semantic element, or a `data-price`
/// attribute, read as a machine-format decimal.
fn structured_value(node: &DomNode) -> Option<(Decimal, String)> {
    let attr = match node.attr("itemprop") {
        Some("price") => node.attr("content"),
        _ => node.attr("data-price"),
    }?;
    let value = Decimal::from_str(attr.trim())
        .ok()
        .or_else(|| normalize_amount(attr))?;
    (value >= *MIN_CANDIDATE).then(|| (value, format!("content=\"{attr}\"")))
}

/// Parse an embedded `var <NAME> = [{...}];` payload and pick the first
/// populated field in declared priority order.
fn script_data_candidate(raw_html: &str, script: &ScriptData) -> Option<PriceCandidate> {
    let pattern = match Regex::new(&format!(
        r"(?s)var\s+{}\s*=\s*(\[.*?\]);",
        regex::escape(script.global_var)
    )) {
        Ok(p) => p,
        Err(e) => {
            warn!("script data pattern failed to build: {e}");
            return None;
        }
    };
    let caps = pattern.captures(raw_html)?;
    let payload: serde_json::Value = serde_json::from_str(caps.get(1)?.as_str()).ok()?;
    let product = payload.get(0)?;

    for field in script.fields {
        let Some(raw) = product.get(field.name) else {
            continue;
        };
        let Some(value) = json_decimal(raw) else {
            continue;
        };
        if value <= Decimal::ZERO {
            continue;
        }
        let value = if field.vat_exclusive {
            value * *VAT_MULTIPLIER
        } else {
            value
        };
        return Some(
            PriceCandidate::new(value, field.name, Priority::High)
                .with_selector(script.global_var),
        );
    }
    None
}

fn json_decimal(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        serde_json::Value::Number(n) => n.as_f64().and_then(Decimal::from_f64),
        _ => None,
    }
}

/// Does the page content say the product or page is missing?
///
/// Checked by both strategies even when the transport reported success,
/// because storefronts routinely serve missing-product pages with status 200.
pub fn classify_not_found<D: Queryable + ?Sized>(doc: &D) -> bool {
    let title = page_title_tag(doc).unwrap_or_default().to_lowercase();
    if NOT_FOUND_TITLE_MARKERS.iter().any(|m| title.contains(m)) {
        return true;
    }
    let body = body_text(doc).to_lowercase();
    NOT_FOUND_BODY_MARKERS.iter().any(|m| body.contains(m))
}

/// Page title chain: `<title>`, else first `<h1>`, else a fixed fallback.
pub fn page_title<D: Queryable + ?Sized>(doc: &D) -> String {
    page_title_tag(doc)
        .or_else(|| {
            doc.select("h1")
                .into_iter()
                .map(|n| n.full_text)
                .find(|t| !t.is_empty())
        })
        .unwrap_or_else(|| "Ürün başlığı bulunamadı".to_string())
}

fn page_title_tag<D: Queryable + ?Sized>(doc: &D) -> Option<String> {
    doc.select("title")
        .into_iter()
        .map(|n| n.full_text)
        .find(|t| !t.is_empty())
}

fn body_text<D: Queryable + ?Sized>(doc: &D) -> String {
    doc.select("body")
        .into_iter()
        .map(|n| n.full_text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Log-only stock check: an out-of-stock page still gets price extraction.
pub fn check_stock<D: Queryable + ?Sized>(doc: &D, profile: &SiteProfile) {
    if profile.stock_markers.is_empty() {
        return;
    }
    let body = body_text(doc);
    if profile.stock_markers.iter().any(|m| body.contains(m)) {
        warn!("{}: page reports item out of stock", profile.host_fragment);
    }
}
