use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which fetch path produced a result. `Batch` marks results synthesized by
/// the batch runner when a task failed outside either strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchMethod {
    #[serde(rename = "HTTP")]
    Http,
    Browser,
    Batch,
}

impl std::fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMethod::Http => write!(f, "HTTP"),
            FetchMethod::Browser => write!(f, "Browser"),
            FetchMethod::Batch => write!(f, "Batch"),
        }
    }
}

/// Final outcome for one URL. Exactly one is produced per input URL and it is
/// never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub url: String,
    pub title: String,
    pub price: Option<Decimal>,
    pub currency: String,
    pub success: bool,
    pub method: FetchMethod,
    pub error: Option<String>,
    pub not_found: bool,
    pub duration_ms: Option<u64>,
}

impl ScrapeResult {
    /// Extraction ran to completion. `success` is true iff a price came out.
    pub fn extracted(
        url: &str,
        title: String,
        price: Option<Decimal>,
        currency: &str,
        method: FetchMethod,
        duration_ms: u64,
    ) -> Self {
        Self {
            url: url.to_string(),
            title,
            price,
            currency: currency.to_string(),
            success: price.is_some(),
            method,
            error: None,
            not_found: false,
            duration_ms: Some(duration_ms),
        }
    }

    /// The page was classified as a missing product, either by transport
    /// status or by content markers.
    pub fn not_found(url: &str, currency: &str, method: FetchMethod, duration_ms: u64) -> Self {
        Self {
            url: url.to_string(),
            title: "Ürün Bulunamadı".to_string(),
            price: None,
            currency: currency.to_string(),
            success: false,
            method,
            error: Some("Product not found (404)".to_string()),
            not_found: false,
            duration_ms: Some(duration_ms),
        }
        .with_not_found()
    }

    /// The strategy itself failed (transport, navigation, session, panic).
    pub fn failed(
        url: &str,
        title: &str,
        currency: &str,
        method: FetchMethod,
        error: String,
        duration_ms: Option<u64>,
    ) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            price: None,
            currency: currency.to_string(),
            success: false,
            method,
            error: Some(error),
            not_found: false,
            duration_ms,
        }
    }

    fn with_not_found(mut self) -> Self {
        self.not_found = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_success_requires_price() {
        let hit = ScrapeResult::extracted(
            "https://example.com/p",
            "Ürün".to_string(),
            Some(Decimal::from_str("1234.56").unwrap()),
            "TL",
            FetchMethod::Http,
            42,
        );
        assert!(hit.success);
        assert!(!hit.not_found);

        let miss = ScrapeResult::extracted(
            "https://example.com/p",
            "Ürün".to_string(),
            None,
            "TL",
            FetchMethod::Http,
            42,
        );
        assert!(!miss.success);
        assert!(miss.error.is_none());
    }

    #[test]
    fn test_not_found_invariant() {
        let result = ScrapeResult::not_found("https://example.com/gone", "TL", FetchMethod::Http, 10);
        assert!(result.not_found);
        assert!(!result.success);
        assert!(result.price.is_none());
        assert_eq!(result.title, "Ürün Bulunamadı");
    }

    #[test]
    fn test_wire_field_names() {
        let result = ScrapeResult::not_found("https://example.com/gone", "TL", FetchMethod::Http, 10);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["notFound"], serde_json::json!(true));
        assert_eq!(json["durationMs"], serde_json::json!(10));
        assert_eq!(json["method"], serde_json::json!("HTTP"));
        assert!(json["price"].is_null());
    }

    #[test]
    fn test_price_serializes_as_number() {
        let result = ScrapeResult::extracted(
            "https://example.com/p",
            "Ürün".to_string(),
            Some(Decimal::from_str("99.90").unwrap()),
            "TL",
            FetchMethod::Browser,
            5,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["price"], serde_json::json!(99.90));
        assert_eq!(json["method"], serde_json::json!("Browser"));
    }
}
