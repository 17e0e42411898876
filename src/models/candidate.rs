use rust_decimal::Decimal;

/// High-priority candidates come from the targeted selector pass (or a site
/// profile's structured data); normal ones from the broad document walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Normal,
}

/// One plausible monetary mention found during a single extraction pass.
/// Transient: consumed by the ranker, never persisted.
#[derive(Debug, Clone)]
pub struct PriceCandidate {
    pub value: Decimal,
    pub source_text: String,
    pub css_class_hint: String,
    pub tag_hint: String,
    pub priority: Priority,
    pub origin_selector: Option<String>,
}

impl PriceCandidate {
    pub fn new(value: Decimal, source_text: &str, priority: Priority) -> Self {
        Self {
            value,
            // keep a bounded snippet for logging, the way debug output wants it
            source_text: source_text.chars().take(100).collect(),
            css_class_hint: String::new(),
            tag_hint: String::new(),
            priority,
            origin_selector: None,
        }
    }

    pub fn with_hints(mut self, css_class: &str, tag: &str) -> Self {
        self.css_class_hint = css_class.to_string();
        self.tag_hint = tag.to_string();
        self
    }

    pub fn with_selector(mut self, selector: &str) -> Self {
        self.origin_selector = Some(selector.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_text_is_bounded() {
        let long = "x".repeat(500);
        let candidate = PriceCandidate::new(Decimal::ONE, &long, Priority::Normal);
        assert_eq!(candidate.source_text.chars().count(), 100);
    }

    #[test]
    fn test_builder_hints() {
        let candidate = PriceCandidate::new(Decimal::ONE, "1 TL", Priority::High)
            .with_hints("product-price", "span")
            .with_selector(".product-price");
        assert_eq!(candidate.css_class_hint, "product-price");
        assert_eq!(candidate.tag_hint, "span");
        assert_eq!(candidate.origin_selector.as_deref(), Some(".product-price"));
    }
}
