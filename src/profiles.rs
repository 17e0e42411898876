//! Shared pattern tables and per-site extraction profiles.
//!
//! Both fetch strategies read these tables; nothing here is mutated at
//! runtime. Selector lists are ordered: earlier entries win ties downstream.

use regex::Regex;
use std::sync::LazyLock;

/// A field of an embedded-script product payload, in declared priority order.
/// `vat_exclusive` fields carry the pre-tax amount and must be marked up
/// before comparison with VAT-inclusive values.
#[derive(Debug, Clone, Copy)]
pub struct ScriptField {
    pub name: &'static str,
    pub vat_exclusive: bool,
}

/// Structured product data assigned to a script-global identifier, e.g.
/// `var PRODUCT_DATA = [{...}];`.
#[derive(Debug, Clone, Copy)]
pub struct ScriptData {
    pub global_var: &'static str,
    pub fields: &'static [ScriptField],
}

/// Static extraction hints for one hostname fragment.
#[derive(Debug, Clone, Copy)]
pub struct SiteProfile {
    pub host_fragment: &'static str,
    pub selectors: &'static [&'static str],
    pub script_data: Option<ScriptData>,
    /// Phrases that mean the item is out of stock. Informational only:
    /// extraction continues regardless.
    pub stock_markers: &'static [&'static str],
}

pub static PROFILES: &[SiteProfile] = &[
    SiteProfile {
        host_fragment: "dokuzkimya.com",
        selectors: &[
            "[itemprop=\"price\"]",
            ".product-price__price",
            ".product-price .money",
            ".price .money",
            ".product-form__cart-submit .money",
            "[data-price]",
            ".price-item--sale .money",
            ".money",
        ],
        script_data: None,
        stock_markers: &[],
    },
    SiteProfile {
        host_fragment: "3dteknomarket.com",
        selectors: &[
            ".Formline.IndirimliFiyatContent .spanFiyat",
            ".Formline.PiyasafiyatiContent .spanFiyat",
            ".spanFiyat",
        ],
        script_data: None,
        stock_markers: &[],
    },
    SiteProfile {
        host_fragment: "3dcim.com",
        selectors: &[".price-current", ".product-price", ".price"],
        script_data: None,
        stock_markers: &[],
    },
    SiteProfile {
        host_fragment: "robotistan.com",
        selectors: &[
            ".product-price",
            ".product-price-not-vat",
            ".total_sale_price",
            ".total_base_price",
            ".sale_price",
        ],
        script_data: Some(ScriptData {
            global_var: "PRODUCT_DATA",
            fields: &[
                ScriptField { name: "total_sale_price", vat_exclusive: false },
                ScriptField { name: "total_base_price", vat_exclusive: false },
                ScriptField { name: "sale_price", vat_exclusive: true },
            ],
        }),
        stock_markers: &["Out Of Stock", "Stokta Yok"],
    },
];

/// Look up the profile for a hostname by substring match.
pub fn profile_for(host: &str) -> Option<&'static SiteProfile> {
    PROFILES.iter().find(|p| host.contains(p.host_fragment))
}

/// Generic fallback selectors appended after any site profile's own list.
/// Class and attribute names commonly denoting price in English and Turkish.
pub static GENERIC_PRICE_SELECTORS: &[&str] = &[
    "[itemprop=\"price\"]",
    ".Formline.IndirimliFiyatContent .spanFiyat",
    ".Formline.PiyasafiyatiContent .spanFiyat",
    ".spanFiyat",
    ".price",
    ".product-price",
    ".current-price",
    ".sale-price",
    ".fiyat",
    ".tutar",
    ".amount",
    ".cost",
    ".value",
    ".money",
    ".currency",
    "[data-price]",
    ".product-amount",
    ".final-price",
    ".selling-price",
];

/// Ordered pattern families for monetary mentions, each anchored to a
/// trailing TL marker. Earlier families are more specific and win ties.
pub static PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 16.000,50 TL - grouped thousands with decimal comma
        r"(\d{1,3}(?:\.\d{3})+,\d{1,2})\s*(?:TL|₺|tl|Tl)",
        // 483,12 TL - compact decimal without grouping
        r"(\d{1,4},\d{1,2})\s*(?:TL|₺|tl|Tl)",
        // 16,000.50 TL - international grouping with decimal point
        r"(\d{1,3}(?:,\d{3})+\.\d{1,2})\s*(?:TL|₺|tl|Tl)",
        // 16.000 TL or 16,000 TL - grouped without explicit decimal
        r"(\d{1,3}(?:[.,]\d{3})+)\s*(?:TL|₺|tl|Tl)",
        // 1234 TL - bare integer
        r"(\d+)\s*(?:TL|₺|tl|Tl)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static price pattern"))
    .collect()
});

/// Context phrases that disqualify a broad-pass candidate: promotional,
/// shipping, loyalty, installment and VAT-disclaimer language, plus markup
/// and analytics boilerplate that can read as numeric.
pub static EXCLUSION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)kargo.*bedava",
        r"(?i)ücretsiz.*kargo",
        r"(?i)free.*shipping",
        r"(?i)kazanmanıza.*kaldı",
        r"(?i)kazan",
        r"(?i)earn",
        r"(?i)kupon.*kod",
        r"(?i)coupon.*code",
        r"(?i)puan.*kazan",
        r"(?i)bonus.*point",
        r"(?i)taksit.*sayısı",
        r"(?i)aylık.*ödeme",
        r"(?i)kdv.*dahil",
        r"(?i)vat.*included",
        r"(?i)komisyon.*oranı",
        r"(?i)fee.*rate",
        // script/style/markup noise
        r"(?i)window\.",
        r"(?i)function",
        r"(?i)script",
        r"(?i)style",
        r"(?i)\.css",
        r"(?i)\.js",
        r"(?i)src=",
        r"(?i)href=",
        r"(?i)@media",
        r"(?i)font-family",
        r"(?i)color:",
        r"(?i)performance.*mark",
        r"(?i)console\.",
        // analytics noise
        r"(?i)googletagmanager",
        r"(?i)analytics",
        r"(?i)tracking",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static exclusion pattern"))
    .collect()
});

/// Title phrases marking a missing page. Compared lowercase.
pub static NOT_FOUND_TITLE_MARKERS: &[&str] = &[
    "404",
    "not found",
    "bulunamadı",
    "aradığınız içeriğe şu an ulaşılamıyor",
];

/// Body phrases marking a missing product. Compared lowercase.
pub static NOT_FOUND_BODY_MARKERS: &[&str] = &[
    "ürün bulunamadı",
    "sayfa bulunamadı",
    "aradığınız içeriğe şu an ulaşılamıyor",
];

/// Class-hint terms for ranker step 3, in tie-break order.
pub static PRIORITY_CLASS_HINTS: &[&str] =
    &["product", "price", "fiyat", "cost", "amount", "value", "money"];

/// Broad-pass elements with more own text than this are skipped as prose.
pub const MAX_BROAD_TEXT_CHARS: usize = 200;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_lookup_by_fragment() {
        assert_eq!(
            profile_for("www.robotistan.com").map(|p| p.host_fragment),
            Some("robotistan.com")
        );
        assert_eq!(
            profile_for("shop.dokuzkimya.com").map(|p| p.host_fragment),
            Some("dokuzkimya.com")
        );
        assert!(profile_for("example.com").is_none());
    }

    #[test]
    fn test_robotistan_script_field_order() {
        let profile = profile_for("robotistan.com").unwrap();
        let script = profile.script_data.unwrap();
        assert_eq!(script.global_var, "PRODUCT_DATA");
        let names: Vec<_> = script.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["total_sale_price", "total_base_price", "sale_price"]);
        assert!(script.fields[2].vat_exclusive);
    }

    #[test]
    fn test_pattern_family_order() {
        // The grouped-thousands family must match before the bare-integer one.
        let text = "16.000,50 TL";
        let grouped = &PRICE_PATTERNS[0];
        let caps = grouped.captures(text).unwrap();
        assert_eq!(&caps[1], "16.000,50");
    }

    #[test]
    fn test_exclusion_hits_promotional_text() {
        let text = "150 TL üzeri ücretsiz kargo";
        assert!(EXCLUSION_PATTERNS.iter().any(|p| p.is_match(text)));
    }

    #[test]
    fn test_exclusion_hits_markup_noise() {
        let html = r#"<script>window.dataLayer = [];</script>"#;
        assert!(EXCLUSION_PATTERNS.iter().any(|p| p.is_match(html)));
    }
}
