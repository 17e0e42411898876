//! Locale-ambiguous amount normalization.
//!
//! Turkish pages write `16.000,50`, international ones `16,000.50`, and plenty
//! of markup carries bare integers or single-separator amounts whose separator
//! role is ambiguous. The rules here resolve that ambiguity deterministically.

use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

static MIN_AMOUNT: LazyLock<Decimal> = LazyLock::new(|| Decimal::new(1, 2)); // 0.01
static MAX_AMOUNT: LazyLock<Decimal> = LazyLock::new(|| Decimal::from(10_000_000));

/// Turn an isolated numeric substring into a canonical decimal amount.
///
/// When both `.` and `,` appear, whichever occurs later is the decimal
/// separator and all occurrences of the other are stripped as thousands
/// grouping. A lone separator is decimal only when it reads as a plausible
/// decimal amount: 1-2 fractional digits and at most 4 integer digits.
///
/// Returns `None` for malformed syntax and for amounts outside
/// `[0.01, 10,000,000]`.
pub fn normalize_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let last_dot = raw.rfind('.');
    let last_comma = raw.rfind(',');

    let canonical = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => {
            if comma > dot {
                let (int_part, frac) = raw.split_at(comma);
                format!("{}.{}", int_part.replace('.', ""), &frac[1..])
            } else {
                let (int_part, frac) = raw.split_at(dot);
                format!("{}.{}", int_part.replace(',', ""), &frac[1..])
            }
        }
        (None, Some(_)) => resolve_lone_separator(raw, ','),
        (Some(_), None) => resolve_lone_separator(raw, '.'),
        (None, None) => raw.to_string(),
    };

    let value = Decimal::from_str(&canonical).ok()?;
    (value >= *MIN_AMOUNT && value <= *MAX_AMOUNT).then_some(value)
}

fn resolve_lone_separator(raw: &str, sep: char) -> String {
    let parts: Vec<&str> = raw.split(sep).collect();
    let decimal_shaped =
        parts.len() == 2 && (1..=2).contains(&parts[1].len()) && parts[0].len() <= 4;
    if decimal_shaped {
        format!("{}.{}", parts[0], parts[1])
    } else {
        raw.replace(sep, "")
    }
}
