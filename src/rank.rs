//! Candidate ranking: one price out of many noisy mentions.
//!
//! The five steps below run in a fixed order; reordering them changes
//! observable behavior. Discovery order of the candidate slice is the
//! tie-break within each step, which keeps the outcome deterministic.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{PriceCandidate, Priority};
use crate::profiles::PRIORITY_CLASS_HINTS;

/// Product-price plausibility window. Narrower than the normalizer's raw
/// parse bounds.
const PLAUSIBLE_MIN: Decimal = Decimal::ONE;

fn plausible_max() -> Decimal {
    Decimal::from(1_000_000)
}

/// Choose the single most likely price, or `None` when no candidate exists.
///
/// 1. Filter to the plausible window; if that empties the set, fall back to
///    the first unfiltered candidate (a weak signal beats none).
/// 2. First high-priority candidate, in discovery order.
/// 3. First candidate whose class hint contains a priority term, in
///    hint-list order.
/// 4. Most frequent value, if it repeats across the document.
/// 5. Largest surviving value.
pub fn select_price(candidates: &[PriceCandidate]) -> Option<Decimal> {
    if candidates.is_empty() {
        return None;
    }

    let survivors: Vec<&PriceCandidate> = candidates
        .iter()
        .filter(|c| c.value >= PLAUSIBLE_MIN && c.value <= plausible_max())
        .collect();
    if survivors.is_empty() {
        debug!("all candidates outside plausibility window, keeping first anyway");
        return candidates.first().map(|c| c.value);
    }

    if let Some(chosen) = survivors.iter().find(|c| c.priority == Priority::High) {
        debug!(
            "high-priority candidate chosen: {} ({})",
            chosen.value,
            chosen.origin_selector.as_deref().unwrap_or("-")
        );
        return Some(chosen.value);
    }

    for hint in PRIORITY_CLASS_HINTS {
        if let Some(chosen) = survivors
            .iter()
            .find(|c| c.css_class_hint.to_lowercase().contains(hint))
        {
            debug!("class-hint candidate chosen: {} ({hint})", chosen.value);
            return Some(chosen.value);
        }
    }

    if let Some((value, count)) = most_frequent(&survivors) {
        if count > 1 {
            debug!("repeated value chosen: {value} ({count} occurrences)");
            return Some(value);
        }
    }

    // Decorative numbers on a page tend to be smaller than the headline
    // price, so the maximum is the last-resort pick.
    let max = survivors.iter().map(|c| c.value).max();
    if let Some(value) = max {
        debug!("maximum value chosen: {value}");
    }
    max
}

/// Frequency count preserving discovery order, so equal counts resolve to the
/// earliest-seen value.
fn most_frequent(survivors: &[&PriceCandidate]) -> Option<(Decimal, usize)> {
    let mut counts: Vec<(Decimal, usize)> = Vec::new();
    for candidate in survivors {
        match counts.iter_mut().find(|(v, _)| *v == candidate.value) {
            Some((_, n)) => *n += 1,
            None => counts.push((candidate.value, 1)),
        }
    }
    let mut best: Option<(Decimal, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((value, count));
        }
    }
    best
}
