//! Derived confidence rules
//!
//! Claim, bias and synthesis confidence is self-assessed by the reasoning
//! service. The remaining tasks derive confidence from the counts they
//! report, so a model cannot claim certainty its own output does not back.

use crate::model::clamp_score;

/// Derived confidence never drops to zero for an empty count
pub const CONFIDENCE_FLOOR: f64 = 10.0;

/// Points awarded per useful quote, section or argument
const USEFULNESS_POINTS_PER_ITEM: f64 = 8.0;

/// Points removed per author bias indicator
const AUTHOR_BIAS_PENALTY: f64 = 10.0;

fn ratio(part: u32, total: u32) -> f64 {
    if total == 0 {
        return CONFIDENCE_FLOOR;
    }
    clamp_score(part.min(total) as f64 / total as f64 * 100.0)
}

/// Share of citations that could be verified
pub fn citation_confidence(verified: u32, total: u32) -> f64 {
    ratio(verified, total)
}

/// Share of evidence items supporting the claim
pub fn evidence_confidence(supporting: u32, total: u32) -> f64 {
    ratio(supporting, total)
}

/// Eight points per useful item, capped at 100
pub fn usefulness_confidence(useful_items: usize) -> f64 {
    if useful_items == 0 {
        return CONFIDENCE_FLOOR;
    }
    clamp_score(useful_items as f64 * USEFULNESS_POINTS_PER_ITEM)
}

/// Full confidence once a publication date is identified
pub fn date_confidence(date: Option<&str>) -> f64 {
    match date {
        Some(d) if is_identified_date(d) => 100.0,
        _ => CONFIDENCE_FLOOR,
    }
}

/// Expertise alignment minus a penalty per bias indicator
pub fn author_confidence(expertise_alignment: Option<f64>, bias_indicators: usize) -> f64 {
    match expertise_alignment {
        Some(expertise) if !expertise.is_nan() => {
            let score = expertise - AUTHOR_BIAS_PENALTY * bias_indicators as f64;
            clamp_score(score).max(CONFIDENCE_FLOOR)
        }
        _ => CONFIDENCE_FLOOR,
    }
}

/// Models sometimes answer "unknown" instead of null
pub fn is_identified_date(date: &str) -> bool {
    let d = date.trim().to_lowercase();
    !(d.is_empty()
        || d == "unknown"
        || d == "n/a"
        || d == "none"
        || d.contains("not found")
        || d.contains("not available")
        || d.contains("no date"))
}
