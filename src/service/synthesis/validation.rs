//! Contract enforcement for the synthesis result
//!
//! The synthesis output is repaired rather than rejected: scores are
//! clamped, key findings are trimmed to the allowed range and every issue is
//! reported so the caller can log it.

use crate::model::extracted::ExtractedSynthesis;
use crate::model::{ScoreBase, ScorePolarity, SynthesisReport, clamp_score};

pub const MIN_KEY_FINDINGS: usize = 3;
pub const MAX_KEY_FINDINGS: usize = 5;

/// Result of synthesis validation
#[derive(Debug)]
pub struct SynthesisValidationResult {
    /// Whether the output met the contract without repair
    pub is_valid: bool,
    /// Contract violations that were repaired
    pub errors: Vec<String>,
    /// Quality issues left as-is
    pub warnings: Vec<String>,
}

impl SynthesisValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Turn the extracted synthesis into a report that honors the contract
pub fn enforce_contract(
    extracted: ExtractedSynthesis,
    upstream_average_score: f64,
) -> (SynthesisReport, SynthesisValidationResult) {
    let mut validation = SynthesisValidationResult::valid();

    let raw_score = extracted.overall_credibility_score;
    let score = clamp_score(raw_score);
    if score != raw_score {
        validation.add_error(format!(
            "overall_credibility_score {} outside [0, 100], clamped to {}",
            raw_score, score
        ));
    }

    let raw_confidence = extracted.confidence_score;
    if clamp_score(raw_confidence) != raw_confidence {
        validation.add_error(format!(
            "confidence_score {} outside [0, 100], clamped",
            raw_confidence
        ));
    }

    let mut key_findings = clean_list(extracted.key_findings);
    if key_findings.len() > MAX_KEY_FINDINGS {
        validation.add_error(format!(
            "{} key findings returned, truncated to {}",
            key_findings.len(),
            MAX_KEY_FINDINGS
        ));
        key_findings.truncate(MAX_KEY_FINDINGS);
    } else if key_findings.len() < MIN_KEY_FINDINGS {
        validation.add_warning(format!(
            "only {} key findings returned, expected at least {}",
            key_findings.len(),
            MIN_KEY_FINDINGS
        ));
    }

    if extracted.final_verdict.trim().is_empty() {
        validation.add_warning("final verdict is empty".to_string());
    }

    // A large gap between the verdict and the evidence deserves a look
    if (score - upstream_average_score).abs() > 40.0 {
        validation.add_warning(format!(
            "credibility score {:.0} diverges from upstream average {:.1}",
            score, upstream_average_score
        ));
    }

    let report = SynthesisReport {
        base: ScoreBase::new(
            score,
            raw_confidence,
            extracted.summary.trim(),
            ScorePolarity::HigherIsBetter,
        ),
        overall_credibility_score: score,
        key_findings,
        red_flags: clean_list(extracted.red_flags),
        strengths: clean_list(extracted.strengths),
        final_verdict: extracted.final_verdict.trim().to_string(),
        recommendation: extracted.recommendation,
        upstream_average_score,
    };

    (report, validation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Recommendation;

    fn extracted(score: f64, findings: usize) -> ExtractedSynthesis {
        ExtractedSynthesis {
            overall_credibility_score: score,
            confidence_score: 80.0,
            summary: " Solid. ".to_string(),
            key_findings: (0..findings).map(|i| format!("finding {}", i)).collect(),
            red_flags: vec!["".to_string(), "thin sourcing".to_string()],
            strengths: Vec::new(),
            final_verdict: "Mostly reliable.".to_string(),
            recommendation: Recommendation::UseWithCaution,
        }
    }

    #[test]
    fn test_excess_findings_truncated() {
        let (report, validation) = enforce_contract(extracted(70.0, 7), 68.0);
        assert_eq!(report.key_findings.len(), MAX_KEY_FINDINGS);
        assert!(!validation.is_valid);
    }

    #[test]
    fn test_shortfall_only_warns() {
        let (report, validation) = enforce_contract(extracted(70.0, 1), 68.0);
        assert_eq!(report.key_findings.len(), 1);
        assert!(validation.is_valid);
        assert_eq!(validation.warnings.len(), 1);
    }

    #[test]
    fn test_score_clamped_and_lists_cleaned() {
        let (report, validation) = enforce_contract(extracted(130.0, 4), 90.0);
        assert_eq!(report.overall_credibility_score, 100.0);
        assert_eq!(report.base.overall_score(), 100.0);
        assert_eq!(report.red_flags, vec!["thin sourcing"]);
        assert!(report.strengths.is_empty());
        assert_eq!(report.base.summary(), "Solid.");
        assert!(!validation.is_valid);
    }

    #[test]
    fn test_divergence_warning() {
        let (_, validation) = enforce_contract(extracted(95.0, 3), 30.0);
        assert!(validation.warnings.iter().any(|w| w.contains("diverges")));
    }
}
