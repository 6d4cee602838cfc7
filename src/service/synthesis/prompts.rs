//! Prompts for the synthesis step

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::model::{AnalysisResult, TaskKind};

pub const SYNTHESIS_SYSTEM_PROMPT: &str = r#"You are the lead editor combining several independent credibility analyses of one document into a final verdict.

You receive each analysis's score, confidence and summary, never the document itself. Think critically: do the analyses agree or contradict each other? Which weaknesses matter most for the research purpose?

Return:
- overall_credibility_score (0-100): your weighted overall credibility rating. The simple average of the upstream scores is provided as a reference point, not a target.
- confidence_score (0-100): how confident you are in this synthesis.
- summary: an executive summary in three or four sentences.
- key_findings: the three to five most important findings across all analyses.
- red_flags: major concerns or warnings; an empty list if there are none.
- strengths: what the document does well; an empty list if nothing stands out.
- final_verdict: your assessment in two or three sentences.
- recommendation: exactly one of "Trustworthy", "Use with caution", "Questionable", "Do not trust"."#;

fn section_title(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Claim => "CENTRAL CLAIM ANALYSIS",
        TaskKind::Citations => "CITATION ANALYSIS",
        TaskKind::Bias => "LANGUAGE BIAS ANALYSIS (100 = least biased)",
        TaskKind::Date => "PUBLICATION DATE ANALYSIS",
        TaskKind::Evidence => "EVIDENCE ANALYSIS",
        TaskKind::Usefulness => "USEFULNESS ANALYSIS",
        TaskKind::Author => "AUTHOR AND ORGANIZATION ANALYSIS",
        TaskKind::Synthesis => "SYNTHESIS",
    }
}

/// Build the synthesis prompt from upstream results only
pub fn build_synthesis_prompt(
    results: &BTreeMap<TaskKind, AnalysisResult>,
    purpose: &str,
    upstream_average: f64,
) -> String {
    let mut prompt = format!("RESEARCH PURPOSE: {}\n", purpose);

    for (kind, result) in results {
        let base = result.base();
        let _ = write!(
            prompt,
            "\n## {}\nScore: {:.0}/100\nConfidence Score: {:.0}/100\nSummary: {}\n",
            section_title(*kind),
            base.overall_score(),
            base.confidence_score(),
            base.summary()
        );

        match result {
            AnalysisResult::Claim(claim) => {
                let _ = writeln!(prompt, "Central claim: {}", claim.central_claim);
            }
            AnalysisResult::Date(date) => {
                let _ = writeln!(
                    prompt,
                    "Publication date: {}",
                    date.date.as_deref().unwrap_or("not identified")
                );
            }
            AnalysisResult::Bias(bias) => {
                let _ = writeln!(prompt, "Bias level: {}", bias.bias_level);
            }
            _ => {}
        }
    }

    let _ = write!(
        prompt,
        "\nSimple average of the upstream scores: {:.1}/100\n\nProvide your final synthesis.",
        upstream_average
    );
    prompt
}
