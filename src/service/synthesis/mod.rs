//! Synthesis of all upstream analysis results into the final verdict

use std::collections::BTreeMap;

use crate::model::extracted::ExtractedSynthesis;
use crate::model::{AnalysisResult, SynthesisReport, TaskKind};
use crate::service::llm::{ReasoningClient, TaskRequest};
use crate::service::synthesis::prompts::{SYNTHESIS_SYSTEM_PROMPT, build_synthesis_prompt};
use crate::service::synthesis::validation::enforce_contract;
use crate::service::tasks::{TaskError, dependencies};

pub mod prompts;
pub mod validation;

const SYNTHESIS_TEMPERATURE: f64 = 0.2;

/// Mean of upstream overall scores on the higher-is-better scale
pub fn upstream_average(results: &BTreeMap<TaskKind, AnalysisResult>) -> f64 {
    let scores: Vec<f64> = results
        .values()
        .filter(|r| r.kind() != TaskKind::Synthesis)
        .map(|r| r.base().aligned_score())
        .collect();

    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Produce the synthesis report; requires every upstream result
pub async fn synthesize<R: ReasoningClient>(
    reasoner: &R,
    results: &BTreeMap<TaskKind, AnalysisResult>,
    purpose: &str,
) -> Result<SynthesisReport, TaskError> {
    if let Some(missing) = dependencies(TaskKind::Synthesis)
        .iter()
        .find(|kind| !results.contains_key(*kind))
    {
        return Err(TaskError::MissingInput {
            task: TaskKind::Synthesis,
            input: missing.as_str(),
        });
    }

    let start = std::time::Instant::now();
    let average = upstream_average(results);
    let request = TaskRequest {
        task: TaskKind::Synthesis,
        preamble: SYNTHESIS_SYSTEM_PROMPT,
        prompt: build_synthesis_prompt(results, purpose, average),
        temperature: SYNTHESIS_TEMPERATURE,
    };

    let extracted = reasoner
        .run_task::<ExtractedSynthesis>(request)
        .await
        .map_err(|source| TaskError::Reasoning {
            task: TaskKind::Synthesis,
            source,
        })?;

    let (report, validation) = enforce_contract(extracted, average);

    if !validation.is_valid {
        tracing::warn!(
            errors = ?validation.errors,
            "Synthesis output violated its contract and was repaired"
        );
    }
    if !validation.warnings.is_empty() {
        tracing::warn!(
            warnings = ?validation.warnings,
            "Synthesis produced quality warnings"
        );
    }

    tracing::info!(
        overall_credibility_score = report.overall_credibility_score,
        upstream_average = average,
        recommendation = ?report.recommendation,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Synthesis completed"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClaimResult, DateResult, ScoreBase, ScorePolarity};
    use crate::service::llm::scripted::ScriptedReasoner;

    #[test]
    fn test_average_aligns_polarity() {
        let mut results = BTreeMap::new();
        results.insert(
            TaskKind::Claim,
            AnalysisResult::Claim(ClaimResult {
                base: ScoreBase::new(80.0, 90.0, "c", ScorePolarity::HigherIsBetter),
                central_claim: "x".to_string(),
            }),
        );
        results.insert(
            TaskKind::Date,
            AnalysisResult::Date(DateResult {
                base: ScoreBase::new(30.0, 100.0, "d", ScorePolarity::HigherIsWorse),
                date: None,
                relevance: None,
            }),
        );

        assert_eq!(upstream_average(&results), 75.0);
        assert_eq!(upstream_average(&BTreeMap::new()), 0.0);
    }

    #[tokio::test]
    async fn test_missing_upstream_result_rejected() {
        let reasoner = ScriptedReasoner::new();
        let err = synthesize(&reasoner, &BTreeMap::new(), "p").await.unwrap_err();
        assert!(matches!(
            err,
            TaskError::MissingInput {
                task: TaskKind::Synthesis,
                input: "claim"
            }
        ));
        assert!(!reasoner.called(TaskKind::Synthesis));
    }
}
