//! Dependency-ordered, phase-concurrent execution of the analysis tasks

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::future::try_join_all;

use crate::model::{AnalysisResult, Document, PipelineReport, TaskKind};
use crate::service::llm::ReasoningClient;
use crate::service::synthesis::synthesize;
use crate::service::tasks::{TaskError, TaskInputs, dependencies, run_analysis_task};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PipelineError {
    #[error(transparent)]
    TaskFailure(#[from] TaskError),

    #[error("Task dependency cycle among: {0:?}")]
    DependencyCycle(Vec<TaskKind>),
}

/// Layer tasks into phases; every task lands after all of its dependencies
///
/// Dependencies outside `tasks` are ignored. Within a phase tasks keep
/// `TaskKind` order.
pub fn plan_phases(tasks: &[TaskKind]) -> Result<Vec<Vec<TaskKind>>, PipelineError> {
    let selected: BTreeSet<TaskKind> = tasks.iter().copied().collect();
    let mut remaining: BTreeMap<TaskKind, BTreeSet<TaskKind>> = selected
        .iter()
        .map(|task| {
            let deps = dependencies(*task)
                .iter()
                .copied()
                .filter(|d| selected.contains(d))
                .collect();
            (*task, deps)
        })
        .collect();

    let mut phases = Vec::new();
    while !remaining.is_empty() {
        let ready: Vec<TaskKind> = remaining
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(task, _)| *task)
            .collect();

        if ready.is_empty() {
            return Err(PipelineError::DependencyCycle(remaining.keys().copied().collect()));
        }

        for task in &ready {
            remaining.remove(task);
        }
        for deps in remaining.values_mut() {
            for task in &ready {
                deps.remove(task);
            }
        }
        phases.push(ready);
    }

    Ok(phases)
}

/// Runs the analysis pipeline over one document
pub struct Orchestrator<R> {
    reasoner: Arc<R>,
    phases: Vec<Vec<TaskKind>>,
}

impl<R: ReasoningClient> Orchestrator<R> {
    pub fn new(reasoner: Arc<R>) -> Result<Self, PipelineError> {
        let phases = plan_phases(&TaskKind::ALL)?;
        tracing::info!(phases = ?phases, "Analysis pipeline planned");
        Ok(Self { reasoner, phases })
    }

    pub fn phases(&self) -> &[Vec<TaskKind>] {
        &self.phases
    }

    /// Run every phase; the first task failure aborts the invocation
    ///
    /// Sibling tasks still in flight are dropped, which cancels them, and no
    /// later phase or synthesis runs.
    pub async fn run(&self, document: &Document, purpose: &str) -> Result<PipelineReport, PipelineError> {
        let start = std::time::Instant::now();
        let mut results: BTreeMap<TaskKind, AnalysisResult> = BTreeMap::new();
        let mut synthesis = None;

        for (index, phase) in self.phases.iter().enumerate() {
            let phase_start = std::time::Instant::now();
            tracing::info!(
                phase = index + 1,
                tasks = ?phase,
                fingerprint = %document.fingerprint(),
                "Starting analysis phase"
            );

            let inputs = TaskInputs {
                purpose: purpose.to_string(),
                central_claim: match results.get(&TaskKind::Claim) {
                    Some(AnalysisResult::Claim(claim)) => Some(claim.central_claim.clone()),
                    _ => None,
                },
            };

            let analysis_tasks: Vec<TaskKind> = phase
                .iter()
                .copied()
                .filter(|t| *t != TaskKind::Synthesis)
                .collect();

            let outcomes = try_join_all(
                analysis_tasks
                    .iter()
                    .map(|kind| run_analysis_task(self.reasoner.as_ref(), *kind, document, &inputs)),
            )
            .await
            .inspect_err(|e| {
                tracing::warn!(phase = index + 1, task = %e.task(), error = %e, "Analysis phase failed");
            })?;

            for result in outcomes {
                results.insert(result.kind(), result);
            }

            if phase.contains(&TaskKind::Synthesis) {
                synthesis = Some(synthesize(self.reasoner.as_ref(), &results, purpose).await?);
            }

            tracing::info!(
                phase = index + 1,
                elapsed_ms = phase_start.elapsed().as_millis() as u64,
                "Analysis phase completed"
            );
        }

        let synthesis = synthesis.ok_or(PipelineError::TaskFailure(TaskError::MissingInput {
            task: TaskKind::Synthesis,
            input: "synthesis phase",
        }))?;

        tracing::info!(
            tasks = results.len(),
            overall_credibility_score = synthesis.overall_credibility_score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis pipeline completed"
        );

        Ok(PipelineReport { results, synthesis })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Scripted responses for a complete, successful pipeline run

    use serde_json::json;

    use crate::model::TaskKind;
    use crate::service::llm::scripted::ScriptedReasoner;

    pub const CENTRAL_CLAIM: &str = "Reading for pleasure at age ten predicts higher attainment at sixteen.";

    pub fn full_script() -> ScriptedReasoner {
        ScriptedReasoner::new()
            .respond(
                TaskKind::Claim,
                json!({
                    "central_claim": CENTRAL_CLAIM,
                    "overall_score": 85,
                    "confidence_score": 90,
                    "summary": "A cohort study of reading habits."
                }),
            )
            .respond(
                TaskKind::Citations,
                json!({
                    "overall_score": 70,
                    "summary": "Mostly peer-reviewed sources.",
                    "total_citations_found": 10,
                    "verified_citations": 8,
                    "unverified_citations": 2,
                    "avg_citation_age_years": 5.0
                }),
            )
            .respond(
                TaskKind::Bias,
                json!({
                    "overall_score": 90,
                    "confidence_score": 65,
                    "summary": "Neutral academic tone.",
                    "dominant_tone": "neutral",
                    "bias_level": "Low"
                }),
            )
            .respond(
                TaskKind::Date,
                json!({
                    "date": "2013-09-01",
                    "relevance": "Still relevant",
                    "overall_score": 60,
                    "summary": "Published in 2013."
                }),
            )
            .respond(
                TaskKind::Evidence,
                json!({
                    "overall_score": 75,
                    "summary": "Large sample, observational design.",
                    "total_evidence_found": 4,
                    "supporting_evidence_count": 3,
                    "contradicting_evidence_count": 0,
                    "neutral_evidence_count": 1,
                    "methodology_quality": "adequate",
                    "data_quality": "strong",
                    "logical_consistency": true
                }),
            )
            .respond(
                TaskKind::Usefulness,
                json!({
                    "overall_score": 80,
                    "summary": "Directly relevant.",
                    "alignment_score": 85,
                    "key_arguments": ["a", "b"],
                    "suggested_role": "primary source"
                }),
            )
            .respond(
                TaskKind::Author,
                json!({
                    "overall_score": 82,
                    "summary": "Established researchers.",
                    "author_name": "A. Sullivan",
                    "expertise_alignment_score": 90,
                    "reliability_score_estimate": 85,
                    "bias_indicators": ["advocacy for libraries"]
                }),
            )
            .respond(
                TaskKind::Synthesis,
                json!({
                    "overall_credibility_score": 78,
                    "confidence_score": 80,
                    "summary": "Credible study with observational limits.",
                    "key_findings": ["f1", "f2", "f3"],
                    "red_flags": [],
                    "strengths": ["large cohort"],
                    "final_verdict": "Reliable with caveats.",
                    "recommendation": "Use with caution"
                }),
            )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::fixtures::{CENTRAL_CLAIM, full_script};
    use super::*;
    use crate::model::Recommendation;

    fn document() -> Document {
        Document::new(&"The cohort study text. ".repeat(20), "text-input", "raw_text", 10_000).unwrap()
    }

    #[test]
    fn test_default_plan_has_three_phases() {
        let phases = plan_phases(&TaskKind::ALL).unwrap();
        assert_eq!(
            phases,
            vec![
                vec![TaskKind::Claim, TaskKind::Citations, TaskKind::Bias, TaskKind::Date],
                vec![TaskKind::Evidence, TaskKind::Usefulness, TaskKind::Author],
                vec![TaskKind::Synthesis],
            ]
        );
    }

    #[test]
    fn test_plan_ignores_unselected_dependencies() {
        let phases = plan_phases(&[TaskKind::Author, TaskKind::Bias]).unwrap();
        assert_eq!(phases, vec![vec![TaskKind::Bias, TaskKind::Author]]);
    }

    #[tokio::test]
    async fn test_full_run_produces_all_results() {
        let reasoner = Arc::new(full_script());
        let orchestrator = Orchestrator::new(reasoner.clone()).unwrap();

        let report = orchestrator.run(&document(), "school policy").await.unwrap();

        assert_eq!(report.results.len(), 7);
        assert_eq!(report.synthesis.recommendation, Recommendation::UseWithCaution);
        assert_eq!(report.synthesis.overall_credibility_score, 78.0);
        for result in report.results.values() {
            let base = result.base();
            assert!((0.0..=100.0).contains(&base.overall_score()));
            assert!((0.0..=100.0).contains(&base.confidence_score()));
        }

        // Derived confidence: 8 of 10 citations verified, 90 - 10 for one bias indicator
        assert_eq!(report.citations().unwrap().base.confidence_score(), 80.0);
        assert_eq!(report.author().unwrap().base.confidence_score(), 80.0);
        assert_eq!(report.usefulness().unwrap().research_topic, "school policy");
    }

    #[tokio::test]
    async fn test_phase_two_receives_claim_unchanged() {
        let reasoner = Arc::new(full_script());
        let report = Orchestrator::new(reasoner.clone())
            .unwrap()
            .run(&document(), "p")
            .await
            .unwrap();

        assert_eq!(report.evidence().unwrap().central_claim_evaluated, CENTRAL_CLAIM);
        for task in [TaskKind::Evidence, TaskKind::Usefulness, TaskKind::Author] {
            let prompt = reasoner.prompt_for(task).unwrap();
            assert!(prompt.contains(&format!("CENTRAL CLAIM: {}\n", CENTRAL_CLAIM)));
        }
    }

    #[tokio::test]
    async fn test_synthesis_never_sees_raw_document() {
        let reasoner = Arc::new(full_script());
        Orchestrator::new(reasoner.clone())
            .unwrap()
            .run(&document(), "p")
            .await
            .unwrap();

        let prompt = reasoner.prompt_for(TaskKind::Synthesis).unwrap();
        assert!(!prompt.contains("The cohort study text."));
        assert!(prompt.contains("Simple average of the upstream scores"));
    }

    #[tokio::test]
    async fn test_seed_failure_stops_pipeline() {
        let reasoner = Arc::new(full_script().fail(TaskKind::Bias));
        let err = Orchestrator::new(reasoner.clone())
            .unwrap()
            .run(&document(), "p")
            .await
            .unwrap_err();

        match err {
            PipelineError::TaskFailure(e) => assert_eq!(e.task(), TaskKind::Bias),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!reasoner.called(TaskKind::Evidence));
        assert!(!reasoner.called(TaskKind::Synthesis));
    }

    #[tokio::test]
    async fn test_failure_cancels_slow_siblings() {
        let reasoner = Arc::new(
            full_script()
                .fail(TaskKind::Author)
                .delay(TaskKind::Evidence, Duration::from_secs(30)),
        );
        let orchestrator = Orchestrator::new(reasoner.clone()).unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(5), orchestrator.run(&document(), "p")).await;

        let err = outcome.expect("failure should not wait for slow siblings").unwrap_err();
        assert!(matches!(err, PipelineError::TaskFailure(ref e) if e.task() == TaskKind::Author));
        assert!(!reasoner.called(TaskKind::Synthesis));
    }
}
