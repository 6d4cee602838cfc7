//! Analysis tasks
//!
//! Each task wraps one structured call to the reasoning service and converts
//! the response into an [`AnalysisResult`]. Tasks share no mutable state and
//! only read the document and their declared inputs.

use crate::model::extracted::{
    ExtractedAuthor, ExtractedBias, ExtractedCitations, ExtractedClaim, ExtractedDate,
    ExtractedEvidence, ExtractedUsefulness,
};
use crate::model::{AnalysisResult, Document, TaskKind};
use crate::service::llm::{ReasoningClient, ReasoningError, TaskRequest};
use crate::service::tasks::converters::{
    convert_author, convert_bias, convert_citations, convert_claim, convert_date,
    convert_evidence, convert_usefulness,
};
use crate::service::tasks::prompts::{
    AUTHOR_SYSTEM_PROMPT, BIAS_SYSTEM_PROMPT, CITATION_SYSTEM_PROMPT, CLAIM_SYSTEM_PROMPT,
    DATE_SYSTEM_PROMPT, EVIDENCE_SYSTEM_PROMPT, USEFULNESS_SYSTEM_PROMPT, build_author_prompt,
    build_date_prompt, build_document_prompt, build_evidence_prompt, build_usefulness_prompt,
};

pub mod confidence;
pub mod converters;
pub mod prompts;

/// Low temperature keeps scores reproducible across runs
const ANALYSIS_TEMPERATURE: f64 = 0.2;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TaskError {
    #[error("{task} task failed: {source}")]
    Reasoning {
        task: TaskKind,
        #[source]
        source: ReasoningError,
    },

    #[error("{task} task is missing required input '{input}'")]
    MissingInput { task: TaskKind, input: &'static str },

    #[error("{task} task produced an invalid result: {reason}")]
    InvalidResult { task: TaskKind, reason: String },
}

impl TaskError {
    pub fn task(&self) -> TaskKind {
        match self {
            TaskError::Reasoning { task, .. }
            | TaskError::MissingInput { task, .. }
            | TaskError::InvalidResult { task, .. } => *task,
        }
    }
}

/// Upstream tasks whose output a task consumes
pub fn dependencies(kind: TaskKind) -> &'static [TaskKind] {
    match kind {
        TaskKind::Claim | TaskKind::Citations | TaskKind::Bias | TaskKind::Date => &[],
        TaskKind::Evidence | TaskKind::Usefulness | TaskKind::Author => &[TaskKind::Claim],
        TaskKind::Synthesis => &[
            TaskKind::Claim,
            TaskKind::Citations,
            TaskKind::Bias,
            TaskKind::Date,
            TaskKind::Evidence,
            TaskKind::Usefulness,
            TaskKind::Author,
        ],
    }
}

/// Read-only inputs shared by the tasks of one invocation
#[derive(Debug, Clone)]
pub struct TaskInputs {
    /// The caller's research purpose
    pub purpose: String,
    /// Set once the claim task has completed
    pub central_claim: Option<String>,
}

impl TaskInputs {
    pub fn new(purpose: impl Into<String>) -> Self {
        Self {
            purpose: purpose.into(),
            central_claim: None,
        }
    }

    fn require_claim(&self, task: TaskKind) -> Result<&str, TaskError> {
        self.central_claim
            .as_deref()
            .ok_or(TaskError::MissingInput {
                task,
                input: "central_claim",
            })
    }
}

async fn call<R, T>(reasoner: &R, task: TaskKind, preamble: &'static str, prompt: String) -> Result<T, TaskError>
where
    R: ReasoningClient,
    T: schemars::JsonSchema + serde::de::DeserializeOwned + serde::Serialize + Send + Sync + 'static,
{
    let request = TaskRequest {
        task,
        preamble,
        prompt,
        temperature: ANALYSIS_TEMPERATURE,
    };
    reasoner
        .run_task::<T>(request)
        .await
        .map_err(|source| TaskError::Reasoning { task, source })
}

/// Run one non-synthesis analysis task
pub async fn run_analysis_task<R: ReasoningClient>(
    reasoner: &R,
    kind: TaskKind,
    document: &Document,
    inputs: &TaskInputs,
) -> Result<AnalysisResult, TaskError> {
    let start = std::time::Instant::now();
    tracing::debug!(task = %kind, fingerprint = %document.fingerprint(), "Running analysis task");

    let result = match kind {
        TaskKind::Claim => {
            let extracted: ExtractedClaim =
                call(reasoner, kind, CLAIM_SYSTEM_PROMPT, build_document_prompt(document)).await?;
            let claim = convert_claim(extracted);
            if claim.central_claim.is_empty() {
                return Err(TaskError::InvalidResult {
                    task: kind,
                    reason: "empty central claim".to_string(),
                });
            }
            AnalysisResult::Claim(claim)
        }
        TaskKind::Citations => {
            let extracted: ExtractedCitations =
                call(reasoner, kind, CITATION_SYSTEM_PROMPT, build_document_prompt(document)).await?;
            AnalysisResult::Citations(convert_citations(extracted))
        }
        TaskKind::Bias => {
            let extracted: ExtractedBias =
                call(reasoner, kind, BIAS_SYSTEM_PROMPT, build_document_prompt(document)).await?;
            AnalysisResult::Bias(convert_bias(extracted))
        }
        TaskKind::Date => {
            let prompt = build_date_prompt(document, &inputs.purpose);
            let extracted: ExtractedDate = call(reasoner, kind, DATE_SYSTEM_PROMPT, prompt).await?;
            AnalysisResult::Date(convert_date(extracted))
        }
        TaskKind::Evidence => {
            let claim = inputs.require_claim(kind)?;
            let prompt = build_evidence_prompt(document, claim);
            let extracted: ExtractedEvidence = call(reasoner, kind, EVIDENCE_SYSTEM_PROMPT, prompt).await?;
            AnalysisResult::Evidence(convert_evidence(extracted, claim))
        }
        TaskKind::Usefulness => {
            let claim = inputs.require_claim(kind)?;
            let prompt = build_usefulness_prompt(document, claim, &inputs.purpose);
            let extracted: ExtractedUsefulness =
                call(reasoner, kind, USEFULNESS_SYSTEM_PROMPT, prompt).await?;
            AnalysisResult::Usefulness(convert_usefulness(extracted, &inputs.purpose))
        }
        TaskKind::Author => {
            let claim = inputs.require_claim(kind)?;
            let prompt = build_author_prompt(document, claim, &inputs.purpose);
            let extracted: ExtractedAuthor = call(reasoner, kind, AUTHOR_SYSTEM_PROMPT, prompt).await?;
            AnalysisResult::Author(convert_author(extracted))
        }
        TaskKind::Synthesis => {
            return Err(TaskError::InvalidResult {
                task: kind,
                reason: "synthesis consumes upstream results and is run by the synthesizer"
                    .to_string(),
            });
        }
    };

    tracing::info!(
        task = %kind,
        overall_score = result.base().overall_score(),
        confidence_score = result.base().confidence_score(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Analysis task completed"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::llm::scripted::ScriptedReasoner;
    use serde_json::json;

    fn document() -> Document {
        Document::new(&"Body text. ".repeat(20), "text-input", "raw_text", 10_000).unwrap()
    }

    #[test]
    fn test_dependency_declarations() {
        assert!(dependencies(TaskKind::Bias).is_empty());
        assert_eq!(dependencies(TaskKind::Author), &[TaskKind::Claim]);
        assert_eq!(dependencies(TaskKind::Synthesis).len(), 7);
        assert!(!dependencies(TaskKind::Synthesis).contains(&TaskKind::Synthesis));
    }

    #[tokio::test]
    async fn test_dependent_task_requires_claim() {
        let reasoner = ScriptedReasoner::new();
        let err = run_analysis_task(&reasoner, TaskKind::Evidence, &document(), &TaskInputs::new("p"))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::MissingInput { task: TaskKind::Evidence, .. }));
        assert!(reasoner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_claim_is_invalid() {
        let reasoner = ScriptedReasoner::new().respond(
            TaskKind::Claim,
            json!({"central_claim": "  ", "overall_score": 50, "confidence_score": 50, "summary": "s"}),
        );
        let err = run_analysis_task(&reasoner, TaskKind::Claim, &document(), &TaskInputs::new("p"))
            .await
            .unwrap_err();
        assert_eq!(err.task(), TaskKind::Claim);
    }

    #[tokio::test]
    async fn test_reasoning_failure_is_attributed() {
        let reasoner = ScriptedReasoner::new().fail(TaskKind::Bias);
        let err = run_analysis_task(&reasoner, TaskKind::Bias, &document(), &TaskInputs::new("p"))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Reasoning { task: TaskKind::Bias, .. }));
    }
}
