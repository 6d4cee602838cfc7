//! Inbound analysis operations
//!
//! Each operation runs configuration check, validation, acquisition and
//! orchestration in that order and stops at the first failure.

use std::sync::Arc;

use url::Url;

use crate::acquisition::text::prepare_document_text;
use crate::acquisition::{AcquisitionEngine, AcquisitionError};
use crate::model::{Document, PipelineReport, SourceLocator};
use crate::service::llm::ReasoningClient;
use crate::service::orchestrator::{Orchestrator, PipelineError};

/// Purpose used when the caller gives none
pub const DEFAULT_PURPOSE: &str = "general credibility analysis";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("Service not configured: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl AnalysisError {
    /// Stable machine-readable failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Configuration(_) => "configuration_failure",
            AnalysisError::Validation(_) => "validation_failure",
            AnalysisError::Acquisition(_) => "acquisition_failure",
            AnalysisError::Pipeline(PipelineError::TaskFailure(_)) => "task_failure",
            AnalysisError::Pipeline(PipelineError::DependencyCycle(_)) => "planning_failure",
        }
    }

    pub fn hints(&self) -> Vec<String> {
        match self {
            AnalysisError::Acquisition(e) => e.remediation_hints(),
            AnalysisError::Configuration(_) => {
                vec!["Set OPENAI_API_KEY in the environment or .env file and restart".to_string()]
            }
            _ => Vec::new(),
        }
    }
}

/// A completed analysis
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub document: Document,
    pub purpose: String,
    pub report: PipelineReport,
}

/// Blank purposes fall back to a general analysis
pub fn normalize_purpose(purpose: Option<&str>) -> String {
    match purpose.map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => DEFAULT_PURPOSE.to_string(),
    }
}

/// Entry point for URL, text and upload analyses
pub struct CredibilityService<R> {
    engine: Arc<AcquisitionEngine>,
    orchestrator: Option<Orchestrator<R>>,
}

impl<R: ReasoningClient> CredibilityService<R> {
    /// `reasoner` is `None` when no reasoning credential is configured
    pub fn new(engine: Arc<AcquisitionEngine>, reasoner: Option<Arc<R>>) -> Result<Self, PipelineError> {
        let orchestrator = reasoner.map(Orchestrator::new).transpose()?;
        if orchestrator.is_none() {
            tracing::warn!("Reasoning client not configured; analysis requests will be rejected");
        }
        Ok(Self {
            engine,
            orchestrator,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.orchestrator.is_some()
    }

    fn orchestrator(&self) -> Result<&Orchestrator<R>, AnalysisError> {
        self.orchestrator.as_ref().ok_or_else(|| {
            AnalysisError::Configuration("reasoning service credential is missing".to_string())
        })
    }

    pub async fn analyze_from_url(&self, url: &str, purpose: Option<&str>) -> Result<AnalysisOutcome, AnalysisError> {
        let orchestrator = self.orchestrator()?;

        let url = url.trim();
        if url.is_empty() {
            return Err(AnalysisError::Validation("url must not be empty".to_string()));
        }
        let parsed = Url::parse(url).map_err(|e| AnalysisError::Validation(format!("url is not valid: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AnalysisError::Validation(format!(
                "url scheme must be http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if !self.engine.config().is_url_allowed(&parsed) {
            tracing::debug!(url = %parsed, "URL blocked by configuration");
            return Err(AnalysisError::Validation(format!(
                "host '{}' is not allowed",
                parsed.host_str().unwrap_or_default()
            )));
        }

        self.run(orchestrator, SourceLocator::Url(url.to_string()), purpose).await
    }

    pub async fn analyze_from_text(&self, text: &str, purpose: Option<&str>) -> Result<AnalysisOutcome, AnalysisError> {
        let orchestrator = self.orchestrator()?;

        let config = self.engine.config();
        let min = config.min_text_length;
        let length = prepare_document_text(text, config.max_text_length).chars().count();
        if length < min {
            return Err(AnalysisError::Validation(format!(
                "text must be at least {} characters, got {}",
                min, length
            )));
        }

        self.run(orchestrator, SourceLocator::RawText(text.to_string()), purpose).await
    }

    pub async fn analyze_from_binary(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        purpose: Option<&str>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let orchestrator = self.orchestrator()?;

        if bytes.is_empty() {
            return Err(AnalysisError::Validation("uploaded file is empty".to_string()));
        }
        let filename = match filename.trim() {
            "" => "upload.pdf".to_string(),
            name => name.to_string(),
        };

        self.run(orchestrator, SourceLocator::BinaryBlob { bytes, filename }, purpose).await
    }

    async fn run(
        &self,
        orchestrator: &Orchestrator<R>,
        locator: SourceLocator,
        purpose: Option<&str>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let purpose = normalize_purpose(purpose);
        let document = self.engine.acquire(&locator).await?;

        tracing::info!(
            source = %document.source_descriptor(),
            fingerprint = %document.fingerprint(),
            chars = document.char_len(),
            purpose = %purpose,
            "Starting analysis"
        );

        let report = orchestrator.run(&document, &purpose).await?;

        Ok(AnalysisOutcome {
            document,
            purpose,
            report,
        })
    }
}
