//! Application state and service initialization

use std::sync::Arc;

use crate::acquisition::AcquisitionEngine;
use crate::model::{Config, ReasoningConfig};
use crate::service::{CredibilityService, LlmClient};

/// Application state containing all services and shared resources
pub struct AppState {
    /// Acquisition and analysis entry point shared by every worker
    pub credibility_service: Arc<CredibilityService<LlmClient>>,
}

impl AppState {
    /// Build the service graph from configuration
    ///
    /// A missing or unusable reasoning credential is not fatal: the server
    /// starts and analysis requests answer with a configuration failure.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let engine = Arc::new(AcquisitionEngine::new(config.acquisition)?);
        let reasoner = Self::build_reasoner(&config.reasoning);

        let credibility_service = CredibilityService::new(engine, reasoner)
            .map_err(|e| AppError::PipelineInit(e.to_string()))?;

        Ok(Self {
            credibility_service: Arc::new(credibility_service),
        })
    }

    fn build_reasoner(config: &ReasoningConfig) -> Option<Arc<LlmClient>> {
        if !config.is_configured() {
            tracing::warn!("OPENAI_API_KEY not set, analysis endpoints will return 503");
            return None;
        }

        match LlmClient::new(config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "Reasoning client unavailable, analysis endpoints will return 503");
                None
            }
        }
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// The outbound HTTP client could not be built
    #[error("HTTP client initialization failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The analysis pipeline could not be planned
    #[error("Pipeline initialization failed: {0}")]
    PipelineInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_without_credential() {
        let state = AppState::new(Config::default()).unwrap();
        assert!(!state.credibility_service.is_configured());
    }
}
