//! Shared reasoning client and interaction utilities
//!
//! Every analysis task talks to the external reasoning service through
//! [`ReasoningClient`], so tests can swap in scripted responses.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::providers::openai;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::{ReasoningConfig, TaskKind};

/// Default model for the per-document analysis tasks
const DEFAULT_ANALYSIS_MODEL: &str = openai::GPT_4O_MINI;

/// Default model for the synthesis step, which reasons over all results
const DEFAULT_SYNTHESIS_MODEL: &str = openai::GPT_4O;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReasoningError {
    #[error("Reasoning client not configured: {0}")]
    NotConfigured(String),

    #[error("Reasoning call failed: {0}")]
    CallFailed(String),
}

/// One structured request to the reasoning service
#[derive(Debug, Clone)]
pub struct TaskRequest {
    pub task: TaskKind,
    /// System instructions
    pub preamble: &'static str,
    pub prompt: String,
    pub temperature: f64,
}

/// Structured-output reasoning collaborator
///
/// The response type doubles as the response schema.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    async fn run_task<T>(&self, request: TaskRequest) -> Result<T, ReasoningError>
    where
        T: JsonSchema + DeserializeOwned + Serialize + Send + Sync + 'static;
}

/// OpenAI-backed reasoning client
#[derive(Clone)]
pub struct LlmClient {
    client: openai::Client,
    analysis_model: String,
    synthesis_model: String,
}

impl LlmClient {
    /// Create a client from reasoning settings; fails without an API key
    pub fn new(config: &ReasoningConfig) -> Result<Self, ReasoningError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ReasoningError::NotConfigured("OPENAI_API_KEY is not set".to_string()))?;

        // rig-core 0.24: Client::new is infallible
        let client = openai::Client::new(api_key);

        let analysis_model = config
            .analysis_model
            .clone()
            .unwrap_or_else(|| DEFAULT_ANALYSIS_MODEL.to_string());
        let synthesis_model = config
            .synthesis_model
            .clone()
            .unwrap_or_else(|| DEFAULT_SYNTHESIS_MODEL.to_string());

        tracing::info!(
            analysis_model = %analysis_model,
            synthesis_model = %synthesis_model,
            "Reasoning client initialized"
        );

        Ok(Self {
            client,
            analysis_model,
            synthesis_model,
        })
    }

    fn model_for(&self, task: TaskKind) -> &str {
        match task {
            TaskKind::Synthesis => &self.synthesis_model,
            _ => &self.analysis_model,
        }
    }
}

#[async_trait]
impl ReasoningClient for LlmClient {
    async fn run_task<T>(&self, request: TaskRequest) -> Result<T, ReasoningError>
    where
        T: JsonSchema + DeserializeOwned + Serialize + Send + Sync + 'static,
    {
        let model = self.model_for(request.task);
        let prompt_length = request.prompt.len();

        tracing::debug!(
            task = %request.task,
            model = %model,
            prompt_length = prompt_length,
            "Initiating OpenAI API call"
        );

        let start_time = std::time::Instant::now();

        let extractor = self
            .client
            .extractor::<T>(model)
            .preamble(request.preamble)
            .additional_params(serde_json::json!({
                "temperature": request.temperature,
                "seed": 42
            }))
            .build();

        match extractor.extract(&request.prompt).await {
            Ok(result) => {
                tracing::info!(
                    task = %request.task,
                    model = %model,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    prompt_length = prompt_length,
                    "OpenAI API call completed successfully"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::error!(
                    task = %request.task,
                    model = %model,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    prompt_length = prompt_length,
                    error = %e,
                    "OpenAI API call failed"
                );
                Err(ReasoningError::CallFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    //! Scripted reasoning client for pipeline tests

    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    pub struct ScriptedReasoner {
        responses: BTreeMap<TaskKind, serde_json::Value>,
        failing: BTreeSet<TaskKind>,
        delays: BTreeMap<TaskKind, Duration>,
        calls: Mutex<Vec<TaskRequest>>,
    }

    impl ScriptedReasoner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(mut self, task: TaskKind, value: serde_json::Value) -> Self {
            self.responses.insert(task, value);
            self
        }

        pub fn fail(mut self, task: TaskKind) -> Self {
            self.failing.insert(task);
            self
        }

        pub fn delay(mut self, task: TaskKind, delay: Duration) -> Self {
            self.delays.insert(task, delay);
            self
        }

        /// Requests received, in call order
        pub fn calls(&self) -> Vec<TaskRequest> {
            self.calls.lock().unwrap().clone()
        }

        pub fn called(&self, task: TaskKind) -> bool {
            self.calls().iter().any(|c| c.task == task)
        }

        pub fn prompt_for(&self, task: TaskKind) -> Option<String> {
            self.calls()
                .into_iter()
                .find(|c| c.task == task)
                .map(|c| c.prompt)
        }
    }

    #[async_trait]
    impl ReasoningClient for ScriptedReasoner {
        async fn run_task<T>(&self, request: TaskRequest) -> Result<T, ReasoningError>
        where
            T: JsonSchema + DeserializeOwned + Serialize + Send + Sync + 'static,
        {
            let task = request.task;
            self.calls.lock().unwrap().push(request);

            if let Some(delay) = self.delays.get(&task) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing.contains(&task) {
                return Err(ReasoningError::CallFailed(format!("scripted failure for {}", task)));
            }

            let value = self
                .responses
                .get(&task)
                .cloned()
                .ok_or_else(|| ReasoningError::CallFailed(format!("no script for {}", task)))?;
            serde_json::from_value(value).map_err(|e| ReasoningError::CallFailed(e.to_string()))
        }
    }
}
