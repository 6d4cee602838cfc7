pub mod credibility;
pub mod llm;
pub mod orchestrator;
pub mod synthesis;
pub mod tasks;

pub use credibility::{AnalysisError, AnalysisOutcome, CredibilityService};
pub use llm::LlmClient;
pub use orchestrator::PipelineError;
