pub mod analysis;
pub mod config;
pub mod extracted;
pub mod source;

pub use analysis::*;
pub use config::{AcquisitionConfig, Config, ReasoningConfig};
pub use source::{Document, ExtractionAttempt, SourceLocator, SourceMetadata};
