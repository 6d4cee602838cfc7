//! Source locators and acquired documents

use serde::Serialize;
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

/// Caller-supplied reference to the document to analyze
#[derive(Debug, Clone)]
pub enum SourceLocator {
    Url(String),
    RawText(String),
    BinaryBlob { bytes: Vec<u8>, filename: String },
}

impl SourceLocator {
    /// Human-readable descriptor used in logs and document provenance
    pub fn descriptor(&self) -> String {
        match self {
            SourceLocator::Url(url) => url.clone(),
            SourceLocator::RawText(_) => "text-input".to_string(),
            SourceLocator::BinaryBlob { filename, .. } => filename.clone(),
        }
    }
}

/// Bibliographic metadata scraped from the source page
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SourceMetadata {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub published: Option<String>,
}

impl SourceMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.authors.is_empty() && self.published.is_none()
    }
}

/// Record of one extraction strategy attempt
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionAttempt {
    pub strategy: String,
    pub url: String,
    pub succeeded: bool,
    pub text_length: usize,
    pub rejection_reason: Option<String>,
}

impl ExtractionAttempt {
    pub fn success(strategy: impl Into<String>, url: impl Into<String>, text_length: usize) -> Self {
        Self {
            strategy: strategy.into(),
            url: url.into(),
            succeeded: true,
            text_length,
            rejection_reason: None,
        }
    }

    pub fn rejected(
        strategy: impl Into<String>,
        url: impl Into<String>,
        text_length: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            strategy: strategy.into(),
            url: url.into(),
            succeeded: false,
            text_length,
            rejection_reason: Some(reason.into()),
        }
    }
}

/// Clean document text ready for analysis
///
/// Fields are private so the text invariant (non-empty, normalized,
/// capped) cannot be broken after construction.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    text: String,
    source_descriptor: String,
    extraction_method: String,
    metadata: Option<SourceMetadata>,
    fingerprint: String,
}

impl Document {
    /// Build a document from already-extracted text
    ///
    /// Normalizes whitespace and truncates to `max_chars`. Returns `None`
    /// when nothing but whitespace remains.
    pub fn new(
        text: &str,
        source_descriptor: impl Into<String>,
        extraction_method: impl Into<String>,
        max_chars: usize,
    ) -> Option<Self> {
        let text = crate::acquisition::text::prepare_document_text(text, max_chars);

        if text.is_empty() {
            return None;
        }

        let source_descriptor = source_descriptor.into();
        let fingerprint = compute_fingerprint(&source_descriptor, &text);

        Some(Self {
            text,
            source_descriptor,
            extraction_method: extraction_method.into(),
            metadata: None,
            fingerprint,
        })
    }

    pub fn with_metadata(mut self, metadata: Option<SourceMetadata>) -> Self {
        self.metadata = metadata.filter(|m| !m.is_empty());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_descriptor(&self) -> &str {
        &self.source_descriptor
    }

    pub fn extraction_method(&self) -> &str {
        &self.extraction_method
    }

    pub fn metadata(&self) -> Option<&SourceMetadata> {
        self.metadata.as_ref()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// SHA-256 over descriptor and text, used to correlate log lines
fn compute_fingerprint(descriptor: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(descriptor.as_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
