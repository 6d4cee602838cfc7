//! Content acquisition: turn a source locator into clean document text
//!
//! The engine tries an ordered list of extraction strategies, grades every
//! result with the quality gate and falls back to publisher sessions and URL
//! variants before giving up.

mod classify;
mod error;
mod fallback;
pub mod fetch;
mod html;
mod pdf;
mod publisher;
mod quality;
pub mod text;

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::model::{AcquisitionConfig, Document, ExtractionAttempt, SourceLocator, SourceMetadata};

use classify::{DeliveryClass, canonical_full_text_url, is_pdf_url};
use fallback::fallback_variants;
use fetch::{FetchKind, FetchedResource, Fetcher, ReqwestFetcher};
use html::extract_html;
use pdf::{extract_pdf_text, has_pdf_magic};
use publisher::PublisherAdapters;
use quality::QualityGate;

pub use error::AcquisitionError;

/// Text pulled from one fetched resource, not yet graded
#[derive(Debug, Clone)]
pub struct Extracted {
    pub text: String,
    /// Strategy that produced the text
    pub method: String,
    /// URL the content was actually served from
    pub url: Url,
    pub metadata: Option<SourceMetadata>,
    pub full_text_links: Vec<Url>,
}

/// Refuse URLs whose host the acquisition policy blocks
pub(crate) fn ensure_host_allowed(policy: &AcquisitionConfig, url: &Url) -> Result<(), AcquisitionError> {
    if policy.is_url_allowed(url) {
        Ok(())
    } else {
        Err(AcquisitionError::HostNotAllowed {
            url: url.to_string(),
        })
    }
}

/// Extract text from a fetched resource by its detected type
///
/// HTML without a usable container yields empty text rather than an error so
/// that its full-text links remain available to the caller.
pub(crate) async fn extract_resource(
    resource: FetchedResource,
    method: &str,
) -> Result<Extracted, AcquisitionError> {
    if resource.is_pdf() {
        let url = resource.url;
        let text = extract_pdf_text(resource.body).await?;
        return Ok(Extracted {
            text,
            method: method.to_string(),
            url,
            metadata: None,
            full_text_links: Vec::new(),
        });
    }

    if resource.is_html() {
        let page = extract_html(&resource.text(), &resource.url);
        return Ok(Extracted {
            text: page.text.unwrap_or_default(),
            method: method.to_string(),
            url: resource.url,
            metadata: Some(page.metadata),
            full_text_links: page.full_text_links,
        });
    }

    Err(AcquisitionError::UnsupportedContentType {
        origin: resource.url.to_string(),
        content_type: resource
            .content_type
            .unwrap_or_else(|| "unknown".to_string()),
    })
}

/// One step of the basic extraction chain
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this strategy should be tried for the URL
    fn applies_to(&self, url: &Url) -> bool;

    async fn attempt(&self, fetcher: &dyn Fetcher, url: &Url) -> Result<Extracted, AcquisitionError>;
}

/// Fetch a URL that looks like a PDF and extract it
pub struct DirectPdfStrategy;

#[async_trait]
impl ExtractionStrategy for DirectPdfStrategy {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn applies_to(&self, url: &Url) -> bool {
        is_pdf_url(url)
    }

    async fn attempt(&self, fetcher: &dyn Fetcher, url: &Url) -> Result<Extracted, AcquisitionError> {
        let resource = fetcher.fetch(url, FetchKind::Pdf).await?;
        if !resource.is_pdf() {
            return Err(AcquisitionError::UnsupportedContentType {
                origin: url.to_string(),
                content_type: resource.content_type.unwrap_or_else(|| "unknown".to_string()),
            });
        }
        extract_resource(resource, self.name()).await
    }
}

/// Fetch a page and extract its main content
pub struct HtmlContentStrategy;

#[async_trait]
impl ExtractionStrategy for HtmlContentStrategy {
    fn name(&self) -> &'static str {
        "html"
    }

    fn applies_to(&self, _url: &Url) -> bool {
        true
    }

    async fn attempt(&self, fetcher: &dyn Fetcher, url: &Url) -> Result<Extracted, AcquisitionError> {
        let resource = fetcher.fetch(url, FetchKind::Html).await?;
        extract_resource(resource, self.name()).await
    }
}

/// Last resort for servers that return PDFs from extension-less URLs
pub struct PdfProbeStrategy;

#[async_trait]
impl ExtractionStrategy for PdfProbeStrategy {
    fn name(&self) -> &'static str {
        "pdf_probe"
    }

    fn applies_to(&self, url: &Url) -> bool {
        !is_pdf_url(url)
    }

    async fn attempt(&self, fetcher: &dyn Fetcher, url: &Url) -> Result<Extracted, AcquisitionError> {
        let resource = fetcher.fetch(url, FetchKind::Pdf).await?;
        if !resource.is_pdf() {
            return Err(AcquisitionError::UnsupportedContentType {
                origin: url.to_string(),
                content_type: resource.content_type.unwrap_or_else(|| "unknown".to_string()),
            });
        }
        extract_resource(resource, self.name()).await
    }
}

/// Drives classification, strategies, the quality gate and fallbacks
pub struct AcquisitionEngine {
    config: AcquisitionConfig,
    fetcher: Arc<dyn Fetcher>,
    gate: QualityGate,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    publishers: PublisherAdapters,
}

impl AcquisitionEngine {
    pub fn new(config: AcquisitionConfig) -> Result<Self, reqwest::Error> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(&config)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: AcquisitionConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        if !config.allow.is_empty() {
            tracing::info!(allow = ?config.allow, "Acquisition host whitelist configured");
        }
        if !config.deny.is_empty() {
            tracing::info!(deny = ?config.deny, "Acquisition host blacklist configured");
        }

        Self {
            gate: QualityGate::new(&config),
            config,
            fetcher,
            strategies: vec![
                Box::new(DirectPdfStrategy),
                Box::new(HtmlContentStrategy),
                Box::new(PdfProbeStrategy),
            ],
            publishers: PublisherAdapters::new(),
        }
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Acquire a document, or fail definitively
    pub async fn acquire(&self, locator: &SourceLocator) -> Result<Document, AcquisitionError> {
        self.acquire_traced(locator).await.0
    }

    /// Acquire a document and return every extraction attempt made
    pub async fn acquire_traced(
        &self,
        locator: &SourceLocator,
    ) -> (Result<Document, AcquisitionError>, Vec<ExtractionAttempt>) {
        let start = std::time::Instant::now();
        let mut attempts = Vec::new();
        let class = DeliveryClass::classify(locator);

        tracing::info!(source = %locator.descriptor(), class = ?class, "Acquiring document");

        let result = match locator {
            SourceLocator::RawText(text) => self.accept_local(text, "text-input", "raw_text", &mut attempts),
            SourceLocator::BinaryBlob { bytes, filename } => {
                self.acquire_binary(bytes, filename, &mut attempts).await
            }
            SourceLocator::Url(raw) => self.acquire_url(raw, &mut attempts).await,
        };

        match &result {
            Ok(doc) => tracing::info!(
                source = %locator.descriptor(),
                method = %doc.extraction_method(),
                chars = doc.char_len(),
                fingerprint = %doc.fingerprint(),
                attempts = attempts.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Document acquired"
            ),
            Err(e) => tracing::warn!(
                source = %locator.descriptor(),
                error = %e,
                attempts = attempts.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Acquisition failed"
            ),
        }

        (result, attempts)
    }

    /// Gate and wrap text that did not come from the network
    fn accept_local(
        &self,
        text: &str,
        descriptor: &str,
        method: &str,
        attempts: &mut Vec<ExtractionAttempt>,
    ) -> Result<Document, AcquisitionError> {
        match self.gate.admit(text, descriptor, method, None, self.gate.local_threshold()) {
            Ok(document) => {
                attempts.push(ExtractionAttempt::success(method, descriptor, document.char_len()));
                Ok(document)
            }
            Err(e) => {
                attempts.push(ExtractionAttempt::rejected(method, descriptor, e.measured_length(), e.to_string()));
                Err(e)
            }
        }
    }

    async fn acquire_binary(
        &self,
        bytes: &[u8],
        filename: &str,
        attempts: &mut Vec<ExtractionAttempt>,
    ) -> Result<Document, AcquisitionError> {
        if has_pdf_magic(bytes) {
            let text = match extract_pdf_text(bytes.to_vec()).await {
                Ok(text) => text,
                Err(e) => {
                    attempts.push(ExtractionAttempt::rejected("pdf_upload", filename, 0, e.to_string()));
                    return Err(e);
                }
            };
            return self.accept_local(&text, filename, "pdf_upload", attempts);
        }

        let lower = filename.to_lowercase();
        if (lower.ends_with(".txt") || lower.ends_with(".md"))
            && let Ok(text) = std::str::from_utf8(bytes)
        {
            return self.accept_local(text, filename, "text_upload", attempts);
        }

        let err = AcquisitionError::UnsupportedContentType {
            origin: filename.to_string(),
            content_type: "binary upload without PDF signature".to_string(),
        };
        attempts.push(ExtractionAttempt::rejected("upload", filename, 0, err.to_string()));
        Err(err)
    }

    async fn acquire_url(
        &self,
        raw: &str,
        attempts: &mut Vec<ExtractionAttempt>,
    ) -> Result<Document, AcquisitionError> {
        let url = Url::parse(raw.trim()).map_err(|e| AcquisitionError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AcquisitionError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }
        ensure_host_allowed(&self.config, &url)?;

        // Repository landing pages go straight to their full-text URL
        if let Some(canonical) = canonical_full_text_url(&url) {
            tracing::info!(url = %url, canonical = %canonical, "Rewrote to canonical full-text URL");
            if let Some(document) = self.run_basic_chain(&canonical, &url, attempts).await {
                return Ok(document);
            }
        }

        if let Some(document) = self.run_basic_chain(&url, &url, attempts).await {
            return Ok(document);
        }

        if let Some(matched) = self.publishers.match_url(&url) {
            let session = self.fetcher.session();
            if let Some(document) = self
                .publishers
                .run_session(session.as_ref(), &url, &matched, &self.gate, &self.config, attempts)
                .await
            {
                return Ok(document);
            }
        }

        for variant in fallback_variants(&url) {
            tracing::debug!(url = %url, variant = %variant, "Trying fallback URL variant");
            if let Some(document) = self.run_basic_chain(&variant, &url, attempts).await {
                return Ok(document);
            }
        }

        Err(AcquisitionError::NoStrategySucceeded {
            locator: url.to_string(),
            attempts: attempts.clone(),
        })
    }

    /// Try each applicable strategy in order; the first gated success wins
    async fn run_basic_chain(
        &self,
        target: &Url,
        request_url: &Url,
        attempts: &mut Vec<ExtractionAttempt>,
    ) -> Option<Document> {
        if let Err(e) = ensure_host_allowed(&self.config, target) {
            tracing::info!(url = %target, "Skipping URL blocked by host policy");
            attempts.push(ExtractionAttempt::rejected("policy", target.as_str(), 0, e.to_string()));
            return None;
        }

        for strategy in self.strategies.iter().filter(|s| s.applies_to(target)) {
            let name = strategy.name();
            let extracted = match strategy.attempt(self.fetcher.as_ref(), target).await {
                Ok(extracted) => extracted,
                Err(e) => {
                    tracing::debug!(strategy = name, url = %target, error = %e, "Extraction attempt failed");
                    attempts.push(ExtractionAttempt::rejected(name, target.as_str(), 0, e.to_string()));
                    continue;
                }
            };

            // Redirects may land somewhere the policy blocks
            if let Err(e) = ensure_host_allowed(&self.config, &extracted.url) {
                attempts.push(ExtractionAttempt::rejected(name, target.as_str(), 0, e.to_string()));
                continue;
            }

            let threshold = self.gate.threshold_for(&[request_url, target, &extracted.url]);
            match self.gate.admit(
                &extracted.text,
                request_url.as_str(),
                &extracted.method,
                extracted.metadata,
                threshold,
            ) {
                Ok(document) => {
                    let length = document.char_len();
                    tracing::info!(strategy = name, url = %target, length, "Extraction accepted");
                    attempts.push(ExtractionAttempt::success(name, target.as_str(), length));
                    return Some(document);
                }
                Err(e) => {
                    let length = e.measured_length();
                    tracing::info!(
                        strategy = name,
                        url = %target,
                        length,
                        threshold,
                        "Extraction rejected by quality gate"
                    );
                    attempts.push(ExtractionAttempt::rejected(name, target.as_str(), length, e.to_string()));
                }
            }
        }
        None
    }
}
