//! Publisher-specific session extractors
//!
//! Scholarly publishers tend to serve an abstract page to anonymous clients
//! and the full text only after a cookie round-trip. Each adapter knows how
//! to find the DOI in its URLs and which canonical URLs carry full text.

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::classify::is_pdf_url;
use super::fetch::{FetchKind, Fetcher};
use super::quality::QualityGate;
use super::{ensure_host_allowed, extract_resource};
use crate::model::{AcquisitionConfig, Document, ExtractionAttempt, SourceMetadata};

/// Maximum fetches in one publisher session
const SESSION_FETCH_BUDGET: usize = 8;

// DOI matching is scoped to each publisher's own path layout so that DOIs of
// cited works elsewhere in the URL are never picked up.
static SPRINGER_DOI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:article|chapter|content/pdf)/(10\.\d{4,9}/[^?#]+?)(?:\.pdf)?/?$")
        .expect("Springer DOI pattern should compile")
});

static DOI_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^/doi/(?:abs/|full/|fullHtml/|epdf/|pdf/|pdfdirect/|reader/)?(10\.\d{4,9}/[^?#]+?)/?$",
    )
    .expect("DOI path pattern should compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publisher {
    Springer,
    Wiley,
    TaylorFrancis,
    Sage,
    Acm,
}

impl Publisher {
    pub fn name(&self) -> &'static str {
        match self {
            Publisher::Springer => "springer",
            Publisher::Wiley => "wiley",
            Publisher::TaylorFrancis => "taylor_francis",
            Publisher::Sage => "sage",
            Publisher::Acm => "acm",
        }
    }

    fn domain(&self) -> &'static str {
        match self {
            Publisher::Springer => "springer.com",
            Publisher::Wiley => "wiley.com",
            Publisher::TaylorFrancis => "tandfonline.com",
            Publisher::Sage => "sagepub.com",
            Publisher::Acm => "acm.org",
        }
    }

    fn doi_pattern(&self) -> &'static Regex {
        match self {
            Publisher::Springer => &SPRINGER_DOI,
            _ => &DOI_PATH,
        }
    }

    /// Path templates tried after the landing page, `{doi}` substituted
    fn candidate_paths(&self) -> &'static [&'static str] {
        match self {
            Publisher::Springer => &["/content/pdf/{doi}.pdf"],
            Publisher::Wiley => &["/doi/pdfdirect/{doi}", "/doi/pdf/{doi}", "/doi/full/{doi}"],
            Publisher::TaylorFrancis => &["/doi/pdf/{doi}", "/doi/full/{doi}"],
            Publisher::Sage => &["/doi/pdf/{doi}", "/doi/full/{doi}"],
            Publisher::Acm => &["/doi/pdf/{doi}", "/doi/fullHtml/{doi}"],
        }
    }
}

/// A publisher match for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherMatch {
    pub publisher: Publisher,
    pub doi: String,
}

/// Table of known publisher adapters
pub struct PublisherAdapters {
    publishers: Vec<Publisher>,
}

impl PublisherAdapters {
    pub fn new() -> Self {
        Self {
            publishers: vec![
                Publisher::Springer,
                Publisher::Wiley,
                Publisher::TaylorFrancis,
                Publisher::Sage,
                Publisher::Acm,
            ],
        }
    }

    /// Identify the publisher and DOI for a URL
    pub fn match_url(&self, url: &Url) -> Option<PublisherMatch> {
        let host = url.host_str()?.to_lowercase();
        let publisher = *self.publishers.iter().find(|p| {
            let domain = p.domain();
            host == domain || host.ends_with(&format!(".{}", domain))
        })?;

        let captures = publisher.doi_pattern().captures(url.path())?;
        let doi = captures.get(1)?.as_str().trim_end_matches('/').to_string();

        Some(PublisherMatch { publisher, doi })
    }

    /// Landing page first, then the publisher's canonical full-text URLs
    pub fn candidate_urls(&self, url: &Url, matched: &PublisherMatch) -> Vec<Url> {
        let mut urls = vec![url.clone()];
        for template in matched.publisher.candidate_paths() {
            let mut candidate = url.clone();
            candidate.set_path(&template.replace("{doi}", &matched.doi));
            candidate.set_query(None);
            candidate.set_fragment(None);
            if !urls.contains(&candidate) {
                urls.push(candidate);
            }
        }
        urls
    }

    /// Run one cookie-holding session against the publisher
    ///
    /// Records an attempt for every candidate and returns the first document
    /// that passes the gate. Hosts blocked by `policy` are never fetched.
    pub async fn run_session(
        &self,
        session: &dyn Fetcher,
        request_url: &Url,
        matched: &PublisherMatch,
        gate: &QualityGate,
        policy: &AcquisitionConfig,
        attempts: &mut Vec<ExtractionAttempt>,
    ) -> Option<Document> {
        let strategy = format!("publisher:{}", matched.publisher.name());
        let mut queue: VecDeque<Url> = self.candidate_urls(request_url, matched).into();
        let mut seen: Vec<Url> = queue.iter().cloned().collect();
        let mut landing_metadata: Option<SourceMetadata> = None;
        let mut fetches = 0usize;

        tracing::info!(
            url = %request_url,
            publisher = matched.publisher.name(),
            doi = %matched.doi,
            candidates = queue.len(),
            "Starting publisher session"
        );

        while let Some(url) = queue.pop_front() {
            if let Err(e) = ensure_host_allowed(policy, &url) {
                tracing::info!(url = %url, "Skipping publisher URL blocked by host policy");
                attempts.push(ExtractionAttempt::rejected(&strategy, url.as_str(), 0, e.to_string()));
                continue;
            }
            if fetches >= SESSION_FETCH_BUDGET {
                tracing::info!(url = %request_url, fetches, "Publisher session fetch budget exhausted");
                break;
            }
            fetches += 1;

            let kind = if is_pdf_url(&url) { FetchKind::Pdf } else { FetchKind::Html };
            let resource = match session.fetch(&url, kind).await {
                Ok(resource) => resource,
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "Publisher fetch failed");
                    attempts.push(ExtractionAttempt::rejected(&strategy, url.as_str(), 0, e.to_string()));
                    continue;
                }
            };
            if let Err(e) = ensure_host_allowed(policy, &resource.url) {
                attempts.push(ExtractionAttempt::rejected(&strategy, url.as_str(), 0, e.to_string()));
                continue;
            }

            let extracted = match extract_resource(resource, &strategy).await {
                Ok(extracted) => extracted,
                Err(e) => {
                    attempts.push(ExtractionAttempt::rejected(&strategy, url.as_str(), 0, e.to_string()));
                    continue;
                }
            };

            for link in &extracted.full_text_links {
                if !seen.contains(link) {
                    seen.push(link.clone());
                    queue.push_back(link.clone());
                }
            }

            // PDFs carry no page metadata; keep what the landing page offered
            let metadata = match extracted.metadata {
                Some(metadata) => {
                    if landing_metadata.is_none() {
                        landing_metadata = Some(metadata.clone());
                    }
                    Some(metadata)
                }
                None => landing_metadata.clone(),
            };

            let threshold = gate.threshold_for(&[request_url, &extracted.url]);
            match gate.admit(&extracted.text, request_url.as_str(), &extracted.method, metadata, threshold) {
                Ok(document) => {
                    attempts.push(ExtractionAttempt::success(&strategy, url.as_str(), document.char_len()));
                    return Some(document);
                }
                Err(e) => {
                    let length = e.measured_length();
                    tracing::info!(url = %url, length, threshold, "Publisher response rejected by quality gate");
                    attempts.push(ExtractionAttempt::rejected(&strategy, url.as_str(), length, e.to_string()));
                }
            }
        }

        None
    }
}

impl Default for PublisherAdapters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_springer_doi() {
        let adapters = PublisherAdapters::new();
        let m = adapters
            .match_url(&url("https://link.springer.com/article/10.1007/s11618-020-00979-2"))
            .unwrap();
        assert_eq!(m.publisher, Publisher::Springer);
        assert_eq!(m.doi, "10.1007/s11618-020-00979-2");

        let pdf = adapters
            .match_url(&url("https://link.springer.com/content/pdf/10.1007/s11618-020-00979-2.pdf"))
            .unwrap();
        assert_eq!(pdf.doi, "10.1007/s11618-020-00979-2");
    }

    #[test]
    fn test_doi_layout_publishers() {
        let adapters = PublisherAdapters::new();
        let wiley = adapters
            .match_url(&url("https://onlinelibrary.wiley.com/doi/full/10.1111/jcal.12345?af=R"))
            .unwrap();
        assert_eq!(wiley.publisher, Publisher::Wiley);
        assert_eq!(wiley.doi, "10.1111/jcal.12345");

        let tf = adapters
            .match_url(&url("https://www.tandfonline.com/doi/abs/10.1080/0305764X.2019.1/"))
            .unwrap();
        assert_eq!(tf.publisher, Publisher::TaylorFrancis);
        assert_eq!(tf.doi, "10.1080/0305764X.2019.1");

        let acm = adapters
            .match_url(&url("https://dl.acm.org/doi/10.1145/3313831.3376727"))
            .unwrap();
        assert_eq!(acm.publisher, Publisher::Acm);
    }

    #[test]
    fn test_doi_outside_publisher_layout_ignored() {
        let adapters = PublisherAdapters::new();
        assert!(adapters
            .match_url(&url("https://journals.sagepub.com/toc/10.1177/current"))
            .is_none());
        assert!(adapters
            .match_url(&url("https://example.org/doi/10.1000/xyz"))
            .is_none());
    }

    #[test]
    fn test_candidate_urls_ordered_and_deduped() {
        let adapters = PublisherAdapters::new();
        let landing = url("https://onlinelibrary.wiley.com/doi/full/10.1111/jcal.12345");
        let m = adapters.match_url(&landing).unwrap();
        let candidates: Vec<String> = adapters
            .candidate_urls(&landing, &m)
            .into_iter()
            .map(|u| u.to_string())
            .collect();

        assert_eq!(
            candidates,
            vec![
                "https://onlinelibrary.wiley.com/doi/full/10.1111/jcal.12345",
                "https://onlinelibrary.wiley.com/doi/pdfdirect/10.1111/jcal.12345",
                "https://onlinelibrary.wiley.com/doi/pdf/10.1111/jcal.12345",
            ]
        );
    }
}
