//! Acquisition error types

use crate::model::ExtractionAttempt;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AcquisitionError {
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Unsupported content type '{content_type}' from {origin}")]
    UnsupportedContentType {
        origin: String,
        content_type: String,
    },

    #[error("Extracted text too short: {length} chars, need {threshold}")]
    BelowQualityThreshold { length: usize, threshold: usize },

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Host of {url} is not allowed by the acquisition policy")]
    HostNotAllowed { url: String },

    #[error("Response from {url} exceeds the {limit} byte fetch limit")]
    ResponseTooLarge { url: String, limit: usize },

    #[error("No extraction strategy succeeded for {locator} ({n} attempts)", n = .attempts.len())]
    NoStrategySucceeded {
        locator: String,
        attempts: Vec<ExtractionAttempt>,
    },
}

impl AcquisitionError {
    pub fn network(url: &url::Url, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        AcquisitionError::Network {
            url: url.to_string(),
            message,
        }
    }

    /// Text length measured by a quality-gate rejection, otherwise zero
    pub fn measured_length(&self) -> usize {
        match self {
            AcquisitionError::BelowQualityThreshold { length, .. } => *length,
            _ => 0,
        }
    }

    /// Suggestions for the caller when acquisition gives up
    pub fn remediation_hints(&self) -> Vec<String> {
        match self {
            AcquisitionError::NoStrategySucceeded { attempts, .. } => {
                let mut hints = Vec::new();
                let reasons: Vec<&str> = attempts
                    .iter()
                    .filter_map(|a| a.rejection_reason.as_deref())
                    .collect();

                if reasons.iter().any(|r| r.contains("HTTP 401") || r.contains("HTTP 403")) {
                    hints.push(
                        "The publisher refused access; the article is likely paywalled or \
                         requires an institutional login"
                            .to_string(),
                    );
                }
                if reasons.iter().any(|r| r.contains("too short")) {
                    hints.push(
                        "Only an abstract or preview was reachable; the full text may be \
                         behind a paywall"
                            .to_string(),
                    );
                }
                if reasons.iter().any(|r| r.contains("Network error")) {
                    hints.push("Check that the URL is publicly reachable".to_string());
                }
                hints.push("Download the PDF yourself and upload it instead".to_string());
                hints.push("Paste the article text directly".to_string());
                hints
            }
            AcquisitionError::UnsupportedContentType { .. } => vec![
                "Upload a PDF, or a .txt/.md file containing UTF-8 text".to_string(),
                "Paste the article text directly".to_string(),
            ],
            AcquisitionError::InvalidUrl(_) => {
                vec!["Provide a full http(s) URL, including the scheme".to_string()]
            }
            AcquisitionError::BelowQualityThreshold { .. } | AcquisitionError::Extraction(_) => {
                vec![
                    "The document may be scanned; text extraction does not perform OCR"
                        .to_string(),
                    "Paste the article text directly".to_string(),
                ]
            }
            AcquisitionError::HostNotAllowed { .. } => {
                vec!["The document's host is blocked by the service configuration".to_string()]
            }
            AcquisitionError::ResponseTooLarge { .. } => vec![
                "Download the document and upload it, or paste the relevant text".to_string(),
            ],
            AcquisitionError::Network { .. } | AcquisitionError::HttpStatus { .. } => {
                vec!["Check that the URL is publicly reachable".to_string()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion_hints_reflect_attempts() {
        let err = AcquisitionError::NoStrategySucceeded {
            locator: "https://example.org/a".to_string(),
            attempts: vec![
                ExtractionAttempt::rejected("html", "https://example.org/a", 0, "HTTP 403 from https://example.org/a"),
                ExtractionAttempt::rejected(
                    "pdf_probe",
                    "https://example.org/a",
                    40,
                    "Extracted text too short: 40 chars, need 100",
                ),
            ],
        };

        let hints = err.remediation_hints();
        assert!(hints.iter().any(|h| h.contains("paywalled")));
        assert!(hints.iter().any(|h| h.contains("abstract")));
        assert!(hints.iter().any(|h| h.contains("upload")));
        assert!(err.to_string().contains("2 attempts"));
    }
}
