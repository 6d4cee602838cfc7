//! Extraction quality gate

use url::Url;

use super::AcquisitionError;
use crate::model::{AcquisitionConfig, Document, SourceMetadata};

/// Domain class that decides the minimum accepted length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainClass {
    General,
    Scholarly,
}

/// Accepts or rejects extractor output by length
#[derive(Debug, Clone)]
pub struct QualityGate {
    config: AcquisitionConfig,
}

impl QualityGate {
    pub fn new(config: &AcquisitionConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn domain_class(&self, url: &Url) -> DomainClass {
        match url.host_str() {
            Some(host) if self.config.is_scholarly_host(host) => DomainClass::Scholarly,
            _ => DomainClass::General,
        }
    }

    pub fn threshold(&self, class: DomainClass) -> usize {
        match class {
            DomainClass::General => self.config.min_text_length,
            DomainClass::Scholarly => self.config.scholarly_min_text_length,
        }
    }

    /// Strictest threshold over every URL involved in an attempt
    ///
    /// A redirect off a scholarly host does not lower the bar.
    pub fn threshold_for(&self, urls: &[&Url]) -> usize {
        urls.iter()
            .map(|u| self.threshold(self.domain_class(u)))
            .max()
            .unwrap_or(self.config.min_text_length)
    }

    /// Threshold for trusted local uploads
    pub fn local_threshold(&self) -> usize {
        self.config.min_text_length
    }

    /// Build the document the caller would receive and accept it only when
    /// its final text meets `threshold`
    ///
    /// Normalization and the length cap run before measuring, so padding
    /// never counts towards the threshold.
    pub fn admit(
        &self,
        text: &str,
        descriptor: &str,
        method: &str,
        metadata: Option<SourceMetadata>,
        threshold: usize,
    ) -> Result<Document, AcquisitionError> {
        let document = Document::new(text, descriptor, method, self.config.max_text_length);
        let length = document.as_ref().map_or(0, Document::char_len);
        match document {
            Some(document) if length >= threshold => Ok(document.with_metadata(metadata)),
            _ => Err(AcquisitionError::BelowQualityThreshold { length, threshold }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scholarly_threshold_applies_to_publisher_hosts() {
        let gate = QualityGate::new(&AcquisitionConfig::default());
        let springer = Url::parse("https://link.springer.com/article/10.1007/x").unwrap();
        let blog = Url::parse("https://blog.example.org/post").unwrap();

        assert_eq!(gate.threshold_for(&[&springer]), 1200);
        assert_eq!(gate.threshold_for(&[&blog]), 100);
        assert_eq!(gate.threshold_for(&[&blog, &springer]), 1200);
    }

    #[test]
    fn test_admit_boundary() {
        let gate = QualityGate::new(&AcquisitionConfig::default());
        let doc = gate.admit(&"a".repeat(100), "x", "raw_text", None, 100).unwrap();
        assert_eq!(doc.char_len(), 100);
        assert!(matches!(
            gate.admit(&"a".repeat(99), "x", "raw_text", None, 100),
            Err(AcquisitionError::BelowQualityThreshold {
                length: 99,
                threshold: 100
            })
        ));
    }

    #[test]
    fn test_blank_line_padding_does_not_count() {
        let gate = QualityGate::new(&AcquisitionConfig::default());
        let padded = format!("a{}b", "\n".repeat(98));
        assert!(matches!(
            gate.admit(&padded, "x", "raw_text", None, 100),
            Err(AcquisitionError::BelowQualityThreshold { length: 4, .. })
        ));
    }

    #[test]
    fn test_length_cap_applies_before_gate() {
        let config = AcquisitionConfig {
            max_text_length: 500,
            ..Default::default()
        };
        let gate = QualityGate::new(&config);
        assert!(matches!(
            gate.admit(&"a".repeat(2000), "x", "html", None, 1200),
            Err(AcquisitionError::BelowQualityThreshold { length: 500, threshold: 1200 })
        ));
    }

    #[test]
    fn test_whitespace_only_rejected_with_zero_length() {
        let gate = QualityGate::new(&AcquisitionConfig::default());
        assert!(matches!(
            gate.admit(" \n\t ", "x", "raw_text", None, 100),
            Err(AcquisitionError::BelowQualityThreshold { length: 0, .. })
        ));
    }
}
