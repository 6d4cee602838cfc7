//! LLM-extractable models for the analysis tasks

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::analysis::{CountedType, EvidenceItem, Recommendation, UsefulQuote, UsefulSection};

/// Central claim extraction
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedClaim {
    /// The single main claim or thesis, one sentence
    pub central_claim: String,
    /// How clearly the document states its claim, 0-100
    pub overall_score: f64,
    /// Self-assessed confidence in the extraction, 0-100
    pub confidence_score: f64,
    pub summary: String,
}

/// Citation quality analysis
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedCitations {
    pub overall_score: f64,
    pub summary: String,
    pub total_citations_found: u32,
    pub verified_citations: u32,
    pub unverified_citations: u32,
    #[serde(default)]
    pub broken_links: Vec<String>,
    #[serde(default)]
    pub citation_types: Vec<CountedType>,
    #[serde(default)]
    pub flagged_citations: Vec<String>,
    #[serde(default)]
    pub peer_reviewed_count: u32,
    #[serde(default)]
    pub self_citation_count: u32,
    /// Average age of cited works in years, when dates are visible
    #[serde(default)]
    pub avg_citation_age_years: Option<f64>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Linguistic bias analysis
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedBias {
    /// 100 means neutral, balanced wording; 0 means heavily loaded
    pub overall_score: f64,
    pub confidence_score: f64,
    pub summary: String,
    pub dominant_tone: String,
    /// none, low, moderate, high or extreme
    pub bias_level: String,
    #[serde(default)]
    pub key_indicators: Vec<String>,
    #[serde(default)]
    pub affected_topics: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Publication date identification
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedDate {
    /// Publication date as written, or null when none can be found
    #[serde(default)]
    pub date: Option<String>,
    /// How the age of the document affects its relevance
    #[serde(default)]
    pub relevance: Option<String>,
    pub overall_score: f64,
    pub summary: String,
}

/// Evidence weighed against the central claim
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedEvidence {
    pub overall_score: f64,
    pub summary: String,
    pub total_evidence_found: u32,
    pub supporting_evidence_count: u32,
    pub contradicting_evidence_count: u32,
    #[serde(default)]
    pub neutral_evidence_count: u32,
    #[serde(default)]
    pub evidence_items: Vec<EvidenceItem>,
    pub methodology_quality: String,
    pub data_quality: String,
    pub logical_consistency: bool,
    #[serde(default)]
    pub gaps_identified: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Usefulness for the caller's research purpose
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedUsefulness {
    pub overall_score: f64,
    pub summary: String,
    pub alignment_score: f64,
    #[serde(default)]
    pub useful_quotes: Vec<UsefulQuote>,
    #[serde(default)]
    pub useful_sections: Vec<UsefulSection>,
    #[serde(default)]
    pub key_arguments: Vec<String>,
    #[serde(default)]
    pub counterarguments: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    /// primary source, supporting evidence, background, counterpoint or not useful
    pub suggested_role: String,
    #[serde(default)]
    pub related_topics: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Author background
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedAuthor {
    pub overall_score: f64,
    pub summary: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub related_links: Vec<String>,
    #[serde(default)]
    pub total_articles_found: u32,
    #[serde(default)]
    pub publication_types: Vec<CountedType>,
    #[serde(default)]
    pub notable_publications: Vec<String>,
    /// How well the author's expertise matches the central claim, 0-100
    #[serde(default)]
    pub expertise_alignment_score: Option<f64>,
    #[serde(default)]
    pub reliability_score_estimate: Option<f64>,
    #[serde(default)]
    pub bias_indicators: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Aggregate verdict
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedSynthesis {
    pub overall_credibility_score: f64,
    pub confidence_score: f64,
    pub summary: String,
    /// Three to five key findings
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    pub final_verdict: String,
    pub recommendation: Recommendation,
}
