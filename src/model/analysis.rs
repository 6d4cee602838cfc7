//! Analysis task results and the aggregate synthesis report

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifies one analysis task in the pipeline
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Claim,
    Citations,
    Bias,
    Date,
    Evidence,
    Usefulness,
    Author,
    Synthesis,
}

impl TaskKind {
    /// Every task the pipeline runs, synthesis included
    pub const ALL: [TaskKind; 8] = [
        TaskKind::Claim,
        TaskKind::Citations,
        TaskKind::Bias,
        TaskKind::Date,
        TaskKind::Evidence,
        TaskKind::Usefulness,
        TaskKind::Author,
        TaskKind::Synthesis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Claim => "claim",
            TaskKind::Citations => "citations",
            TaskKind::Bias => "bias",
            TaskKind::Date => "date",
            TaskKind::Evidence => "evidence",
            TaskKind::Usefulness => "usefulness",
            TaskKind::Author => "author",
            TaskKind::Synthesis => "synthesis",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a task's overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolarity {
    /// 100 is the most credible / least problematic outcome
    HigherIsBetter,
    /// 100 is the most problematic outcome
    ///
    /// No built-in task scores this way today. Results keep their own
    /// direction and the synthesis average inverts these before combining.
    HigherIsWorse,
}

/// Clamp a score into `[0, 100]`, mapping NaN to 0
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Fields shared by every analysis result
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ScoreBase {
    overall_score: f64,
    confidence_score: f64,
    summary: String,
    polarity: ScorePolarity,
}

impl ScoreBase {
    pub fn new(
        overall_score: f64,
        confidence_score: f64,
        summary: impl Into<String>,
        polarity: ScorePolarity,
    ) -> Self {
        Self {
            overall_score: clamp_score(overall_score),
            confidence_score: clamp_score(confidence_score),
            summary: summary.into(),
            polarity,
        }
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn polarity(&self) -> ScorePolarity {
        self.polarity
    }

    /// Score on the higher-is-better scale, for cross-task averaging
    pub fn aligned_score(&self) -> f64 {
        match self.polarity {
            ScorePolarity::HigherIsBetter => self.overall_score,
            ScorePolarity::HigherIsWorse => 100.0 - self.overall_score,
        }
    }
}

/// Category with an occurrence count (citation types, publication types)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct CountedType {
    pub type_name: String,
    pub count: u32,
}

/// One piece of evidence weighed against the central claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct EvidenceItem {
    pub description: String,
    pub supports_claim: bool,
    /// strong, moderate or weak
    pub strength: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct UsefulQuote {
    pub quote: String,
    pub relevance: String,
    pub suggested_use: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct UsefulSection {
    pub section_name: String,
    pub relevance_summary: String,
    pub strength: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClaimResult {
    #[serde(flatten)]
    pub base: ScoreBase,
    pub central_claim: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CitationResult {
    #[serde(flatten)]
    pub base: ScoreBase,
    pub total_citations_found: u32,
    pub verified_citations: u32,
    pub unverified_citations: u32,
    pub broken_links: Vec<String>,
    pub citation_types: Vec<CountedType>,
    pub flagged_citations: Vec<String>,
    pub peer_reviewed_count: u32,
    pub self_citation_count: u32,
    pub avg_citation_age_years: Option<f64>,
    pub recommendations: Vec<String>,
}

/// Linguistic bias analysis; 100 means the least biased wording
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BiasResult {
    #[serde(flatten)]
    pub base: ScoreBase,
    pub dominant_tone: String,
    pub bias_level: String,
    pub key_indicators: Vec<String>,
    pub affected_topics: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DateResult {
    #[serde(flatten)]
    pub base: ScoreBase,
    pub date: Option<String>,
    pub relevance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EvidenceResult {
    #[serde(flatten)]
    pub base: ScoreBase,
    pub central_claim_evaluated: String,
    pub total_evidence_found: u32,
    pub supporting_evidence_count: u32,
    pub contradicting_evidence_count: u32,
    pub neutral_evidence_count: u32,
    pub evidence_items: Vec<EvidenceItem>,
    pub methodology_quality: String,
    pub data_quality: String,
    pub logical_consistency: bool,
    pub gaps_identified: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UsefulnessResult {
    #[serde(flatten)]
    pub base: ScoreBase,
    pub research_topic: String,
    pub alignment_score: f64,
    pub useful_quotes: Vec<UsefulQuote>,
    pub useful_sections: Vec<UsefulSection>,
    pub key_arguments: Vec<String>,
    pub counterarguments: Vec<String>,
    pub gaps: Vec<String>,
    pub suggested_role: String,
    pub related_topics: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AuthorResult {
    #[serde(flatten)]
    pub base: ScoreBase,
    pub author_name: Option<String>,
    pub organization: Option<String>,
    pub related_links: Vec<String>,
    pub total_articles_found: u32,
    pub publication_types: Vec<CountedType>,
    pub notable_publications: Vec<String>,
    pub expertise_alignment_score: Option<f64>,
    pub reliability_score_estimate: Option<f64>,
    pub bias_indicators: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Final reader guidance, a closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub enum Recommendation {
    #[serde(rename = "Trustworthy")]
    Trustworthy,
    #[serde(rename = "Use with caution")]
    UseWithCaution,
    #[serde(rename = "Questionable")]
    Questionable,
    #[serde(rename = "Do not trust")]
    DoNotTrust,
}

/// Aggregate verdict over every other task's result
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SynthesisReport {
    #[serde(flatten)]
    pub base: ScoreBase,
    pub overall_credibility_score: f64,
    pub key_findings: Vec<String>,
    pub red_flags: Vec<String>,
    pub strengths: Vec<String>,
    pub final_verdict: String,
    pub recommendation: Recommendation,
    /// Polarity-aligned mean of the upstream overall scores
    pub upstream_average_score: f64,
}

/// Result of any analysis task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Claim(ClaimResult),
    Citations(CitationResult),
    Bias(BiasResult),
    Date(DateResult),
    Evidence(EvidenceResult),
    Usefulness(UsefulnessResult),
    Author(AuthorResult),
    Synthesis(SynthesisReport),
}

impl AnalysisResult {
    pub fn kind(&self) -> TaskKind {
        match self {
            AnalysisResult::Claim(_) => TaskKind::Claim,
            AnalysisResult::Citations(_) => TaskKind::Citations,
            AnalysisResult::Bias(_) => TaskKind::Bias,
            AnalysisResult::Date(_) => TaskKind::Date,
            AnalysisResult::Evidence(_) => TaskKind::Evidence,
            AnalysisResult::Usefulness(_) => TaskKind::Usefulness,
            AnalysisResult::Author(_) => TaskKind::Author,
            AnalysisResult::Synthesis(_) => TaskKind::Synthesis,
        }
    }

    pub fn base(&self) -> &ScoreBase {
        match self {
            AnalysisResult::Claim(r) => &r.base,
            AnalysisResult::Citations(r) => &r.base,
            AnalysisResult::Bias(r) => &r.base,
            AnalysisResult::Date(r) => &r.base,
            AnalysisResult::Evidence(r) => &r.base,
            AnalysisResult::Usefulness(r) => &r.base,
            AnalysisResult::Author(r) => &r.base,
            AnalysisResult::Synthesis(r) => &r.base,
        }
    }
}

/// Keyed output of one pipeline invocation
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Every non-synthesis result, keyed by task
    pub results: BTreeMap<TaskKind, AnalysisResult>,
    pub synthesis: SynthesisReport,
}

impl PipelineReport {
    pub fn get(&self, kind: TaskKind) -> Option<&AnalysisResult> {
        self.results.get(&kind)
    }

    pub fn claim(&self) -> Option<&ClaimResult> {
        match self.get(TaskKind::Claim) {
            Some(AnalysisResult::Claim(r)) => Some(r),
            _ => None,
        }
    }

    pub fn citations(&self) -> Option<&CitationResult> {
        match self.get(TaskKind::Citations) {
            Some(AnalysisResult::Citations(r)) => Some(r),
            _ => None,
        }
    }

    pub fn bias(&self) -> Option<&BiasResult> {
        match self.get(TaskKind::Bias) {
            Some(AnalysisResult::Bias(r)) => Some(r),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<&DateResult> {
        match self.get(TaskKind::Date) {
            Some(AnalysisResult::Date(r)) => Some(r),
            _ => None,
        }
    }

    pub fn evidence(&self) -> Option<&EvidenceResult> {
        match self.get(TaskKind::Evidence) {
            Some(AnalysisResult::Evidence(r)) => Some(r),
            _ => None,
        }
    }

    pub fn usefulness(&self) -> Option<&UsefulnessResult> {
        match self.get(TaskKind::Usefulness) {
            Some(AnalysisResult::Usefulness(r)) => Some(r),
            _ => None,
        }
    }

    pub fn author(&self) -> Option<&AuthorResult> {
        match self.get(TaskKind::Author) {
            Some(AnalysisResult::Author(r)) => Some(r),
            _ => None,
        }
    }
}
