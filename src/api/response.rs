//! External response shape for completed analyses

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use url::Url;
use utoipa::ToSchema;

use crate::model::{
    AuthorResult, BiasResult, CitationResult, ClaimResult, DateResult, EvidenceResult,
    SynthesisReport, UsefulnessResult, clamp_score,
};
use crate::service::AnalysisOutcome;

const PREVIEW_CHARS: usize = 500;
const MAX_TITLE_CHARS: usize = 180;
const UNKNOWN_AGE_RELEVANCY: f64 = 60.0;
const RELEVANCY_PENALTY_PER_YEAR: f64 = 8.0;
const CURRENT_THRESHOLD: f64 = 70.0;

static TITLE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(REVIEW|ARTICLE|ABSTRACT)\s+").expect("title prefix pattern should compile")
});

static TITLE_TRAILER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(Received:|Accepted:|Published online:|©|/C\d+).*$")
        .expect("title trailer pattern should compile")
});

// PDF extraction often glues the first author's name onto the title line
static TRAILING_AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+[A-Z][A-Za-z'´’.-]+\s+[A-Z][A-Za-z'´’.-]+\s*\d{0,2}$")
        .expect("trailing author pattern should compile")
});

static SITE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[-|–—]\s*(SpringerLink|Springer Nature Link)$")
        .expect("site suffix pattern should compile")
});

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResponseMetadata {
    pub title: String,
    pub author: String,
    pub date: Option<String>,
    pub preview_text: String,
    pub central_claim: String,
    pub article_summary: String,
    /// Host of the source URL, or "Direct input"
    pub source: String,
    pub extraction_method: String,
    pub fingerprint: String,
    pub purpose: String,
}

/// Recency estimate derived from citation ages
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RelevancyCheck {
    pub overall_score: f64,
    pub confidence_score: f64,
    pub summary: String,
    pub publication_date: String,
    pub is_current: bool,
    pub relevancy_notes: String,
}

/// Publisher and organization view of the author analysis
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrganizationCheck {
    pub overall_score: f64,
    pub confidence_score: f64,
    pub summary: String,
    pub structure_quality: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub metadata: ResponseMetadata,
    /// Synthesis score rounded to a whole number
    pub overall_credibility: u8,
    pub claim_check: Option<ClaimResult>,
    pub bias_check: Option<BiasResult>,
    pub author_credibility: Option<AuthorResult>,
    pub evidence_check: Option<EvidenceResult>,
    pub usefulness_check: Option<UsefulnessResult>,
    pub citation_check: Option<CitationResult>,
    pub date_check: Option<DateResult>,
    pub organization_check: Option<OrganizationCheck>,
    pub relevancy_check: Option<RelevancyCheck>,
    pub synthesis: SynthesisReport,
}

impl From<AnalysisOutcome> for AnalysisResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        let report = &outcome.report;
        let document = &outcome.document;
        let source_meta = document.metadata();

        let title = source_meta
            .and_then(|m| m.title.as_deref())
            .and_then(normalize_title)
            .unwrap_or_else(|| guess_title_from_text(document.text()));

        let author = source_meta
            .filter(|m| !m.authors.is_empty())
            .map(|m| m.authors.join(", "))
            .or_else(|| report.author().and_then(|a| a.author_name.clone()))
            .unwrap_or_else(|| "Unknown".to_string());

        let date = source_meta
            .and_then(|m| m.published.as_deref())
            .or_else(|| report.date().and_then(|d| d.date.as_deref()))
            .map(humanize_date);

        let metadata = ResponseMetadata {
            title,
            author,
            date: date.clone(),
            preview_text: document.text().chars().take(PREVIEW_CHARS).collect(),
            central_claim: report.claim().map(|c| c.central_claim.clone()).unwrap_or_default(),
            article_summary: report
                .claim()
                .map(|c| c.base.summary().to_string())
                .unwrap_or_default(),
            source: source_host(document.source_descriptor()),
            extraction_method: document.extraction_method().to_string(),
            fingerprint: document.fingerprint().to_string(),
            purpose: outcome.purpose.clone(),
        };

        Self {
            metadata,
            overall_credibility: clamp_score(report.synthesis.overall_credibility_score).round() as u8,
            claim_check: report.claim().cloned(),
            bias_check: report.bias().cloned(),
            author_credibility: report.author().cloned(),
            evidence_check: report.evidence().cloned(),
            usefulness_check: report.usefulness().cloned(),
            citation_check: report.citations().cloned(),
            date_check: report.date().cloned(),
            organization_check: report.author().map(organization_check),
            relevancy_check: report.citations().map(|c| relevancy_check(c, date)),
            synthesis: report.synthesis.clone(),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `100 - 8 x average citation age`, or a neutral 60 when ages are unknown
pub fn relevancy_check(citations: &CitationResult, publication_date: Option<String>) -> RelevancyCheck {
    let (score, summary, notes) = match citations.avg_citation_age_years {
        Some(age) => {
            let score = clamp_score(100.0 - age * RELEVANCY_PENALTY_PER_YEAR);
            let recency = if score >= CURRENT_THRESHOLD { "current" } else { "mixed recency" };
            (
                score,
                format!(
                    "Citation recency suggests {} references (average age: {:.1} years).",
                    recency, age
                ),
                "Score is estimated from average citation age.",
            )
        }
        None => (
            UNKNOWN_AGE_RELEVANCY,
            "Citation dates could not be verified precisely; relevancy appears moderate.".to_string(),
            "Insufficient citation date metadata to confidently assess freshness.",
        ),
    };

    RelevancyCheck {
        overall_score: round1(score),
        confidence_score: 70.0,
        summary,
        publication_date: publication_date.unwrap_or_else(|| "Unknown".to_string()),
        is_current: citations.avg_citation_age_years.is_some() && score >= CURRENT_THRESHOLD,
        relevancy_notes: notes.to_string(),
    }
}

pub fn organization_check(author: &AuthorResult) -> OrganizationCheck {
    let organization = author.organization.as_deref().unwrap_or("Unknown organization");
    let score = author
        .reliability_score_estimate
        .unwrap_or_else(|| author.base.overall_score());

    let mut strengths = Vec::new();
    if let Some(name) = &author.author_name {
        strengths.push(format!("Identified author: {}", name));
    }
    if author.total_articles_found > 0 {
        strengths.push(format!(
            "Prior publication footprint: {} items",
            author.total_articles_found
        ));
    }

    let mut weaknesses = Vec::new();
    if !author.bias_indicators.is_empty() {
        weaknesses.push("Potential author/organization bias indicators were flagged".to_string());
    }

    OrganizationCheck {
        overall_score: round1(clamp_score(score)),
        confidence_score: author.base.confidence_score(),
        summary: format!("Publisher/organization context assessed as {}.", organization),
        structure_quality: "Derived from author/organization credibility signals.".to_string(),
        strengths,
        weaknesses,
    }
}

fn source_host(descriptor: &str) -> String {
    Url::parse(descriptor)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "Direct input".to_string())
}

/// Collapse whitespace and drop site suffixes and bare section labels
pub fn normalize_title(title: &str) -> Option<String> {
    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = SITE_SUFFIX.replace(&collapsed, "").trim().to_string();
    if cleaned.is_empty() || matches!(cleaned.to_uppercase().as_str(), "REVIEW" | "ARTICLE" | "ABSTRACT") {
        return None;
    }
    Some(cleaned)
}

/// Best-effort title from the first non-blank line of the text
pub fn guess_title_from_text(text: &str) -> String {
    let Some(first) = text.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return "Article".to_string();
    };

    let line = TITLE_PREFIX.replace(first, "");
    let line = TITLE_TRAILER.replace(&line, "");
    let line = match line.split_once('•') {
        Some((head, _)) => head.trim().to_string(),
        None => line.to_string(),
    };
    let line = TRAILING_AUTHOR.replace(&line, "");
    let title: String = line
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();

    if title.is_empty() { "Article".to_string() } else { title }
}

/// Render ISO-like dates as "March 05, 2021", "March 2021" or "2021"
///
/// Unrecognised values are returned unchanged.
pub fn humanize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    let date_part = trimmed.split('T').next().unwrap_or(trimmed).replace('/', "-");

    for format in ["%Y-%m-%d", "%d %B %Y", "%B %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&date_part, format) {
            return date.format("%B %d, %Y").to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", date_part), "%Y-%m-%d") {
        return date.format("%B %Y").to_string();
    }
    if date_part.len() == 4 && date_part.chars().all(|c| c.is_ascii_digit()) {
        return date_part;
    }
    raw.to_string()
}
