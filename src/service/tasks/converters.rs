//! Converters from extracted LLM models to domain results

use crate::model::extracted::{
    ExtractedAuthor, ExtractedBias, ExtractedCitations, ExtractedClaim, ExtractedDate,
    ExtractedEvidence, ExtractedUsefulness,
};
use crate::model::{
    AuthorResult, BiasResult, CitationResult, ClaimResult, DateResult, EvidenceResult, ScoreBase,
    ScorePolarity, UsefulnessResult, clamp_score,
};
use crate::service::tasks::confidence::{
    author_confidence, citation_confidence, date_confidence, evidence_confidence,
    is_identified_date, usefulness_confidence,
};

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn convert_claim(extracted: ExtractedClaim) -> ClaimResult {
    ClaimResult {
        base: ScoreBase::new(
            extracted.overall_score,
            extracted.confidence_score,
            extracted.summary,
            ScorePolarity::HigherIsBetter,
        ),
        central_claim: extracted.central_claim.trim().to_string(),
    }
}

pub fn convert_citations(extracted: ExtractedCitations) -> CitationResult {
    let confidence = citation_confidence(extracted.verified_citations, extracted.total_citations_found);

    CitationResult {
        base: ScoreBase::new(
            extracted.overall_score,
            confidence,
            extracted.summary,
            ScorePolarity::HigherIsBetter,
        ),
        total_citations_found: extracted.total_citations_found,
        verified_citations: extracted.verified_citations,
        unverified_citations: extracted.unverified_citations,
        broken_links: extracted.broken_links,
        citation_types: extracted.citation_types,
        flagged_citations: extracted.flagged_citations,
        peer_reviewed_count: extracted.peer_reviewed_count,
        self_citation_count: extracted.self_citation_count,
        avg_citation_age_years: extracted
            .avg_citation_age_years
            .filter(|age| age.is_finite() && *age >= 0.0),
        recommendations: extracted.recommendations,
    }
}

pub fn convert_bias(extracted: ExtractedBias) -> BiasResult {
    BiasResult {
        base: ScoreBase::new(
            extracted.overall_score,
            extracted.confidence_score,
            extracted.summary,
            ScorePolarity::HigherIsBetter,
        ),
        dominant_tone: extracted.dominant_tone,
        bias_level: extracted.bias_level.trim().to_lowercase(),
        key_indicators: extracted.key_indicators,
        affected_topics: extracted.affected_topics,
        recommendations: extracted.recommendations,
    }
}

pub fn convert_date(extracted: ExtractedDate) -> DateResult {
    let date = non_blank(extracted.date).filter(|d| is_identified_date(d));
    let confidence = date_confidence(date.as_deref());

    DateResult {
        base: ScoreBase::new(
            extracted.overall_score,
            confidence,
            extracted.summary,
            ScorePolarity::HigherIsBetter,
        ),
        date,
        relevance: non_blank(extracted.relevance),
    }
}

/// `central_claim` is the claim the task was given, not whatever the model echoes back
pub fn convert_evidence(extracted: ExtractedEvidence, central_claim: &str) -> EvidenceResult {
    let confidence = evidence_confidence(
        extracted.supporting_evidence_count,
        extracted.total_evidence_found,
    );

    EvidenceResult {
        base: ScoreBase::new(
            extracted.overall_score,
            confidence,
            extracted.summary,
            ScorePolarity::HigherIsBetter,
        ),
        central_claim_evaluated: central_claim.to_string(),
        total_evidence_found: extracted.total_evidence_found,
        supporting_evidence_count: extracted.supporting_evidence_count,
        contradicting_evidence_count: extracted.contradicting_evidence_count,
        neutral_evidence_count: extracted.neutral_evidence_count,
        evidence_items: extracted.evidence_items,
        methodology_quality: extracted.methodology_quality,
        data_quality: extracted.data_quality,
        logical_consistency: extracted.logical_consistency,
        gaps_identified: extracted.gaps_identified,
        recommendations: extracted.recommendations,
    }
}

pub fn convert_usefulness(extracted: ExtractedUsefulness, research_topic: &str) -> UsefulnessResult {
    let useful_items = extracted.useful_quotes.len()
        + extracted.useful_sections.len()
        + extracted.key_arguments.len();

    UsefulnessResult {
        base: ScoreBase::new(
            extracted.overall_score,
            usefulness_confidence(useful_items),
            extracted.summary,
            ScorePolarity::HigherIsBetter,
        ),
        research_topic: research_topic.to_string(),
        alignment_score: clamp_score(extracted.alignment_score),
        useful_quotes: extracted.useful_quotes,
        useful_sections: extracted.useful_sections,
        key_arguments: extracted.key_arguments,
        counterarguments: extracted.counterarguments,
        gaps: extracted.gaps,
        suggested_role: extracted.suggested_role,
        related_topics: extracted.related_topics,
        recommendations: extracted.recommendations,
    }
}

pub fn convert_author(extracted: ExtractedAuthor) -> AuthorResult {
    let expertise = extracted.expertise_alignment_score.map(clamp_score);
    let confidence = author_confidence(expertise, extracted.bias_indicators.len());

    AuthorResult {
        base: ScoreBase::new(
            extracted.overall_score,
            confidence,
            extracted.summary,
            ScorePolarity::HigherIsBetter,
        ),
        author_name: non_blank(extracted.author_name),
        organization: non_blank(extracted.organization),
        related_links: extracted.related_links,
        total_articles_found: extracted.total_articles_found,
        publication_types: extracted.publication_types,
        notable_publications: extracted.notable_publications,
        expertise_alignment_score: expertise,
        reliability_score_estimate: extracted.reliability_score_estimate.map(clamp_score),
        bias_indicators: extracted.bias_indicators,
        recommendations: extracted.recommendations,
    }
}
