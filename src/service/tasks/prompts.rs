//! Prompts for the per-document analysis tasks

use crate::model::Document;

pub const CLAIM_SYSTEM_PROMPT: &str = r#"You are a careful journalist reading a document for the first time.

Identify the document's central claim: the single main point it argues or reports, stated in one or two plain sentences. Do not add commentary, hedging or conversational filler.

Return:
- central_claim: the claim itself.
- summary: a short, neutral summary of the document's content and purpose.
- confidence_score (0-100): how confident you are that the claim you extracted is what the document actually argues. Rate lower when the text is muddled, fragmentary or hard to follow.
- overall_score (0-100): how clearly and explicitly the document states its claim."#;

pub const CITATION_SYSTEM_PROMPT: &str = r#"You are a research librarian auditing the sources a document relies on.

Examine every citation, reference, hyperlink or attributed source in the document:
1. Count the citations found.
2. Classify each as verified (specific enough to locate: authors, venue, year, DOI or working link) or unverified (vague, anonymous, "studies show").
3. Note links that look broken or malformed.
4. Break the citations down by type (peer-reviewed journal, news, government report, book, website, preprint, other).
5. Count peer-reviewed sources and self-citations by the document's own authors.
6. Estimate the average age of cited works in years when dates are visible; use null otherwise.
7. Flag citations that look misrepresented, predatory or irrelevant.

overall_score (0-100) rates the overall quality and traceability of the sourcing. A document with no citations at all scores low."#;

pub const BIAS_SYSTEM_PROMPT: &str = r#"You are a linguist analysing a document for biased or loaded language.

Look for emotionally charged wording, one-sided framing, ad hominem, sweeping generalisations, selective emphasis and omission of counterpoints.

Scoring:
- overall_score (0-100): 100 means neutral, balanced wording; 0 means heavily loaded, propagandistic language.
- bias_level: one of none, low, moderate, high, extreme.
- confidence_score (0-100): start from 50. Add points when indicators are explicit and repeated, subtract points when the text is short, ambiguous or mostly quotation. Clamp to 0-100.

List the concrete phrases that indicate bias in key_indicators and the topics affected in affected_topics."#;

pub const DATE_SYSTEM_PROMPT: &str = r#"You are an archivist establishing when a document was published.

Find the publication date from bylines, headers, citations of recent events or copyright notices. Return it as written (ISO 8601 when unambiguous). If no date can be established, return null for date; do not guess.

relevance explains how the document's age affects its usefulness for the stated research purpose.
overall_score (0-100) rates how current the document is for that purpose; use 50 when no date is found."#;

pub const EVIDENCE_SYSTEM_PROMPT: &str = r#"You are a peer reviewer weighing the evidence a document offers for its central claim.

Identify each piece of evidence (data, experiments, statistics, expert testimony, examples) and decide whether it supports the claim, contradicts it, or is neutral. Rate each item's strength as strong, moderate or weak, with a one-line reason.

Also rate methodology_quality and data_quality (strong, adequate, weak or absent), state whether the argument is logically consistent, and list gaps where the claim outruns its evidence.

overall_score (0-100) rates how well the evidence, taken together, supports the claim."#;

pub const USEFULNESS_SYSTEM_PROMPT: &str = r#"You are a research assistant deciding whether a document is useful for a specific research purpose.

Extract verbatim quotes worth citing, sections that are directly relevant, key arguments and counterarguments. Note gaps the researcher would still need to fill and related topics worth exploring.

- alignment_score (0-100): how closely the document's subject matches the research purpose.
- suggested_role: one of primary source, supporting evidence, background, counterpoint, not useful.
- overall_score (0-100): overall usefulness for the purpose."#;

pub const AUTHOR_SYSTEM_PROMPT: &str = r#"You are a professor reviewing the credibility of a document's author and publishing organization.

1. Identify the author(s) and any affiliated organization, publication or institution.
2. Estimate how many articles or publications the author has produced and break them down by type.
3. List notable publications you are aware of.
4. expertise_alignment_score (0-100): how well the author's background matches the central claim's subject.
5. reliability_score_estimate (0-100): reliability of the author and organization based on reputation, track record and transparency.
6. List bias indicators such as advocacy positions, funding conflicts or ideological framing.
7. Suggest up to three related links from other authors on the same topic, if you know of any.

Use null for anything you cannot determine. overall_score (0-100) is your overall rating of author and organization credibility."#;

fn document_section(document: &Document) -> String {
    format!(
        "DOCUMENT (source: {})\n<<<\n{}\n>>>",
        document.source_descriptor(),
        document.text()
    )
}

/// Prompt for tasks that only need the document
pub fn build_document_prompt(document: &Document) -> String {
    format!("{}\n\nAnalyse the document above.", document_section(document))
}

pub fn build_date_prompt(document: &Document, purpose: &str) -> String {
    let hint = document
        .metadata()
        .and_then(|m| m.published.as_deref())
        .map(|p| format!("\nPage metadata reports a publication date of: {}\n", p))
        .unwrap_or_default();

    format!(
        "RESEARCH PURPOSE: {}\n{}\n{}\n\nEstablish the publication date of the document above.",
        purpose,
        hint,
        document_section(document)
    )
}

pub fn build_evidence_prompt(document: &Document, central_claim: &str) -> String {
    format!(
        "CENTRAL CLAIM: {}\n\n{}\n\nWeigh the evidence the document offers for the central claim.",
        central_claim,
        document_section(document)
    )
}

pub fn build_usefulness_prompt(document: &Document, central_claim: &str, purpose: &str) -> String {
    format!(
        "RESEARCH PURPOSE: {}\nCENTRAL CLAIM: {}\n\n{}\n\nAssess how useful the document is for the research purpose.",
        purpose,
        central_claim,
        document_section(document)
    )
}

pub fn build_author_prompt(document: &Document, central_claim: &str, purpose: &str) -> String {
    let known = document
        .metadata()
        .filter(|m| !m.authors.is_empty())
        .map(|m| format!("\nPage metadata lists the authors as: {}\n", m.authors.join("; ")))
        .unwrap_or_default();

    format!(
        "RESEARCH PURPOSE: {}\nCENTRAL CLAIM: {}\n{}\n{}\n\nAssess the author and publishing organization.",
        purpose,
        central_claim,
        known,
        document_section(document)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceMetadata;

    fn document() -> Document {
        Document::new("Body of the article.", "https://example.org/a", "html", 1000)
            .unwrap()
            .with_metadata(Some(SourceMetadata {
                title: None,
                authors: vec!["Jane Doe".to_string()],
                published: Some("2020-01-02".to_string()),
            }))
    }

    #[test]
    fn test_prompts_embed_claim_and_purpose() {
        let prompt = build_usefulness_prompt(&document(), "Claim X.", "school policy");
        assert!(prompt.contains("RESEARCH PURPOSE: school policy"));
        assert!(prompt.contains("CENTRAL CLAIM: Claim X."));
        assert!(prompt.contains("Body of the article."));
    }

    #[test]
    fn test_metadata_hints() {
        assert!(build_date_prompt(&document(), "p").contains("2020-01-02"));
        assert!(build_author_prompt(&document(), "c", "p").contains("Jane Doe"));
    }
}
