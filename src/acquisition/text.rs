//! Plain-text cleanup shared by the extractors and `Document`

/// Clean text pulled out of markup
///
/// Collapses whitespace runs inside each line and drops empty lines.
pub fn clean_extracted_text(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize document text: unify line endings, blank out whitespace-only
/// lines and keep at most one blank line between paragraphs
pub fn normalize_document_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;

    for line in text.replace("\r\n", "\n").replace('\r', "\n").lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(line);
            out.push('\n');
        }
    }

    out.trim().to_string()
}

/// Truncate to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Exactly the text a `Document` holds: normalized, capped and end-trimmed
pub fn prepare_document_text(text: &str, max_chars: usize) -> String {
    let normalized = normalize_document_text(text);
    truncate_chars(&normalized, max_chars).trim_end().to_string()
}

/// Character count after trimming, the unit every length threshold uses
pub fn content_length(text: &str) -> usize {
    text.trim().chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_drops_empty_lines_and_collapses_spaces() {
        let raw = "  Title   here \n\n\n   \n body\t\ttext  \n";
        assert_eq!(clean_extracted_text(raw), "Title here\nbody text");
    }

    #[test]
    fn test_normalize_keeps_single_blank_line() {
        let text = "Page one\r\n\r\n\r\n\r\nPage two\n   \n\t\nPage three\n\n";
        let normalized = normalize_document_text(text);
        assert_eq!(normalized, "Page one\n\nPage two\n\nPage three");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "ééééé";
        assert_eq!(truncate_chars(text, 3), "ééé");
        assert_eq!(truncate_chars(text, 10), text);
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_prepared_text_collapses_padding_before_capping() {
        let padded = format!("a{}b", "\n".repeat(98));
        assert_eq!(prepare_document_text(&padded, 1000), "a\n\nb");
        assert_eq!(prepare_document_text("abc  \n\n\ndef", 5), "abc");
    }

    #[test]
    fn test_content_length_counts_chars() {
        assert_eq!(content_length("  héllo \n"), 5);
    }
}
