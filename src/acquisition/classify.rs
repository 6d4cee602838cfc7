//! Locator classification and repository URL conventions

use url::Url;

use crate::model::SourceLocator;

/// How a locator's content is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryClass {
    LocalBinary,
    RemotePdf,
    RemoteHtml,
    RawText,
}

impl DeliveryClass {
    pub fn classify(locator: &SourceLocator) -> Self {
        match locator {
            SourceLocator::RawText(_) => DeliveryClass::RawText,
            SourceLocator::BinaryBlob { .. } => DeliveryClass::LocalBinary,
            SourceLocator::Url(raw) => match Url::parse(raw) {
                Ok(url) if is_pdf_url(&url) => DeliveryClass::RemotePdf,
                _ => DeliveryClass::RemoteHtml,
            },
        }
    }
}

/// URL shape indicates a PDF: `.pdf` suffix or a `/pdf/` path segment
pub fn is_pdf_url(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    path.ends_with(".pdf") || path.contains("/pdf/")
}

fn host_matches(url: &Url, domain: &str) -> bool {
    url.host_str()
        .map(|h| {
            let h = h.to_lowercase();
            h == domain || h.ends_with(&format!(".{}", domain))
        })
        .unwrap_or(false)
}

/// Rewrite known repository landing pages to their full-text URL
///
/// Returns `None` when the URL follows no known convention or already
/// points at full text.
pub fn canonical_full_text_url(url: &Url) -> Option<Url> {
    if host_matches(url, "arxiv.org") {
        let id = url.path().strip_prefix("/abs/")?.trim_end_matches('/');
        if id.is_empty() {
            return None;
        }
        return Url::parse(&format!("https://arxiv.org/pdf/{}.pdf", id)).ok();
    }

    if host_matches(url, "biorxiv.org") || host_matches(url, "medrxiv.org") {
        let path = url.path().trim_end_matches('/');
        if !path.starts_with("/content/") || path.ends_with(".pdf") {
            return None;
        }
        let base = [".full-text", ".full", ".abstract", ".article-info", ".article-metrics"]
            .iter()
            .find_map(|suffix| path.strip_suffix(suffix))
            .unwrap_or(path);

        let mut rewritten = url.clone();
        rewritten.set_path(&format!("{}.full.pdf", base));
        rewritten.set_query(None);
        rewritten.set_fragment(None);
        return Some(rewritten);
    }

    if host_matches(url, "openreview.net") && url.path().trim_end_matches('/') == "/forum" {
        let id = url
            .query_pairs()
            .find(|(k, _)| k == "id")
            .map(|(_, v)| v.into_owned())?;
        let mut rewritten = url.clone();
        rewritten.set_path("/pdf");
        rewritten.query_pairs_mut().clear().append_pair("id", &id);
        rewritten.set_fragment(None);
        return Some(rewritten);
    }

    None
}
