//! Structural content extraction from HTML pages

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use super::text::clean_extracted_text;
use crate::model::SourceMetadata;

/// Containers tried in priority order before falling back to `<body>`
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "#mw-content-text .mw-parser-output",
    "#mw-content-text",
    "[class*='article-body']",
    "[class*='article-content']",
    "[class*='post-content']",
    "[class*='entry-content']",
    "[class*='story-body']",
    "[class*='content-body']",
    "[class*='prose']",
    ".caas-body",
    "#article-body",
    "main",
    "[role='main']",
];

/// Minimum raw text a candidate container must hold
const MIN_CONTAINER_CHARS: usize = 200;

const STRIPPED_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "form", "iframe", "noscript", "button",
    "input", "select", "textarea", "sup",
];

/// Substrings of class or id values marking page chrome
const JUNK_PATTERNS: &[&str] = &[
    "sidebar",
    "footer",
    "header",
    "menu",
    "cookie",
    "banner",
    "popup",
    "modal",
    "social",
    "share",
    "comment",
    "navbox",
    "navbar",
    "infobox",
    "toc",
    "mw-editsection",
    "edit-section",
    "reference",
    "reflist",
    "noprint",
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table",
    "td", "th", "tr", "ul",
];

/// Maximum number of full-text links mined from one page
const MAX_FULL_TEXT_LINKS: usize = 5;

/// Everything mined from one HTML page
///
/// Parsing happens once and synchronously; the parsed tree never crosses an
/// await point.
#[derive(Debug, Clone, Default)]
pub struct HtmlExtraction {
    /// Cleaned main-content text, `None` if the page had no usable container
    pub text: Option<String>,
    pub metadata: SourceMetadata,
    /// Candidate full-text links (PDF, download) resolved against the page URL
    pub full_text_links: Vec<Url>,
}

pub fn extract_html(body: &str, page_url: &Url) -> HtmlExtraction {
    let document = Html::parse_document(body);

    HtmlExtraction {
        text: extract_content(&document),
        metadata: extract_metadata(&document),
        full_text_links: discover_full_text_links(&document, page_url),
    }
}

fn extract_content(document: &Html) -> Option<String> {
    let container = select_container(document)?;

    let mut raw = String::new();
    collect_text(container, &mut raw);

    let text = clean_extracted_text(&raw);
    if text.is_empty() {
        tracing::debug!("Content container was empty after cleanup");
        return None;
    }
    Some(text)
}

fn select_container(document: &Html) -> Option<ElementRef<'_>> {
    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(el) = document.select(&selector).next() {
            let length = el.text().collect::<String>().trim().chars().count();
            if length > MIN_CONTAINER_CHARS {
                tracing::debug!(selector = %selector_str, length, "Selected content container");
                return Some(el);
            }
        }
    }

    let body = Selector::parse("body").ok()?;
    let fallback = document.select(&body).next();
    if fallback.is_some() {
        tracing::debug!("Falling back to <body>");
    }
    fallback
}

/// Walk the container's descendants, skipping page chrome
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_chrome(&child_el) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&child_el.value().name());
                if block {
                    out.push('\n');
                }
                collect_text(child_el, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn is_chrome(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    if STRIPPED_TAGS.contains(&value.name()) {
        return true;
    }

    let class_hit = value.classes().any(|class| {
        let class = class.to_lowercase();
        JUNK_PATTERNS.iter().any(|p| class.contains(p))
    });
    let id_hit = value.id().is_some_and(|id| {
        let id = id.to_lowercase();
        JUNK_PATTERNS.iter().any(|p| id.contains(p))
    });

    class_hit || id_hit
}

/// All `<meta>` contents whose `name` or `property` equals `key`, case-insensitively
fn meta_values(document: &Html, key: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("meta[content]") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter(|el| {
            let value = el.value();
            value
                .attr("name")
                .or_else(|| value.attr("property"))
                .is_some_and(|n| n.eq_ignore_ascii_case(key))
        })
        .filter_map(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn first_meta(document: &Html, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| meta_values(document, key).into_iter().next())
}

fn extract_metadata(document: &Html) -> SourceMetadata {
    let title = first_meta(document, &["citation_title", "og:title", "dc.title"]).or_else(|| {
        let selector = Selector::parse("title").ok()?;
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    });

    let mut authors: Vec<String> = Vec::new();
    for key in ["citation_author", "author", "article:author", "dc.creator"] {
        for author in meta_values(document, key) {
            if !authors.contains(&author) {
                authors.push(author);
            }
        }
    }

    let published = first_meta(
        document,
        &[
            "citation_publication_date",
            "citation_date",
            "article:published_time",
            "dc.date",
            "date",
        ],
    );

    SourceMetadata {
        title,
        authors,
        published,
    }
}

fn discover_full_text_links(document: &Html, page_url: &Url) -> Vec<Url> {
    let mut candidates: Vec<String> = meta_values(document, "citation_pdf_url");

    if let Ok(selector) = Selector::parse("a[href]") {
        for anchor in document.select(&selector) {
            if let Some(href) = anchor.value().attr("href") {
                let lower = href.to_lowercase();
                if lower.contains("pdf") || lower.contains("download") {
                    candidates.push(href.trim().to_string());
                }
            }
        }
    }

    let mut links: Vec<Url> = Vec::new();
    for candidate in candidates {
        let Ok(mut link) = page_url.join(&candidate) else {
            continue;
        };
        link.set_fragment(None);
        if !matches!(link.scheme(), "http" | "https") || link == *page_url || links.contains(&link) {
            continue;
        }
        links.push(link);
        if links.len() >= MAX_FULL_TEXT_LINKS {
            break;
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://news.example.org/story/1").unwrap()
    }

    fn paragraph(n: usize) -> String {
        format!(
            "<p>Paragraph {} discusses the findings of the study in some detail, \
             including the methodology and the sample size used by the authors.</p>",
            n
        )
    }

    #[test]
    fn test_article_container_preferred_over_chrome() {
        let html = format!(
            "<html><body><nav>Home | About | Contact</nav>\
             <article><header>Byline junk</header>{}{}{}\
             <div class=\"share-buttons\">Share on social</div>\
             <p>Footnote<sup>1</sup></p></article>\
             <footer>Copyright</footer></body></html>",
            paragraph(1),
            paragraph(2),
            paragraph(3)
        );

        let extraction = extract_html(&html, &page_url());
        let text = extraction.text.unwrap();

        assert!(text.starts_with("Paragraph 1"));
        assert!(text.contains("Paragraph 3"));
        assert!(!text.contains("Home | About"));
        assert!(!text.contains("Byline junk"));
        assert!(!text.contains("Share on social"));
        assert!(!text.contains("Copyright"));
        assert!(text.contains("Footnote"));
        assert!(!text.contains("Footnote1"));
        assert!(!text.contains("\n\n"));
    }

    #[test]
    fn test_short_container_falls_back_to_body() {
        let html = format!(
            "<html><body><article><p>Too short.</p></article><div>{}{}</div></body></html>",
            paragraph(1),
            paragraph(2)
        );
        let text = extract_html(&html, &page_url()).text.unwrap();
        assert!(text.contains("Too short."));
        assert!(text.contains("Paragraph 2"));
    }

    #[test]
    fn test_container_class_is_not_stripped() {
        let html = format!(
            "<html><body><div class=\"article-content comment-free\">{}{}{}</div></body></html>",
            paragraph(1),
            paragraph(2),
            paragraph(3)
        );
        let text = extract_html(&html, &page_url()).text.unwrap();
        assert!(text.contains("Paragraph 1"));
    }

    #[test]
    fn test_metadata_from_meta_tags() {
        let html = r#"<html><head>
            <title>Fallback title</title>
            <meta name="citation_title" content="Reading and Attainment">
            <meta name="citation_author" content="Doe, Jane">
            <meta name="citation_author" content="Roe, Rick">
            <meta name="DC.creator" content="Doe, Jane">
            <meta name="citation_publication_date" content="2021/03/04">
            </head><body></body></html>"#;

        let metadata = extract_html(html, &page_url()).metadata;
        assert_eq!(metadata.title.as_deref(), Some("Reading and Attainment"));
        assert_eq!(metadata.authors, vec!["Doe, Jane", "Roe, Rick"]);
        assert_eq!(metadata.published.as_deref(), Some("2021/03/04"));
    }

    #[test]
    fn test_full_text_links_discovered_and_resolved() {
        let html = r#"<html><head>
            <meta name="citation_pdf_url" content="https://pub.example.org/doi/pdf/10.1/x">
            </head><body>
            <a href="/doi/pdf/10.1/x">PDF</a>
            <a href="/download/file?id=2#top">Download</a>
            <a href="mailto:pdf@example.org">Mail</a>
            <a href="/about">About</a>
            </body></html>"#;

        let links = extract_html(html, &page_url()).full_text_links;
        let links: Vec<&str> = links.iter().map(|u| u.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://pub.example.org/doi/pdf/10.1/x",
                "https://news.example.org/doi/pdf/10.1/x",
                "https://news.example.org/download/file?id=2",
            ]
        );
    }
}
