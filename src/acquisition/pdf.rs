//! PDF text extraction

use super::AcquisitionError;
use super::text::{clean_extracted_text, content_length};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Leading bytes searched for the magic; some servers prepend junk
const MAGIC_SEARCH_WINDOW: usize = 1024;

/// Below this the PDF is most likely scanned images
const MIN_PDF_TEXT_CHARS: usize = 100;

pub fn has_pdf_magic(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(MAGIC_SEARCH_WINDOW)];
    window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

/// Extract text from PDF bytes on the blocking pool
///
/// Pages are extracted separately, cleaned and joined with a blank line so
/// text never runs across a page break.
pub async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String, AcquisitionError> {
    if !has_pdf_magic(&bytes) {
        return Err(AcquisitionError::UnsupportedContentType {
            origin: "pdf".to_string(),
            content_type: "missing %PDF signature".to_string(),
        });
    }

    let start = std::time::Instant::now();
    let size = bytes.len();
    let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes))
        .await
        .map_err(|e| AcquisitionError::Extraction(format!("PDF worker failed: {}", e)))?
        .map_err(|e| AcquisitionError::Extraction(format!("PDF parse failed: {}", e)))?;

    let page_count = pages.len();
    let text = join_pages(pages.as_slice());
    let length = content_length(&text);

    tracing::debug!(
        bytes = size,
        pages = page_count,
        chars = length,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Extracted PDF text"
    );

    if length < MIN_PDF_TEXT_CHARS {
        return Err(AcquisitionError::Extraction(format!(
            "PDF yielded only {} chars of text (no OCR)",
            length
        )));
    }

    Ok(text)
}

/// Clean each page and join them with a blank line
fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|page| clean_extracted_text(page.as_ref()))
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
