//! Per-page text extraction using pdf-extract
//!
//! Extraction failure is fatal to the whole job: segmentation needs the full
//! page sequence, so there is no per-page recovery here.

use crate::error::PdfError;
use mailsort_types::Page;

/// Extract the text of every page, in source order
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<Page>, PdfError> {
    let texts =
        pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(classify_extract_error)?;

    tracing::debug!(pages = texts.len(), "extracted page text");

    Ok(texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Page { index, text })
        .collect())
}

/// Parse PDF bytes and return page count
pub fn page_count(bytes: &[u8]) -> Result<u32, PdfError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}

/// Distinguish encrypted documents from malformed ones
fn classify_extract_error(err: pdf_extract::OutputError) -> PdfError {
    let message = err.to_string();
    let lowered = message.to_lowercase();

    if lowered.contains("encrypted") || lowered.contains("password") {
        PdfError::Encrypted(message)
    } else if lowered.contains("invalid") || lowered.contains("malformed") || lowered.contains("corrupt") {
        PdfError::Parse(message)
    } else {
        PdfError::Extraction(message)
    }
}
