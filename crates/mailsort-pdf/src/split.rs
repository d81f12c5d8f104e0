//! Page extraction using "Construction by Whitelist"
//!
//! The routed output for one mailing category is the original document with
//! every page outside that category deleted, which keeps the surviving pages
//! in source order and carries their resources along.

use crate::error::PdfError;
use lopdf::Document;
use std::collections::HashSet;

/// Build a new PDF containing only the specified pages (1-indexed)
pub fn select_pages(bytes: &[u8], pages: &[u32]) -> Result<Vec<u8>, PdfError> {
    if pages.is_empty() {
        return Err(PdfError::InvalidRange("No pages specified".into()));
    }
    if pages.contains(&0) {
        return Err(PdfError::InvalidRange("Page numbers must be >= 1".into()));
    }

    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;

    let page_count = doc.get_pages().len() as u32;
    for &page in pages {
        if page > page_count {
            return Err(PdfError::InvalidRange(format!(
                "Page {} does not exist (document has {} pages)",
                page, page_count
            )));
        }
    }

    let mut new_doc = doc.clone();

    let pages_to_keep: HashSet<u32> = pages.iter().copied().collect();
    let mut pages_to_delete: Vec<u32> = (1..=page_count)
        .filter(|p| !pages_to_keep.contains(p))
        .collect();

    // Delete in reverse so earlier deletions don't shift later indices
    pages_to_delete.reverse();
    for page_num in pages_to_delete {
        new_doc.delete_pages(&[page_num]);
    }

    new_doc.prune_objects();
    new_doc.compress();

    let mut buffer = Vec::new();
    new_doc
        .save_to(&mut buffer)
        .map_err(|e| PdfError::Operation(format!("Save failed: {}", e)))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testpdf::pdf_with_page_texts;

    fn numbered_pdf(pages: usize) -> Vec<u8> {
        let texts: Vec<String> = (1..=pages).map(|i| format!("Page {}", i)).collect();
        let refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        pdf_with_page_texts(&refs)
    }

    #[test]
    fn test_select_empty_pages_fails() {
        let pdf = numbered_pdf(5);
        assert!(select_pages(&pdf, &[]).is_err());
    }

    #[test]
    fn test_select_single_page() {
        let pdf = numbered_pdf(5);
        let result = select_pages(&pdf, &[1]).unwrap();
        let doc = Document::load_mem(&result).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_select_multiple_pages() {
        let pdf = numbered_pdf(5);
        let result = select_pages(&pdf, &[1, 3, 5]).unwrap();
        let doc = Document::load_mem(&result).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_select_contiguous_range() {
        let pdf = numbered_pdf(10);
        let result = select_pages(&pdf, &[2, 3, 4, 5]).unwrap();
        let doc = Document::load_mem(&result).unwrap();
        assert_eq!(doc.get_pages().len(), 4);
    }

    #[test]
    fn test_select_out_of_range_fails() {
        let pdf = numbered_pdf(5);
        assert!(select_pages(&pdf, &[10]).is_err());
    }

    #[test]
    fn test_select_page_zero_fails() {
        let pdf = numbered_pdf(5);
        assert!(select_pages(&pdf, &[0]).is_err());
    }

    #[test]
    fn test_select_is_deterministic() {
        let pdf = numbered_pdf(6);
        let first = select_pages(&pdf, &[2, 4]).unwrap();
        let second = select_pages(&pdf, &[2, 4]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_selected_pages_keep_their_text() {
        let pdf = pdf_with_page_texts(&["ALPHA", "BRAVO", "CHARLIE"]);
        let result = select_pages(&pdf, &[2]).unwrap();
        let pages = crate::extract::extract_pages(&result).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].text.contains("BRAVO"));
        assert!(!pages[0].text.contains("ALPHA"));
    }
}
