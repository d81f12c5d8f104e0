//! PDF boundary for the mailsort pipeline
//!
//! Two concerns live here: pulling per-page text out of a statement-run PDF,
//! and cutting a page whitelist back out of it once statements have been
//! routed. Everything else (segmentation, matching, review) operates on the
//! extracted text and never touches PDF structure.

pub mod error;
pub mod extract;
pub mod split;

pub use error::PdfError;
pub use extract::{extract_pages, page_count};
pub use split::select_pages;

#[cfg(any(test, feature = "test-util"))]
pub mod testpdf;
