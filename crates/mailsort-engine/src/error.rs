//! Error taxonomy for the categorization engine
//!
//! Extraction and configuration errors abort the job before any routing
//! happens. Review-protocol errors reject the single offending call and
//! leave the session usable.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] mailsort_pdf::PdfError),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("No pending review item with id {0}")]
    UnknownItem(usize),

    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    #[error("Job is not finalizable: {0} item(s) still pending")]
    NotFinalizable(usize),

    #[error("Job has not been finalized")]
    NotFinalized,

    #[error("Job was cancelled")]
    Cancelled,
}
