use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF is encrypted: {0}")]
    Encrypted(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Invalid page range: {0}")]
    InvalidRange(String),

    #[error("PDF operation failed: {0}")]
    Operation(String),
}
