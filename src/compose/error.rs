/// Error types for deck composition.
use thiserror::Error;

/// Result type for deck composition.
pub type Result<T> = std::result::Result<T, ComposeError>;

#[derive(Error, Debug)]
pub enum ComposeError {
    /// PresentationML error
    #[error("pptx error: {0}")]
    Pptx(#[from] crate::pptx::PptxError),

    /// OPC package error
    #[error("OPC error: {0}")]
    Opc(#[from] crate::opc::error::OpcError),

    /// Ledger file error
    #[error("ledger error: {0}")]
    Ledger(#[from] csv::Error),

    /// Uploaded workbook lacks the required roster column
    #[error("uploaded workbook has no 'Name' column")]
    MissingNameColumn,

    /// Uploaded workbook could not be parsed
    #[error("workbook parse error: {0}")]
    Workbook(String),

    /// A template package contains no slides
    #[error("template has no slides: {0}")]
    EmptyTemplate(String),

    /// Uploaded image could not be decoded
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Unrecognized uploaded image format
    #[error("unsupported image format")]
    UnsupportedImage,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
