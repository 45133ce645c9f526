//! Error types for document-to-deck conversion.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a document into a slide deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read, or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// ZIP archive error (DOCX input or PPTX output).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    XmlError(String),

    /// The DOCX content is structurally invalid.
    #[error("DOCX parsing error: {0}")]
    DocxParseError(String),

    /// Malformed figures or slides handed to the placement step.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Deck settings that cannot produce a usable layout.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// The text-generation service failed or returned an unusable payload.
    #[error("Generation error: {0}")]
    GenerationError(String),

    /// An image could not be decoded or measured.
    #[error("Image error: {0}")]
    ImageError(String),
}
