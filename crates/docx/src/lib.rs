//! DOCX (Office Open XML) reader for document-to-deck conversion.
//!
//! Parses .docx files, which are ZIP archives containing XML documents, into
//! ordered paragraphs and tables, and extracts embedded images as figures.

pub mod figures;
pub mod parser;

pub use figures::FigureExtractor;
pub use parser::{DocumentBlock, DocxParser, EmbeddedImage, ParsedDocument};
