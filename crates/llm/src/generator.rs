//! The seam between deck composition and text generation.

use docdeck_core::{Generation, Result};

/// Turns document text into slide text.
///
/// Responses follow the `**title**` / bullet-line convention understood by
/// [`docdeck_core::SlideParser`].
pub trait SlideGenerator {
    /// Write slides for one document segment under a key topic (may be empty).
    fn generate_slides(&self, topic: &str, segment: &str) -> Result<Generation>;

    /// List the key topics of a whole document as `**topic**` lines, each
    /// followed by the opening words of its section.
    fn extract_topics(&self, document: &str) -> Result<Generation>;

    /// Name of this generator for logging.
    fn name(&self) -> &str;
}
