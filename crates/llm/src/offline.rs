//! Offline generator: slides straight from the document text.

use crate::SlideGenerator;
use docdeck_core::normalize::truncate_words;
use docdeck_core::{Generation, Result};

/// Builds slides without calling a model.
///
/// The title is the segment's first words and every sentence becomes a
/// bullet. Topic extraction is not supported and always comes back
/// rejected.
#[derive(Debug, Clone)]
pub struct OfflineGenerator {
    title_words: usize,
}

impl Default for OfflineGenerator {
    fn default() -> Self {
        Self { title_words: 6 }
    }
}

impl OfflineGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of words kept in generated titles.
    pub fn with_title_words(mut self, words: usize) -> Self {
        self.title_words = words.max(1);
        self
    }
}

/// Split text into sentences at `.`, `!` or `?` followed by whitespace.
fn sentences(text: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                result.push(sentence.to_string());
            }
            current.clear();
        }
    }
    let rest = current.trim();
    if !rest.is_empty() {
        result.push(rest.to_string());
    }

    result
}

impl SlideGenerator for OfflineGenerator {
    fn generate_slides(&self, topic: &str, segment: &str) -> Result<Generation> {
        let bullets = sentences(segment);
        if bullets.is_empty() {
            return Ok(Generation::Rejected("missing content".to_string()));
        }

        let title = if topic.trim().is_empty() {
            truncate_words(segment, self.title_words)
        } else {
            topic.trim().to_string()
        };

        let mut text = format!("**{}**\n", title);
        for bullet in bullets {
            text.push_str("- ");
            text.push_str(&bullet.replace('\n', " "));
            text.push('\n');
        }
        Ok(Generation::Success(text))
    }

    fn extract_topics(&self, _document: &str) -> Result<Generation> {
        Ok(Generation::Rejected(
            "topic extraction needs a language model".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdeck_core::SlideParser;

    #[test]
    fn test_sentences() {
        assert_eq!(
            sentences("First one. Second one! Third? tail"),
            vec!["First one.", "Second one!", "Third?", "tail"]
        );
        assert_eq!(sentences("Version 1.2 shipped."), vec!["Version 1.2 shipped."]);
        assert!(sentences("   ").is_empty());
    }

    #[test]
    fn test_generate_slides_round_trips_through_parser() {
        let generator = OfflineGenerator::new().with_title_words(3);
        let Generation::Success(text) = generator
            .generate_slides("", "Revenue grew strongly this year. Costs were flat.")
            .unwrap()
        else {
            panic!("expected success");
        };

        let slides = SlideParser::new().parse(&text);
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "Revenue grew strongly…");
        assert_eq!(
            slides[0].bullets,
            vec!["Revenue grew strongly this year.", "Costs were flat."]
        );
    }

    #[test]
    fn test_topic_becomes_title() {
        let generator = OfflineGenerator::new();
        let Generation::Success(text) = generator.generate_slides("Finance", "Costs fell.").unwrap()
        else {
            panic!("expected success");
        };
        assert!(text.starts_with("**Finance**\n"));
    }

    #[test]
    fn test_empty_segment_rejected() {
        let result = OfflineGenerator::new().generate_slides("", "  ").unwrap();
        assert!(matches!(result, Generation::Rejected(_)));
    }

    #[test]
    fn test_topics_unsupported() {
        let result = OfflineGenerator::new().extract_topics("doc").unwrap();
        assert!(matches!(result, Generation::Rejected(_)));
    }
}
