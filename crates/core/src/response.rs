//! Interpreting text-generation responses.
//!
//! Responses use a light markdown convention: a `**title**` line opens a
//! slide and every following non-blank line is a bullet point.

use crate::{DeckSlide, Generation};

/// Phrases that mark a response as a refusal rather than slide content.
pub const FALLBACK_PHRASES: &[&str] = &[
    "not enough information",
    "i cannot",
    "provide more context",
    "please provide",
    "sorry",
    "missing content",
];

/// Title used when bullets appear before any `**title**` line.
pub const UNTITLED: &str = "Untitled";

/// Characters stripped from both ends of a bullet line.
const BULLET_MARKERS: &[char] = &['-', '•', '*', ' ', '\t'];

/// Classify a raw response as usable content or a rejection.
pub fn classify_response(text: &str) -> Generation {
    if text.trim().is_empty() {
        return Generation::Rejected("empty response".to_string());
    }

    let lowered = text.to_lowercase();
    match FALLBACK_PHRASES.iter().find(|p| lowered.contains(*p)) {
        Some(phrase) => Generation::Rejected(format!("response contains \"{}\"", phrase)),
        None => Generation::Success(text.to_string()),
    }
}

fn is_heading(line: &str) -> bool {
    line.starts_with("**")
}

/// Parses generated text into slides.
#[derive(Debug, Clone)]
pub struct SlideParser {
    /// Bullets kept per slide.
    max_bullets: usize,
}

impl Default for SlideParser {
    fn default() -> Self {
        Self { max_bullets: 6 }
    }
}

impl SlideParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of bullets per slide.
    pub fn with_max_bullets(mut self, max_bullets: usize) -> Self {
        self.max_bullets = max_bullets.max(1);
        self
    }

    /// Parse a response into slides.
    ///
    /// # Example input
    /// ```text
    /// **Revenue**
    /// - Grew 12% year over year
    /// - Driven by the north region
    /// ```
    ///
    /// Slides that end up without bullets are dropped.
    pub fn parse(&self, text: &str) -> Vec<DeckSlide> {
        let mut slides = Vec::new();
        let mut current: Option<DeckSlide> = None;

        for line in text.trim().lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if is_heading(line) {
                if let Some(slide) = current.take() {
                    slides.push(slide);
                }
                let title = line.trim_matches(|c: char| c == '*' || c == ' ');
                current = Some(DeckSlide::title_only(title));
                continue;
            }

            let bullet = line.trim_matches(BULLET_MARKERS);
            if bullet.is_empty() {
                continue;
            }
            current
                .get_or_insert_with(|| DeckSlide::title_only(UNTITLED))
                .bullets
                .push(bullet.to_string());
        }
        if let Some(slide) = current {
            slides.push(slide);
        }

        slides
            .into_iter()
            .filter_map(|mut slide| {
                if slide.bullets.is_empty() {
                    log::debug!("Dropping slide without bullets: {:?}", slide.title);
                    return None;
                }
                slide.bullets.truncate(self.max_bullets);
                Some(slide)
            })
            .collect()
    }
}

/// A key topic listed by the topic-extraction prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub name: String,
    /// The first words of the section the topic covers.
    pub opening: String,
}

/// Parse a topic-extraction response: `**name**` lines, each followed by
/// the opening words of its section.
pub fn parse_topics(text: &str) -> Vec<Topic> {
    let mut topics = Vec::new();
    let mut pending: Option<String> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_heading(line) {
            pending = Some(line.trim_matches(|c: char| c == '*' || c == ' ').to_string());
        } else if let Some(name) = pending.take() {
            topics.push(Topic {
                name,
                opening: line.trim_matches(|c: char| c == '\'' || c == '"' || c == ' ').to_string(),
            });
        }
    }

    topics
}
