//! Figure-to-slide placement.
//!
//! Greedy text-overlap scoring: every image is attached to the generated
//! slide whose title and content share the most words with the paragraph
//! the image came from. Tables, and images with no overlapping slide, get a
//! slide of their own.

use crate::{Error, Figure, FigureType, PlacementDecision, Result, TextSlide};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Runs of non-word characters separate tokens.
static TOKEN_SPLIT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

/// How a figure token is compared with a slide's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The token occurs anywhere in the slide text ("an" matches "analysis").
    #[default]
    Substring,
    /// The token equals one of the slide's own tokens.
    Word,
}

/// Split text into lower-cased word tokens, dropping empty ones.
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_SPLIT_REGEX
        .split(&text.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// A slide prepared for repeated scoring.
struct Haystack {
    text: String,
    words: HashSet<String>,
}

impl Haystack {
    fn new(slide: &TextSlide) -> Self {
        let text = format!("{} {}", slide.title, slide.content).to_lowercase();
        let words = tokenize(&text).into_iter().collect();
        Self { text, words }
    }

    fn overlap(&self, tokens: &[String], mode: MatchMode) -> usize {
        tokens
            .iter()
            .filter(|token| match mode {
                MatchMode::Substring => self.text.contains(token.as_str()),
                MatchMode::Word => self.words.contains(token.as_str()),
            })
            .count()
    }
}

/// Decides which slide each figure belongs on.
#[derive(Debug, Clone, Default)]
pub struct FigurePlacer {
    match_mode: MatchMode,
}

impl FigurePlacer {
    /// Create a placer using substring matching.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token matching mode.
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Produce one decision per figure, in input order.
    ///
    /// Fails with [`Error::InvalidInput`] on duplicate figure ids or an
    /// image figure without a path.
    pub fn decide(&self, figures: &[Figure], slides: &[TextSlide]) -> Result<Vec<PlacementDecision>> {
        validate(figures)?;

        let haystacks: Vec<Haystack> = slides.iter().map(Haystack::new).collect();

        let decisions = figures
            .iter()
            .map(|figure| {
                let is_large = figure.figure_type() == FigureType::Table;
                let fig_text = match figure.figure_type() {
                    FigureType::Image => figure.paragraph_text.as_str(),
                    FigureType::Table => "",
                };
                let tokens = tokenize(fig_text);

                let mut best_slide_index = None;
                let mut best_score = 0;
                for (i, haystack) in haystacks.iter().enumerate() {
                    let overlap = haystack.overlap(&tokens, self.match_mode);
                    if overlap > best_score {
                        best_score = overlap;
                        best_slide_index = Some(i);
                    }
                }

                match best_slide_index {
                    Some(index) if !is_large => {
                        log::debug!(
                            "Figure {} -> slide {} (overlap {})",
                            figure.id,
                            index,
                            best_score
                        );
                        PlacementDecision::on_slide(figure, index)
                    }
                    _ => {
                        log::debug!("Figure {} -> own slide", figure.id);
                        PlacementDecision::standalone(figure)
                    }
                }
            })
            .collect();

        Ok(decisions)
    }
}

/// Place figures with the default (substring) matching.
pub fn decide_placement(figures: &[Figure], slides: &[TextSlide]) -> Result<Vec<PlacementDecision>> {
    FigurePlacer::new().decide(figures, slides)
}

/// Reject duplicate figure ids and image figures with an empty path.
pub fn validate(figures: &[Figure]) -> Result<()> {
    let mut seen = HashSet::with_capacity(figures.len());
    for figure in figures {
        if !seen.insert(figure.id) {
            return Err(Error::InvalidInput(format!(
                "duplicate figure id {}",
                figure.id
            )));
        }
        if let Some(path) = figure.path() {
            if path.as_os_str().is_empty() {
                return Err(Error::InvalidInput(format!(
                    "image figure {} has an empty path",
                    figure.id
                )));
            }
        }
    }
    Ok(())
}
