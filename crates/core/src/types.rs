//! Domain types for extracted document content and composed decks.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The kind of figure, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureType {
    /// A raster or vector picture embedded in the document.
    Image,
    /// A table from the document body.
    Table,
}

/// Payload of a figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FigureKind {
    /// An image written to disk during extraction.
    Image { path: PathBuf },
    /// A table, one inner vector per row.
    Table { rows: Vec<Vec<String>> },
}

/// An image or table extracted from the document, with placement metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// Sequential id, unique within one document.
    pub id: u32,

    /// What the figure is.
    #[serde(flatten)]
    pub kind: FigureKind,

    /// Text of the paragraph the figure was found in. May be empty.
    pub paragraph_text: String,
}

impl Figure {
    /// Create an image figure.
    pub fn image(id: u32, path: impl Into<PathBuf>, paragraph_text: impl Into<String>) -> Self {
        Self {
            id,
            kind: FigureKind::Image { path: path.into() },
            paragraph_text: paragraph_text.into(),
        }
    }

    /// Create a table figure.
    pub fn table(id: u32, rows: Vec<Vec<String>>, paragraph_text: impl Into<String>) -> Self {
        Self {
            id,
            kind: FigureKind::Table { rows },
            paragraph_text: paragraph_text.into(),
        }
    }

    /// The figure's type tag.
    pub fn figure_type(&self) -> FigureType {
        match self.kind {
            FigureKind::Image { .. } => FigureType::Image,
            FigureKind::Table { .. } => FigureType::Table,
        }
    }

    /// Path of the extracted image file. `None` for tables.
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            FigureKind::Image { path } => Some(path),
            FigureKind::Table { .. } => None,
        }
    }
}

/// A slide produced by the text-generation step, as seen by figure placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSlide {
    pub title: String,
    pub content: String,
}

impl TextSlide {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Where a figure should go.
///
/// `slide_index` is `Some` exactly when `own_slide` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementDecision {
    pub figure_id: u32,
    pub figure_type: FigureType,
    pub figure_path: Option<PathBuf>,
    pub slide_index: Option<usize>,
    pub own_slide: bool,
}

impl PlacementDecision {
    /// Place the figure on an existing slide.
    pub fn on_slide(figure: &Figure, slide_index: usize) -> Self {
        Self {
            figure_id: figure.id,
            figure_type: figure.figure_type(),
            figure_path: figure.path().map(Path::to_path_buf),
            slide_index: Some(slide_index),
            own_slide: false,
        }
    }

    /// Give the figure a slide of its own.
    pub fn standalone(figure: &Figure) -> Self {
        Self {
            figure_id: figure.id,
            figure_type: figure.figure_type(),
            figure_path: figure.path().map(Path::to_path_buf),
            slide_index: None,
            own_slide: true,
        }
    }
}

/// One element of the document content, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    /// A non-empty paragraph.
    Text(String),
    /// An extracted image or table.
    Figure(Figure),
}

/// Outcome of a single text-generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// Usable slide text.
    Success(String),
    /// The model answered, but with a refusal or a request for more input.
    Rejected(String),
}

/// How an image sits on its slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePlacement {
    /// Centered on the slide, text (if any) left untouched.
    Centered,
    /// To the right of the bullet text, which is narrowed to make room.
    Inline,
}

/// Non-text content of a deck slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SlideVisual {
    Image {
        path: PathBuf,
        placement: ImagePlacement,
    },
    Table {
        rows: Vec<Vec<String>>,
    },
}

impl SlideVisual {
    /// The visual used when `figure` gets a slide to itself.
    pub fn standalone(figure: &Figure) -> Self {
        match &figure.kind {
            FigureKind::Image { path } => Self::Image {
                path: path.clone(),
                placement: ImagePlacement::Centered,
            },
            FigureKind::Table { rows } => Self::Table { rows: rows.clone() },
        }
    }
}

/// A fully composed slide, ready to be written out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckSlide {
    pub title: String,
    pub bullets: Vec<String>,
    pub visual: Option<SlideVisual>,
}

impl DeckSlide {
    /// Create a slide with a title and bullets.
    pub fn new(title: impl Into<String>, bullets: Vec<String>) -> Self {
        Self {
            title: title.into(),
            bullets,
            visual: None,
        }
    }

    /// Create a slide that only carries a title.
    pub fn title_only(title: impl Into<String>) -> Self {
        Self::new(title, Vec::new())
    }

    /// Attach a visual to this slide.
    pub fn with_visual(mut self, visual: SlideVisual) -> Self {
        self.visual = Some(visual);
        self
    }

    /// View this slide as placement input.
    pub fn to_text_slide(&self) -> TextSlide {
        TextSlide::new(self.title.clone(), self.bullets.join("\n"))
    }
}

/// An ordered list of slides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub slides: Vec<DeckSlide>,
}

impl Deck {
    /// Create an empty deck.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slide at the end of the deck.
    pub fn add_slide(&mut self, slide: DeckSlide) {
        self.slides.push(slide);
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_type_and_path() {
        let image = Figure::image(1, "figs/figure_1.png", "A chart");
        assert_eq!(image.figure_type(), FigureType::Image);
        assert_eq!(image.path(), Some(Path::new("figs/figure_1.png")));

        let table = Figure::table(2, vec![vec!["a".into(), "b".into()]], "");
        assert_eq!(table.figure_type(), FigureType::Table);
        assert_eq!(table.path(), None);
    }

    #[test]
    fn test_placement_decision_constructors() {
        let image = Figure::image(3, "x.png", "");
        let placed = PlacementDecision::on_slide(&image, 4);
        assert_eq!(placed.slide_index, Some(4));
        assert!(!placed.own_slide);
        assert_eq!(placed.figure_path, Some(PathBuf::from("x.png")));

        let table = Figure::table(5, Vec::new(), "");
        let own = PlacementDecision::standalone(&table);
        assert_eq!(own.slide_index, None);
        assert!(own.own_slide);
        assert_eq!(own.figure_path, None);
        assert_eq!(own.figure_type, FigureType::Table);
    }

    #[test]
    fn test_placement_decision_serializes_lowercase_type() {
        let image = Figure::image(1, "a.png", "");
        let json = serde_json::to_string(&PlacementDecision::on_slide(&image, 0)).unwrap();
        assert!(json.contains("\"figure_type\":\"image\""));
        assert!(json.contains("\"slide_index\":0"));
    }

    #[test]
    fn test_deck_slide_to_text_slide() {
        let slide = DeckSlide::new("Results", vec!["Up 10%".into(), "Down 2%".into()]);
        let text = slide.to_text_slide();
        assert_eq!(text.title, "Results");
        assert_eq!(text.content, "Up 10%\nDown 2%");
    }

    #[test]
    fn test_standalone_visual() {
        let image = Figure::image(1, "a.png", "");
        assert_eq!(
            SlideVisual::standalone(&image),
            SlideVisual::Image {
                path: PathBuf::from("a.png"),
                placement: ImagePlacement::Centered
            }
        );

        let rows = vec![vec!["h".to_string()]];
        let table = Figure::table(2, rows.clone(), "");
        assert_eq!(SlideVisual::standalone(&table), SlideVisual::Table { rows });
    }
}
