//! Core domain types, figure placement, prompt handling, and slide geometry
//! for turning documents into slide decks.

pub mod error;
pub mod layout;
pub mod normalize;
pub mod placement;
pub mod prompt;
pub mod response;
pub mod settings;
pub mod types;

pub use error::{Error, Result};
pub use layout::{Rect, SlideGeometry, TableFrame};
pub use normalize::TextNormalizer;
pub use placement::{decide_placement, FigurePlacer, MatchMode};
pub use response::{classify_response, SlideParser, Topic};
pub use settings::DeckSettings;
pub use types::{
    ContentItem, Deck, DeckSlide, Figure, FigureKind, FigureType, Generation, ImagePlacement,
    PlacementDecision, SlideVisual, TextSlide,
};
