//! PPTX (Office Open XML) writer for composed slide decks.
//!
//! A deck is written as a ZIP package with one master, one blank layout,
//! one theme, and a slide part per deck slide. Text boxes, pictures, and
//! tables are positioned explicitly from the deck settings.

mod parts;
mod slide;
pub mod writer;
mod xml;

pub use writer::PptxWriter;
