//! Slide text generation backends.
//!
//! [`AnthropicGenerator`] calls the Anthropic Messages API; [`OfflineGenerator`]
//! builds slides from the document text alone, without any network access.

pub mod anthropic;
pub mod generator;
pub mod offline;

pub use anthropic::AnthropicGenerator;
pub use generator::SlideGenerator;
pub use offline::OfflineGenerator;
