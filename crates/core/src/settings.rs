//! Deck layout settings.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Sizes and limits used when composing and writing a deck.
///
/// All lengths are in inches. Missing fields in a settings file fall back
/// to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckSettings {
    /// Bullets kept per generated slide.
    pub max_bullets_per_slide: usize,

    /// Bounding box for centered images.
    pub max_image_width: f64,
    pub max_image_height: f64,

    /// Bounding box for images placed next to bullet text.
    pub inline_image_width: f64,
    pub inline_image_height: f64,

    /// Distance kept between text boxes or images and the slide edge.
    pub textbox_margin: f64,

    /// Slide size. The default is the classic 4:3 page.
    pub slide_width: f64,
    pub slide_height: f64,
}

impl Default for DeckSettings {
    fn default() -> Self {
        Self {
            max_bullets_per_slide: 6,
            max_image_width: 5.5,
            max_image_height: 4.0,
            inline_image_width: 4.5,
            inline_image_height: 3.5,
            textbox_margin: 0.5,
            slide_width: 10.0,
            slide_height: 7.5,
        }
    }
}

impl DeckSettings {
    /// Check that the settings describe a usable layout.
    pub fn validate(&self) -> Result<()> {
        if self.max_bullets_per_slide == 0 {
            return Err(Error::InvalidSettings(
                "max_bullets_per_slide must be at least 1".to_string(),
            ));
        }

        let lengths = [
            ("max_image_width", self.max_image_width),
            ("max_image_height", self.max_image_height),
            ("inline_image_width", self.inline_image_width),
            ("inline_image_height", self.inline_image_height),
            ("slide_width", self.slide_width),
            ("slide_height", self.slide_height),
        ];
        for (name, value) in lengths {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidSettings(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        if !(self.textbox_margin.is_finite() && self.textbox_margin >= 0.0) {
            return Err(Error::InvalidSettings(format!(
                "textbox_margin must not be negative, got {}",
                self.textbox_margin
            )));
        }

        // Inline images share the slide width with at least an inch of text.
        if self.inline_image_width + 2.0 * self.textbox_margin + 1.0 > self.slide_width {
            return Err(Error::InvalidSettings(format!(
                "inline_image_width {} leaves no room for text on a {} inch slide",
                self.inline_image_width, self.slide_width
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = DeckSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_bullets_per_slide, 6);
        assert_eq!(settings.max_image_width, 5.5);
        assert_eq!(settings.max_image_height, 4.0);
        assert_eq!(settings.textbox_margin, 0.5);
    }

    #[test]
    fn test_zero_bullets_rejected() {
        let settings = DeckSettings {
            max_bullets_per_slide: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn test_non_positive_size_rejected() {
        let settings = DeckSettings {
            max_image_height: 0.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = DeckSettings {
            slide_width: f64::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_negative_margin_rejected() {
        let settings = DeckSettings {
            textbox_margin: -0.1,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_inline_image_too_wide_rejected() {
        let settings = DeckSettings {
            inline_image_width: 9.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: DeckSettings =
            serde_json::from_str(r#"{"max_bullets_per_slide": 4, "slide_width": 13.333}"#).unwrap();
        assert_eq!(settings.max_bullets_per_slide, 4);
        assert_eq!(settings.slide_width, 13.333);
        assert_eq!(settings.slide_height, 7.5);
        assert_eq!(settings.inline_image_width, 4.5);
    }
}
