//! Slide geometry.
//!
//! Positions are computed in EMU (English Metric Units, 914400 per inch),
//! the unit used throughout DrawingML. Image pixel sizes are converted at
//! 96 DPI.

use crate::{DeckSettings, Error, Result};

/// EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Pixel density assumed for embedded images.
pub const PIXELS_PER_INCH: f64 = 96.0;

const TITLE_TOP: f64 = 0.3;
const TITLE_HEIGHT: f64 = 1.0;
const BODY_TOP: f64 = 1.5;
const TABLE_ROW_HEIGHT: f64 = 0.4;

/// Convert inches to EMU.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// An axis-aligned box on the slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }
}

/// Scale an image into a bounding box, never enlarging it.
///
/// Returns the scaled `(width, height)` in EMU.
pub fn fit_image(px_width: u32, px_height: u32, max_width: f64, max_height: f64) -> Result<(i64, i64)> {
    if px_width == 0 || px_height == 0 {
        return Err(Error::ImageError(format!(
            "image has zero size ({}x{})",
            px_width, px_height
        )));
    }

    let width_in = f64::from(px_width) / PIXELS_PER_INCH;
    let height_in = f64::from(px_height) / PIXELS_PER_INCH;
    let scale = (max_width / width_in).min(max_height / height_in).min(1.0);

    Ok((inches(width_in * scale), inches(height_in * scale)))
}

/// Placement of a table: its frame plus uniform cell sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFrame {
    pub frame: Rect,
    pub column_width: i64,
    pub row_height: i64,
}

/// Computes shape positions for one slide size.
#[derive(Debug, Clone)]
pub struct SlideGeometry {
    settings: DeckSettings,
}

impl SlideGeometry {
    pub fn new(settings: &DeckSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Slide `(width, height)` in EMU.
    pub fn slide_size(&self) -> (i64, i64) {
        (
            inches(self.settings.slide_width),
            inches(self.settings.slide_height),
        )
    }

    fn margin(&self) -> i64 {
        inches(self.settings.textbox_margin)
    }

    /// Title box along the top of the slide.
    pub fn title_rect(&self) -> Rect {
        let (width, _) = self.slide_size();
        let margin = self.margin();
        Rect::new(margin, inches(TITLE_TOP), width - 2 * margin, inches(TITLE_HEIGHT))
    }

    /// Title box centered vertically, for slides that carry nothing else.
    pub fn centered_title_rect(&self) -> Rect {
        let (_, height) = self.slide_size();
        let mut rect = self.title_rect();
        rect.y = (height - rect.cy) / 2;
        rect
    }

    /// Bullet text box spanning the slide below the title.
    pub fn body_rect(&self) -> Rect {
        let (width, height) = self.slide_size();
        let margin = self.margin();
        let top = inches(BODY_TOP);
        Rect::new(margin, top, width - 2 * margin, (height - top - margin).max(0))
    }

    /// An image fitted into the centered-image box and centered on the slide.
    pub fn centered_image(&self, px_width: u32, px_height: u32) -> Result<Rect> {
        let (width, height) = self.slide_size();
        let (cx, cy) = fit_image(
            px_width,
            px_height,
            self.settings.max_image_width,
            self.settings.max_image_height,
        )?;
        Ok(Rect::new((width - cx) / 2, (height - cy) / 2, cx, cy))
    }

    /// An image on the right of the slide and the narrowed bullet box beside it.
    ///
    /// Returns `(body, image)`.
    pub fn inline_image(&self, px_width: u32, px_height: u32) -> Result<(Rect, Rect)> {
        let (width, height) = self.slide_size();
        let margin = self.margin();
        let (cx, cy) = fit_image(
            px_width,
            px_height,
            self.settings.inline_image_width,
            self.settings.inline_image_height,
        )?;

        let image = Rect::new(width - cx - margin, (height - cy) / 2, cx, cy);
        let mut body = self.body_rect();
        body.cx = (width - cx - 3 * margin).max(0);
        Ok((body, image))
    }

    /// Frame for a table with `rows` rows and `columns` columns below the title.
    pub fn table_frame(&self, rows: usize, columns: usize) -> TableFrame {
        let body = self.body_rect();
        let rows = rows.max(1) as i64;
        let columns = columns.max(1) as i64;

        let row_height = inches(TABLE_ROW_HEIGHT).min(body.cy / rows);
        let column_width = body.cx / columns;

        TableFrame {
            frame: Rect::new(body.x, body.y, column_width * columns, row_height * rows),
            column_width,
            row_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> SlideGeometry {
        SlideGeometry::new(&DeckSettings::default())
    }

    #[test]
    fn test_inches() {
        assert_eq!(inches(1.0), EMU_PER_INCH);
        assert_eq!(inches(0.5), 457_200);
        assert_eq!(inches(10.0), 9_144_000);
    }

    #[test]
    fn test_fit_small_image_is_not_enlarged() {
        // 96x48 px is 1x0.5 in
        let (cx, cy) = fit_image(96, 48, 5.5, 4.0).unwrap();
        assert_eq!(cx, inches(1.0));
        assert_eq!(cy, inches(0.5));
    }

    #[test]
    fn test_fit_wide_image_limited_by_width() {
        // 1056 px is 11 in, twice the 5.5 in limit
        let (cx, cy) = fit_image(1056, 192, 5.5, 4.0).unwrap();
        assert_eq!(cx, inches(5.5));
        assert_eq!(cy, inches(1.0));
    }

    #[test]
    fn test_fit_tall_image_limited_by_height() {
        // 96x768 px is 1x8 in, scale 0.5
        let (cx, cy) = fit_image(96, 768, 5.5, 4.0).unwrap();
        assert_eq!(cx, inches(0.5));
        assert_eq!(cy, inches(4.0));
    }

    #[test]
    fn test_fit_zero_size_rejected() {
        assert!(matches!(fit_image(0, 10, 1.0, 1.0), Err(Error::ImageError(_))));
    }

    #[test]
    fn test_centered_image() {
        let rect = geometry().centered_image(96, 96).unwrap();
        let (width, height) = geometry().slide_size();
        assert_eq!(rect.cx, inches(1.0));
        assert_eq!(rect.x, (width - rect.cx) / 2);
        assert_eq!(rect.y, (height - rect.cy) / 2);
    }

    #[test]
    fn test_inline_image_sits_right_of_text() {
        let (body, image) = geometry().inline_image(960, 960).unwrap();
        let (width, _) = geometry().slide_size();

        // 10x10 in scaled into 4.5x3.5
        assert_eq!(image.cx, inches(3.5));
        assert_eq!(image.cy, inches(3.5));
        assert_eq!(image.x + image.cx, width - inches(0.5));
        assert_eq!(body.x, inches(0.5));
        assert_eq!(body.y, inches(1.5));
        assert_eq!(body.cx, width - image.cx - inches(1.5));
        assert!(body.x + body.cx < image.x);
    }

    #[test]
    fn test_title_and_body() {
        let geometry = geometry();
        let title = geometry.title_rect();
        let body = geometry.body_rect();
        assert_eq!(title.x, inches(0.5));
        assert_eq!(title.cx, inches(9.0));
        assert!(title.y + title.cy <= body.y);
        assert_eq!(body.y + body.cy, inches(7.0));

        let centered = geometry.centered_title_rect();
        assert_eq!(centered.y, (inches(7.5) - centered.cy) / 2);
    }

    #[test]
    fn test_table_frame() {
        let frame = geometry().table_frame(3, 4);
        assert_eq!(frame.row_height, inches(0.4));
        assert_eq!(frame.column_width, inches(9.0) / 4);
        assert_eq!(frame.frame.cy, frame.row_height * 3);

        // Many rows shrink to fit the body
        let body = geometry().body_rect();
        let crowded = geometry().table_frame(100, 1);
        assert!(crowded.frame.cy <= body.cy);
    }
}
