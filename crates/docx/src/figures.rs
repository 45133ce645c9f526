//! Turning a parsed document into ordered content with extracted figures.

use crate::parser::{DocumentBlock, EmbeddedImage, ParsedDocument};
use docdeck_core::{ContentItem, Figure, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes document images to disk and numbers every figure.
#[derive(Debug, Clone)]
pub struct FigureExtractor {
    image_dir: PathBuf,
}

impl FigureExtractor {
    /// Create an extractor writing images into `image_dir`.
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
        }
    }

    /// Flatten the document into text items and figures, in reading order.
    ///
    /// Images come right after the text of the paragraph holding them and
    /// carry that text as their `paragraph_text`. Tables carry the text of
    /// the closest non-empty paragraph before them. Ids start at 1.
    pub fn extract(&self, document: &ParsedDocument) -> Result<Vec<ContentItem>> {
        fs::create_dir_all(&self.image_dir)?;

        let mut items = Vec::new();
        let mut next_id: u32 = 1;
        let mut last_text = String::new();

        for block in &document.blocks {
            match block {
                DocumentBlock::Paragraph { text, images } => {
                    if !text.is_empty() {
                        items.push(ContentItem::Text(text.clone()));
                        last_text = text.clone();
                    }
                    for image in images {
                        let path = self.write_image(next_id, image)?;
                        items.push(ContentItem::Figure(Figure::image(next_id, path, text.clone())));
                        next_id += 1;
                    }
                }
                DocumentBlock::Table { rows } => {
                    items.push(ContentItem::Figure(Figure::table(
                        next_id,
                        rows.clone(),
                        last_text.clone(),
                    )));
                    next_id += 1;
                }
            }
        }

        log::info!(
            "Extracted {} figures into {}",
            next_id - 1,
            self.image_dir.display()
        );
        Ok(items)
    }

    fn write_image(&self, id: u32, image: &EmbeddedImage) -> Result<PathBuf> {
        let path = self
            .image_dir
            .join(format!("figure_{}.{}", id, image_extension(image)));
        fs::write(&path, &image.data)?;
        log::debug!("Wrote {} ({} bytes)", path.display(), image.data.len());
        Ok(path)
    }
}

/// File extension for an image: sniffed from its bytes, else taken from the
/// media part name.
fn image_extension(image: &EmbeddedImage) -> String {
    if let Ok(format) = image::guess_format(&image.data) {
        if let Some(ext) = format.extensions_str().first() {
            return (*ext).to_string();
        }
    }

    Path::new(&image.target)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdeck_core::{FigureKind, FigureType};

    fn image(target: &str, data: &[u8]) -> EmbeddedImage {
        EmbeddedImage {
            rel_id: "rId1".to_string(),
            target: target.to_string(),
            data: data.to_vec(),
        }
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension(&image("word/media/a.bin", b"\x89PNG\r\n\x1a\n")), "png");
        assert_eq!(image_extension(&image("word/media/a.png", b"\xff\xd8\xff\xe0")), "jpg");
        assert_eq!(image_extension(&image("word/media/a.EMF", b"???")), "emf");
        assert_eq!(image_extension(&image("word/media/noext", b"???")), "bin");
    }

    #[test]
    fn test_extract_orders_and_numbers_figures() {
        let dir = tempfile::tempdir().unwrap();
        let image_dir = dir.path().join("figures");

        let document = ParsedDocument {
            blocks: vec![
                DocumentBlock::Paragraph {
                    text: "Title".to_string(),
                    images: Vec::new(),
                },
                DocumentBlock::Paragraph {
                    text: "Sales chart".to_string(),
                    images: vec![image("word/media/image1.png", b"\x89PNG\r\n\x1a\nabc")],
                },
                DocumentBlock::Paragraph {
                    text: String::new(),
                    images: vec![image("word/media/image2.gif", b"GIF89a...")],
                },
                DocumentBlock::Table {
                    rows: vec![vec!["a".to_string()]],
                },
            ],
        };

        let items = FigureExtractor::new(&image_dir).extract(&document).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0], ContentItem::Text("Title".to_string()));
        assert_eq!(items[1], ContentItem::Text("Sales chart".to_string()));

        let ContentItem::Figure(first) = &items[2] else {
            panic!("expected a figure");
        };
        assert_eq!(first.id, 1);
        assert_eq!(first.paragraph_text, "Sales chart");
        let path = first.path().unwrap();
        assert_eq!(path, image_dir.join("figure_1.png"));
        assert_eq!(fs::read(path).unwrap(), b"\x89PNG\r\n\x1a\nabc");

        let ContentItem::Figure(second) = &items[3] else {
            panic!("expected a figure");
        };
        assert_eq!(second.id, 2);
        assert_eq!(second.paragraph_text, "");
        assert_eq!(second.path().unwrap(), image_dir.join("figure_2.gif"));

        let ContentItem::Figure(table) = &items[4] else {
            panic!("expected a figure");
        };
        assert_eq!(table.id, 3);
        assert_eq!(table.figure_type(), FigureType::Table);
        assert_eq!(table.paragraph_text, "Sales chart");
        assert_eq!(
            table.kind,
            FigureKind::Table {
                rows: vec![vec!["a".to_string()]]
            }
        );
    }

    #[test]
    fn test_extract_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let items = FigureExtractor::new(dir.path())
            .extract(&ParsedDocument::default())
            .unwrap();
        assert!(items.is_empty());
    }
}
