//! PPTX package assembly.

use crate::parts::{self, REL_IMAGE, REL_SLIDE_LAYOUT};
use crate::slide::{render_slide, IMAGE_REL_ID};
use docdeck_core::{Deck, DeckSettings, Error, Result, SlideGeometry};
use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use std::time::Instant;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes decks as PowerPoint presentations.
pub struct PptxWriter {
    geometry: SlideGeometry,
}

fn zip_error(e: zip::result::ZipError) -> Error {
    Error::ZipError(format!("Failed to write archive: {}", e))
}

fn add_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    content: &[u8],
    options: FileOptions,
) -> Result<()> {
    zip.start_file(name, options).map_err(zip_error)?;
    zip.write_all(content)?;
    Ok(())
}

impl PptxWriter {
    pub fn new(settings: &DeckSettings) -> Self {
        Self {
            geometry: SlideGeometry::new(settings),
        }
    }

    /// Write the deck as a `.pptx` package.
    pub fn write<W: Write + Seek>(&self, deck: &Deck, writer: W) -> Result<()> {
        let start = Instant::now();
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(writer);

        let mut slide_parts = Vec::with_capacity(deck.len());
        let mut media = Vec::new();
        for slide in &deck.slides {
            let rendered = render_slide(slide, &self.geometry)?;
            let image_target = rendered.image.map(|image| {
                let name = format!("image{}.{}", media.len() + 1, image.extension);
                media.push((name.clone(), image));
                format!("../media/{}", name)
            });
            slide_parts.push((rendered.xml, image_target));
        }

        let mut extensions: Vec<String> = media
            .iter()
            .map(|(_, image)| image.extension.to_ascii_lowercase())
            .collect();
        extensions.sort();
        extensions.dedup();

        let slide_count = slide_parts.len();
        let title = deck
            .slides
            .first()
            .map(|slide| slide.title.as_str())
            .unwrap_or("");

        add_file(
            &mut zip,
            "[Content_Types].xml",
            parts::content_types(slide_count, &extensions)?.as_bytes(),
            options,
        )?;
        add_file(&mut zip, "_rels/.rels", parts::root_relationships()?.as_bytes(), options)?;
        add_file(&mut zip, "docProps/core.xml", parts::core_properties(title)?.as_bytes(), options)?;
        add_file(&mut zip, "docProps/app.xml", parts::app_properties(slide_count)?.as_bytes(), options)?;
        add_file(
            &mut zip,
            "ppt/presentation.xml",
            parts::presentation(slide_count, self.geometry.slide_size())?.as_bytes(),
            options,
        )?;
        add_file(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            parts::presentation_relationships(slide_count)?.as_bytes(),
            options,
        )?;
        add_file(
            &mut zip,
            "ppt/slideMasters/slideMaster1.xml",
            parts::slide_master().as_bytes(),
            options,
        )?;
        add_file(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            parts::slide_master_relationships()?.as_bytes(),
            options,
        )?;
        add_file(
            &mut zip,
            "ppt/slideLayouts/slideLayout1.xml",
            parts::slide_layout().as_bytes(),
            options,
        )?;
        add_file(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            parts::slide_layout_relationships()?.as_bytes(),
            options,
        )?;
        add_file(&mut zip, "ppt/theme/theme1.xml", parts::theme().as_bytes(), options)?;

        for (index, (xml, image_target)) in slide_parts.iter().enumerate() {
            let number = index + 1;
            let mut rels = vec![(
                "rId1".to_string(),
                REL_SLIDE_LAYOUT,
                "../slideLayouts/slideLayout1.xml".to_string(),
            )];
            if let Some(target) = image_target {
                rels.push((IMAGE_REL_ID.to_string(), REL_IMAGE, target.clone()));
            }

            add_file(
                &mut zip,
                &format!("ppt/slides/slide{}.xml", number),
                xml.as_bytes(),
                options,
            )?;
            add_file(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                parts::relationships(&rels)?.as_bytes(),
                options,
            )?;
        }

        for (name, image) in &media {
            add_file(&mut zip, &format!("ppt/media/{}", name), &image.data, options)?;
        }

        let mut inner = zip.finish().map_err(zip_error)?;
        inner.flush()?;
        log::info!(
            "Wrote {} slides with {} images in {:?}",
            slide_count,
            media.len(),
            start.elapsed()
        );
        Ok(())
    }

    /// Write the deck to `path`, creating parent directories as needed.
    pub fn write_to_path(&self, deck: &Deck, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        self.write(deck, BufWriter::new(file))
    }
}
