//! Rendering of a single deck slide to `ppt/slides/slideN.xml`.

use crate::parts::SHAPE_TREE_HEADER;
use crate::xml::{XmlBuilder, NS_A, NS_P, NS_R};
use docdeck_core::{DeckSlide, Error, ImagePlacement, Rect, Result, SlideGeometry, SlideVisual};
use image::io::Reader as ImageReader;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Relationship id of a slide's picture; `rId1` is the layout.
pub(crate) const IMAGE_REL_ID: &str = "rId2";

const TITLE_SIZE: &str = "3600";
const CENTERED_TITLE_SIZE: &str = "4400";
const BULLET_SIZE: &str = "2000";
const TABLE_TEXT_SIZE: &str = "1400";
const BULLET_INDENT: i64 = 342_900;

/// Image bytes to store under `ppt/media/`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MediaImage {
    pub extension: String,
    pub data: Vec<u8>,
}

/// A rendered slide part and the picture it references, if any.
#[derive(Debug, Clone)]
pub(crate) struct RenderedSlide {
    pub xml: String,
    pub image: Option<MediaImage>,
}

enum Visual<'a> {
    Picture {
        media: MediaImage,
        frame: Rect,
        body: Rect,
    },
    Table(&'a [Vec<String>]),
}

/// Read an image file and its pixel size.
fn load_image(path: &Path) -> Result<(MediaImage, u32, u32)> {
    let data = fs::read(path)?;
    let reader = ImageReader::new(Cursor::new(&data)).with_guessed_format()?;
    let format = reader.format();
    let (width, height) = reader.into_dimensions().map_err(|e| {
        Error::ImageError(format!("Cannot read dimensions of {}: {}", path.display(), e))
    })?;

    let extension = format
        .and_then(|f| f.extensions_str().first().copied())
        .map(str::to_string)
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
        })
        .unwrap_or_else(|| "bin".to_string());

    Ok((MediaImage { extension, data }, width, height))
}

/// Resolve the slide's visual into something drawable. Failures are logged
/// and leave the slide without a visual.
fn prepare_visual<'a>(visual: Option<&'a SlideVisual>, geometry: &SlideGeometry) -> Option<Visual<'a>> {
    match visual? {
        SlideVisual::Image { path, placement } => {
            let (media, width, height) = match load_image(path) {
                Ok(loaded) => loaded,
                Err(e) => {
                    log::warn!("Skipping image {}: {}", path.display(), e);
                    return None;
                }
            };
            let placed = match placement {
                ImagePlacement::Centered => geometry
                    .centered_image(width, height)
                    .map(|frame| (geometry.body_rect(), frame)),
                ImagePlacement::Inline => geometry.inline_image(width, height),
            };
            match placed {
                Ok((body, frame)) => Some(Visual::Picture { media, frame, body }),
                Err(e) => {
                    log::warn!("Skipping image {}: {}", path.display(), e);
                    None
                }
            }
        }
        SlideVisual::Table { rows } => {
            if rows.iter().all(|row| row.is_empty()) {
                log::warn!("Skipping empty table");
                None
            } else {
                Some(Visual::Table(rows))
            }
        }
    }
}

fn write_xfrm(xml: &mut XmlBuilder, tag: &str, rect: Rect) -> Result<()> {
    xml.open(tag, &[])?;
    xml.empty("a:off", &[("x", rect.x.to_string().as_str()), ("y", rect.y.to_string().as_str())])?;
    xml.empty("a:ext", &[("cx", rect.cx.to_string().as_str()), ("cy", rect.cy.to_string().as_str())])?;
    xml.close(tag)
}

fn write_rect_geometry(xml: &mut XmlBuilder) -> Result<()> {
    xml.open("a:prstGeom", &[("prst", "rect")])?;
    xml.empty("a:avLst", &[])?;
    xml.close("a:prstGeom")
}

/// A single-run paragraph.
fn write_run(xml: &mut XmlBuilder, text: &str, size: &str, bold: bool) -> Result<()> {
    let mut props = vec![("lang", "en-US"), ("sz", size)];
    if bold {
        props.push(("b", "1"));
    }
    props.push(("dirty", "0"));
    xml.open("a:r", &[])?;
    xml.empty("a:rPr", &props)?;
    xml.text_element("a:t", text)?;
    xml.close("a:r")
}

fn open_text_box(xml: &mut XmlBuilder, id: u32, name: &str, rect: Rect) -> Result<()> {
    let id = id.to_string();
    xml.open("p:sp", &[])?;
    xml.open("p:nvSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", id.as_str()), ("name", name)])?;
    xml.empty("p:cNvSpPr", &[("txBox", "1")])?;
    xml.empty("p:nvPr", &[])?;
    xml.close("p:nvSpPr")?;

    xml.open("p:spPr", &[])?;
    write_xfrm(xml, "a:xfrm", rect)?;
    write_rect_geometry(xml)?;
    xml.empty("a:noFill", &[])?;
    xml.close("p:spPr")?;

    xml.open("p:txBody", &[])?;
    xml.open("a:bodyPr", &[("wrap", "square"), ("rtlCol", "0")])?;
    xml.empty("a:normAutofit", &[])?;
    xml.close("a:bodyPr")?;
    xml.empty("a:lstStyle", &[])
}

fn close_text_box(xml: &mut XmlBuilder) -> Result<()> {
    xml.close("p:txBody")?;
    xml.close("p:sp")
}

fn write_title(xml: &mut XmlBuilder, id: u32, title: &str, rect: Rect, centered: bool) -> Result<()> {
    open_text_box(xml, id, "Title", rect)?;
    xml.open("a:p", &[])?;
    if centered {
        xml.empty("a:pPr", &[("algn", "ctr")])?;
        write_run(xml, title, CENTERED_TITLE_SIZE, true)?;
    } else {
        write_run(xml, title, TITLE_SIZE, true)?;
    }
    xml.close("a:p")?;
    close_text_box(xml)
}

fn write_bullets(xml: &mut XmlBuilder, id: u32, bullets: &[String], rect: Rect) -> Result<()> {
    let indent = BULLET_INDENT.to_string();
    let hanging = (-BULLET_INDENT).to_string();

    open_text_box(xml, id, "Content", rect)?;
    for bullet in bullets {
        xml.open("a:p", &[])?;
        xml.open("a:pPr", &[("marL", indent.as_str()), ("indent", hanging.as_str())])?;
        xml.empty("a:buFont", &[("typeface", "Arial")])?;
        xml.empty("a:buChar", &[("char", "•")])?;
        xml.close("a:pPr")?;
        write_run(xml, bullet, BULLET_SIZE, false)?;
        xml.close("a:p")?;
    }
    close_text_box(xml)
}

fn write_picture(xml: &mut XmlBuilder, id: u32, frame: Rect) -> Result<()> {
    let id = id.to_string();
    xml.open("p:pic", &[])?;
    xml.open("p:nvPicPr", &[])?;
    xml.empty("p:cNvPr", &[("id", id.as_str()), ("name", "Picture")])?;
    xml.open("p:cNvPicPr", &[])?;
    xml.empty("a:picLocks", &[("noChangeAspect", "1")])?;
    xml.close("p:cNvPicPr")?;
    xml.empty("p:nvPr", &[])?;
    xml.close("p:nvPicPr")?;

    xml.open("p:blipFill", &[])?;
    xml.empty("a:blip", &[("r:embed", IMAGE_REL_ID)])?;
    xml.open("a:stretch", &[])?;
    xml.empty("a:fillRect", &[])?;
    xml.close("a:stretch")?;
    xml.close("p:blipFill")?;

    xml.open("p:spPr", &[])?;
    write_xfrm(xml, "a:xfrm", frame)?;
    write_rect_geometry(xml)?;
    xml.close("p:spPr")?;
    xml.close("p:pic")
}

fn write_table(xml: &mut XmlBuilder, id: u32, rows: &[Vec<String>], geometry: &SlideGeometry) -> Result<()> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let table = geometry.table_frame(rows.len(), columns);
    let column_width = table.column_width.to_string();
    let row_height = table.row_height.to_string();
    let id = id.to_string();

    xml.open("p:graphicFrame", &[])?;
    xml.open("p:nvGraphicFramePr", &[])?;
    xml.empty("p:cNvPr", &[("id", id.as_str()), ("name", "Table")])?;
    xml.open("p:cNvGraphicFramePr", &[])?;
    xml.empty("a:graphicFrameLocks", &[("noGrp", "1")])?;
    xml.close("p:cNvGraphicFramePr")?;
    xml.empty("p:nvPr", &[])?;
    xml.close("p:nvGraphicFramePr")?;
    write_xfrm(xml, "p:xfrm", table.frame)?;

    xml.open("a:graphic", &[])?;
    xml.open(
        "a:graphicData",
        &[("uri", "http://schemas.openxmlformats.org/drawingml/2006/table")],
    )?;
    xml.open("a:tbl", &[])?;
    xml.empty("a:tblPr", &[("firstRow", "1"), ("bandRow", "1")])?;
    xml.open("a:tblGrid", &[])?;
    for _ in 0..columns {
        xml.empty("a:gridCol", &[("w", column_width.as_str())])?;
    }
    xml.close("a:tblGrid")?;

    for row in rows {
        xml.open("a:tr", &[("h", row_height.as_str())])?;
        // Ragged rows are padded with empty cells
        for column in 0..columns {
            let text = row.get(column).map(String::as_str).unwrap_or("");
            xml.open("a:tc", &[])?;
            xml.open("a:txBody", &[])?;
            xml.empty("a:bodyPr", &[])?;
            xml.empty("a:lstStyle", &[])?;
            xml.open("a:p", &[])?;
            if text.is_empty() {
                xml.empty("a:endParaRPr", &[("lang", "en-US"), ("dirty", "0")])?;
            } else {
                write_run(xml, text, TABLE_TEXT_SIZE, false)?;
            }
            xml.close("a:p")?;
            xml.close("a:txBody")?;
            xml.empty("a:tcPr", &[])?;
            xml.close("a:tc")?;
        }
        xml.close("a:tr")?;
    }

    xml.close("a:tbl")?;
    xml.close("a:graphicData")?;
    xml.close("a:graphic")?;
    xml.close("p:graphicFrame")
}

/// Render one slide.
///
/// A slide with only a title gets it centered vertically. Images sit either
/// centered or to the right of a narrowed bullet box; tables go under the
/// title.
pub(crate) fn render_slide(slide: &DeckSlide, geometry: &SlideGeometry) -> Result<RenderedSlide> {
    let visual = prepare_visual(slide.visual.as_ref(), geometry);
    let title_only = visual.is_none() && slide.bullets.is_empty();

    let mut xml = XmlBuilder::new()?;
    xml.open("p:sld", &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)])?;
    xml.open("p:cSld", &[])?;
    xml.open("p:spTree", &[])?;
    xml.raw(SHAPE_TREE_HEADER);

    let mut next_id = 2;
    if !slide.title.trim().is_empty() {
        let rect = if title_only {
            geometry.centered_title_rect()
        } else {
            geometry.title_rect()
        };
        write_title(&mut xml, next_id, &slide.title, rect, title_only)?;
        next_id += 1;
    }

    let mut image = None;
    match visual {
        None => {
            if !slide.bullets.is_empty() {
                write_bullets(&mut xml, next_id, &slide.bullets, geometry.body_rect())?;
            }
        }
        Some(Visual::Picture { media, frame, body }) => {
            if !slide.bullets.is_empty() {
                write_bullets(&mut xml, next_id, &slide.bullets, body)?;
                next_id += 1;
            }
            write_picture(&mut xml, next_id, frame)?;
            image = Some(media);
        }
        Some(Visual::Table(rows)) => {
            if !slide.bullets.is_empty() {
                log::warn!(
                    "Slide '{}' has a table; {} bullets not rendered",
                    slide.title,
                    slide.bullets.len()
                );
            }
            write_table(&mut xml, next_id, rows, geometry)?;
        }
    }

    xml.close("p:spTree")?;
    xml.close("p:cSld")?;
    xml.open("p:clrMapOvr", &[])?;
    xml.empty("a:masterClrMapping", &[])?;
    xml.close("p:clrMapOvr")?;
    xml.close("p:sld")?;

    Ok(RenderedSlide {
        xml: xml.finish()?,
        image,
    })
}
