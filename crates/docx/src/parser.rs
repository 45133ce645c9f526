//! DOCX file parser implementation.

use docdeck_core::{Error, Result, TextNormalizer};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek};
use zip::ZipArchive;

const DOCUMENT_PATH: &str = "word/document.xml";
const DOCUMENT_RELS_PATH: &str = "word/_rels/document.xml.rels";

/// A document body, in reading order.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub blocks: Vec<DocumentBlock>,
}

impl ParsedDocument {
    /// Text of all non-empty paragraphs, one per line.
    pub fn full_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                DocumentBlock::Paragraph { text, .. } if !text.is_empty() => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of embedded images across all paragraphs.
    pub fn image_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| match block {
                DocumentBlock::Paragraph { images, .. } => images.len(),
                DocumentBlock::Table { .. } => 0,
            })
            .sum()
    }
}

/// A top-level element of the document body.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentBlock {
    /// A paragraph with its normalized text and the images drawn inside it.
    Paragraph {
        text: String,
        images: Vec<EmbeddedImage>,
    },
    /// A table, one inner vector of cell texts per row.
    Table { rows: Vec<Vec<String>> },
}

/// Image bytes referenced from a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    /// Relationship id from the `r:embed` attribute.
    pub rel_id: String,
    /// Archive path of the media part, e.g. `word/media/image1.png`.
    pub target: String,
    pub data: Vec<u8>,
}

/// Body element before image relationships are resolved.
#[derive(Debug)]
enum RawBlock {
    Paragraph { text: String, rel_ids: Vec<String> },
    Table { rows: Vec<Vec<String>> },
}

/// Parser for DOCX (Office Open XML) files.
#[derive(Debug, Clone)]
pub struct DocxParser {
    normalizer: TextNormalizer,
    /// Table cells hold a single line.
    cell_normalizer: TextNormalizer,
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxParser {
    /// Create a new DOCX parser.
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            cell_normalizer: TextNormalizer::new().with_preserve_line_breaks(false),
        }
    }

    /// Parse a DOCX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<ParsedDocument> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let relationships = self.read_relationships(&mut archive)?;
        let content = read_file_from_archive(&mut archive, DOCUMENT_PATH)?;
        let raw_blocks = self.read_blocks(&content)?;

        let mut used_ids = HashSet::new();
        let mut blocks = Vec::with_capacity(raw_blocks.len());

        for raw in raw_blocks {
            match raw {
                RawBlock::Paragraph { text, rel_ids } => {
                    let mut images = Vec::new();
                    for rel_id in rel_ids {
                        if !used_ids.insert(rel_id.clone()) {
                            log::debug!("Skipping repeated image reference {}", rel_id);
                            continue;
                        }
                        let Some(target) = relationships.get(&rel_id) else {
                            log::warn!("Image relationship {} not found, skipping", rel_id);
                            continue;
                        };
                        match read_binary_from_archive(&mut archive, target) {
                            Ok(data) => images.push(EmbeddedImage {
                                rel_id,
                                target: target.clone(),
                                data,
                            }),
                            Err(e) => log::warn!("Skipping image {}: {}", rel_id, e),
                        }
                    }
                    blocks.push(DocumentBlock::Paragraph { text, images });
                }
                RawBlock::Table { rows } => blocks.push(DocumentBlock::Table { rows }),
            }
        }

        log::debug!("Parsed {} body blocks", blocks.len());
        Ok(ParsedDocument { blocks })
    }

    /// Map relationship ids to archive paths for the main document part.
    fn read_relationships<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<HashMap<String, String>> {
        let mut relationships = HashMap::new();

        if archive.by_name(DOCUMENT_RELS_PATH).is_err() {
            log::debug!("No document relationships part; images will be skipped");
            return Ok(relationships);
        }
        let rels_content = read_file_from_archive(archive, DOCUMENT_RELS_PATH)?;

        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = String::new();
                    let mut target = String::new();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            b"TargetMode" => external = attr.value.as_ref() == b"External",
                            _ => {}
                        }
                    }

                    if !external && !id.is_empty() && !target.is_empty() {
                        relationships.insert(id, resolve_target("word", &target));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(relationships)
    }

    /// Walk the document part and collect body paragraphs and tables.
    fn read_blocks(&self, xml_content: &str) -> Result<Vec<RawBlock>> {
        let mut blocks = Vec::new();
        let mut reader = Reader::from_str(xml_content);

        let mut state = BodyState::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"Fallback" => {
                            // Legacy VML duplicate of the preceding mc:Choice
                            let end = e.to_end().into_owned();
                            reader.read_to_end(end.name()).map_err(|err| {
                                Error::XmlError(format!("Unterminated fallback content: {}", err))
                            })?;
                        }
                        b"p" => state.start_paragraph(),
                        b"r" => state.in_run = true,
                        b"t" => state.in_text = true,
                        b"blip" => state.push_blip(e),
                        b"tbl" => state.start_table(),
                        b"tr" => state.start_row(),
                        b"tc" => state.start_cell(),
                        _ => {}
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"tab" if state.in_run => state.push_text("\t"),
                        b"br" | b"cr" if state.in_run => state.push_text("\n"),
                        b"blip" => state.push_blip(e),
                        _ => {}
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if state.in_text {
                        let text = e.unescape().map_err(|err| {
                            Error::XmlError(format!(
                                "Bad text at position {} in {}: {}",
                                reader.buffer_position(),
                                DOCUMENT_PATH,
                                err
                            ))
                        })?;
                        state.push_text(&text);
                    }
                }
                Ok(Event::End(ref e)) => {
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"t" => state.in_text = false,
                        b"r" => state.in_run = false,
                        b"p" => {
                            let block = state.end_paragraph(&self.normalizer, &self.cell_normalizer);
                            if let Some(block) = block {
                                blocks.push(block);
                            }
                        }
                        b"tc" => state.end_cell(),
                        b"tr" => state.end_row(),
                        b"tbl" => {
                            if let Some(block) = state.end_table() {
                                blocks.push(block);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error at position {} in {}: {}",
                        reader.buffer_position(),
                        DOCUMENT_PATH,
                        e
                    )));
                }
                _ => {}
            }
        }

        if state.paragraph_depth != 0 || state.table_depth != 0 {
            return Err(Error::DocxParseError(
                "document body ended inside a paragraph or table".to_string(),
            ));
        }

        Ok(blocks)
    }
}

/// Parser state while walking `word/document.xml`.
#[derive(Debug, Default)]
struct BodyState {
    /// Nesting of `w:p`; text boxes put paragraphs inside paragraphs.
    paragraph_depth: usize,
    in_run: bool,
    in_text: bool,
    paragraph_text: String,
    paragraph_images: Vec<String>,

    /// Nesting of `w:tbl`; only the outermost table becomes a block.
    table_depth: usize,
    rows: Vec<Vec<String>>,
    current_row: Option<Vec<String>>,
    current_cell: Option<String>,
}

impl BodyState {
    fn start_paragraph(&mut self) {
        self.paragraph_depth += 1;
        if self.paragraph_depth == 1 {
            self.paragraph_text.clear();
            self.paragraph_images.clear();
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.paragraph_depth == 1 {
            self.paragraph_text.push_str(text);
        }
    }

    fn push_blip(&mut self, e: &BytesStart) {
        if self.paragraph_depth == 0 {
            return;
        }
        let embed = e
            .attributes()
            .flatten()
            .find(|attr| local_name(attr.key.as_ref()) == b"embed")
            .map(|attr| String::from_utf8_lossy(&attr.value).to_string());
        if let Some(rel_id) = embed {
            self.paragraph_images.push(rel_id);
        }
    }

    fn end_paragraph(
        &mut self,
        normalizer: &TextNormalizer,
        cell_normalizer: &TextNormalizer,
    ) -> Option<RawBlock> {
        self.paragraph_depth = self.paragraph_depth.saturating_sub(1);
        if self.paragraph_depth > 0 {
            return None;
        }

        let rel_ids = std::mem::take(&mut self.paragraph_images);

        if self.table_depth > 0 {
            let text = cell_normalizer.normalize(&self.paragraph_text);
            if !rel_ids.is_empty() {
                log::debug!("Ignoring {} image(s) inside a table cell", rel_ids.len());
            }
            if let Some(cell) = self.current_cell.as_mut() {
                if !text.is_empty() {
                    if !cell.is_empty() {
                        cell.push(' ');
                    }
                    cell.push_str(&text);
                }
            }
            return None;
        }

        let text = normalizer.normalize(&self.paragraph_text);
        Some(RawBlock::Paragraph { text, rel_ids })
    }

    fn start_table(&mut self) {
        self.table_depth += 1;
        if self.table_depth == 1 {
            self.rows.clear();
        }
    }

    fn start_row(&mut self) {
        if self.table_depth == 1 {
            self.current_row = Some(Vec::new());
        }
    }

    fn start_cell(&mut self) {
        if self.table_depth == 1 {
            self.current_cell = Some(String::new());
        }
    }

    fn end_cell(&mut self) {
        if self.table_depth == 1 {
            if let (Some(cell), Some(row)) = (self.current_cell.take(), self.current_row.as_mut()) {
                row.push(cell);
            }
        }
    }

    fn end_row(&mut self) {
        if self.table_depth == 1 {
            if let Some(row) = self.current_row.take() {
                self.rows.push(row);
            }
        }
    }

    fn end_table(&mut self) -> Option<RawBlock> {
        self.table_depth = self.table_depth.saturating_sub(1);
        if self.table_depth > 0 {
            return None;
        }

        let rows = std::mem::take(&mut self.rows);
        if rows.iter().all(|row| row.iter().all(String::is_empty)) {
            log::debug!("Skipping empty table");
            return None;
        }
        Some(RawBlock::Table { rows })
    }
}

/// Read a text file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Read a binary file from the ZIP archive.
fn read_binary_from_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut data = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut data)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(data)
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Resolve a relationship target against the directory of its source part.
///
/// `("word", "media/a.png")` gives `word/media/a.png`; absolute targets drop
/// the leading slash; `..` segments climb out of `base`.
fn resolve_target(base: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
