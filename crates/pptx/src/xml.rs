//! Small wrapper over the quick-xml writer for emitting OOXML parts.

use docdeck_core::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub(crate) const NS_PACKAGE_RELS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
pub(crate) const NS_CONTENT_TYPES: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";

/// Builds one XML part in memory.
pub(crate) struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

fn xml_error(e: quick_xml::Error) -> Error {
    Error::XmlError(format!("Failed to write XML: {}", e))
}

impl XmlBuilder {
    /// Start a standalone UTF-8 document.
    pub(crate) fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_error)?;
        Ok(Self { writer })
    }

    pub(crate) fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(start)).map_err(xml_error)
    }

    pub(crate) fn close(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    pub(crate) fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(start)).map_err(xml_error)
    }

    /// Write escaped character data.
    pub(crate) fn text(&mut self, text: &str) -> Result<()> {
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_error)
    }

    /// Append already-serialized markup as is.
    pub(crate) fn raw(&mut self, markup: &str) {
        self.writer.get_mut().extend_from_slice(markup.as_bytes());
    }

    /// `<name>text</name>`
    pub(crate) fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.open(name, &[])?;
        self.text(text)?;
        self.close(name)
    }

    pub(crate) fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| Error::XmlError(format!("Generated XML is not UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_escapes_text_and_attributes() {
        let mut xml = XmlBuilder::new().unwrap();
        xml.open("root", &[("name", "a \"b\" & c")]).unwrap();
        xml.text_element("t", "1 < 2 & 3 > 2").unwrap();
        xml.empty("leaf", &[]).unwrap();
        xml.close("root").unwrap();
        let out = xml.finish().unwrap();

        assert!(out.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(out.contains(r#"<root name="a &quot;b&quot; &amp; c">"#));
        assert!(out.contains("<t>1 &lt; 2 &amp; 3 &gt; 2</t>"));
        assert!(out.ends_with("<leaf/></root>"));
    }
}
