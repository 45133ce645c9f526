//! Package-level parts: content types, relationships, presentation, master,
//! layout, theme, and document properties.

use crate::xml::{XmlBuilder, NS_A, NS_CONTENT_TYPES, NS_P, NS_PACKAGE_RELS, NS_R};
use docdeck_core::Result;

pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub(crate) const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub(crate) const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// Id of the first slide in `p:sldIdLst`; ids below 256 are reserved.
const FIRST_SLIDE_ID: usize = 256;

/// A relationship entry: `(id, type, target)`.
pub(crate) type Relationship<'a> = (String, &'a str, String);

/// MIME type for an image file extension.
pub(crate) fn image_content_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => "application/octet-stream",
    }
}

/// `[Content_Types].xml` for `slide_count` slides and the given media extensions.
pub(crate) fn content_types(slide_count: usize, media_extensions: &[String]) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.open("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    xml.empty(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    for extension in media_extensions {
        xml.empty(
            "Default",
            &[
                ("Extension", extension.as_str()),
                ("ContentType", image_content_type(extension)),
            ],
        )?;
    }

    let overrides = [
        ("/ppt/presentation.xml", CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml", CT_THEME),
        ("/docProps/core.xml", CT_CORE),
        ("/docProps/app.xml", CT_APP),
    ];
    for (part, content_type) in overrides {
        xml.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }
    for number in 1..=slide_count {
        let part = format!("/ppt/slides/slide{}.xml", number);
        xml.empty("Override", &[("PartName", part.as_str()), ("ContentType", CT_SLIDE)])?;
    }

    xml.close("Types")?;
    xml.finish()
}

/// A `.rels` part.
pub(crate) fn relationships(entries: &[Relationship]) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.open("Relationships", &[("xmlns", NS_PACKAGE_RELS)])?;
    for (id, rel_type, target) in entries {
        xml.empty(
            "Relationship",
            &[("Id", id.as_str()), ("Type", *rel_type), ("Target", target.as_str())],
        )?;
    }
    xml.close("Relationships")?;
    xml.finish()
}

/// Package root relationships.
pub(crate) fn root_relationships() -> Result<String> {
    relationships(&[
        ("rId1".to_string(), REL_OFFICE_DOCUMENT, "ppt/presentation.xml".to_string()),
        ("rId2".to_string(), REL_CORE_PROPERTIES, "docProps/core.xml".to_string()),
        ("rId3".to_string(), REL_EXTENDED_PROPERTIES, "docProps/app.xml".to_string()),
    ])
}

/// Relationship id of slide `number` (1-based) in the presentation rels.
pub(crate) fn slide_rel_id(number: usize) -> String {
    format!("rId{}", number + 2)
}

/// `ppt/_rels/presentation.xml.rels`
pub(crate) fn presentation_relationships(slide_count: usize) -> Result<String> {
    let mut entries = vec![
        ("rId1".to_string(), REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml".to_string()),
        ("rId2".to_string(), REL_THEME, "theme/theme1.xml".to_string()),
    ];
    for number in 1..=slide_count {
        entries.push((slide_rel_id(number), REL_SLIDE, format!("slides/slide{}.xml", number)));
    }
    relationships(&entries)
}

/// `ppt/presentation.xml`
pub(crate) fn presentation(slide_count: usize, slide_size: (i64, i64)) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.open(
        "p:presentation",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P), ("saveSubsetFonts", "1")],
    )?;

    xml.open("p:sldMasterIdLst", &[])?;
    xml.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    xml.close("p:sldMasterIdLst")?;

    if slide_count > 0 {
        xml.open("p:sldIdLst", &[])?;
        for number in 1..=slide_count {
            let id = (FIRST_SLIDE_ID + number - 1).to_string();
            xml.empty("p:sldId", &[("id", id.as_str()), ("r:id", slide_rel_id(number).as_str())])?;
        }
        xml.close("p:sldIdLst")?;
    }

    let (cx, cy) = slide_size;
    xml.empty("p:sldSz", &[("cx", cx.to_string().as_str()), ("cy", cy.to_string().as_str())])?;
    xml.empty("p:notesSz", &[("cx", "6858000"), ("cy", "9144000")])?;

    xml.close("p:presentation")?;
    xml.finish()
}

/// `docProps/core.xml`
pub(crate) fn core_properties(title: &str) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.open(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    xml.text_element("dc:title", title)?;
    xml.text_element("dc:creator", "docdeck")?;
    xml.close("cp:coreProperties")?;
    xml.finish()
}

/// `docProps/app.xml`
pub(crate) fn app_properties(slide_count: usize) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.open(
        "Properties",
        &[(
            "xmlns",
            "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
        )],
    )?;
    xml.text_element("Application", "docdeck")?;
    xml.text_element("Slides", slide_count.to_string().as_str())?;
    xml.close("Properties")?;
    xml.finish()
}

/// Empty shape tree header shared by master, layout, and slides.
pub(crate) const SHAPE_TREE_HEADER: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
);

/// `ppt/slideMasters/slideMaster1.xml`
pub(crate) fn slide_master() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:sldMaster xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            r#"<p:spTree>{tree}</p:spTree></p:cSld>"#,
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" "#,
            r#"hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            r#"</p:sldMaster>"#,
        ),
        a = NS_A,
        r = NS_R,
        p = NS_P,
        tree = SHAPE_TREE_HEADER,
    )
}

/// `ppt/slideMasters/_rels/slideMaster1.xml.rels`
pub(crate) fn slide_master_relationships() -> Result<String> {
    relationships(&[
        ("rId1".to_string(), REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml".to_string()),
        ("rId2".to_string(), REL_THEME, "../theme/theme1.xml".to_string()),
    ])
}

/// `ppt/slideLayouts/slideLayout1.xml`
pub(crate) fn slide_layout() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:sldLayout xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" type="blank" preserve="1">"#,
            r#"<p:cSld name="Blank"><p:spTree>{tree}</p:spTree></p:cSld>"#,
            r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#,
            r#"</p:sldLayout>"#,
        ),
        a = NS_A,
        r = NS_R,
        p = NS_P,
        tree = SHAPE_TREE_HEADER,
    )
}

/// `ppt/slideLayouts/_rels/slideLayout1.xml.rels`
pub(crate) fn slide_layout_relationships() -> Result<String> {
    relationships(&[(
        "rId1".to_string(),
        REL_SLIDE_MASTER,
        "../slideMasters/slideMaster1.xml".to_string(),
    )])
}

/// `ppt/theme/theme1.xml`
pub(crate) fn theme() -> String {
    let accents = ["4F81BD", "C0504D", "9BBB59", "8064A2", "4BACC6", "F79646"];
    let accent_xml: String = accents
        .iter()
        .enumerate()
        .map(|(i, color)| {
            format!(
                r#"<a:accent{n}><a:srgbClr val="{c}"/></a:accent{n}>"#,
                n = i + 1,
                c = color
            )
        })
        .collect();

    let solid_fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let fills = solid_fill.repeat(3);
    let lines: String = [9525, 25400, 38100]
        .iter()
        .map(|w| format!(r#"<a:ln w="{}">{}</a:ln>"#, w, solid_fill))
        .collect();
    let effects = "<a:effectStyle><a:effectLst/></a:effectStyle>".repeat(3);
    let font = r#"<a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/>"#;

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<a:theme xmlns:a="{a}" name="docdeck"><a:themeElements>"#,
            r#"<a:clrScheme name="docdeck">"#,
            r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
            r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
            r#"<a:dk2><a:srgbClr val="1F497D"/></a:dk2>"#,
            r#"<a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#,
            r#"{accents}"#,
            r#"<a:hlink><a:srgbClr val="0000FF"/></a:hlink>"#,
            r#"<a:folHlink><a:srgbClr val="800080"/></a:folHlink>"#,
            r#"</a:clrScheme>"#,
            r#"<a:fontScheme name="docdeck"><a:majorFont>{font}</a:majorFont>"#,
            r#"<a:minorFont>{font}</a:minorFont></a:fontScheme>"#,
            r#"<a:fmtScheme name="docdeck">"#,
            r#"<a:fillStyleLst>{fills}</a:fillStyleLst>"#,
            r#"<a:lnStyleLst>{lines}</a:lnStyleLst>"#,
            r#"<a:effectStyleLst>{effects}</a:effectStyleLst>"#,
            r#"<a:bgFillStyleLst>{fills}</a:bgFillStyleLst>"#,
            r#"</a:fmtScheme></a:themeElements>"#,
            r#"<a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#,
        ),
        a = NS_A,
        accents = accent_xml,
        font = font,
        fills = fills,
        lines = lines,
        effects = effects,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type("PNG"), "image/png");
        assert_eq!(image_content_type("jpeg"), "image/jpeg");
        assert_eq!(image_content_type("jpg"), "image/jpeg");
        assert_eq!(image_content_type("xyz"), "application/octet-stream");
    }

    #[test]
    fn test_content_types_lists_slides_and_media() {
        let xml = content_types(2, &["png".to_string()]).unwrap();
        assert!(xml.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        assert!(xml.contains(r#"PartName="/ppt/slides/slide1.xml""#));
        assert!(xml.contains(r#"PartName="/ppt/slides/slide2.xml""#));
        assert!(!xml.contains("slide3.xml"));
    }

    #[test]
    fn test_presentation_slide_ids() {
        let xml = presentation(2, (9_144_000, 6_858_000)).unwrap();
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId3"/>"#));
        assert!(xml.contains(r#"<p:sldId id="257" r:id="rId4"/>"#));
        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="6858000"/>"#));

        let empty = presentation(0, (1, 1)).unwrap();
        assert!(!empty.contains("sldIdLst"));
    }

    #[test]
    fn test_presentation_relationships() {
        let xml = presentation_relationships(1).unwrap();
        assert!(xml.contains(r#"Id="rId3""#));
        assert!(xml.contains(r#"Target="slides/slide1.xml""#));
        assert!(xml.contains(r#"Target="theme/theme1.xml""#));
    }

    #[test]
    fn test_static_parts_are_complete() {
        let theme = theme();
        assert!(theme.contains("<a:accent6>"));
        assert_eq!(theme.matches("<a:ln ").count(), 3);
        assert!(slide_master().contains(SHAPE_TREE_HEADER));
        assert!(slide_layout().contains(r#"type="blank""#));
    }
}
