//! XML generation for the parts that depend on deck content.
use crate::presentation::{Presentation, Slide, SlideLayout};
use crate::template::{content_type, ns, XML_DECLARATION};
use crate::text::{Paragraph, TextFrame};
use crate::Result;
use std::fmt::Write as FmtWrite;

/// Escape XML special characters and drop characters XML 1.0 cannot carry.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_control() || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

/// A relationship entry: id, type URI, target.
pub(crate) struct Relationship<'a> {
    pub id: String,
    pub rel_type: &'a str,
    pub target: String,
}

impl<'a> Relationship<'a> {
    pub fn new(id: impl Into<String>, rel_type: &'a str, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rel_type,
            target: target.into(),
        }
    }
}

pub(crate) fn relationships_xml(rels: &[Relationship<'_>]) -> Result<String> {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(XML_DECLARATION);
    write!(xml, r#"<Relationships xmlns="{}">"#, ns::PACKAGE_RELATIONSHIPS)?;
    for rel in rels {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            rel.id,
            rel.rel_type,
            escape_xml(&rel.target)
        )?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

/// `[Content_Types].xml` with an override for every part in the package.
pub(crate) fn content_types_xml(slide_count: usize, layout_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(2048 + slide_count * 160);
    xml.push_str(XML_DECLARATION);
    write!(xml, r#"<Types xmlns="{}">"#, ns::CONTENT_TYPES)?;
    write!(
        xml,
        r#"<Default Extension="rels" ContentType="{}"/>"#,
        content_type::RELATIONSHIPS
    )?;
    write!(xml, r#"<Default Extension="xml" ContentType="{}"/>"#, content_type::XML)?;

    let mut part = |name: &str, ct: &str| -> Result<()> {
        write!(xml, r#"<Override PartName="{name}" ContentType="{ct}"/>"#)?;
        Ok(())
    };

    part("/ppt/presentation.xml", content_type::PRESENTATION)?;
    part("/ppt/slideMasters/slideMaster1.xml", content_type::SLIDE_MASTER)?;
    for index in 1..=layout_count {
        part(
            &format!("/ppt/slideLayouts/slideLayout{index}.xml"),
            content_type::SLIDE_LAYOUT,
        )?;
    }
    for index in 1..=slide_count {
        part(&format!("/ppt/slides/slide{index}.xml"), content_type::SLIDE)?;
    }
    part("/ppt/theme/theme1.xml", content_type::THEME)?;
    part("/ppt/presProps.xml", content_type::PRES_PROPS)?;
    part("/ppt/viewProps.xml", content_type::VIEW_PROPS)?;
    part("/ppt/tableStyles.xml", content_type::TABLE_STYLES)?;
    part("/docProps/core.xml", content_type::CORE_PROPERTIES)?;
    part("/docProps/app.xml", content_type::EXTENDED_PROPERTIES)?;

    xml.push_str("</Types>");
    Ok(xml)
}

/// `ppt/presentation.xml`. `slide_rel_ids` holds the relationship id of each
/// slide in deck order.
pub(crate) fn presentation_xml(pres: &Presentation, slide_rel_ids: &[String]) -> Result<String> {
    let mut xml = String::with_capacity(1024 + slide_rel_ids.len() * 48);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        ns::DRAWINGML,
        ns::RELATIONSHIPS,
        ns::PRESENTATIONML
    )?;

    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);

    if !slide_rel_ids.is_empty() {
        xml.push_str("<p:sldIdLst>");
        for (index, rel_id) in slide_rel_ids.iter().enumerate() {
            // Slide ids start at 256.
            write!(xml, r#"<p:sldId id="{}" r:id="{rel_id}"/>"#, 256 + index)?;
        }
        xml.push_str("</p:sldIdLst>");
    }

    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}" type="screen4x3"/>"#,
        pres.slide_width(),
        pres.slide_height()
    )?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    Ok(xml)
}

/// `ppt/slides/slideN.xml`
pub(crate) fn slide_xml(slide: &Slide) -> Result<String> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        ns::DRAWINGML,
        ns::RELATIONSHIPS,
        ns::PRESENTATIONML
    )?;
    xml.push_str("<p:cSld><p:spTree>");

    // Group shape properties (required)
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str("<p:grpSpPr><a:xfrm>");
    xml.push_str(r#"<a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/>"#);
    xml.push_str("</a:xfrm></p:grpSpPr>");

    let (title_ph, body_ph, body_name) = match slide.layout() {
        SlideLayout::Title => (r#"<p:ph type="ctrTitle"/>"#, r#"<p:ph type="subTitle" idx="1"/>"#, "Subtitle 2"),
        SlideLayout::TitleAndContent => (r#"<p:ph type="title"/>"#, r#"<p:ph idx="1"/>"#, "Content Placeholder 2"),
    };
    write_placeholder(&mut xml, 2, "Title 1", title_ph, slide.title())?;
    write_placeholder(&mut xml, 3, body_name, body_ph, slide.body())?;

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    Ok(xml)
}

fn write_placeholder(
    xml: &mut String,
    shape_id: u32,
    name: &str,
    placeholder: &str,
    frame: &TextFrame,
) -> Result<()> {
    xml.push_str("<p:sp><p:nvSpPr>");
    write!(xml, r#"<p:cNvPr id="{shape_id}" name="{name}"/>"#)?;
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
    write!(xml, "<p:nvPr>{placeholder}</p:nvPr>")?;
    xml.push_str("</p:nvSpPr><p:spPr/>");

    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
    if frame.paragraphs().is_empty() {
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    }
    for paragraph in frame.paragraphs() {
        write_paragraph(xml, paragraph)?;
    }
    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) -> Result<()> {
    xml.push_str("<a:p>");

    let mut attrs = String::new();
    if paragraph.level() > 0 {
        write!(attrs, r#" lvl="{}""#, paragraph.level())?;
    }
    if let Some(alignment) = paragraph.alignment() {
        write!(attrs, r#" algn="{}""#, alignment.as_ooxml())?;
    }
    if !paragraph.has_bullet() {
        write!(xml, "<a:pPr{attrs}><a:buNone/></a:pPr>")?;
    } else if !attrs.is_empty() {
        write!(xml, "<a:pPr{attrs}/>")?;
    }

    let size = match paragraph.font_size_centipoints() {
        Some(sz) => format!(r#" sz="{sz}""#),
        None => String::new(),
    };
    if paragraph.text().is_empty() {
        write!(xml, r#"<a:endParaRPr lang="en-US"{size} dirty="0"/>"#)?;
    } else {
        write!(
            xml,
            r#"<a:r><a:rPr lang="en-US"{size} dirty="0"/><a:t>{}</a:t></a:r>"#,
            escape_xml(paragraph.text())
        )?;
    }

    xml.push_str("</a:p>");
    Ok(())
}

/// `docProps/core.xml`
pub(crate) fn core_props_xml(pres: &Presentation) -> Result<String> {
    let timestamp = pres.created().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECLARATION);
    xml.push_str(concat!(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));
    if let Some(title) = pres.title() {
        write!(xml, "<dc:title>{}</dc:title>", escape_xml(title))?;
    }
    xml.push_str("<dc:creator>slidegen</dc:creator>");
    xml.push_str("<cp:lastModifiedBy>slidegen</cp:lastModifiedBy>");
    xml.push_str("<cp:revision>1</cp:revision>");
    write!(xml, r#"<dcterms:created xsi:type="dcterms:W3CDTF">{timestamp}</dcterms:created>"#)?;
    write!(xml, r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{timestamp}</dcterms:modified>"#)?;
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

/// `docProps/app.xml`
pub(crate) fn app_props_xml(pres: &Presentation) -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECLARATION);
    xml.push_str(concat!(
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
        r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#
    ));
    xml.push_str("<Application>slidegen</Application>");
    xml.push_str("<PresentationFormat>On-screen Show (4:3)</PresentationFormat>");
    write!(xml, "<Slides>{}</Slides>", pres.slide_count())?;
    xml.push_str("</Properties>");
    Ok(xml)
}
