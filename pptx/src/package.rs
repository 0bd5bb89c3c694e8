//! Serializes a [`Presentation`] as a zipped OPC package.
use crate::presentation::Presentation;
use crate::template::{self, rel_type};
use crate::xml::{self, Relationship};
use crate::Result;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Relationship ids of `ppt/presentation.xml` taken by the fixed parts.
/// Slides are numbered after them.
const FIXED_PRESENTATION_RELS: usize = 5;

struct PackageWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> PackageWriter<W> {
    fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    fn part(&mut self, name: &str, content: &str) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn finish(self) -> Result<W> {
        Ok(self.zip.finish()?)
    }
}

pub(crate) fn write_package<W: Write + Seek>(pres: &Presentation, writer: W) -> Result<W> {
    let mut package = PackageWriter::new(writer);
    let slide_count = pres.slide_count();

    // [Content_Types].xml goes first so readers that stream the archive find it.
    package.part(
        "[Content_Types].xml",
        &xml::content_types_xml(slide_count, template::LAYOUTS.len())?,
    )?;

    package.part(
        "_rels/.rels",
        &xml::relationships_xml(&[
            Relationship::new("rId1", rel_type::OFFICE_DOCUMENT, "ppt/presentation.xml"),
            Relationship::new("rId2", rel_type::CORE_PROPERTIES, "docProps/core.xml"),
            Relationship::new("rId3", rel_type::EXTENDED_PROPERTIES, "docProps/app.xml"),
        ])?,
    )?;
    package.part("docProps/core.xml", &xml::core_props_xml(pres)?)?;
    package.part("docProps/app.xml", &xml::app_props_xml(pres)?)?;

    let slide_rel_ids: Vec<String> = (0..slide_count)
        .map(|index| format!("rId{}", FIXED_PRESENTATION_RELS + 1 + index))
        .collect();

    let mut presentation_rels = vec![
        Relationship::new("rId1", rel_type::SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
        Relationship::new("rId2", rel_type::THEME, "theme/theme1.xml"),
        Relationship::new("rId3", rel_type::PRES_PROPS, "presProps.xml"),
        Relationship::new("rId4", rel_type::VIEW_PROPS, "viewProps.xml"),
        Relationship::new("rId5", rel_type::TABLE_STYLES, "tableStyles.xml"),
    ];
    for (index, rel_id) in slide_rel_ids.iter().enumerate() {
        presentation_rels.push(Relationship::new(
            rel_id.clone(),
            rel_type::SLIDE,
            format!("slides/slide{}.xml", index + 1),
        ));
    }
    package.part("ppt/presentation.xml", &xml::presentation_xml(pres, &slide_rel_ids)?)?;
    package.part(
        "ppt/_rels/presentation.xml.rels",
        &xml::relationships_xml(&presentation_rels)?,
    )?;

    // Master, layouts and theme
    let mut master_rels: Vec<Relationship<'_>> = (1..=template::LAYOUTS.len())
        .map(|index| {
            Relationship::new(
                format!("rId{index}"),
                rel_type::SLIDE_LAYOUT,
                format!("../slideLayouts/slideLayout{index}.xml"),
            )
        })
        .collect();
    master_rels.push(Relationship::new(
        format!("rId{}", template::LAYOUTS.len() + 1),
        rel_type::THEME,
        "../theme/theme1.xml",
    ));
    package.part("ppt/slideMasters/slideMaster1.xml", template::SLIDE_MASTER_XML)?;
    package.part(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &xml::relationships_xml(&master_rels)?,
    )?;

    let layout_rels = xml::relationships_xml(&[Relationship::new(
        "rId1",
        rel_type::SLIDE_MASTER,
        "../slideMasters/slideMaster1.xml",
    )])?;
    for (index, layout) in template::LAYOUTS.iter().enumerate() {
        let number = index + 1;
        package.part(&format!("ppt/slideLayouts/slideLayout{number}.xml"), layout)?;
        package.part(
            &format!("ppt/slideLayouts/_rels/slideLayout{number}.xml.rels"),
            &layout_rels,
        )?;
    }

    package.part("ppt/theme/theme1.xml", template::THEME_XML)?;
    package.part("ppt/presProps.xml", template::PRES_PROPS_XML)?;
    package.part("ppt/viewProps.xml", template::VIEW_PROPS_XML)?;
    package.part("ppt/tableStyles.xml", template::TABLE_STYLES_XML)?;

    for (index, slide) in pres.slides().iter().enumerate() {
        let number = index + 1;
        package.part(&format!("ppt/slides/slide{number}.xml"), &xml::slide_xml(slide)?)?;
        package.part(
            &format!("ppt/slides/_rels/slide{number}.xml.rels"),
            &xml::relationships_xml(&[Relationship::new(
                "rId1",
                rel_type::SLIDE_LAYOUT,
                format!("../slideLayouts/slideLayout{}.xml", slide.layout().part_index()),
            )])?,
        )?;
    }

    package.finish()
}
