use crate::text::TextFrame;
use crate::Result;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

/// Slide layouts provided by the built-in template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideLayout {
    /// Centered title with a subtitle below it.
    Title,
    /// Title bar with a body placeholder.
    TitleAndContent,
}

impl SlideLayout {
    /// 1-based index of the layout part (`slideLayoutN.xml`).
    pub(crate) fn part_index(&self) -> usize {
        match self {
            SlideLayout::Title => 1,
            SlideLayout::TitleAndContent => 2,
        }
    }
}

/// A slide with a title placeholder and a body placeholder.
///
/// For [`SlideLayout::Title`] the body placeholder is the subtitle.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    layout: SlideLayout,
    title: TextFrame,
    body: TextFrame,
}

impl Slide {
    pub fn new(layout: SlideLayout) -> Self {
        Self {
            layout,
            title: TextFrame::new(),
            body: TextFrame::new(),
        }
    }

    pub fn layout(&self) -> SlideLayout {
        self.layout
    }

    pub fn title(&self) -> &TextFrame {
        &self.title
    }

    pub fn title_mut(&mut self) -> &mut TextFrame {
        &mut self.title
    }

    pub fn body(&self) -> &TextFrame {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut TextFrame {
        &mut self.body
    }

    pub fn set_title(&mut self, text: &str) -> &mut TextFrame {
        self.title.set_text(text)
    }

    pub fn set_body(&mut self, text: &str) -> &mut TextFrame {
        self.body.set_text(text)
    }
}

/// An in-memory deck. Build it, then serialize it once.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    slides: Vec<Slide>,
    /// Document title stored in the core properties part
    title: Option<String>,
    created: Option<DateTime<Utc>>,
    /// Slide width in EMUs (914400 EMU = 1 inch)
    slide_width: i64,
    slide_height: i64,
}

impl Presentation {
    /// Create an empty 4:3 (10" x 7.5") presentation.
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            title: None,
            created: None,
            slide_width: 9144000,
            slide_height: 6858000,
        }
    }

    pub fn add_slide(&mut self, layout: SlideLayout) -> &mut Slide {
        self.slides.push(Slide::new(layout));
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Pin the creation timestamp written to the core properties. Defaults to
    /// the time of serialization.
    pub fn set_created(&mut self, created: DateTime<Utc>) {
        self.created = Some(created);
    }

    pub(crate) fn created(&self) -> DateTime<Utc> {
        self.created.unwrap_or_else(Utc::now)
    }

    pub fn slide_width(&self) -> i64 {
        self.slide_width
    }

    pub fn slide_height(&self) -> i64 {
        self.slide_height
    }

    /// Write the package to `writer` and hand the writer back.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        crate::package::write_package(self, writer)
    }

    /// Serialize the package into a byte buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let cursor = self.write_to(Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Write the package to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = self.write_to(BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_presentation() {
        let pres = Presentation::new();
        assert_eq!(pres.slide_count(), 0);
        assert_eq!(pres.slide_width(), 9144000);
        assert_eq!(pres.slide_height(), 6858000);
    }

    #[test]
    fn test_add_slides_keeps_order() {
        let mut pres = Presentation::new();
        pres.add_slide(SlideLayout::Title).set_title("Deck");
        pres.add_slide(SlideLayout::TitleAndContent)
            .set_title("First");
        pres.add_slide(SlideLayout::TitleAndContent)
            .set_title("Second");

        let titles: Vec<String> = pres.slides().iter().map(|s| s.title().text()).collect();
        assert_eq!(titles, vec!["Deck", "First", "Second"]);
        assert_eq!(pres.slides()[0].layout(), SlideLayout::Title);
        assert_eq!(pres.slides()[0].layout().part_index(), 1);
        assert_eq!(pres.slides()[2].layout().part_index(), 2);
    }
}
