/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub(crate) fn as_ooxml(&self) -> &'static str {
        match self {
            Alignment::Left => "l",
            Alignment::Center => "ctr",
            Alignment::Right => "r",
            Alignment::Justify => "just",
        }
    }
}

/// A single paragraph holding one text run.
///
/// Unset properties are inherited from the slide layout and master.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    text: String,
    level: u8,
    bullet: bool,
    alignment: Option<Alignment>,
    font_size: Option<f64>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: 0,
            bullet: true,
            alignment: None,
            font_size: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Indentation level, clamped to the 0..=8 range PresentationML allows.
    pub fn set_level(&mut self, level: u8) -> &mut Self {
        self.level = level.min(8);
        self
    }

    pub fn has_bullet(&self) -> bool {
        self.bullet
    }

    /// `false` suppresses the bullet the layout would otherwise draw.
    pub fn set_bullet(&mut self, bullet: bool) -> &mut Self {
        self.bullet = bullet;
        self
    }

    pub fn alignment(&self) -> Option<Alignment> {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> &mut Self {
        self.alignment = Some(alignment);
        self
    }

    /// Font size in points.
    pub fn font_size(&self) -> Option<f64> {
        self.font_size
    }

    pub fn set_font_size(&mut self, points: f64) -> &mut Self {
        self.font_size = Some(points);
        self
    }

    /// Font size in hundredths of a point, as stored in `a:rPr/@sz`.
    pub(crate) fn font_size_centipoints(&self) -> Option<u32> {
        self.font_size
            .filter(|pt| pt.is_finite() && *pt > 0.0)
            .map(|pt| (pt * 100.0).round() as u32)
    }
}

/// The text content of a placeholder shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFrame {
    paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the frame content. Each line of `text` becomes a paragraph.
    pub fn set_text(&mut self, text: &str) -> &mut Self {
        self.paragraphs = text
            .split('\n')
            .map(|line| Paragraph::new(line.strip_suffix('\r').unwrap_or(line)))
            .collect();
        self
    }

    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn add_paragraph(&mut self, text: impl Into<String>) -> &mut Paragraph {
        self.paragraphs.push(Paragraph::new(text));
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.paragraphs.iter_mut()
    }

    /// Apply a font size (points) to every paragraph.
    pub fn set_font_size(&mut self, points: f64) -> &mut Self {
        for paragraph in &mut self.paragraphs {
            paragraph.set_font_size(points);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(|p| p.text.is_empty())
    }
}
