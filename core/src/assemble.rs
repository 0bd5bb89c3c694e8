use crate::segment::{parse_fragment, ParsedFragment};
use slidegen_common::PresentationRequest;
use slidegen_pptx::{Alignment, Presentation, SlideLayout, TextFrame};

pub const DEFAULT_SUBTITLE: &str = "Generated by AI";

/// Fixed formatting applied to every generated deck.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckStyle {
    pub subtitle: String,
    pub cover_title_size: f64,
    pub cover_subtitle_size: f64,
    pub slide_title_size: f64,
    pub slide_body_size: f64,
    /// Outline level of paragraphs on the second and later chunk of a topic.
    pub continuation_level: u8,
}

impl Default for DeckStyle {
    fn default() -> Self {
        Self {
            subtitle: DEFAULT_SUBTITLE.to_string(),
            cover_title_size: 32.0,
            cover_subtitle_size: 20.0,
            slide_title_size: 24.0,
            slide_body_size: 18.0,
            continuation_level: 3,
        }
    }
}

/// Builds presentations from segmented text.
#[derive(Debug, Clone, Default)]
pub struct DeckAssembler {
    style: DeckStyle,
}

impl DeckAssembler {
    pub fn new(style: DeckStyle) -> Self {
        Self { style }
    }

    /// A new deck holding only the title slide.
    fn cover(&self, title: &str) -> Presentation {
        let mut pres = Presentation::new();
        pres.set_title(title);

        let slide = pres.add_slide(SlideLayout::Title);
        slide.set_title(title).set_font_size(self.style.cover_title_size);
        slide
            .set_body(&self.style.subtitle)
            .set_font_size(self.style.cover_subtitle_size);
        pres
    }

    fn content_slide(&self, pres: &mut Presentation, title: &str, body: &str, level: u8) {
        let slide = pres.add_slide(SlideLayout::TitleAndContent);
        slide.set_title(title).set_font_size(self.style.slide_title_size);
        self.format_body(slide.set_body(body), level);
    }

    fn format_body(&self, frame: &mut TextFrame, level: u8) {
        for paragraph in frame.paragraphs_mut() {
            paragraph
                .set_level(level)
                .set_bullet(false)
                .set_alignment(Alignment::Left)
                .set_font_size(self.style.slide_body_size);
        }
    }

    /// One content slide per chunk, repeated for every topic.
    pub fn assemble_fixed_length<S: AsRef<str>>(
        &self,
        request: &PresentationRequest,
        chunks: &[S],
    ) -> Presentation {
        let mut pres = self.cover(&request.title);
        for topic in &request.topics {
            for (index, chunk) in chunks.iter().enumerate() {
                let level = if index == 0 {
                    0
                } else {
                    self.style.continuation_level
                };
                self.content_slide(&mut pres, topic, chunk.as_ref(), level);
            }
        }
        tracing::debug!(slides = pres.slide_count(), "assembled fixed-length deck");
        pres
    }

    /// One content slide per parsable marker fragment.
    ///
    /// Fragments without the "Slide N: heading" shape are left out; `on_skip`
    /// receives the index of each one.
    pub fn assemble_markers<S, F>(&self, title: &str, fragments: &[S], mut on_skip: F) -> Presentation
    where
        S: AsRef<str>,
        F: FnMut(usize),
    {
        let mut pres = self.cover(title);
        for (index, fragment) in fragments.iter().enumerate() {
            match parse_fragment(fragment.as_ref()) {
                Some(parsed) => self.marker_slide(&mut pres, &parsed),
                None => {
                    tracing::debug!(index, "skipping fragment without slide header");
                    on_skip(index);
                }
            }
        }
        tracing::debug!(slides = pres.slide_count(), "assembled marker deck");
        pres
    }

    fn marker_slide(&self, pres: &mut Presentation, parsed: &ParsedFragment) {
        self.content_slide(pres, &parsed.slide_title(), &parsed.points, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{remove_marker_formatting, split_content, split_into_slides};

    fn request(topics: &[&str]) -> PresentationRequest {
        PresentationRequest::new("Gen AI", topics.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn cover_slide_comes_first() {
        let pres = DeckAssembler::default().assemble_fixed_length(&request(&["A"]), &["body"]);
        let cover = &pres.slides()[0];
        assert_eq!(cover.layout(), SlideLayout::Title);
        assert_eq!(cover.title().text(), "Gen AI");
        assert_eq!(cover.body().text(), DEFAULT_SUBTITLE);
        assert_eq!(cover.title().paragraphs()[0].font_size(), Some(32.0));
        assert_eq!(cover.body().paragraphs()[0].font_size(), Some(20.0));
        assert_eq!(pres.title(), Some("Gen AI"));
    }

    #[test]
    fn every_topic_gets_every_chunk() {
        let blob = "word ".repeat(500);
        let chunks = split_content(&blob, 900);
        assert!(chunks.len() > 1);

        let pres = DeckAssembler::default().assemble_fixed_length(&request(&["A", "B"]), &chunks);
        assert_eq!(pres.slide_count(), 1 + chunks.len() * 2);

        let slides = &pres.slides()[1..];
        assert!(slides[..chunks.len()].iter().all(|s| s.title().text() == "A"));
        assert!(slides[chunks.len()..].iter().all(|s| s.title().text() == "B"));
        assert_eq!(slides[0].body().text(), chunks[0]);
        assert_eq!(slides[chunks.len()].body().text(), chunks[0]);
    }

    #[test]
    fn continuation_chunks_are_indented() {
        let pres =
            DeckAssembler::default().assemble_fixed_length(&request(&["A"]), &["first", "second"]);
        let first = &pres.slides()[1].body().paragraphs()[0];
        let second = &pres.slides()[2].body().paragraphs()[0];

        assert_eq!(first.level(), 0);
        assert_eq!(second.level(), 3);
        for paragraph in [first, second] {
            assert!(!paragraph.has_bullet());
            assert_eq!(paragraph.alignment(), Some(Alignment::Left));
            assert_eq!(paragraph.font_size(), Some(18.0));
        }
        assert_eq!(
            pres.slides()[1].title().paragraphs()[0].font_size(),
            Some(24.0)
        );
    }

    #[test]
    fn marker_slides_use_numbered_titles() {
        let text = "**Slide 1: Intro**\n* What\n* Why\n\n**Slide 2: Uses**\n* Chat\n\n";
        let fragments = remove_marker_formatting(&split_into_slides(text));
        let mut skipped = Vec::new();
        let pres =
            DeckAssembler::default().assemble_markers("Gen AI", &fragments, |i| skipped.push(i));

        assert!(skipped.is_empty());
        assert_eq!(pres.slide_count(), 3);
        assert_eq!(pres.slides()[1].title().text(), "1.Intro");
        assert_eq!(pres.slides()[1].body().text(), "What, Why");
        assert_eq!(pres.slides()[2].title().text(), "2.Uses");
    }

    #[test]
    fn malformed_fragments_are_skipped() {
        let fragments = ["Slide 1: Intro\n* a", "Slide 2: no body", "Slide 3: End\n* b"];
        let mut skipped = Vec::new();
        let pres =
            DeckAssembler::default().assemble_markers("Deck", &fragments, |i| skipped.push(i));

        assert_eq!(skipped, vec![1]);
        assert_eq!(pres.slide_count(), 3);
        assert_eq!(pres.slides()[2].title().text(), "3.End");
    }

    #[test]
    fn custom_subtitle() {
        let style = DeckStyle {
            subtitle: "Draft".to_string(),
            ..DeckStyle::default()
        };
        let pres = DeckAssembler::new(style).assemble_markers("Deck", &[] as &[&str], |_| {});
        assert_eq!(pres.slide_count(), 1);
        assert_eq!(pres.slides()[0].body().text(), "Draft");
    }
}
