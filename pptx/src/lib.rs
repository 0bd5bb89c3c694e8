//! Minimal PresentationML (`.pptx`) writer.
//!
//! Builds decks from a fixed template (one slide master, a "Title Slide" and a
//! "Title and Content" layout) and serializes them as a zipped OPC package,
//! either to a file or to an in-memory buffer.

mod package;
mod presentation;
mod template;
mod text;
mod xml;

pub use presentation::{Presentation, Slide, SlideLayout};
pub use text::{Alignment, Paragraph, TextFrame};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML write error: {0}")]
    Xml(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
