//! Generation pipeline: prompt the model, cut the text into fragments and
//! assemble the deck.

pub mod assemble;
pub mod client;
pub mod error;
pub mod pipeline;
pub mod requester;
pub mod segment;

pub use assemble::{DeckAssembler, DeckStyle};
pub use client::{GeminiAdapter, ModelClient, StubClient};
pub use error::{Result, SlideError};
pub use pipeline::{segment_text, GeneratedDeck, Generator};
pub use requester::{ContentRequester, GeneratedText};
