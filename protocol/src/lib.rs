//! Progress events emitted while a deck is generated.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TaskStarted {
        id: Uuid,
        title: String,
        topics: usize,
    },
    /// The model answered; `chars` is the length of the generated text.
    ContentReceived { chars: usize },
    Segmented { fragments: usize },
    /// A marker fragment did not have the "Slide N: heading" shape and was left out.
    FragmentSkipped { index: usize },
    DeckAssembled { slides: usize },
    DeckSaved { path: PathBuf },
    Error { message: String },
    TaskComplete { id: Uuid },
}

impl Event {
    /// Whether no further events follow for this task.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Error { .. } | Event::TaskComplete { .. })
    }

    /// One-line status text for display.
    pub fn describe(&self) -> String {
        match self {
            Event::TaskStarted { title, topics, .. } => {
                format!("Generating \"{title}\" ({topics} topics)...")
            }
            Event::ContentReceived { chars } => format!("Received {chars} characters of content"),
            Event::Segmented { fragments } => format!("Split content into {fragments} fragments"),
            Event::FragmentSkipped { index } => {
                format!("Skipped fragment {index}: no \"Slide N: heading\" line")
            }
            Event::DeckAssembled { slides } => format!("Assembled {slides} slides"),
            Event::DeckSaved { path } => format!("Saved {}", path.display()),
            Event::Error { message } if message.starts_with("Error") => message.clone(),
            Event::Error { message } => format!("Error: {message}"),
            Event::TaskComplete { .. } => "Done".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_events() {
        assert!(Event::Error { message: "x".into() }.is_terminal());
        assert!(Event::TaskComplete { id: Uuid::new_v4() }.is_terminal());
        assert!(!Event::Segmented { fragments: 2 }.is_terminal());
    }

    #[test]
    fn error_prefix_is_not_doubled() {
        let sentinel = Event::Error {
            message: "Error: Missing API key.".into(),
        };
        assert_eq!(sentinel.describe(), "Error: Missing API key.");
        let plain = Event::Error {
            message: "Please enter at least one topic.".into(),
        };
        assert_eq!(plain.describe(), "Error: Please enter at least one topic.");
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(Event::DeckAssembled { slides: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "deck_assembled", "slides": 3}));
    }
}
