use serde::{Deserialize, Serialize};
use std::fmt;

/// Values prefilled in the input forms.
pub const DEFAULT_TITLE: &str = "Gen AI";
pub const DEFAULT_TOPICS: &str = "Introduction to GenAI\nApplications of GenAI";

/// Title and topics collected from one form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationRequest {
    pub title: String,
    pub topics: Vec<String>,
}

impl PresentationRequest {
    pub fn new(title: impl Into<String>, topics: Vec<String>) -> Self {
        Self {
            title: title.into(),
            topics,
        }
    }

    /// Build a request from raw form fields. Topics are entered one per line;
    /// lines are trimmed and blank ones dropped.
    pub fn from_form(title: &str, topics_input: &str) -> Self {
        let topics = topics_input
            .lines()
            .map(str::trim)
            .filter(|topic| !topic.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            title: title.to_string(),
            topics,
        }
    }

    pub fn has_topics(&self) -> bool {
        !self.topics.is_empty()
    }
}

/// How the generated text is cut into slide fragments.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum SegmentMode {
    /// Cut the text into chunks of at most `max_chunk_chars` characters and
    /// repeat the chunk sequence for every topic.
    #[default]
    FixedLength,
    /// Split the text on "Slide N: heading" markers, one slide per marker.
    Markers,
}

impl SegmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentMode::FixedLength => "fixed-length",
            SegmentMode::Markers => "markers",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SegmentMode::FixedLength => SegmentMode::Markers,
            SegmentMode::Markers => SegmentMode::FixedLength,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "fixed-length" | "fixed" => Some(SegmentMode::FixedLength),
            "markers" | "marker" => Some(SegmentMode::Markers),
            _ => None,
        }
    }
}

impl fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
