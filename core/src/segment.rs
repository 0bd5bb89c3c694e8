//! Cutting generated text into slide-sized fragments.
//!
//! Two strategies are provided: [`split_content`] cuts at whitespace near a
//! character limit, and [`split_into_slides`] follows "Slide N:" markers
//! emitted by the model.
use regex::Regex;
use std::sync::OnceLock;

const BOLD: &str = "**";

#[allow(clippy::expect_used)]
fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"Slide \d+:").expect("marker pattern compiles"))
}

#[allow(clippy::expect_used)]
fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"^Slide (\d+): (.+)").expect("header pattern compiles"))
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Each cut lands on the last whitespace character before the limit, or
/// exactly at the limit when the window holds no whitespace. The remainder is
/// trimmed before the next cut. A head that is only whitespace (leading
/// blanks before the first cut) is skipped rather than becoming a blank
/// slide. The last chunk is always emitted, even when empty, so the result is
/// never empty.
pub fn split_content(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_chars {
        let limit = rest
            .char_indices()
            .nth(max_chars)
            .map(|(offset, _)| offset)
            .unwrap_or(rest.len());
        let cut = rest[..limit].rfind(char::is_whitespace).unwrap_or(limit);

        let (head, tail) = rest.split_at(cut);
        if !head.trim().is_empty() {
            chunks.push(head.to_string());
        }
        rest = tail.trim();
    }

    chunks.push(rest.to_string());
    chunks
}

/// Split `text` at every "Slide N:" marker.
///
/// A fragment runs from its marker to the next one. The last fragment ends at
/// the end of the text, not counting one trailing newline. The final two
/// characters of every fragment are dropped (usually the bold marker that
/// opens the next heading) and the fragment is prefixed with a bold marker.
pub fn split_into_slides(text: &str) -> Vec<String> {
    let starts: Vec<usize> = marker_regex().find_iter(text).map(|m| m.start()).collect();
    let end_of_text = text.strip_suffix('\n').unwrap_or(text).len();

    starts
        .iter()
        .enumerate()
        .map(|(index, &start)| {
            let end = starts.get(index + 1).copied().unwrap_or(end_of_text).max(start);
            wrap_marker_formatting(drop_last_chars(&text[start..end], 2))
        })
        .collect()
}

fn drop_last_chars(text: &str, count: usize) -> &str {
    match text.char_indices().rev().nth(count - 1) {
        Some((offset, _)) => &text[..offset],
        None => "",
    }
}

/// Prefix a fragment with the bold marker.
pub fn wrap_marker_formatting(fragment: &str) -> String {
    format!("{BOLD}{fragment}")
}

/// Remove every bold marker from each fragment.
pub fn remove_marker_formatting<S: AsRef<str>>(fragments: &[S]) -> Vec<String> {
    fragments
        .iter()
        .map(|fragment| fragment.as_ref().replace(BOLD, ""))
        .collect()
}

/// A marker fragment broken into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFragment {
    /// Slide number exactly as written (leading zeros kept).
    pub number: String,
    pub heading: String,
    /// Body lines with list markers removed, joined by ", ".
    pub points: String,
}

impl ParsedFragment {
    /// Title shown on the slide: "{number}.{heading}".
    pub fn slide_title(&self) -> String {
        format!("{}.{}", self.number, self.heading)
    }
}

/// Parse a "Slide N: heading" fragment.
///
/// Returns `None` when the fragment has no body line or its first line does
/// not have the marker shape.
pub fn parse_fragment(fragment: &str) -> Option<ParsedFragment> {
    let (header, body) = fragment.split_once('\n')?;
    let captures = header_regex().captures(header.trim())?;

    let points: Vec<&str> = body
        .trim()
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_matches(|c| c == '*' || c == ' ').trim())
        .collect();

    Some(ParsedFragment {
        number: captures[1].to_string(),
        heading: captures[2].trim().to_string(),
        points: points.join(", "),
    })
}
