use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use slidegen_common::{PresentationRequest, SegmentMode, DEFAULT_TITLE, DEFAULT_TOPICS};
use slidegen_protocol::Event;
use std::path::PathBuf;

/// Keep the status log short enough to fit on screen.
const STATUS_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Topics,
    Mode,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Title => Field::Topics,
            Field::Topics => Field::Mode,
            Field::Mode => Field::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            Field::Title => Field::Mode,
            Field::Topics => Field::Title,
            Field::Mode => Field::Topics,
        }
    }
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
    Preview,
    Quit,
}

/// Input fields plus the outcome of the last generation.
#[derive(Debug, Clone)]
pub struct FormState {
    pub title: String,
    pub topics: String,
    pub mode: SegmentMode,
    pub focus: Field,
    pub busy: bool,
    pub status: Vec<String>,
    pub fragments: Vec<String>,
    pub saved_path: Option<PathBuf>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(SegmentMode::default())
    }
}

impl FormState {
    pub fn new(mode: SegmentMode) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            topics: DEFAULT_TOPICS.to_string(),
            mode,
            focus: Field::Title,
            busy: false,
            status: Vec::new(),
            fragments: Vec::new(),
            saved_path: None,
        }
    }

    pub fn request(&self) -> PresentationRequest {
        PresentationRequest::from_form(&self.title, &self.topics)
    }

    pub fn push_status(&mut self, line: impl Into<String>) {
        self.status.push(line.into());
        if self.status.len() > STATUS_LIMIT {
            let overflow = self.status.len() - STATUS_LIMIT;
            self.status.drain(..overflow);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return FormAction::Quit,
            KeyCode::Char('q') if ctrl => return FormAction::Quit,
            KeyCode::Char('s') if ctrl => return self.submit(),
            KeyCode::F(5) => return self.submit(),
            KeyCode::Char('p') if ctrl => return self.preview(),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return FormAction::None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return FormAction::None;
            }
            _ => {}
        }

        if ctrl {
            return FormAction::None;
        }

        match self.focus {
            Field::Title => match key.code {
                KeyCode::Char(c) => self.title.push(c),
                KeyCode::Backspace => {
                    self.title.pop();
                }
                KeyCode::Enter => self.focus = Field::Topics,
                _ => {}
            },
            Field::Topics => match key.code {
                KeyCode::Char(c) => self.topics.push(c),
                KeyCode::Backspace => {
                    self.topics.pop();
                }
                KeyCode::Enter => self.topics.push('\n'),
                _ => {}
            },
            Field::Mode => match key.code {
                KeyCode::Char('p') => return self.preview(),
                KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Left | KeyCode::Right => {
                    self.mode = self.mode.toggle();
                }
                _ => {}
            },
        }
        FormAction::None
    }

    fn submit(&mut self) -> FormAction {
        if self.busy {
            self.push_status("Generation already running");
            return FormAction::None;
        }
        self.busy = true;
        self.fragments.clear();
        self.saved_path = None;
        FormAction::Submit
    }

    fn preview(&mut self) -> FormAction {
        if self.fragments.is_empty() {
            self.push_status("Nothing to preview yet");
            return FormAction::None;
        }
        FormAction::Preview
    }

    /// Fold a pipeline event into the form.
    pub fn apply_event(&mut self, event: &Event) {
        if let Event::DeckSaved { path } = event {
            self.saved_path = Some(path.clone());
        }
        if event.is_terminal() {
            self.busy = false;
        }
        self.push_status(event.describe());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn defaults_match_form() {
        let state = FormState::default();
        let request = state.request();
        assert_eq!(request.title, "Gen AI");
        assert_eq!(
            request.topics,
            vec!["Introduction to GenAI", "Applications of GenAI"]
        );
        assert_eq!(state.mode, SegmentMode::FixedLength);
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut state = FormState::default();
        state.handle_key(key(KeyCode::Backspace));
        state.handle_key(key(KeyCode::Char('X')));
        assert_eq!(state.title, "Gen AX");

        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.focus, Field::Topics);
        state.handle_key(key(KeyCode::Enter));
        for c in "Ethics".chars() {
            state.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(state.request().topics.last().map(String::as_str), Some("Ethics"));
    }

    #[test]
    fn focus_cycles_both_ways() {
        let mut state = FormState::default();
        state.handle_key(key(KeyCode::BackTab));
        assert_eq!(state.focus, Field::Mode);
        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.focus, Field::Title);
    }

    #[test]
    fn mode_field_toggles() {
        let mut state = FormState::default();
        state.focus = Field::Mode;
        state.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(state.mode, SegmentMode::Markers);
        state.handle_key(key(KeyCode::Right));
        assert_eq!(state.mode, SegmentMode::FixedLength);
    }

    #[test]
    fn submit_and_quit_keys() {
        let mut state = FormState::default();
        assert_eq!(state.handle_key(ctrl('s')), FormAction::Submit);
        assert!(state.busy);
        assert_eq!(state.handle_key(key(KeyCode::F(5))), FormAction::None);

        state.apply_event(&Event::Error {
            message: "Error generating content.".into(),
        });
        assert!(!state.busy);
        assert_eq!(state.status.last().map(String::as_str), Some("Error generating content."));
        assert_eq!(state.handle_key(key(KeyCode::F(5))), FormAction::Submit);

        assert_eq!(state.handle_key(key(KeyCode::Esc)), FormAction::Quit);
        assert_eq!(state.handle_key(ctrl('q')), FormAction::Quit);
        // Ctrl chords never reach the text fields.
        assert_eq!(state.title, "Gen AI");
    }

    #[test]
    fn preview_needs_fragments() {
        let mut state = FormState::default();
        assert_eq!(state.handle_key(ctrl('p')), FormAction::None);
        assert_eq!(state.status.last().map(String::as_str), Some("Nothing to preview yet"));

        state.fragments = vec!["chunk".into()];
        assert_eq!(state.handle_key(ctrl('p')), FormAction::Preview);

        // Plain 'p' is text while a text field has focus.
        assert_eq!(state.handle_key(key(KeyCode::Char('p'))), FormAction::None);
        assert_eq!(state.title, "Gen AIp");
        state.focus = Field::Mode;
        assert_eq!(state.handle_key(key(KeyCode::Char('p'))), FormAction::Preview);
    }

    #[test]
    fn saved_path_is_recorded() {
        let mut state = FormState::default();
        state.apply_event(&Event::DeckSaved {
            path: PathBuf::from("out/Gen_AI.pptx"),
        });
        assert_eq!(state.saved_path, Some(PathBuf::from("out/Gen_AI.pptx")));
        assert_eq!(state.status, vec!["Saved out/Gen_AI.pptx"]);
    }

    #[test]
    fn status_log_is_bounded() {
        let mut state = FormState::default();
        for n in 0..(STATUS_LIMIT + 10) {
            state.push_status(format!("line {n}"));
        }
        assert_eq!(state.status.len(), STATUS_LIMIT);
        assert_eq!(state.status[0], "line 10");
    }
}
