use crate::form::{Field, FormAction, FormState};
use crate::preview::SlidePreview;
use anyhow::Result;
use crossterm::{
    event::{self, Event as TermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use slidegen_common::SlideConfig;
use slidegen_core::Generator;
use slidegen_protocol::Event;
use std::io;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

/// Terminal form: collects title and topics, runs the pipeline in the
/// background and shows its progress.
pub struct FormApp {
    config: SlideConfig,
    state: FormState,
    preview: Option<SlidePreview>,
}

impl FormApp {
    pub fn new(config: SlideConfig) -> Self {
        let state = FormState::new(config.segment_mode);
        Self {
            config,
            state,
            preview: None,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub async fn run(&mut self) -> Result<()> {
        if !self.config.has_api_key() {
            self.state
                .push_status("GOOGLE_API_KEY is not set; generation will fail");
        }

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let (events_tx, mut events_rx) = mpsc::channel::<Event>(64);
        let (fragments_tx, mut fragments_rx) = mpsc::channel::<Vec<String>>(1);
        let mut tick_interval = interval(Duration::from_millis(250));

        loop {
            terminal.draw(|f| self.draw(f))?;

            tokio::select! {
                Some(event) = events_rx.recv() => {
                    self.state.apply_event(&event);
                }
                Some(fragments) = fragments_rx.recv() => {
                    self.state.fragments = fragments;
                }
                _ = tick_interval.tick() => {}
                polled = tokio::task::spawn_blocking(|| event::poll(Duration::from_millis(50))) => {
                    if let Ok(Ok(true)) = polled {
                        if let Ok(TermEvent::Key(key)) = event::read() {
                            if key.kind != KeyEventKind::Press {
                                continue;
                            }
                            if let Some(preview) = self.preview.as_mut() {
                                preview.handle_key(key);
                                if !preview.is_running() {
                                    self.preview = None;
                                }
                                continue;
                            }
                            match self.state.handle_key(key) {
                                FormAction::Quit => break,
                                FormAction::Submit => {
                                    self.start_generation(events_tx.clone(), fragments_tx.clone());
                                }
                                FormAction::Preview => {
                                    self.preview = Some(SlidePreview::new(self.state.fragments.clone()));
                                }
                                FormAction::None => {}
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn start_generation(&self, events: mpsc::Sender<Event>, fragments: mpsc::Sender<Vec<String>>) {
        let generator = Generator::from_config(&self.config).with_mode(self.state.mode);
        let request = self.state.request();
        let dir = self.config.output_dir.clone();
        tracing::info!(title = %request.title, mode = %self.state.mode, "form submitted");

        tokio::spawn(async move {
            // Failures arrive on `events` as Event::Error.
            if let Ok((deck, _path)) = generator.generate_and_save(&request, &dir, &events).await {
                let _ = fragments.send(deck.fragments).await;
            }
        });
    }

    fn draw(&self, f: &mut Frame) {
        let area = f.area();
        if let Some(preview) = &self.preview {
            preview.draw(f, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(self.state.title.as_str())
            .block(self.field_block("Presentation title", Field::Title));
        f.render_widget(title, chunks[0]);

        let topics = Paragraph::new(self.state.topics.as_str())
            .block(self.field_block("Topics (one per line)", Field::Topics))
            .wrap(Wrap { trim: false });
        f.render_widget(topics, chunks[1]);

        let mode = Paragraph::new(format!("< {} >", self.state.mode))
            .block(self.field_block("Segmentation (space to toggle)", Field::Mode));
        f.render_widget(mode, chunks[2]);

        let status_title = match &self.state.saved_path {
            Some(path) => format!("Status: deck at {}", path.display()),
            None if self.state.busy => "Status: generating...".to_string(),
            None => "Status".to_string(),
        };
        let visible = chunks[3].height.saturating_sub(2) as usize;
        let skip = self.state.status.len().saturating_sub(visible);
        let lines: Vec<ListItem> = self.state.status[skip..]
            .iter()
            .map(|line| ListItem::new(line.as_str()))
            .collect();
        let status = List::new(lines).block(Block::default().title(status_title).borders(Borders::ALL));
        f.render_widget(status, chunks[3]);

        let help = Paragraph::new(
            "Tab: next field | Ctrl+S/F5: generate | Ctrl+P: preview | Esc/Ctrl+Q: quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        f.render_widget(help, chunks[4]);
    }

    fn field_block<'a>(&self, title: &'a str, field: Field) -> Block<'a> {
        let block = Block::default().title(title).borders(Borders::ALL);
        if self.state.focus == field {
            block.border_style(Style::default().fg(Color::Yellow))
        } else {
            block
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn render(app: &FormApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn form_shows_defaults() {
        let app = FormApp::new(SlideConfig::default());
        let screen = render(&app);
        assert!(screen.contains("Gen AI"));
        assert!(screen.contains("Introduction to GenAI"));
        assert!(screen.contains("fixed-length"));
    }

    #[test]
    fn preview_replaces_form() {
        let mut app = FormApp::new(SlideConfig::default());
        app.preview = Some(SlidePreview::new(vec!["chunk body".into()]));
        let screen = render(&app);
        assert!(screen.contains("chunk body"));
        assert!(!screen.contains("Presentation title"));
    }
}
