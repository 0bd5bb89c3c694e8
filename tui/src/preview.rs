use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;

/// Pages through segmented fragments, one per screen.
pub struct SlidePreview {
    slides: Vec<String>,
    current_slide: usize,
    running: bool,
}

impl SlidePreview {
    pub fn new(slides: Vec<String>) -> Self {
        Self {
            slides,
            current_slide: 0,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current(&self) -> usize {
        self.current_slide
    }

    /// Standalone mode: owns the terminal until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        while self.running {
            terminal.draw(|f| {
                let area = f.area();
                self.draw(f, area);
            })?;

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.previous_slide();
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                self.next_slide();
            }
            KeyCode::Home => self.current_slide = 0,
            KeyCode::End => self.current_slide = self.slides.len().saturating_sub(1),
            _ => {}
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect) {
        let current_content = self
            .slides
            .get(self.current_slide)
            .map(String::as_str)
            .unwrap_or("No slide content");

        let title = format!(
            "Fragment {}/{} (←/→ to move, q to close)",
            (self.current_slide + 1).min(self.slides.len()),
            self.slides.len()
        );

        let block = Block::default().title(title).borders(Borders::ALL);

        let paragraph = Paragraph::new(current_content)
            .block(block)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    fn next_slide(&mut self) {
        if self.current_slide < self.slides.len().saturating_sub(1) {
            self.current_slide += 1;
        }
    }

    fn previous_slide(&mut self) {
        if self.current_slide > 0 {
            self.current_slide -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn press(preview: &mut SlidePreview, code: KeyCode) {
        preview.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut preview = SlidePreview::new(vec!["a".into(), "b".into(), "c".into()]);
        press(&mut preview, KeyCode::Left);
        assert_eq!(preview.current(), 0);
        press(&mut preview, KeyCode::Right);
        press(&mut preview, KeyCode::Right);
        press(&mut preview, KeyCode::Right);
        assert_eq!(preview.current(), 2);
        press(&mut preview, KeyCode::Home);
        assert_eq!(preview.current(), 0);
        press(&mut preview, KeyCode::End);
        assert_eq!(preview.current(), 2);
        press(&mut preview, KeyCode::Char('q'));
        assert!(!preview.is_running());
    }

    #[test]
    fn renders_current_fragment() {
        let preview = SlidePreview::new(vec!["Slide 1: Intro\n* What".into()]);
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                preview.draw(f, area);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Fragment 1/1"));
        assert!(text.contains("Slide 1: Intro"));
    }

    #[test]
    fn empty_preview_shows_placeholder() {
        let preview = SlidePreview::new(Vec::new());
        let mut terminal = Terminal::new(TestBackend::new(60, 5)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                preview.draw(f, area);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("No slide content"));
        assert!(text.contains("Fragment 0/0"));
    }
}
