use std::collections::VecDeque;

use ratatui::Frame;
use ratatui::crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;
use ratatui::prelude::{Line, Span};
use ratatui::style::Color;
use ratatui::widgets::{Block, Paragraph, Widget};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

const HISTORY: usize = 32;

/// The `:` command line with history and a single inline completion.
pub struct Prompt {
    input: Input,
    history: VecDeque<String>,
    history_position: Option<usize>,
    completions: &'static [&'static str],
    completion: Option<&'static str>,
}

pub enum Control {
    Command(String),
    Hide,
}

impl Prompt {
    pub fn new(completions: &'static [&'static str]) -> Self {
        Self {
            input: Input::default(),
            history: VecDeque::with_capacity(HISTORY),
            history_position: None,
            completions,
            completion: None,
        }
    }

    pub fn draw(&self, area: Rect, frame: &mut Frame<'_>) {
        let width = area.width.max(3) - 3;
        let scroll = self.input.visual_scroll(width as usize);
        let mut line = vec![Span::from(":"), Span::from(self.input.value())];
        if let Some(rest) = self
            .completion
            .and_then(|c| c.strip_prefix(self.input.value()))
        {
            line.push(Span::from(rest).style(Color::DarkGray));
        }
        Paragraph::new(Line::from(line))
            .scroll((0, u16::try_from(scroll).unwrap_or(u16::MAX)))
            .style(Color::Yellow)
            .block(Block::bordered())
            .render(area, frame.buffer_mut());

        let x = self.input.visual_cursor().max(scroll) - scroll + 2;
        frame.set_cursor_position((area.x + u16::try_from(x).unwrap_or(area.width), area.y + 1));
    }

    fn recall(&mut self, position: usize) {
        self.history_position = Some(position);
        self.set_value(self.history[position].clone());
    }

    fn set_value(&mut self, value: String) {
        self.input = Input::new(value);
        self.refresh_completion();
    }

    fn refresh_completion(&mut self) {
        let value = self.input.value();
        self.completion = if value.is_empty() {
            None
        } else {
            self.completions
                .iter()
                .find(|c| c.starts_with(value) && c.len() != value.len())
                .copied()
        };
    }

    fn take(&mut self) -> String {
        self.history_position = None;
        self.completion = None;
        self.input.value_and_reset()
    }

    fn remember(&mut self, value: &str) {
        if self.history.back().map(String::as_str) == Some(value) {
            return;
        }
        if self.history.len() == HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(value.to_owned());
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<Control> {
        if let Event::Key(key) = event
            && key.is_press()
        {
            match key.code {
                KeyCode::Esc => {
                    self.take();
                    return Some(Control::Hide);
                }
                KeyCode::Up => {
                    if !self.history.is_empty() {
                        let position = self
                            .history_position
                            .unwrap_or(self.history.len())
                            .saturating_sub(1);
                        self.recall(position);
                    }
                    return None;
                }
                KeyCode::Down => {
                    if let Some(position) = self.history_position {
                        self.recall((position + 1).min(self.history.len() - 1));
                    }
                    return None;
                }
                KeyCode::Right | KeyCode::Tab => {
                    if let Some(completion) = self.completion {
                        self.set_value(completion.to_owned());
                        return None;
                    }
                }
                KeyCode::Enter => {
                    let value = self.take();
                    if value.trim().is_empty() {
                        return Some(Control::Hide);
                    }
                    self.remember(&value);
                    return Some(Control::Command(value));
                }
                _ => {}
            }
        }

        if let Some(changed) = self.input.handle_event(event)
            && changed.value
        {
            self.history_position = None;
            self.refresh_completion();
        }
        None
    }
}

#[cfg(test)]
mod test {
    use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};

    use crate::term::command::{Control, Prompt};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::from(code))
    }

    fn type_text(prompt: &mut Prompt, text: &str) {
        for c in text.chars() {
            assert!(prompt.handle_event(&key(KeyCode::Char(c))).is_none());
        }
    }

    #[test]
    fn test_complete_and_submit() {
        let mut prompt = Prompt::new(&["pay", "unpay", "month next"]);
        type_text(&mut prompt, "mo");
        assert!(prompt.handle_event(&key(KeyCode::Tab)).is_none());
        assert!(matches!(
            prompt.handle_event(&key(KeyCode::Enter)),
            Some(Control::Command(c)) if c == "month next"
        ));
    }

    #[test]
    fn test_history() {
        let mut prompt = Prompt::new(&[]);
        type_text(&mut prompt, "pay 2026-1");
        let _ = prompt.handle_event(&key(KeyCode::Enter));
        assert!(matches!(
            prompt.handle_event(&key(KeyCode::Enter)),
            Some(Control::Hide)
        ));

        assert!(prompt.handle_event(&key(KeyCode::Up)).is_none());
        assert!(matches!(
            prompt.handle_event(&key(KeyCode::Enter)),
            Some(Control::Command(c)) if c == "pay 2026-1"
        ));
        assert_eq!(prompt.history.len(), 1);
    }
}
