mod command;
mod editor;
mod effects;
mod months;
mod style;
mod summary;

use std::fmt::Display;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{Event, KeyCode, KeyModifiers};
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::text::Text;
use ratatui::widgets::{Block, Clear, Widget};
use schedule::config::Config;
use schedule::state::{FileStore, KeyValueStore, StoreError};
use schedule::tracker::{self, Tracker};
use schedule::{Date, MonthKey};

use crate::term::command::Prompt;
use crate::term::editor::run_editor;
use crate::term::effects::{Decorations, Effects, Ticker};
use crate::term::months::Months;
use crate::term::style::{BORDER, HIGHLIGHT};

const COMPLETIONS: &[&str] = &[
    "pay",
    "unpay",
    "month next",
    "month prev",
    "month first",
    "expand",
    "collapse",
    "edit",
    "q",
];

pub fn run_term(
    tracker: Tracker<FileStore>,
    config_path: PathBuf,
    warning: Option<StoreError>,
) -> anyhow::Result<()> {
    let effects = Decorations::new(rand::thread_rng());
    let mut app = App::new(tracker, config_path, effects);
    if let Some(warning) = warning {
        app.alert(format!("Gagal simpan: {warning}"));
    }
    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}

pub(crate) trait View {
    fn render(&mut self, area: Rect, buf: &mut Buffer);

    #[must_use]
    fn handle_event(&mut self, e: Event) -> Option<Control>;

    fn command(&mut self, command: &str, args: &[&str]) -> Result<(), UnknownCommand>;
}

#[derive(Eq, PartialEq)]
enum Focus {
    Input,
    View,
    Alert,
}

#[must_use]
pub(crate) enum Control {
    Quit,
    Toggle(MonthKey, bool),
    Edit,
    Alert(String),
}

#[derive(Debug)]
pub struct UnknownCommand;

struct Error(String);

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error(s.to_owned())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct App<S, E> {
    focus: Focus,
    prompt: Prompt,
    tracker: Tracker<S>,
    config_path: PathBuf,
    months: Months,
    effects: E,
    alert: Alert,
}

impl<S: KeyValueStore + Clone, E: Effects> App<S, E> {
    fn new(tracker: Tracker<S>, config_path: PathBuf, mut effects: E) -> Self {
        let view = tracker.view(Date::today());
        effects.show_paid(view.summary.total_paid);
        let config = tracker.config();
        let months = Months::new(view, config.payers.clone(), config.rates.display);
        Self {
            focus: Focus::View,
            prompt: Prompt::new(COMPLETIONS),
            tracker,
            config_path,
            months,
            effects,
            alert: Alert::new(),
        }
    }

    fn run(&mut self, terminal: &mut ratatui::DefaultTerminal) -> anyhow::Result<()> {
        let mut ticker = Ticker::new(Instant::now());
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            let animating = self.effects.is_animating();
            let timeout = if animating {
                ticker.timeout(Instant::now())
            } else {
                Duration::from_secs(60)
            };
            if event::poll(timeout)? {
                match self.handle_event(event::read()?) {
                    None => {}
                    Some(Control::Quit) => break,
                    Some(Control::Toggle(month, paid)) => self.toggle(month, paid),
                    Some(Control::Edit) => {
                        run_editor(terminal, &self.config_path)?;
                        if let Err(e) = self.reload_config() {
                            self.alert(e.to_string());
                        }
                    }
                    Some(Control::Alert(message)) => self.alert(message),
                }
            }
            if !animating {
                ticker.reset(Instant::now());
                continue;
            }
            for _ in 0..ticker.due(Instant::now()) {
                self.effects.tick();
            }
        }
        Ok(())
    }

    fn alert(&mut self, message: String) {
        self.alert = Alert::from(message);
        self.focus = Focus::Alert;
    }

    fn refresh(&mut self) {
        let view = self.tracker.view(Date::today());
        self.effects.show_paid(view.summary.total_paid);
        self.months.reload(view);
    }

    fn toggle(&mut self, month: MonthKey, paid: bool) {
        match self
            .tracker
            .handle(tracker::Command::ToggleMonthPaid { month, paid })
        {
            Ok(warning) => {
                if paid {
                    self.effects.celebrate();
                }
                self.refresh();
                self.months.follow_paid(month, paid);
                if let Some(warning) = warning {
                    self.alert(format!("Gagal simpan: {warning}"));
                }
            }
            Err(e) => self.alert(e.to_string()),
        }
    }

    /// Re-reads the configuration after editing. The old schedule stays if
    /// the new configuration is rejected.
    fn reload_config(&mut self) -> anyhow::Result<()> {
        let config = Config::load(&self.config_path)
            .with_context(|| format!("Invalid configuration in {}", self.config_path.display()))?;
        let payers = config.payers.clone();
        let rate = config.rates.display;
        let (tracker, warning) = Tracker::open(config, self.tracker.store().clone())?;
        self.tracker = tracker;
        self.months.set_payers(payers, rate);
        self.refresh();
        if let Some(warning) = warning {
            self.alert(format!("Gagal simpan: {warning}"));
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let [summary_area, rest] =
            Layout::vertical([Constraint::Length(summary::HEIGHT), Constraint::Min(1)])
                .areas(frame.area());
        let view_area = if let Focus::Input = self.focus {
            let [input_area, rest] =
                Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(rest);
            self.prompt.draw(input_area, frame);
            rest
        } else {
            rest
        };

        summary::render_summary(
            &self.months.view().summary,
            self.effects.displayed_paid(),
            summary_area,
            frame.buffer_mut(),
        );
        self.months.render(view_area, frame.buffer_mut());
        self.effects.render(frame.area(), frame.buffer_mut());

        if let Focus::Alert = self.focus {
            self.alert.draw(frame.area(), frame.buffer_mut());
        }
    }

    fn handle_event(&mut self, event: Event) -> Option<Control> {
        if let Event::Key(event) = event
            && event.is_press()
            && event.code == KeyCode::Char('c')
            && event.modifiers == KeyModifiers::CONTROL
        {
            return Some(Control::Quit);
        }
        match self.focus {
            Focus::Input => match self.prompt.handle_event(&event)? {
                command::Control::Command(command) => {
                    self.focus = Focus::View;
                    let mut iter = command.split_whitespace();
                    if let Some(command) = iter.next() {
                        let args = iter.collect::<Vec<&str>>();
                        return self
                            .handle_command(command, &args)
                            .unwrap_or_else(|e| Some(Control::Alert(e.0)));
                    }
                }
                command::Control::Hide => {
                    self.focus = Focus::View;
                }
            },
            Focus::View => {
                if let Event::Key(key) = event
                    && key.is_press()
                {
                    match key.code {
                        KeyCode::Char(':') => {
                            self.focus = Focus::Input;
                            return None;
                        }
                        KeyCode::Char('q') => return Some(Control::Quit),
                        _ => {}
                    }
                }
                return self.months.handle_event(event);
            }
            Focus::Alert => {
                if let Event::Key(key) = event
                    && key.is_press()
                    && matches!(key.code, KeyCode::Enter | KeyCode::Esc)
                {
                    self.focus = Focus::View;
                }
            }
        }
        None
    }

    fn handle_command(&mut self, command: &str, args: &[&str]) -> Result<Option<Control>, Error> {
        match command {
            "q" => Ok(Some(Control::Quit)),
            "edit" => Ok(Some(Control::Edit)),
            "pay" | "unpay" => {
                let paid = command == "pay";
                let month = match *args {
                    [] => self
                        .months
                        .selected_month()
                        .map(|m| m.key)
                        .ok_or("No month selected")?,
                    [month] => month
                        .parse::<MonthKey>()
                        .map_err(|e| format!("Failed to parse month {month:?}: {e}"))?,
                    _ => return Err(format!("Unknown args to `{command}`: {args:?}").into()),
                };
                Ok(Some(Control::Toggle(month, paid)))
            }
            _ => self
                .months
                .command(command, args)
                .map(|()| None)
                .map_err(|_| format!("Unknown command: {command} {}", args.join(" ")).into()),
        }
    }
}

struct Alert {
    text: String,
}

impl From<String> for Alert {
    fn from(value: String) -> Self {
        Self { text: value }
    }
}

impl Alert {
    fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
        let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
        let [area] = vertical.areas(area);
        let [area] = horizontal.areas(area);
        area
    }

    fn draw(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(" Amaran ")
            .title_alignment(Alignment::Center)
            .border_style(BORDER);
        let area = Self::popup_area(area, 60, 20);
        Clear.render(area, buf);
        (&block).render(area, buf);
        let area = block.inner(area);
        let [message_area, _, button_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .flex(Flex::Center)
        .areas(area);
        let button = Text::from(" OK ").style(HIGHLIGHT);
        let button_area = h_center(button_area, button.width());
        button.render(button_area, buf);
        let message = Text::from(self.text.as_str());
        let message_area = h_center(message_area, message.width());
        message.render(message_area, buf);
    }
}

pub fn h_center(area: Rect, width: usize) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(
        u16::try_from(width).unwrap_or(area.width),
    )])
    .flex(Flex::Center)
    .areas(area);
    area
}
