use std::ops::Not;

use ratatui::buffer::Buffer;
use ratatui::crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;
use ratatui::prelude::Line;
use ratatui::text::Span;
use ratatui::widgets::{Block, List, ListItem, ListState, Padding, StatefulWidget};
use schedule::aggregate::{self, MonthGroup, WeekStatus};
use schedule::config::Payers;
use schedule::generate::Label;
use schedule::{Amount, MonthKey};

use crate::term::style::{AMOUNT, BORDER, DIM, HIGHLIGHT, HOLIDAY, MONTH, PAID, PENDING};
use crate::term::{Control, UnknownCommand, View};

pub struct Months {
    state: ListState,
    expanded: Vec<bool>,
    view: aggregate::View,
    payers: Payers,
    rate: Amount,
}

impl Months {
    /// Paid months start collapsed, the first unpaid month is selected.
    pub fn new(view: aggregate::View, payers: Payers, rate: Amount) -> Self {
        let expanded = view.months.iter().map(|m| !m.paid).collect::<Vec<_>>();
        let mut months = Self {
            state: ListState::default(),
            expanded,
            view,
            payers,
            rate,
        };
        let first_unpaid = months
            .view
            .months
            .iter()
            .position(|m| !m.paid)
            .unwrap_or_default();
        let selected = months
            .view
            .months
            .is_empty()
            .not()
            .then(|| months.start_of_month(first_unpaid));
        months.state.select(selected);
        months
    }

    /// Swaps in a freshly derived view, keeping the selection on the same
    /// month where possible.
    pub(crate) fn reload(&mut self, view: aggregate::View) {
        let same_months = view.months.len() == self.view.months.len()
            && view
                .months
                .iter()
                .zip(&self.view.months)
                .all(|(a, b)| a.key == b.key);
        if !same_months {
            let selected = self.selected_month().map(|m| m.key);
            let mut fresh = Self::new(view, self.payers.clone(), self.rate);
            if let Some(key) = selected {
                fresh.select_month(key);
            }
            *self = fresh;
            return;
        }
        self.view = view;
    }

    pub(crate) fn set_payers(&mut self, payers: Payers, rate: Amount) {
        self.payers = payers;
        self.rate = rate;
    }

    pub(crate) fn view(&self) -> &aggregate::View {
        &self.view
    }

    pub(crate) fn selected_month(&self) -> Option<&MonthGroup> {
        let selected = self.state.selected()?;
        let (month, _) = self.month_index_from_index(selected)?;
        self.view.months.get(month)
    }

    pub(crate) fn select_month(&mut self, key: MonthKey) -> bool {
        let Some(index) = self.view.months.iter().position(|m| m.key == key) else {
            return false;
        };
        let start = self.start_of_month(index);
        self.state.select(Some(start));
        *self.state.offset_mut() = start;
        true
    }

    /// Collapses a month that was just paid, expands one that was unpaid.
    pub(crate) fn follow_paid(&mut self, key: MonthKey, paid: bool) {
        if let Some(index) = self.view.months.iter().position(|m| m.key == key) {
            self.expanded[index] = !paid;
            self.state.select(Some(self.start_of_month(index)));
        }
    }

    fn render_month(&self, month: &MonthGroup, expanded: bool) -> Vec<ListItem<'static>> {
        let arrow = Span::from(if expanded { "▼ " } else { "▶ " });
        let status = if month.paid {
            Span::from(" ✔ DIBAYAR").style(PAID)
        } else {
            Span::from(" ○ BELUM").style(DIM)
        };
        let mut lines = vec![ListItem::new(Line::from(vec![
            arrow,
            Span::from(month.name()).style(MONTH),
            Span::from(format!(" • {} Minggu • ", month.payable_weeks)),
            Span::from(month.total.to_string()).style(AMOUNT),
            status,
        ]))];
        if !expanded {
            return lines;
        }

        let split = month.split;
        let mut split_line = vec![
            Span::from("   "),
            Span::from(format!("{} ({}m) ", self.payers.first, split.first_weeks)),
            Span::from(split.first.to_string()).style(AMOUNT),
        ];
        if split.second_weeks > 0 {
            split_line.extend([
                Span::from(format!(" + {} ({}m) ", self.payers.second, split.second_weeks)),
                Span::from(split.second.to_string()).style(AMOUNT),
            ]);
        }
        lines.push(ListItem::new(Line::from(split_line)));

        lines.extend(month.weeks.iter().map(|week| {
            let date = format!("{:<12}", week.date.to_string());
            let line = match &week.label {
                Label::Holiday(name) => Line::from(vec![
                    Span::from("   "),
                    Span::from("CUTI  ").style(HOLIDAY),
                    Span::from(date).style(DIM),
                    Span::from(name.to_uppercase().to_string()).style(HOLIDAY),
                ]),
                Label::Week(number) => {
                    let style = match month.week_status(week, self.view.today) {
                        WeekStatus::Done => PAID,
                        WeekStatus::Pending => PENDING,
                        WeekStatus::Upcoming | WeekStatus::Holiday => ratatui::style::Style::new(),
                    };
                    Line::from(vec![
                        Span::from("   "),
                        Span::from(format!("{:<6}", format!("M{number}"))).style(style),
                        Span::from(date).style(style),
                        Span::from(self.rate.to_string()).style(style),
                    ])
                }
            };
            ListItem::new(line)
        }));
        lines
    }

    fn month_index_from_index(&self, index: usize) -> Option<(usize, usize)> {
        let mut running_index = 0;
        for ((i, month), expanded) in self.view.months.iter().enumerate().zip(&self.expanded) {
            let start = running_index;
            let end = running_index + len_of_month(month, *expanded);
            running_index = end;
            if (start..end).contains(&index) {
                return Some((i, start));
            }
        }
        None
    }

    fn start_of_month(&self, index: usize) -> usize {
        self.view.months[..index]
            .iter()
            .zip(&self.expanded)
            .map(|(m, expanded)| len_of_month(m, *expanded))
            .sum::<usize>()
    }

    fn move_month(&mut self, forward: bool) {
        let Some(selected) = self.state.selected() else {
            return;
        };
        let Some((month, start)) = self.month_index_from_index(selected) else {
            return;
        };
        let index = if forward {
            start + len_of_month(&self.view.months[month], self.expanded[month])
        } else if selected == start && month > 0 {
            start - len_of_month(&self.view.months[month - 1], self.expanded[month - 1])
        } else {
            start
        };
        let last = self.start_of_month(self.view.months.len()).saturating_sub(1);
        self.state.select(Some(index.min(last)));
    }
}

/// Header, payer split and one row per week when expanded.
fn len_of_month(month: &MonthGroup, expanded: bool) -> usize {
    (if expanded { month.weeks.len() + 1 } else { 0 }) + 1
}

impl View for Months {
    fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let rows = self
            .view
            .months
            .iter()
            .zip(&self.expanded)
            .flat_map(|(month, expanded)| self.render_month(month, *expanded))
            .collect::<Vec<_>>();
        let block = Block::bordered()
            .title(" Jadual Bayaran ")
            .border_style(BORDER)
            .padding(Padding::horizontal(1));
        let list_height = block.inner(area).height;
        let list = List::new(rows).block(block).highlight_style(HIGHLIGHT);
        *self.state.offset_mut() = self
            .state
            .offset()
            .min(list.len().saturating_sub(usize::from(list_height)));
        list.render(area, buf, &mut self.state);
    }

    fn handle_event(&mut self, e: Event) -> Option<Control> {
        let Event::Key(e) = e else {
            return None;
        };
        if !e.is_press() {
            return None;
        }
        match e.code {
            KeyCode::Down => self.state.scroll_down_by(1),
            KeyCode::Up => self.state.scroll_up_by(1),
            KeyCode::Left => {
                if let Some(selected) = self.state.selected() {
                    let (month, start) = self.month_index_from_index(selected).unwrap_or_default();
                    self.expanded[month] = false;
                    self.state.select(Some(start));
                }
            }
            KeyCode::Right => {
                if let Some(selected) = self.state.selected() {
                    let (month, _) = self.month_index_from_index(selected).unwrap_or_default();
                    self.expanded[month] = true;
                }
            }
            KeyCode::Home | KeyCode::Char('g') => self.state.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.state.select_last(),
            KeyCode::Char('n') => self.move_month(true),
            KeyCode::Char('N') => self.move_month(false),
            KeyCode::Char(' ') | KeyCode::Enter => {
                return self
                    .selected_month()
                    .map(|month| Control::Toggle(month.key, !month.paid));
            }
            KeyCode::Char('e') => return Some(Control::Edit),
            _ => {}
        }
        None
    }

    fn command(&mut self, command: &str, args: &[&str]) -> Result<(), UnknownCommand> {
        match (command, args) {
            ("collapse" | "c", []) => {
                let selected = self.state.selected().unwrap_or_default();
                let (month, _) = self.month_index_from_index(selected).unwrap_or_default();
                self.expanded.fill(false);
                let start = self.start_of_month(month);
                self.state.select(Some(start));
                *self.state.offset_mut() = start;
                Ok(())
            }
            ("expand" | "e", []) => {
                let selected = self.state.selected().unwrap_or_default();
                let (month, start) = self.month_index_from_index(selected).unwrap_or_default();
                let offset = selected.saturating_sub(start);
                self.expanded.fill(true);
                let start = self.start_of_month(month);
                self.state.select(Some(start + offset));
                *self.state.offset_mut() = start;
                Ok(())
            }
            ("month", ["next"]) => {
                self.move_month(true);
                Ok(())
            }
            ("month", ["prev"]) => {
                self.move_month(false);
                Ok(())
            }
            ("month", ["first"]) => {
                self.state.select_first();
                Ok(())
            }
            ("month", [key]) => match key.parse::<MonthKey>() {
                Ok(key) if self.select_month(key) => Ok(()),
                _ => Err(UnknownCommand),
            },
            _ => Err(UnknownCommand),
        }
    }
}
