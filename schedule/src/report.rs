use std::fmt::{Display, Formatter, Result};

use anstyle::{AnsiColor, Color, Style};

use crate::aggregate::{MonthGroup, Summary, View, WeekStatus};
use crate::config::{Payers, Rates};
use crate::generate::{Label, WeekEntry};

const MONTH: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::BrightYellow)))
    .bold();
const PAID: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
const PENDING: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
const HOLIDAY: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightRed)));
const AMOUNT: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightMagenta)));
const ADDITIONS: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack)));

pub struct Output<'a> {
    view: &'a View,
    payers: &'a Payers,
    rates: Rates,
    expand_paid: bool,
}

impl<'a> Output<'a> {
    #[must_use]
    pub fn new(view: &'a View, payers: &'a Payers, rates: Rates) -> Self {
        Self {
            view,
            payers,
            rates,
            expand_paid: false,
        }
    }

    /// Also list the weeks of months that are already paid.
    #[must_use]
    pub fn expand_paid(mut self, expand: bool) -> Self {
        self.expand_paid = expand;
        self
    }

    fn month(&self, f: &mut Formatter<'_>, month: &MonthGroup) -> Result {
        write!(
            f,
            "{}{}{}{} {} Minggu • Total {}{}",
            MONTH.render(),
            month.name(),
            MONTH.render_reset(),
            ADDITIONS.render(),
            month.payable_weeks,
            month.total,
            ADDITIONS.render_reset(),
        )?;
        if month.paid {
            write!(f, " {}[DIBAYAR]{}", PAID.render(), PAID.render_reset())?;
        }
        writeln!(f)?;

        let split = month.split;
        writeln!(
            f,
            "  {} ({}m) {}{}{}",
            self.payers.first,
            split.first_weeks,
            AMOUNT.render(),
            split.first,
            AMOUNT.render_reset()
        )?;
        if split.second_weeks > 0 {
            writeln!(
                f,
                "  + {} ({}m) {}{}{}",
                self.payers.second,
                split.second_weeks,
                AMOUNT.render(),
                split.second,
                AMOUNT.render_reset()
            )?;
        }
        writeln!(
            f,
            "  Jumlah Bersih {}{}{}",
            AMOUNT.render(),
            month.total,
            AMOUNT.render_reset()
        )?;

        if !month.paid || self.expand_paid {
            for week in &month.weeks {
                self.week(f, week, month.week_status(week, self.view.today))?;
            }
        }
        Ok(())
    }

    fn week(&self, f: &mut Formatter<'_>, week: &WeekEntry, status: WeekStatus) -> Result {
        match &week.label {
            Label::Holiday(name) => writeln!(
                f,
                "    {}CUTI  {:<12} {}{}",
                HOLIDAY.render(),
                week.date.to_string(),
                name.to_uppercase(),
                HOLIDAY.render_reset()
            ),
            Label::Week(number) => {
                let style = match status {
                    WeekStatus::Done => PAID,
                    WeekStatus::Pending => PENDING,
                    WeekStatus::Upcoming | WeekStatus::Holiday => Style::new(),
                };
                writeln!(
                    f,
                    "    {}{:<5} {:<12} {}{}",
                    style.render(),
                    format!("M{number}"),
                    week.date.to_string(),
                    self.rates.display,
                    style.render_reset()
                )
            }
        }
    }

    fn summary(f: &mut Formatter<'_>, summary: &Summary) -> Result {
        writeln!(
            f,
            "Dibayar: {}{}{}  Baki: {}{}{}",
            PAID.render(),
            summary.total_paid,
            PAID.render_reset(),
            PENDING.render(),
            summary.remaining,
            PENDING.render_reset()
        )?;
        write!(
            f,
            "{}{}/{} Minggu ({:.0}%)",
            ADDITIONS.render(),
            summary.paid_weeks,
            summary.target_weeks,
            summary.progress() * 100.0
        )?;
        if let Some(date) = summary.target_date {
            write!(f, " • Sasaran {date}")?;
        }
        writeln!(f, "{}", ADDITIONS.render_reset())
    }
}

impl Display for Output<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for month in &self.view.months {
            self.month(f, month)?;
            writeln!(f)?;
        }
        Self::summary(f, &self.view.summary)
    }
}
