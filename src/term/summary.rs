use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Gauge, Padding, Widget};
use schedule::Amount;
use schedule::aggregate::Summary;

use crate::term::style::{BORDER, DIM, PAID, PENDING};

/// Rows taken by [`render_summary`], borders included.
pub const HEIGHT: u16 = 4;

/// `paid` is the total as the counter animation currently shows it.
pub fn render_summary(summary: &Summary, paid: Amount, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered()
        .title(" Ringkasan ")
        .border_style(BORDER)
        .padding(Padding::horizontal(1));
    let inner = block.inner(area);
    block.render(area, buf);

    let [totals_area, gauge_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);

    let mut totals = vec![
        Span::from("Dibayar "),
        Span::from(paid.to_string()).style(PAID),
        Span::from("   Baki "),
        Span::from(summary.remaining.to_string()).style(PENDING),
    ];
    if let Some(date) = summary.target_date {
        totals.push(Span::from(format!("   Sasaran {date}")).style(DIM));
    }
    Line::from(totals).render(totals_area, buf);

    Gauge::default()
        .gauge_style(PAID)
        .ratio(summary.progress())
        .label(format!(
            "{}/{} Minggu",
            summary.paid_weeks, summary.target_weeks
        ))
        .render(gauge_area, buf);
}
