use ratatui::style::{Color, Modifier, Style};

pub const LIGHT_SKY_BLUE: Color = Color::Rgb(0x87, 0xCE, 0xFA);

pub const HIGHLIGHT: Style = Style::new().bg(Color::LightCyan).fg(Color::Black);
pub const BORDER: Style = Style::new().fg(LIGHT_SKY_BLUE);
pub const MONTH: Style = Style::new().fg(Color::LightYellow).add_modifier(Modifier::BOLD);
pub const AMOUNT: Style = Style::new().fg(Color::LightMagenta);
pub const PAID: Style = Style::new().fg(Color::LightGreen);
pub const PENDING: Style = Style::new().fg(Color::LightRed);
pub const HOLIDAY: Style = Style::new().fg(Color::Red);
pub const DIM: Style = Style::new().fg(Color::DarkGray);

/// Confetti colours.
pub const CONFETTI: [Color; 5] = [
    Color::Rgb(0xf4, 0x3f, 0x5e),
    Color::Rgb(0x10, 0xb9, 0x81),
    Color::Rgb(0x3b, 0x82, 0xf6),
    Color::Rgb(0xf5, 0x9e, 0x0b),
    Color::Rgb(0x8b, 0x5c, 0xf6),
];
