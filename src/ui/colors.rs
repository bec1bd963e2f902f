use ratatui::style::Color;

pub(crate) const PURE_WHITE: Color = Color::Rgb(255, 255, 255);
pub(crate) const DISABLED: Color = Color::DarkGray;
