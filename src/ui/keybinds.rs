use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::ui::colors::PURE_WHITE;

use super::common::titled_block;

const KEYBINDS: [&str; 3] = [
    "Space selects or toggles",
    "1 2 3 pick a mode",
    "Ctrl + Q quits the installer",
];
const KEYBINDS_KEYS: [&str; 6] = ["Space", "1", "2", "3", "Ctrl", "Q"];

fn styled_keybind_line(line: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for part in line.split_inclusive(' ') {
        let (token, trailing_space) = match part.strip_suffix(' ') {
            Some(token) => (token, " "),
            None => (part, ""),
        };
        if KEYBINDS_KEYS.iter().any(|key| key == &token) {
            spans.push(Span::styled(
                token.to_string(),
                Style::default().fg(Color::Cyan),
            ));
        } else {
            spans.push(Span::raw(token.to_string()));
        }

        if !trailing_space.is_empty() {
            spans.push(Span::raw(trailing_space));
        }
    }

    spans
}

fn keybinds_lines() -> Vec<Line<'static>> {
    KEYBINDS
        .iter()
        .map(|line| Line::from(styled_keybind_line(line)))
        .collect()
}

pub(crate) fn keybinds_height() -> u16 {
    (KEYBINDS.len() as u16).saturating_add(3)
}

pub(crate) fn draw_keybinds(area: Rect, f: &mut Frame<'_>) {
    let keybinds_block = Paragraph::new(keybinds_lines())
        .block(titled_block("Keybinds", PURE_WHITE))
        .wrap(Wrap { trim: false });
    f.render_widget(keybinds_block, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_highlighted() {
        let spans = styled_keybind_line("Ctrl + Q quits the installer");
        let cyan: Vec<&str> = spans
            .iter()
            .filter(|span| span.style.fg == Some(Color::Cyan))
            .map(|span| span.content.as_ref())
            .collect();
        assert_eq!(cyan, vec!["Ctrl", "Q"]);
        let text: String = spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(text, "Ctrl + Q quits the installer");
    }

    #[test]
    fn height_fits_all_lines() {
        assert_eq!(keybinds_height(), KEYBINDS.len() as u16 + 3);
    }
}
