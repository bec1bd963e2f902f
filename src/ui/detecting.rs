/////////
/// Waiting for disk and OS detection
////////
use std::io;

use anyhow::Result;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::ui::colors::PURE_WHITE;

use super::common::{
    aligned_summary_area, draw_ask_summary, draw_header, split_main_and_summary, titled_block,
};
use super::{AskSummary, NEBULA_ART};

pub fn render_detecting(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    spinner: &str,
    status: &str,
    summary: &AskSummary,
) -> Result<()> {
    terminal.draw(|f| draw_detecting(f.size(), f, spinner, status, summary))?;
    Ok(())
}

fn draw_detecting(
    area: Rect,
    f: &mut Frame<'_>,
    spinner: &str,
    status: &str,
    summary: &AskSummary,
) {
    let (main_area, summary_area) = split_main_and_summary(area);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(NEBULA_ART.len() as u16),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .split(main_area);

    draw_header(f, layout[0], layout[1], "Installation Type");

    let lines = vec![Line::from(vec![
        Span::styled(spinner.to_string(), Style::default().fg(Color::Green)),
        Span::raw(" "),
        Span::raw(status.to_string()),
    ])];
    let block = Paragraph::new(lines)
        .block(titled_block("Detecting", PURE_WHITE))
        .wrap(Wrap { trim: false });
    f.render_widget(block, layout[3]);

    let summary_area = aligned_summary_area(summary_area, main_area, layout[3]);
    draw_ask_summary(summary_area, f, summary);
}
