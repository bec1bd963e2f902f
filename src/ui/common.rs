use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};
use ratatui::Frame;

use crate::ui::colors::PURE_WHITE;

use super::keybinds::{draw_keybinds, keybinds_height};
use super::{AskSummary, NEBULA_ART};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SummaryStatus {
    Pending,
    Done,
}

fn summary_status_style(status: SummaryStatus) -> Style {
    match status {
        SummaryStatus::Pending => Style::default().fg(Color::White),
        SummaryStatus::Done => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    }
}

fn summary_entries(summary: &AskSummary) -> [(&'static str, Option<&str>); 6] {
    [
        ("Detected", summary.detected.as_deref()),
        ("Alongside", summary.alongside.as_deref()),
        ("Mode", summary.mode.as_deref()),
        ("Encryption", summary.encryption.as_deref()),
        ("LVM", summary.lvm.as_deref()),
        ("Separate /home", summary.home.as_deref()),
    ]
}

// Builds the lines of text to be displayed in the summary panel
fn summary_lines(summary: &AskSummary) -> Vec<Line<'_>> {
    let entries = summary_entries(summary);
    let mut lines = Vec::with_capacity(entries.len());

    for (label, value) in entries {
        let status = if value.is_some() {
            SummaryStatus::Done
        } else {
            SummaryStatus::Pending
        };

        let mut spans = Vec::new();
        match (status, value) {
            // Known values show "[OK]" and the value
            (SummaryStatus::Done, Some(value)) => {
                spans.push(Span::styled("[OK]", summary_status_style(status)));
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    format!("{label}:"),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(
                    format!(" {value}"),
                    Style::default().fg(Color::Blue),
                ));
            }
            _ => {
                let style = summary_status_style(SummaryStatus::Pending);
                spans.push(Span::styled("[..]", style));
                spans.push(Span::styled(" ", style));
                spans.push(Span::styled(format!("{label}:"), style));
            }
        }
        lines.push(Line::from(spans));
    }
    lines
}

// Split an area into a main content area and a summary sidebar
pub(crate) fn split_main_and_summary(area: Rect) -> (Rect, Rect) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(74), Constraint::Percentage(26)])
        .split(area);
    (layout[0], layout[1])
}

// Vertically align the summary panel with a widget in the main area
pub(crate) fn aligned_summary_area(summary_area: Rect, main_area: Rect, anchor: Rect) -> Rect {
    let offset = anchor.y.saturating_sub(main_area.y);
    Rect {
        x: summary_area.x,
        y: summary_area.y.saturating_add(offset),
        width: summary_area.width,
        height: summary_area.height.saturating_sub(offset),
    }
}

// Bordered box with a "[ Title ]" header
pub(crate) fn titled_block(title: &str, title_color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Black))
        .padding(Padding::new(1, 0, 1, 0))
        .title(Line::from(vec![
            Span::styled("[", Style::default().fg(Color::Black)),
            Span::styled(
                format!(" {title} "),
                Style::default().fg(title_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled("]", Style::default().fg(Color::Black)),
        ]))
}

// Nebula ASCII art followed by the "/- Step -/" title
pub(crate) fn draw_header(f: &mut Frame<'_>, art_area: Rect, title_area: Rect, title: &str) {
    let art_lines: Vec<Line> = NEBULA_ART
        .iter()
        .map(|line| {
            Line::from(Span::styled(
                *line,
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ))
        })
        .collect();
    let art = Paragraph::new(art_lines).block(Block::default());
    f.render_widget(art, art_area);

    let title = Line::from(vec![
        Span::raw("/- "),
        Span::styled(
            title.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" -/"),
    ]);
    let title_block = Paragraph::new(title).block(Block::default());
    f.render_widget(title_block, title_area);
}

// Renders the summary widget in a given area
pub(crate) fn draw_ask_summary(area: Rect, f: &mut Frame<'_>, summary: &AskSummary) {
    let lines = summary_lines(summary);
    // 2 for borders + 1 for top padding
    let summary_height = (lines.len() as u16).saturating_add(3);
    let summary_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(summary_height),
            Constraint::Length(keybinds_height()),
            Constraint::Min(0),
        ])
        .split(area);
    let block = Paragraph::new(lines)
        .block(titled_block("Summary", PURE_WHITE))
        .wrap(Wrap { trim: false });
    f.render_widget(block, summary_layout[0]);
    draw_keybinds(summary_layout[1], f);
}
