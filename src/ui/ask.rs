/////////
/// Installation type selection
////////
use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::labels::ScreenText;
use crate::screen::{AskScreen, AutoOption, FocusItem, NextPage, Row};

use super::colors::{DISABLED, PURE_WHITE};
use super::common::{
    aligned_summary_area, draw_ask_summary, draw_header, split_main_and_summary, titled_block,
};
use super::{AskAction, AskSummary, NEBULA_ART};

// Installation type screen
pub fn run_installation_ask(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    screen: &mut AskScreen,
) -> Result<AskAction> {
    let prepared = screen.prepare();
    let mut focus = FocusItem::Mode(screen.get_next_page());

    // Main loop for the installation type screen
    loop {
        let summary = build_ask_summary(screen);
        terminal.draw(|f| draw_ask(f.size(), f, screen, &prepared.text, focus, &summary))?;

        // User input
        let timeout = Duration::from_millis(100);
        if event::poll(timeout).context("poll events")? {
            if let Event::Key(key) = event::read().context("read event")? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Up => focus = screen.move_focus(focus, -1),
                    KeyCode::Down => focus = screen.move_focus(focus, 1),
                    KeyCode::Char(' ') => focus = screen.activate(focus),
                    KeyCode::Char('1') => {
                        focus = screen.activate(FocusItem::Mode(NextPage::Automatic))
                    }
                    KeyCode::Char('2') if prepared.show_alongside => {
                        focus = screen.activate(FocusItem::Mode(NextPage::Alongside))
                    }
                    KeyCode::Char('3') => {
                        focus = screen.activate(FocusItem::Mode(NextPage::Advanced))
                    }
                    KeyCode::Enter => return Ok(AskAction::Submit),
                    KeyCode::Esc => return Ok(AskAction::Back),
                    KeyCode::Char('q') | KeyCode::Char('Q')
                        if key.modifiers.contains(KeyModifiers::CONTROL) =>
                    {
                        return Ok(AskAction::Quit)
                    }
                    _ => {}
                }
            }
        }
    }
}

// Summary panel for the current state of the screen
pub fn build_ask_summary(screen: &AskScreen) -> AskSummary {
    let yes_no = |value: bool| if value { "yes" } else { "no" }.to_string();
    let detected = if screen.other_oses().is_empty() {
        "none".to_string()
    } else {
        screen.os_list_str()
    };
    let automatic = screen.options_enabled();
    AskSummary {
        detected: Some(detected),
        alongside: Some(
            if screen.alongside_enabled() {
                "available"
            } else {
                "unavailable"
            }
            .to_string(),
        ),
        mode: Some(screen.get_next_page().partition_mode().as_str().to_string()),
        encryption: automatic.then(|| yes_no(screen.is_checked(AutoOption::Encrypt))),
        lvm: automatic.then(|| yes_no(screen.is_checked(AutoOption::Lvm))),
        home: automatic.then(|| yes_no(screen.is_checked(AutoOption::Home))),
    }
}

fn row_label(text: &ScreenText, item: FocusItem) -> String {
    match item {
        FocusItem::Mode(NextPage::Automatic) => text.automatic_label.clone(),
        FocusItem::Mode(NextPage::Alongside) => text
            .alongside_label
            .clone()
            .unwrap_or_else(|| "Install alongside the existing system".to_string()),
        FocusItem::Mode(NextPage::Advanced) => text.advanced_label.clone(),
        FocusItem::Option(AutoOption::Encrypt) => text.encrypt_label.clone(),
        FocusItem::Option(AutoOption::Lvm) => text.lvm_label.clone(),
        FocusItem::Option(AutoOption::Home) => text.home_label.clone(),
    }
}

fn row_description(text: &ScreenText, item: FocusItem) -> String {
    match item {
        FocusItem::Mode(NextPage::Automatic) => text.automatic_description.clone(),
        FocusItem::Mode(NextPage::Alongside) => {
            text.alongside_description.clone().unwrap_or_default()
        }
        FocusItem::Mode(NextPage::Advanced) => text.advanced_description.clone(),
        FocusItem::Option(AutoOption::Encrypt) => text.encrypt_description.clone(),
        FocusItem::Option(AutoOption::Lvm) => text.lvm_description.clone(),
        FocusItem::Option(AutoOption::Home) => text.home_description.clone(),
    }
}

// "(*)" radio and "[x]" check markers, options indented under automatic
fn row_marker(screen: &AskScreen, item: FocusItem) -> String {
    match item {
        FocusItem::Mode(page) => {
            if screen.get_next_page() == page {
                "(*)".to_string()
            } else {
                "( )".to_string()
            }
        }
        FocusItem::Option(option) => {
            if screen.is_checked(option) {
                "    [x]".to_string()
            } else {
                "    [ ]".to_string()
            }
        }
    }
}

fn row_line(screen: &AskScreen, text: &ScreenText, row: Row) -> Line<'static> {
    let style = if row.enabled {
        Style::default()
    } else {
        Style::default().fg(DISABLED)
    };
    let marker_style = if row.enabled {
        Style::default().fg(Color::Cyan)
    } else {
        style
    };
    Line::from(vec![
        Span::styled(row_marker(screen, row.item), marker_style),
        Span::raw(" "),
        Span::styled(row_label(text, row.item), style),
    ])
}

fn description_lines(
    screen: &AskScreen,
    text: &ScreenText,
    focus: FocusItem,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        row_description(text, focus),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::ITALIC),
    ))];
    if let FocusItem::Mode(page) = focus {
        if let Some(path) = screen.image_for(page) {
            lines.push(Line::from(Span::styled(
                format!("Preview: {}", path.display()),
                Style::default().fg(DISABLED),
            )));
        }
    }
    lines
}

// Installation type screen UI
fn draw_ask(
    area: Rect,
    f: &mut Frame<'_>,
    screen: &AskScreen,
    text: &ScreenText,
    focus: FocusItem,
    summary: &AskSummary,
) {
    let (main_area, summary_area) = split_main_and_summary(area);
    let intro_height = text.introduction.lines().count() as u16;
    // Layout of the main area
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(NEBULA_ART.len() as u16),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Length(intro_height.saturating_add(1)),
            Constraint::Min(8),
            Constraint::Length(6),
        ])
        .split(main_area);

    draw_header(f, layout[0], layout[1], &text.subtitle);

    // Controls box
    let help = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("󰁞/󰁆", Style::default().fg(Color::Cyan)),
            Span::raw(" to move, "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" to choose, "),
            Span::styled("Enter", Style::default().fg(Color::Cyan)),
            Span::raw(" to continue, "),
            Span::styled("Esc", Style::default().fg(Color::Cyan)),
            Span::raw(" to go back."),
        ]),
        Line::from(vec![Span::styled(
            "Encryption, LVM and /home only apply to the first option",
            Style::default().fg(Color::White),
        )]),
    ])
    .block(titled_block("Controls", PURE_WHITE))
    .wrap(Wrap { trim: false });
    f.render_widget(help, layout[3]);

    // Introduction
    let intro_lines: Vec<Line> = text
        .introduction
        .lines()
        .map(|line| {
            Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(PURE_WHITE).add_modifier(Modifier::BOLD),
            ))
        })
        .collect();
    f.render_widget(Paragraph::new(intro_lines), layout[4]);

    // Installation types and their options
    let rows = screen.rows();
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| ListItem::new(row_line(screen, text, *row)))
        .collect();
    let list = List::new(items)
        .block(titled_block("Installation type", Color::Green))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default();
    state.select(rows.iter().position(|row| row.item == focus));
    f.render_stateful_widget(list, layout[5], &mut state);

    // Description of the focused row
    let description = Paragraph::new(description_lines(screen, text, focus))
        .block(titled_block("Info", PURE_WHITE))
        .wrap(Wrap { trim: false });
    f.render_widget(description, layout[6]);

    // Summary on the right side
    let summary_area = aligned_summary_area(summary_area, main_area, layout[3]);
    draw_ask_summary(summary_area, f, summary);
}
