//! Key reference overlay

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState};

type Bindings = &'static [(&'static str, &'static str)];

const LIST_KEYS: Bindings = &[
    ("↑/k ↓/j", "Move selection"),
    ("←/h →/l", "Previous/next league"),
    ("Tab", "Switch scores/teams"),
    ("Esc", "Quit"),
];

const TEAMS_KEYS: Bindings = &[("Enter", "Open team details")];

const DETAIL_KEYS: Bindings = &[("Esc", "Back to teams")];

const GLOBAL_KEYS: Bindings = &[
    ("r", "Reload this league"),
    ("?", "Close help"),
    ("q", "Quit"),
];

const OVERLAY_WIDTH: u16 = 46;

/// Sections relevant to the current screen
fn sections(state: &AppState) -> Vec<(&'static str, Bindings)> {
    match state {
        AppState::Games => vec![("Scores", LIST_KEYS), ("Anywhere", GLOBAL_KEYS)],
        AppState::Teams => vec![
            ("Teams", LIST_KEYS),
            ("", TEAMS_KEYS),
            ("Anywhere", GLOBAL_KEYS),
        ],
        AppState::TeamDetail(_) => vec![("Team", DETAIL_KEYS), ("Anywhere", GLOBAL_KEYS)],
    }
}

fn help_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (title, bindings) in sections(&app.state) {
        if !title.is_empty() {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                title,
                Style::default().add_modifier(Modifier::BOLD),
            )));
        }
        lines.extend(bindings.iter().map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!(" {:<10}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        }));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Cached data stays up while updating",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

/// Centers a `width` x `height` box in `area`, shrinking it to fit
fn overlay_area(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Draws the bindings for the current screen over it
pub fn render(frame: &mut Frame, app: &App) {
    let lines = help_lines(app);
    let height = lines.len() as u16 + 2;
    let area = overlay_area(frame.area(), OVERLAY_WIDTH, height);

    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
