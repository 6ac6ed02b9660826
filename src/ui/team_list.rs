//! Team list screen rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::Team;

const HINTS: [(&str, &str); 5] = [
    ("↑/↓", "Navigate"),
    ("Enter", "Details"),
    ("Tab", "Scores"),
    ("r", "Refresh"),
    ("?", "Help"),
];

/// Color for a winning percentage
fn record_color(pct: Option<f64>) -> Color {
    match pct {
        Some(p) if p >= 0.6 => Color::Green,
        Some(p) if p >= 0.4 => Color::Yellow,
        Some(_) => Color::Red,
        None => Color::Gray,
    }
}

/// Winning percentage in the usual ".833" form
pub(crate) fn format_percentage(pct: Option<f64>) -> String {
    match pct {
        Some(p) if p >= 1.0 => "1.000".to_string(),
        Some(p) => format!(".{:03}", (p * 1000.0).round() as u32),
        None => "  -- ".to_string(),
    }
}

/// Renders the team list for the selected league
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    super::render_header(frame, chunks[0], app, "COURTSIDE");
    render_teams(frame, app, chunks[1]);
    super::render_status(frame, chunks[2], app, &HINTS);
}

fn render_teams(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" {} Teams ", app.current_league()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.teams.entities.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        super::render_empty(frame, inner, app, "teams");
        return;
    }

    let lines: Vec<Line> = app
        .teams
        .entities
        .iter()
        .enumerate()
        .map(|(index, team)| team_line(team, index == app.selected_index))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn team_line<'a>(team: &Team, is_selected: bool) -> Line<'a> {
    let cursor = if is_selected { "\u{25B8} " } else { "  " };
    let name_style = if is_selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let pct = team.win_percentage();

    Line::from(vec![
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
        Span::styled(format!("{:<5}", team.abbreviation), Style::default().fg(Color::Yellow)),
        Span::styled(format!("{:<28}", team.display_name()), name_style),
        Span::raw(format!("{:>3}-{:<3} ", team.wins, team.losses)),
        Span::styled(format_percentage(pct), Style::default().fg(record_color(pct))),
    ])
}
