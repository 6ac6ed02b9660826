//! Scoreboard screen rendering
//!
//! Renders the games of the selected league: matchup, score and game status.
//! Rows come straight from the latest load result, so cached games stay on
//! screen while a refresh is in flight.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{Game, GameStatus};

/// Key hints shown in the status line
const HINTS: [(&str, &str); 5] = [
    ("↑/↓", "Navigate"),
    ("←/→", "League"),
    ("Tab", "Teams"),
    ("r", "Refresh"),
    ("?", "Help"),
];

/// Status column text for a game
fn status_label(game: &Game) -> String {
    match game.status {
        GameStatus::Scheduled => game
            .starts_at
            .with_timezone(&Local)
            .format("%a %H:%M")
            .to_string(),
        GameStatus::Live => "LIVE".to_string(),
        GameStatus::Final => "FINAL".to_string(),
        GameStatus::Postponed => "PPD".to_string(),
    }
}

/// Color for a game status
fn status_color(status: GameStatus) -> Color {
    match status {
        GameStatus::Scheduled => Color::White,
        GameStatus::Live => Color::Green,
        GameStatus::Final => Color::Gray,
        GameStatus::Postponed => Color::Yellow,
    }
}

/// Renders the scoreboard screen
///
/// Layout: league tabs, the games list, then key hints with load state.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // League tabs
            Constraint::Min(3),    // Games
            Constraint::Length(1), // Status
        ])
        .split(frame.area());

    super::render_header(frame, chunks[0], app, "COURTSIDE");
    render_games(frame, app, chunks[1]);
    super::render_status(frame, chunks[2], app, &HINTS);
}

fn render_games(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" {} Scores ", app.current_league()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.games.entities.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        super::render_empty(frame, inner, app, "games");
        return;
    }

    let lines: Vec<Line> = app
        .games
        .entities
        .iter()
        .enumerate()
        .map(|(index, game)| game_line(app, game, index == app.selected_index))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Format: " ▸ LAL      @ BOS       102 - 99   FINAL"
fn game_line<'a>(app: &App, game: &Game, is_selected: bool) -> Line<'a> {
    let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸ or space
    let team_style = if is_selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let matchup = format!(
        "{:<8} @ {:<8}",
        app.team_label(&game.away),
        app.team_label(&game.home)
    );

    Line::from(vec![
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
        Span::styled(matchup, team_style),
        Span::raw("  "),
        Span::styled(
            format!("{:^11}", game.score_line()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(status_label(game), Style::default().fg(status_color(game.status))),
    ])
}
