//! Team detail screen rendering
//!
//! Shows a team's record and its games in the current league. Teams opened
//! with `--team` are located first, so the screen also covers the lookup
//! in progress and a failed lookup.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::team_list::format_percentage;
use crate::app::{App, TeamView};
use crate::data::Team;
use crate::loader::LoadError;

const HINTS: [(&str, &str); 3] = [("Esc", "Back"), ("r", "Refresh"), ("?", "Help")];

/// Renders the detail screen for `team_id`
pub fn render(frame: &mut Frame, app: &App, team_id: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(5), // Team summary
            Constraint::Min(3),    // Games
            Constraint::Length(1),
        ])
        .split(frame.area());

    super::render_header(frame, chunks[0], app, "COURTSIDE");

    // Prefer the newest copy from the teams list over the one captured on open
    let team = app.team_by_id(team_id).or(match &app.team_view {
        Some(TeamView::Found(team)) => Some(team),
        _ => None,
    });

    match (team, &app.team_view) {
        (Some(team), _) => {
            render_summary(frame, chunks[1], team);
            render_schedule(frame, app, chunks[2], team);
        }
        (None, Some(TeamView::Failed(err))) => render_message(
            frame,
            chunks[1].union(chunks[2]),
            &failure_text(team_id, err),
            Color::Red,
        ),
        (None, _) => render_message(
            frame,
            chunks[1].union(chunks[2]),
            &format!("Looking up {} across {} leagues...", team_id, app.leagues.len()),
            Color::Cyan,
        ),
    }

    super::render_status(frame, chunks[3], app, &HINTS);
}

fn failure_text(team_id: &str, err: &LoadError) -> String {
    match err {
        LoadError::NotFound(_) => format!("No team with id '{}' in any league", team_id),
        other => format!("Couldn't look up '{}': {}", team_id, other),
    }
}

fn render_message(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}

fn render_summary(frame: &mut Frame, area: Rect, team: &Team) {
    let lines = vec![
        Line::from(vec![
            Span::styled(
                team.display_name(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(team.abbreviation.clone(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(format!("League: {}", team.league)),
        Line::from(format!(
            "Record: {}-{} ({})",
            team.wins,
            team.losses,
            format_percentage(team.win_percentage()).trim()
        )),
    ];

    let block = Block::default()
        .title(" Team ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_schedule(frame: &mut Frame, app: &App, area: Rect, team: &Team) {
    let block = Block::default()
        .title(" Games ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let games = app.games_for_team(&team.id);
    if games.is_empty() {
        let text = if app.games.loading {
            "Loading games..."
        } else {
            "No games scheduled"
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let lines: Vec<Line> = games
        .iter()
        .map(|game| {
            let (venue, opponent) = if game.home == team.id {
                ("vs", &game.away)
            } else {
                ("@ ", &game.home)
            };
            Line::from(vec![
                Span::raw(format!("  {} ", venue)),
                Span::styled(
                    format!("{:<8}", app.team_label(opponent)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:^11}", game.score_line()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    game.starts_at.format("%b %d").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::ui::test_support::{create_test_app, render_to_string, sample_games, sample_teams};

    fn detail_app(team_view: TeamView) -> App {
        let mut app = create_test_app();
        app.state = AppState::TeamDetail("bos".to_string());
        app.team_view = Some(team_view);
        app
    }

    #[test]
    fn test_found_team_shows_record_and_games() {
        let teams = sample_teams();
        let mut app = detail_app(TeamView::Found(teams.entities[0].clone()));
        app.games = sample_games();
        app.teams = teams;

        let content = render_to_string(|frame| render(frame, &app, "bos"));

        assert!(content.contains("Boston Celtics"));
        assert!(content.contains("Record: 10-2 (.833)"));
        assert!(content.contains("LAL"), "Opponent label");
        assert!(content.contains("NYK"));
        assert!(content.contains("102 - 99"));
    }

    #[test]
    fn test_searching_message() {
        let app = detail_app(TeamView::Searching("bos".to_string()));

        let content = render_to_string(|frame| render(frame, &app, "bos"));

        assert!(content.contains("Looking up bos across 2 leagues"));
    }

    #[test]
    fn test_not_found_message() {
        let app = detail_app(TeamView::Failed(LoadError::NotFound("bos".to_string())));

        let content = render_to_string(|frame| render(frame, &app, "bos"));

        assert!(content.contains("No team with id 'bos'"));
    }

    #[test]
    fn test_network_failure_message() {
        let app = detail_app(TeamView::Failed(LoadError::NetworkFailure(
            "offline".to_string(),
        )));

        let content = render_to_string(|frame| render(frame, &app, "bos"));

        assert!(content.contains("Couldn't look up 'bos'"));
        assert!(content.contains("offline"));
    }

    #[test]
    fn test_team_without_games() {
        let teams = sample_teams();
        let app = detail_app(TeamView::Found(teams.entities[0].clone()));

        let content = render_to_string(|frame| render(frame, &app, "bos"));

        assert!(content.contains("No games scheduled"));
    }
}
