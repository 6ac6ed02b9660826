//! UI rendering module for Courtside
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components. Screens only read from [`App`];
//! they never trigger loads.

pub mod help_overlay;
pub mod scoreboard;
pub mod team_detail;
pub mod team_list;

use chrono::Utc;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppState};

/// Renders the current view and, when toggled, the help overlay
pub fn render(frame: &mut Frame, app: &App) {
    match &app.state {
        AppState::Games => scoreboard::render(frame, app),
        AppState::Teams => team_list::render(frame, app),
        AppState::TeamDetail(team_id) => team_detail::render(frame, app, team_id),
    }

    if app.show_help {
        help_overlay::render(frame, app);
    }
}

/// Renders the title line with league tabs, the selected league highlighted
pub(crate) fn render_header(frame: &mut Frame, area: Rect, app: &App, title: &str) {
    let mut spans = vec![Span::styled(
        format!("{}  ", title),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    for (i, league) in app.leagues.iter().enumerate() {
        let style = if i == app.league_index {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", league), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Placeholder shown when a list has no rows
///
/// Distinguishes a load in progress, a failed load and a genuinely empty list.
pub(crate) fn render_empty(frame: &mut Frame, area: Rect, app: &App, what: &str) {
    let (text, color) = if let Some(err) = app.current_error() {
        (format!("Couldn't load {}: {}", what, err), Color::Red)
    } else if app.is_loading() {
        (format!("Loading {}...", what), Color::Cyan)
    } else {
        (format!("No {} for {}", what, app.current_league()), Color::DarkGray)
    };

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Data freshness text, e.g. "Data: 5m ago"
pub(crate) fn freshness_text(app: &App) -> Option<String> {
    let last_updated = app.last_updated?;
    let elapsed = Utc::now() - last_updated;
    let mins_ago = elapsed.num_minutes();
    Some(if mins_ago < 1 {
        "Data: just now".to_string()
    } else if mins_ago < 60 {
        format!("Data: {}m ago", mins_ago)
    } else {
        format!("Data: {}h ago", elapsed.num_hours())
    })
}

/// Renders the key hints followed by loading state and data freshness
pub(crate) fn render_status(frame: &mut Frame, area: Rect, app: &App, hints: &[(&str, &str)]) {
    let mut spans = Vec::new();
    for (key, action) in hints {
        spans.push(Span::styled(key.to_string(), Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {}  ", action)));
    }

    if app.is_loading() {
        spans.push(Span::styled(" │ Updating…", Style::default().fg(Color::Cyan)));
    }
    if let Some(freshness) = freshness_text(app) {
        spans.push(Span::styled(
            format!(" │ {}", freshness),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}
