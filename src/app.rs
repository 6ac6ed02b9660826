//! Application state management for Courtside
//!
//! This module contains the main application state: keyboard handling, screen
//! transitions, and the hand-off to the content loaders. Loads run as spawned
//! tasks; the app picks up their published results on every tick, so the render
//! loop never waits on the network.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::cli::StartupConfig;
use crate::data::{Game, Team};
use crate::loader::{ContentLoader, LoadError, LoadResult};

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Scores feed for the selected league
    Games,
    /// Team browser for the selected league
    Teams,
    /// Detail view for a specific team
    TeamDetail(String),
}

/// Progress of opening a team's detail screen
#[derive(Debug, Clone, PartialEq)]
pub enum TeamView {
    /// Searching the configured leagues for the team
    Searching(String),
    /// Team located
    Found(Team),
    /// Lookup failed
    Failed(LoadError),
}

/// Results of spawned work delivered back to the app
#[derive(Debug)]
enum AppEvent {
    /// Final result of a games load cycle
    Games(LoadResult<Game>),
    /// Final result of a teams load cycle
    Teams(LoadResult<Team>),
    /// Outcome of a team lookup
    TeamLookup(String, Result<Team, LoadError>),
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Configured league ids, in display order
    pub leagues: Vec<String>,
    /// Index of the selected league
    pub league_index: usize,
    /// Index of the highlighted row in list views
    pub selected_index: usize,
    /// Latest games result for the selected league
    pub games: LoadResult<Game>,
    /// Latest teams result for the selected league
    pub teams: LoadResult<Team>,
    /// Team shown by the detail view
    pub team_view: Option<TeamView>,
    /// When the selected league's games were last saved to the cache
    pub last_updated: Option<DateTime<Utc>>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating a reload has been requested
    pub reload_requested: bool,
    /// Team id waiting to be looked up
    pub lookup_requested: Option<String>,
    /// Flag to show help overlay
    pub show_help: bool,
    game_loader: Arc<ContentLoader<Game>>,
    team_loader: Arc<ContentLoader<Team>>,
    games_rx: watch::Receiver<LoadResult<Game>>,
    teams_rx: watch::Receiver<LoadResult<Team>>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    /// Creates a new App showing the startup league
    ///
    /// The first load is requested but not started; call [`App::tick`] from
    /// inside the runtime to start it.
    pub fn new(
        game_loader: Arc<ContentLoader<Game>>,
        team_loader: Arc<ContentLoader<Team>>,
        leagues: Vec<String>,
        startup: &StartupConfig,
    ) -> Self {
        let league_index = leagues
            .iter()
            .position(|l| *l == startup.league)
            .unwrap_or(0);
        let league = leagues.get(league_index).cloned().unwrap_or_default();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut app = Self {
            state: AppState::Games,
            leagues,
            league_index,
            selected_index: 0,
            games: LoadResult::idle(league.clone()),
            teams: LoadResult::idle(league),
            team_view: None,
            last_updated: None,
            should_quit: false,
            reload_requested: true,
            lookup_requested: None,
            show_help: false,
            games_rx: game_loader.subscribe(),
            teams_rx: team_loader.subscribe(),
            game_loader,
            team_loader,
            events_tx,
            events_rx,
        };

        if let Some(team_id) = &startup.team {
            app.open_team_by_id(team_id.clone());
        }

        app
    }

    /// The selected league id
    pub fn current_league(&self) -> &str {
        self.leagues
            .get(self.league_index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Number of rows in the current list view
    pub fn row_count(&self) -> usize {
        match self.state {
            AppState::Games => self.games.entities.len(),
            AppState::Teams => self.teams.entities.len(),
            AppState::TeamDetail(_) => 0,
        }
    }

    /// Whether either loader is still fetching the selected league
    pub fn is_loading(&self) -> bool {
        self.games.loading || self.teams.loading
    }

    /// Error to show for the current view, if any
    pub fn current_error(&self) -> Option<&LoadError> {
        match self.state {
            AppState::Games => self.games.error.as_ref(),
            AppState::Teams => self.teams.error.as_ref(),
            AppState::TeamDetail(_) => None,
        }
    }

    /// Looks up a team by id in the current teams result
    pub fn team_by_id(&self, team_id: &str) -> Option<&Team> {
        self.teams.entities.iter().find(|t| t.id == team_id)
    }

    /// Display label for a team id: its abbreviation when known
    pub fn team_label<'a>(&'a self, team_id: &'a str) -> &'a str {
        self.team_by_id(team_id)
            .map(|t| t.abbreviation.as_str())
            .unwrap_or(team_id)
    }

    /// Games of the current league involving `team_id`
    pub fn games_for_team(&self, team_id: &str) -> Vec<&Game> {
        self.games
            .entities
            .iter()
            .filter(|g| g.involves(team_id))
            .collect()
    }

    /// Asks for a new load cycle of the selected league
    pub fn request_reload(&mut self) {
        self.reload_requested = true;
    }

    /// Applies finished work and starts requested work
    ///
    /// Must be called from inside the tokio runtime.
    pub fn tick(&mut self) {
        self.sync();

        if self.reload_requested {
            self.reload_requested = false;
            self.start_loads();
        }
        if let Some(team_id) = self.lookup_requested.take() {
            self.start_lookup(team_id);
        }
    }

    /// Copies the latest results into the app
    ///
    /// Stage updates come from the loaders' watch channels. Those hold only the
    /// newest value across all leagues, so final results also arrive as events.
    pub fn sync(&mut self) {
        if self.games_rx.has_changed().unwrap_or(false) {
            let latest = self.games_rx.borrow_and_update().clone();
            self.apply_games(latest);
        }

        if self.teams_rx.has_changed().unwrap_or(false) {
            let latest = self.teams_rx.borrow_and_update().clone();
            self.apply_teams(latest);
        }

        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::Games(result) => self.apply_games(result),
                AppEvent::Teams(result) => self.apply_teams(result),
                AppEvent::TeamLookup(team_id, result) => self.apply_lookup(team_id, result),
            }
        }

        self.clamp_selection();
    }

    fn apply_games(&mut self, result: LoadResult<Game>) {
        if result.key != self.current_league() {
            return;
        }
        if !result.loading {
            self.last_updated = self.game_loader.last_updated(&result.key);
        }
        self.games = result;
    }

    fn apply_teams(&mut self, result: LoadResult<Team>) {
        if result.key == self.current_league() {
            self.teams = result;
        }
    }

    fn start_loads(&self) {
        let league = self.current_league().to_string();
        debug!(league = %league, "starting load cycle");

        let games = Arc::clone(&self.game_loader);
        let tx = self.events_tx.clone();
        let key = league.clone();
        tokio::spawn(async move {
            let result = games.load(&key).await;
            let _ = tx.send(AppEvent::Games(result));
        });

        let teams = Arc::clone(&self.team_loader);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = teams.load(&league).await;
            let _ = tx.send(AppEvent::Teams(result));
        });
    }

    fn start_lookup(&self, team_id: String) {
        let loader = Arc::clone(&self.team_loader);
        let leagues = self.leagues.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = loader.find(&team_id, &leagues).await;
            let _ = tx.send(AppEvent::TeamLookup(team_id, result));
        });
    }

    fn apply_lookup(&mut self, team_id: String, result: Result<Team, LoadError>) {
        if self.state != AppState::TeamDetail(team_id) {
            return;
        }

        match result {
            Ok(team) => {
                if let Some(index) = self.leagues.iter().position(|l| *l == team.league) {
                    if index != self.league_index {
                        self.switch_league(index);
                    }
                }
                self.team_view = Some(TeamView::Found(team));
            }
            Err(err) => self.team_view = Some(TeamView::Failed(err)),
        }
    }

    /// Opens the detail view for a team that still has to be located
    pub fn open_team_by_id(&mut self, team_id: String) {
        self.state = AppState::TeamDetail(team_id.clone());
        self.team_view = Some(TeamView::Searching(team_id.clone()));
        self.lookup_requested = Some(team_id);
    }

    fn switch_league(&mut self, index: usize) {
        self.league_index = index;
        let league = self.current_league().to_string();
        self.games = LoadResult::idle(league.clone());
        self.teams = LoadResult::idle(league);
        self.last_updated = None;
        self.selected_index = 0;
        self.request_reload();
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit the application
    /// - `Esc`: Back from team detail, quit from the lists
    /// - `Up`/`k`, `Down`/`j`: Move selection
    /// - `Tab`/`BackTab`: Switch between games and teams
    /// - `Left`/`h`, `Right`/`l`: Previous/next league
    /// - `Enter` (in Teams): Open team details
    /// - `r`: Reload the selected league
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(key_event.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return;
            }
            KeyCode::Char('r') => {
                self.request_reload();
                return;
            }
            _ => {}
        }

        match self.state.clone() {
            AppState::Games | AppState::Teams => self.handle_list_key(key_event.code),
            AppState::TeamDetail(_) => {
                if key_event.code == KeyCode::Esc {
                    self.state = AppState::Teams;
                    self.team_view = None;
                    self.clamp_selection();
                }
            }
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection_down(),
            KeyCode::Tab | KeyCode::BackTab => {
                self.state = if self.state == AppState::Games {
                    AppState::Teams
                } else {
                    AppState::Games
                };
                self.selected_index = 0;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                let count = self.leagues.len();
                if count > 1 {
                    self.switch_league((self.league_index + count - 1) % count);
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let count = self.leagues.len();
                if count > 1 {
                    self.switch_league((self.league_index + 1) % count);
                }
            }
            KeyCode::Enter => {
                if self.state == AppState::Teams {
                    if let Some(team) = self.teams.entities.get(self.selected_index).cloned() {
                        self.state = AppState::TeamDetail(team.id.clone());
                        self.team_view = Some(TeamView::Found(team));
                    }
                }
            }
            _ => {}
        }
    }

    fn move_selection_up(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        self.selected_index = if self.selected_index == 0 {
            count - 1
        } else {
            self.selected_index - 1
        };
    }

    fn move_selection_down(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }

    fn clamp_selection(&mut self) {
        let count = self.row_count();
        if count == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= count {
            self.selected_index = count - 1;
        }
    }
}
