//! Courtside - Live scores, teams and standings in your terminal
//!
//! A terminal UI application that shows games and teams per league. Cached
//! data is displayed immediately and refreshed from the content API in the
//! background.

use std::io;
use std::panic;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use courtside::app::App;
use courtside::cache::{CacheManager, DiskCache, EntityCache, MemoryCache};
use courtside::cli::{Cli, StartupConfig};
use courtside::config::{CacheSettings, Config};
use courtside::data::{ContentClient, Entity, EntitySource, Game, Team};
use courtside::loader::ContentLoader;
use courtside::refresh::{self, RefreshHandle};
use courtside::{logging, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Picks the on-disk cache when allowed and available, memory otherwise
fn build_cache<T>(
    manager: Option<&CacheManager>,
    namespace: &str,
    settings: &CacheSettings,
) -> Arc<dyn EntityCache<T>>
where
    T: Entity + Serialize + DeserializeOwned,
{
    match manager {
        Some(manager) => Arc::new(DiskCache::new(
            manager.clone(),
            namespace,
            settings.ttl(),
            settings.max_stale(),
        )),
        None => Arc::new(MemoryCache::new()),
    }
}

/// Builds the loader for one entity kind from the shared settings
fn build_loader<T: Entity>(
    cache: Arc<dyn EntityCache<T>>,
    source: Arc<dyn EntitySource<T>>,
    config: &Config,
) -> Arc<ContentLoader<T>> {
    Arc::new(
        ContentLoader::new(cache, source)
            .with_retry(config.retry.policy())
            .with_fetch_mode(config.fetch_mode),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Validate everything before touching the terminal
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };
    let startup = match StartupConfig::from_cli(&cli, &config) {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let cache_manager = CacheManager::new();
    match logging::init(cache_manager.as_ref().map(CacheManager::dir)) {
        Ok(Some(path)) => info!(path = %path.display(), "logging started"),
        Ok(None) => {}
        Err(e) => eprintln!("Warning: logging disabled: {}", e),
    }

    let client = match ContentClient::new(&config.api_base_url, config.request_timeout()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let disk = if startup.use_disk_cache {
        if cache_manager.is_none() {
            warn!("no cache directory available, keeping data in memory");
        }
        cache_manager.as_ref()
    } else {
        None
    };
    let game_loader = build_loader::<Game>(
        build_cache(disk, "games", &config.cache),
        Arc::clone(&client) as Arc<dyn EntitySource<Game>>,
        &config,
    );
    let team_loader = build_loader::<Team>(
        build_cache(disk, "teams", &config.cache),
        client as Arc<dyn EntitySource<Team>>,
        &config,
    );

    info!(league = %startup.league, disk_cache = disk.is_some(), "starting courtside");
    let mut app = App::new(game_loader, team_loader, config.leagues.clone(), &startup);
    let mut refresh_handle = RefreshHandle::spawn(config.refresh.refresh_config());

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    loop {
        app.tick();

        // Render UI
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        while refresh::try_recv(&mut refresh_handle).is_some() {
            app.request_reload();
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    refresh_handle.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
