use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use geo_dashboard::config::{self, Config};
use geo_dashboard::models::User;
use geo_dashboard::source::{self, FixtureSource};
use geo_dashboard::ui::{
    dashboard::{handle_input as handle_dashboard_input, render_dashboard, DashboardAction, DashboardScreenState},
    loading::{handle_load_error_input, render_load_error, render_loading, LoadErrorAction},
    sign_in::{handle_input as handle_sign_in_input, render_sign_in, SignInAction, SignInState},
};

/// Terminal dashboard of geolocated projects.
#[derive(Debug, Parser)]
#[command(name = "geo-dashboard", version)]
struct Cli {
    /// JSON fixture with the project records
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Rows added per "load more"
    #[arg(long)]
    page_size: Option<usize>,

    /// Write tracing output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(fixture) = self.fixture {
            config.fixture_path = Some(fixture);
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(log_file) = self.log_file {
            config.log_file = Some(log_file);
        }
    }
}

// Represents the current screen in the app
enum AppScreen {
    Loading(String),
    SignIn,
    LoadError(String),
    Dashboard,
}

// Main application state
struct AppState {
    config: Config,
    source: FixtureSource,
    screen: AppScreen,
    user: Option<User>,
    sign_in_state: Option<SignInState>,
    dashboard_state: Option<DashboardScreenState>,
}

impl AppState {
    fn new(config: Config, source: FixtureSource) -> Self {
        Self {
            config,
            source,
            screen: AppScreen::Loading("Loading...".to_string()),
            user: None,
            sign_in_state: None,
            dashboard_state: None,
        }
    }

    fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.config.tick_rate_ms)
    }

    fn auth_delay(&self) -> Duration {
        Duration::from_millis(self.config.auth_delay_ms)
    }
}

fn init_logging(config: &Config) -> Result<()> {
    // The terminal belongs to the UI, so without a file there is no log output.
    let Some(log_file) = &config.log_file else {
        return Ok(());
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::sync::Mutex::new(file)).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = config::init()?;
    cli.apply(&mut config);
    config.validate()?;

    init_logging(&config)?;
    info!(page_size = config.page_size, fixture = ?config.fixture_path, "starting geo dashboard");

    let source = source::init(&config);

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(config, source);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        error!(error = %err, "dashboard exited with an error");
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    restore_session(terminal, app_state).await?;

    loop {
        // Render current screen
        terminal.draw(|f| match &app_state.screen {
            AppScreen::Loading(message) => render_loading(f, message),
            AppScreen::SignIn => {
                if let Some(state) = &app_state.sign_in_state {
                    render_sign_in(f, state);
                }
            }
            AppScreen::LoadError(message) => render_load_error(f, message),
            AppScreen::Dashboard => {
                if let Some(state) = &mut app_state.dashboard_state {
                    render_dashboard(f, state);
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Loading(_) => false,
            AppScreen::SignIn => handle_sign_in_screen(terminal, app_state).await?,
            AppScreen::LoadError(_) => handle_load_error_screen(terminal, app_state).await?,
            AppScreen::Dashboard => handle_dashboard_screen(app_state)?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn restore_session<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    show_loading(terminal, app_state, "Checking session...")?;

    match app_state.source.logged_in_user().await {
        Some(user) => {
            info!(user = %user.name, "session restored");
            load_dashboard(terminal, app_state, user).await
        }
        None => {
            show_sign_in(app_state);
            Ok(())
        }
    }
}

fn show_loading<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState, message: &str) -> Result<()> {
    app_state.screen = AppScreen::Loading(message.to_string());
    terminal.draw(|f| render_loading(f, message))?;
    Ok(())
}

fn show_sign_in(app_state: &mut AppState) {
    app_state.user = None;
    app_state.dashboard_state = None;
    app_state.sign_in_state = Some(SignInState::new());
    app_state.screen = AppScreen::SignIn;
}

// One-shot fetch; a failure parks the app on the retry screen.
async fn load_dashboard<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState, user: User) -> Result<()> {
    show_loading(terminal, app_state, "Loading projects...")?;
    app_state.user = Some(user.clone());

    match app_state.source.fetch_projects().await {
        Ok(projects) => {
            app_state.dashboard_state = Some(DashboardScreenState::new(user, projects, app_state.config.page_size));
            app_state.sign_in_state = None;
            app_state.screen = AppScreen::Dashboard;
        }
        Err(err) => {
            error!(error = %err, "project load failed");
            app_state.screen = AppScreen::LoadError(err.to_string());
        }
    }

    Ok(())
}

async fn handle_sign_in_screen<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<bool> {
    let delay = app_state.auth_delay();
    if let Some(state) = &mut app_state.sign_in_state {
        match handle_sign_in_input(state)? {
            Some(SignInAction::Exit) => {
                return Ok(true);
            }
            Some(SignInAction::Submit) => {
                state.submitting = true;
                terminal.draw(|f| render_sign_in(f, state))?;
                if let Some(user) = state.submit(delay).await {
                    load_dashboard(terminal, app_state, user).await?;
                }
            }
            Some(SignInAction::Anonymous) => {
                let user = state.sign_in_anonymously();
                load_dashboard(terminal, app_state, user).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_load_error_screen<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<bool> {
    match handle_load_error_input()? {
        Some(LoadErrorAction::Retry) => {
            info!("retrying project load");
            match app_state.user.clone() {
                Some(user) => load_dashboard(terminal, app_state, user).await?,
                None => show_sign_in(app_state),
            }
        }
        Some(LoadErrorAction::SignOut) => show_sign_in(app_state),
        Some(LoadErrorAction::Exit) => return Ok(true),
        None => {}
    }

    Ok(false)
}

fn handle_dashboard_screen(app_state: &mut AppState) -> Result<bool> {
    let tick_rate = app_state.tick_rate();
    if let Some(state) = &mut app_state.dashboard_state {
        match handle_dashboard_input(state, tick_rate)? {
            Some(DashboardAction::Exit) => {
                return Ok(true);
            }
            Some(DashboardAction::SignOut) => {
                info!(user = %state.user().name, "signed out");
                show_sign_in(app_state);
            }
            None => {}
        }
    }

    Ok(false)
}
