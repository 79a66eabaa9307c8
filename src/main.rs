use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

mod app;
mod clinic;
mod config;
mod conversation;
mod gateway;
mod handler;
mod prompt;
mod route;
mod session;
mod tui;
mod ui;

use app::App;
use clinic::{InMemoryAppointmentBook, StaticDoctorDirectory, StaticRecordArchive};
use config::{ApiCredential, Config};
use gateway::AiGateway;
use route::Route;
use session::PlaceholderIdentity;

#[tokio::main]
async fn main() -> Result<()> {
    // Optional start path, e.g. `remedy /records`. Unknown paths land on
    // the not-found screen rather than erroring out.
    let path_arg = std::env::args().nth(1);

    init_tracing()?;

    let config = Config::load().unwrap_or_else(|error| {
        tracing::warn!(%error, "config unavailable, using defaults");
        Config::new()
    });

    let start = match path_arg {
        Some(path) => Route::parse(&path),
        None => config
            .start_route
            .as_deref()
            .map(Route::parse)
            .unwrap_or(Route::Home),
    };

    // Without a credential every assistant call would fail, so refuse to
    // start before touching the terminal.
    let credential = ApiCredential::from_env()?;
    let gateway = match config.api_base.as_deref() {
        Some(base) => AiGateway::with_base_url(credential, &config.model, base),
        None => AiGateway::new(credential, &config.model),
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.model,
        start = start.path(),
        "starting remedy"
    );

    let mut app = App::new(
        config,
        gateway,
        Box::new(PlaceholderIdentity),
        Box::new(StaticDoctorDirectory::new()),
        Box::new(InMemoryAppointmentBook::new()),
        Box::new(StaticRecordArchive::new()),
        start,
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;
        let event = events.next().await?;
        handler::handle_event(app, event)?;
        // Finished gateway tasks settle between events; the next tick
        // arrives within 300ms, so replies appear without a key press.
        app.poll_replies().await;
    }
    Ok(())
}

/// Diagnostics go to a file. The terminal belongs to the dashboard, so
/// writing log lines to stderr would corrupt the screen.
fn init_tracing() -> Result<()> {
    let path = config::log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = std::fs::File::create(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(config::ENV_LOG_FILTER)
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}
