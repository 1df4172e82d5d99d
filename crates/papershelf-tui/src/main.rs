use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use papershelf_core::config_file::{self, Settings};
use papershelf_core::{HttpRepository, NoteStore, PaperRepository, SortOrder, ViewMode};

mod action;
mod app;
mod backend;
mod input;
mod logging;
mod theme;
mod tui_event;
mod view;

use app::App;

/// Papershelf: browse, annotate and organise a research paper library from the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the paper server
    #[arg(long)]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Color theme: hacker (default) or modern
    #[arg(long)]
    theme: Option<String>,

    /// Path of the notes file
    #[arg(long)]
    notes: Option<PathBuf>,

    /// Initial sort: dateAdded, publicationDate or title
    #[arg(long)]
    sort: Option<String>,

    /// Initial layout: list, compact or grid
    #[arg(long)]
    view: Option<String>,
}

/// Resolve settings: config file < environment < CLI flags.
fn resolve_settings(
    args: &Args,
    file: &config_file::ConfigFile,
    env_url: Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::from_file(file);

    if let Some(url) = env_url.filter(|u| !u.is_empty()) {
        settings.base_url = url;
    }

    if let Some(url) = &args.url {
        settings.base_url = url.clone();
    }
    if let Some(secs) = args.timeout {
        settings.timeout = Duration::from_secs(secs.max(1));
    }
    if let Some(theme) = &args.theme {
        settings.theme = theme.clone();
    }
    if let Some(path) = &args.notes {
        settings.notes_path = Some(path.clone());
    }
    if let Some(sort) = &args.sort {
        settings.sort = SortOrder::from_key(sort).ok_or_else(|| {
            anyhow::anyhow!("unknown sort order: {sort} (use dateAdded, publicationDate or title)")
        })?;
    }
    if let Some(view) = &args.view {
        settings.view_mode = ViewMode::parse(view)
            .ok_or_else(|| anyhow::anyhow!("unknown view mode: {view} (use list, compact or grid)"))?;
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let settings = resolve_settings(
        &args,
        &config_file::load_config(),
        std::env::var("PAPERSHELF_URL").ok(),
    )?;

    let _log_guard = logging::init();
    tracing::info!(base_url = %settings.base_url, "starting papershelf");

    let repo: Arc<dyn PaperRepository> =
        Arc::new(HttpRepository::new(settings.base_url.clone(), settings.timeout)?);
    let notes = match &settings.notes_path {
        Some(path) => NoteStore::open(path.clone()),
        None => NoteStore::in_memory(),
    };

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let backend_terminal = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_terminal)?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let mut app = App::new(settings);
    app.notes = notes;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<tui_event::BackendCommand>();
    let cancel = CancellationToken::new();

    app.backend_cmd_tx = Some(cmd_tx);
    tokio::spawn(backend::listen(repo, cmd_rx, event_tx, cancel.clone()));

    // Also handle Ctrl+C at the OS level for clean shutdown
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    app.load();

    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| app.view(f))?;

        tokio::select! {
            maybe_event = event_rx.recv() => {
                if let Some(backend_event) = maybe_event {
                    app.handle_backend_event(backend_event);
                    while let Ok(evt) = event_rx.try_recv() {
                        app.handle_backend_event(evt);
                    }
                }
            }
            _ = cancel.cancelled() => {
                app.should_quit = true;
            }
            _ = async {
                if event::poll(tick_rate).unwrap_or(false)
                    && let Ok(evt) = event::read()
                {
                    let action = input::map_event(&evt, &app.input_mode);
                    app.update(action);
                }
            } => {}
        }

        app.update(action::Action::Tick);

        if app.should_quit {
            cancel.cancel();
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    tracing::info!("papershelf stopped");

    Ok(())
}
