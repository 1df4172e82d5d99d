use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Log directory: `<cache_dir>/papershelf/logs`.
pub fn log_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("papershelf").join("logs"))
}

/// Install a daily rolling file subscriber. Logging goes to a file so it
/// never draws over the terminal UI.
///
/// The returned guard must live until exit or buffered lines are lost.
pub fn init() -> Option<WorkerGuard> {
    let dir = log_dir()?;
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("warning: could not create log directory {}: {e}", dir.display());
        return None;
    }
    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, "papershelf.log"));
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("papershelf_core=info,papershelf_tui=info"));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init();
    if result.is_err() {
        return None;
    }
    Some(guard)
}
