//! Log setup: stderr plus a per-session file.
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Setup logging to both stderr and file
///
/// `debug` lowers the default level to DEBUG; `RUST_LOG` still wins for
/// anything it names.
pub fn setup_logging(session_id: Option<&str>, log_dir: Option<PathBuf>, debug: bool) -> Result<PathBuf> {
    let log_dir = log_dir.unwrap_or_else(default_log_dir);

    let session_id = match session_id {
        Some(id) => id.to_owned(),
        None => {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or_default();
            format!("session_{}", timestamp)
        }
    };

    let session_log_dir = log_dir.join(&session_id);
    std::fs::create_dir_all(&session_log_dir)
        .with_context(|| format!("Failed to create log directory {}", session_log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "afkzoned.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    // Leak the guard to keep file writer alive
    std::mem::forget(guard);

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/afkzoned.log", session_log_dir.display());

    Ok(session_log_dir)
}

/// Platform cache directory, e.g. `~/.cache/afkzone/logs` on Linux.
fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "afkzone")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/afkzone"))
        .join("logs")
}
