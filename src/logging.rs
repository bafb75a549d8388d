//! Logging setup.
//!
//! The editor owns the terminal, so in TUI mode logs go to
//! `<state>/logs/workflow-builder-<timestamp>.log`. Plain commands log to stderr.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Keeps the background log writer alive; drop it last so buffered lines are flushed
pub struct LoggingHandle {
    pub _guard: Option<WorkerGuard>,
    pub log_file_path: Option<PathBuf>,
}

/// Filter directive for the configured level, `--debug` wins
fn level_directive(config: &Config, debug_override: bool) -> String {
    if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

fn log_file_name(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("workflow-builder-{}.log", now.format("%Y%m%dT%H%M%SZ"))
}

/// Whether logs should go to a file instead of stderr
fn logs_to_file(config: &Config, is_tui_mode: bool) -> bool {
    is_tui_mode && config.logging.to_file
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logging(
    config: &Config,
    is_tui_mode: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let directive =
        std::env::var("RUST_LOG").unwrap_or_else(|_| level_directive(config, debug_override));
    let filter = EnvFilter::new(directive);

    if !logs_to_file(config, is_tui_mode) {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();

        return Ok(LoggingHandle {
            _guard: None,
            log_file_path: None,
        });
    }

    let logs_dir = config.logs_path();
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let file_name = log_file_name(chrono::Utc::now());
    let (writer, guard) = file_writer(&logs_dir, &file_name);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();

    Ok(LoggingHandle {
        _guard: Some(guard),
        log_file_path: Some(logs_dir.join(file_name)),
    })
}

fn file_writer(
    dir: &Path,
    file_name: &str,
) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    let appender = tracing_appender::rolling::never(dir, file_name);
    tracing_appender::non_blocking(appender)
}
