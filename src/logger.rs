use crate::tui::ConsoleWriter;
use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber: console output plus a timestamped log file
/// in `log_dir`. Level defaults to `info` and can be changed with `RUST_LOG`.
/// Returns the path of the log file.
pub fn init(log_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .context(format!("Failed to create log directory: {}", log_dir.display()))?;

    let log_path = log_dir.join(format!("scraper_{}.log", Local::now().format("%Y%m%d_%H%M%S")));
    let log_file = File::create(&log_path)
        .context(format!("Failed to create log file: {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(ConsoleWriter::default),
        )
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .try_init()
        .context("Failed to install logger")?;

    Ok(log_path)
}
