//! Logging setup.
//!
//! The console is owned by the renderer while a game runs, so log records go
//! to a file. `RUST_LOG` overrides the default `info` filter.

use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// Append log records to `path`.
///
/// Fails if the file cannot be opened or a logger is already installed.
pub fn init_file_logger(path: &Path) -> Result<()> {
    let file = open_log(path)?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("install logger")?;
    log::debug!("logging to {}", path.display());
    Ok(())
}

fn open_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}
