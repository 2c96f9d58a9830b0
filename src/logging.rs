use crate::config::APP_NAME;
use anyhow::Result;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn log_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_local_dir().to_path_buf())
}

/// The form owns the terminal, so interactive runs log to a file.
/// Keep the guard alive until exit or the tail of the log is lost.
pub fn init_file(level: &str) -> Result<Option<WorkerGuard>> {
    let Some(dir) = log_dir() else {
        return Ok(None);
    };
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(&dir, format!("{}.log", APP_NAME));
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter(level))
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(false))
        .try_init()?;

    Ok(Some(guard))
}

/// One-shot runs print the story on stdout, logs go to stderr.
pub fn init_stderr(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter(level))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()?;
    Ok(())
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
