use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_appender::non_blocking::WorkerGuard;
use anyhow::Result;

/// Initializes the logging system for the application
///
/// Logs always go to the console, and additionally to a file when a directory is provided.
/// The log file rotates daily as `iqx-gd.log.{date}` inside that directory.
/// The filter comes from `RUST_LOG` when set, otherwise from `default_level`.
///
/// # Arguments
///
/// * `log_file_path`: An optional directory where the log file should be created
/// * `default_level`: The filter directive used when `RUST_LOG` is not set (e.g. "info")
///
/// # Returns
///
/// * `Ok(Some(WorkerGuard))`: If logging is initialized with a file appender; keep the guard alive to flush the file
/// * `Ok(None)`: If logging is initialized console only
/// * `Err(anyhow::Error)`: If there's an error initializing the logging system
pub fn init_logger(log_file_path: Option<PathBuf>, default_level: &str) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;

    let format = fmt::format()
        .with_timer(fmt::time::LocalTime::rfc_3339())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if let Some(path) = log_file_path {
        std::fs::create_dir_all(&path)?;

        let file_appender = RollingFileAppender::new(Rotation::DAILY, path, "iqx-gd.log");

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = fmt::Layer::default()
            .event_format(format.clone())
            .with_writer(non_blocking);

        let console_layer = fmt::Layer::default()
            .event_format(format.with_ansi(true))
            .with_writer(std::io::stdout);

        let subscriber = subscriber.with(file_layer).with(console_layer);

        tracing::subscriber::set_global_default(subscriber)?;

        tracing::info!("Logging initialized successfully");
        Ok(Some(guard))
    } else {
        let console_layer = fmt::Layer::default()
            .event_format(format.with_ansi(true))
            .with_writer(std::io::stdout);

        let subscriber = subscriber.with(console_layer);
        tracing::subscriber::set_global_default(subscriber)?;

        tracing::info!("Logging initialized successfully (console only)");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_logging_writes_a_daily_rotated_file() {
        let dir = tempfile::tempdir().unwrap();
        let guard = init_logger(Some(dir.path().to_path_buf()), "info").unwrap();
        assert!(guard.is_some());
        tracing::info!("door settled");
        drop(guard);

        let names: Vec<String> = std::fs::read_dir(dir.path()).unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1, "{:?}", names);
        assert!(names[0].starts_with("iqx-gd.log."), "{:?}", names);

        let contents = std::fs::read_to_string(dir.path().join(&names[0])).unwrap();
        assert!(contents.contains("door settled"));
    }
}
