//! Tracing setup for the binaries: stdout plus a timestamped file under the
//! configured log directory (`logs/MM_DD_YYYY_HH_MM_SS.log`).

use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

const LOG_FILE_FORMAT: &str = "%m_%d_%Y_%H_%M_%S";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot create log file {}: {1}", .0.display())]
    Io(PathBuf, std::io::Error),
    #[error(transparent)]
    Init(#[from] TryInitError),
}

pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("{}.log", now.format(LOG_FILE_FORMAT))
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info`
/// filter. Returns the log file path when file logging is enabled.
pub fn init(config: &LoggingConfig) -> Result<Option<PathBuf>, LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = fmt::layer().with_target(false);

    let (file_layer, path) = if config.file_logging {
        fs::create_dir_all(&config.dir).map_err(|e| LoggingError::Io(config.dir.clone(), e))?;
        let path = config.dir.join(log_file_name(Local::now()));
        let file = File::create(&path).map_err(|e| LoggingError::Io(path.clone(), e))?;
        let layer = fmt::layer().with_ansi(false).with_writer(Arc::new(file));
        (Some(layer), Some(path))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file_layer)
        .try_init()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name() {
        let t = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(log_file_name(t), "03_07_2024_09_05_01.log");
    }
}
