//! Structured logging setup.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_SUBDIR: &str = "chatbot_log";
const LOG_FILE: &str = "chatbot_log.log";

/// Location of the log file under `log_dir`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_SUBDIR).join(LOG_FILE)
}

/// Initialize structured logging with environment-based filtering.
///
/// Events go to stdout and, when `log_dir` is given, are also appended to
/// `<log_dir>/chatbot_log/chatbot_log.log`. The directory is created if it
/// does not exist.
///
/// # Arguments
/// * `log_level` - Optional log level override (e.g., "info", "debug", "error")
/// * `log_dir` - Optional directory for the log file
pub fn init_logging(log_level: Option<&str>, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let filter = if let Some(level) = log_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let file_layer = match log_dir {
        Some(dir) => {
            let path = log_file_path(dir);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            Some(fmt::layer().json().with_ansi(false).with_writer(Arc::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .with(file_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_path_layout() {
        let path = log_file_path(Path::new("logs"));
        assert_eq!(path, Path::new("logs/chatbot_log/chatbot_log.log"));
    }

    #[test]
    fn test_init_creates_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        init_logging(Some("info"), Some(dir.path())).unwrap();

        tracing::info!("log file smoke test");

        let path = log_file_path(dir.path());
        assert!(path.exists());
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("log file smoke test"));
    }
}
