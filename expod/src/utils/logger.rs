//! Logging Infrastructure
//!
//! Structured logging for the order engine: console output plus an
//! optional daily-rotated file. Rotated files are deleted once they age
//! past the retention window; `RUST_LOG` overrides the configured level.

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Rotated log files older than this many days are eligible for cleanup.
pub const LOG_RETENTION_DAYS: i64 = 14;

/// File name prefix for rotated files (`expod.YYYY-MM-DD`)
const LOG_FILE_PREFIX: &str = "expod";

/// Initialize console-only logging.
pub fn init_logger(level: &str) -> anyhow::Result<()> {
    init_logger_with_file(level, None)
}

/// Initialize logging with an optional daily-rotated file under `log_dir`.
pub fn init_logger_with_file(level: &str, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if let Some(dir) = log_dir {
        let dir = Path::new(dir);
        fs::create_dir_all(dir)?;

        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(std::sync::Mutex::new(file_appender));

        subscriber.with(file_layer).init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Delete rotated log files older than `retention_days`.
///
/// Matches the daily appender's naming (`expod.YYYY-MM-DD`); anything else
/// in the directory is left alone. Returns the number of files removed.
pub fn cleanup_old_logs(log_dir: &str, retention_days: i64) -> anyhow::Result<usize> {
    use chrono::{Local, NaiveDate, TimeZone};

    let dir = Path::new(log_dir);
    if !dir.exists() {
        return Ok(0);
    }

    let cutoff = Local::now() - chrono::Duration::days(retention_days);
    let mut removed = 0;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date_part) = name
            .strip_prefix(LOG_FILE_PREFIX)
            .and_then(|rest| rest.strip_prefix('.'))
        else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") else {
            continue;
        };
        let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
            continue;
        };
        if let Some(file_day) = Local.from_local_datetime(&midnight).single()
            && file_day < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"log line\n").unwrap();
    }

    #[test]
    fn test_cleanup_removes_only_expired_rotations() {
        let dir = tempfile::tempdir().unwrap();
        let old = (chrono::Local::now() - chrono::Duration::days(30))
            .format("expod.%Y-%m-%d")
            .to_string();
        let fresh = chrono::Local::now().format("expod.%Y-%m-%d").to_string();
        touch(dir.path(), &old);
        touch(dir.path(), &fresh);
        touch(dir.path(), "unrelated.txt");

        let removed = cleanup_old_logs(dir.path().to_str().unwrap(), LOG_RETENTION_DAYS).unwrap();

        assert_eq!(removed, 1);
        assert!(!dir.path().join(&old).exists());
        assert!(dir.path().join(&fresh).exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let removed = cleanup_old_logs("/nonexistent/expod-logs", LOG_RETENTION_DAYS).unwrap();
        assert_eq!(removed, 0);
    }
}
