use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use time::macros::format_description;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{self, fmt, prelude::*};

const LOG_RETENTION_DAYS: u64 = 7;

/// Get the log directory path in the user-specific OS cache directory
/// - Linux: ~/.cache/openrewrite/lst-js/
/// - macOS: ~/Library/Caches/openrewrite/lst-js/
/// - Windows: %LOCALAPPDATA%\openrewrite\lst-js\
fn get_log_dir() -> io::Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Unable to determine user cache directory"))?;

    let log_dir = cache_dir.join("openrewrite").join("lst-js");
    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)?;
    }
    Ok(log_dir)
}

/// Removes session logs older than LOG_RETENTION_DAYS
fn cleanup_old_logs(log_dir: &Path) -> io::Result<()> {
    let now = std::time::SystemTime::now();
    let retention = std::time::Duration::from_secs(LOG_RETENTION_DAYS * 24 * 60 * 60);

    for entry in fs::read_dir(log_dir)?.flatten() {
        let Ok(metadata) = entry.metadata() else { continue };
        let is_session_log = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with("session-") && name.ends_with(".log"));
        if !metadata.is_file() || !is_session_log {
            continue;
        }
        let expired = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age > retention);
        if expired {
            if let Err(e) = fs::remove_file(entry.path()) {
                eprintln!("Failed to remove old log file {:?}: {}", entry.path(), e);
            }
        }
    }
    Ok(())
}

/// Initialize logging to stderr and, optionally, to a per-session file.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for as long as logging is wanted. It is `None` when file logging is off.
///
/// # Arguments
/// * `no_color` - Disable ANSI colors in stderr output
/// * `log_level` - Override log level (otherwise uses RUST_LOG or defaults to "info")
/// * `enable_file_logging` - Also log at DEBUG level to the cache directory (disable for tests)
///
/// RPC op batches are traced on the `lst_js::wire` target; enable them with
/// `RUST_LOG=lst_js::wire=trace` together with `LstConfig::wire_log`.
pub fn init_logger(no_color: bool, log_level: Option<&str>, enable_file_logging: bool) -> io::Result<Option<WorkerGuard>> {
    let timer = fmt::time::OffsetTime::new(
        UtcOffset::UTC,
        format_description!("[[[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z]"),
    );

    let stderr_filter = match log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_ansi(!no_color)
        .with_filter(stderr_filter);

    if !enable_file_logging {
        return tracing_subscriber::registry()
            .with(stderr_layer)
            .try_init()
            .or_else(already_set)
            .map(|()| None);
    }

    let log_dir = get_log_dir()?;
    cleanup_old_logs(&log_dir)?;

    let timestamp = time::OffsetDateTime::now_utc()
        .format(format_description!("[year][month][day]-[hour][minute][second]"))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let log_path = log_dir.join(format!("session-{}-{}.log", timestamp, std::process::id()));

    let file = fs::OpenOptions::new().create(true).append(true).open(&log_path)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_timer(timer)
        .with_ansi(false)
        .with_filter(tracing_subscriber::EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .or_else(already_set)?;
    eprintln!("Logging to file: {:?}", log_path);
    Ok(Some(guard))
}

/// A subscriber installed earlier (by a host or another test) is not an error.
fn already_set(e: tracing_subscriber::util::TryInitError) -> io::Result<()> {
    let message = e.to_string();
    if message.contains("already been set") || message.contains("SetLoggerError") {
        Ok(())
    } else {
        Err(io::Error::new(io::ErrorKind::Other, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_twice_is_ok() {
        assert!(init_logger(true, Some("warn"), false).unwrap().is_none());
        assert!(init_logger(true, Some("warn"), false).unwrap().is_none());
    }

    #[test]
    fn test_cleanup_ignores_unrelated_files() {
        let dir = std::env::temp_dir().join(format!("lst-js-log-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let keep = dir.join("notes.txt");
        fs::write(&keep, "x").unwrap();
        cleanup_old_logs(&dir).unwrap();
        assert!(keep.exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
