//! File logging for askpanel
//!
//! The terminal and desktop front-ends own stdout, so log output goes to a
//! file: `askpanel.log` next to the executable unless the config names one.
//! The file is truncated on every run.

use crate::config::AppConfig;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::EnvFilter;

/// Path of the active log file, set once by [`init`]
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Default log file name
const LOG_FILE_NAME: &str = "askpanel.log";

/// Longest query prefix written to the log
pub const QUERY_PREVIEW_CHARS: usize = 100;

/// Install the global `tracing` subscriber.
///
/// Returns the log file path, or `None` when the file could not be opened
/// or a subscriber was already installed.
pub fn init(config: &AppConfig) -> Option<PathBuf> {
    if LOG_PATH.get().is_some() {
        return None;
    }

    let log_path = config.log_file.clone().unwrap_or_else(default_log_path);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)
        .ok()?;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .ok()?;

    let _ = LOG_PATH.set(log_path.clone());
    tracing::info!(path = %log_path.display(), "logging initialized");
    Some(log_path)
}

/// The log file chosen by [`init`], if logging is active
pub fn log_path() -> Option<&'static PathBuf> {
    LOG_PATH.get()
}

/// Log file next to the executable
fn default_log_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LOG_FILE_NAME)
}

/// Shorten user text for log lines without splitting a character
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Write a separator line for readability
pub fn separator(label: &str) {
    tracing::info!("========== {} ==========", label);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(preview("hello", 10), "hello");
        assert_eq!(preview("", 3), "");
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        assert_eq!(preview("привет мир", 6), "привет...");
        assert_eq!(preview("abcdef", 3), "abc...");
    }
}
