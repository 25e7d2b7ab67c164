//! Error types for askpanel
//!
//! Every failure a query can end in, plus the ambient failures of the
//! front-ends (configuration, terminal I/O, window creation).

use thiserror::Error;

/// Main error type for askpanel operations
#[derive(Error, Debug)]
pub enum AskError {
    #[error("Could not reach the answer service: {0}")]
    Transport(String),

    #[error("Answer service returned {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("Malformed response from answer service: {0}")]
    Decode(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GUI error: {0}")]
    Gui(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

/// Result type alias for askpanel operations
pub type Result<T> = std::result::Result<T, AskError>;

impl AskError {
    /// Cancellation is an expected ending, never shown as error text
    pub fn is_cancellation(&self) -> bool {
        matches!(self, AskError::Cancelled)
    }

    /// Classify a reqwest failure that happened before a body was decoded
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            AskError::Timeout(timeout_secs)
        } else if err.is_decode() {
            AskError::Decode(err.to_string())
        } else {
            AskError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AskError {
    fn from(err: serde_json::Error) -> Self {
        AskError::Decode(err.to_string())
    }
}
