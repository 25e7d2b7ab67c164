//! askpanel - chat-style query panel for a remote answer service
//!
//! Type a question, send it to an HTTP answer service, and show the answer
//! that comes back. At most one request is in flight per panel, and it can be
//! stopped at any time.
//!
//! # Features
//!
//! - **Single-flight requests**: a new submission supersedes and cancels the old one
//! - **Instant cancellation**: the panel resets immediately; late responses are dropped
//! - **Three front-ends**: desktop window, terminal UI, one-shot CLI
//! - **Layered configuration**: JSON file, environment, command-line flags
//!
//! # Example
//!
//! ```no_run
//! use askpanel::{AnswerClient, AppConfig, ConfigOverrides, QueryController};
//! use std::time::Duration;
//!
//! fn main() -> askpanel::Result<()> {
//!     let config = AppConfig::load(&ConfigOverrides::default())?;
//!     let runtime = tokio::runtime::Runtime::new()?;
//!
//!     let mut controller =
//!         QueryController::new(AnswerClient::new(&config)?, runtime.handle().clone());
//!     controller.submit_query("hello");
//!
//!     while controller.panel().is_pending() {
//!         controller.process_messages_timeout(Duration::from_millis(100));
//!     }
//!
//!     println!("{}", controller.panel().answer());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod gui;
pub mod logging;
pub mod panel;
pub mod service;
pub mod tui;
pub mod worker;

// Re-export main types
pub use config::{AppConfig, ConfigOverrides};
pub use error::{AskError, Result};
pub use panel::{
    ApplyResult, PrimaryAction, PrimaryPress, QueryPanel, RequestId, RequestStats, RequestTicket,
};
pub use service::{AnswerClient, AskRequest, AskResponse, HealthStatus};
pub use worker::{QueryController, WorkerMessage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format bytes as a human-readable string
pub fn format_size(bytes: usize) -> String {
    humansize::format_size(bytes, humansize::DECIMAL)
}

/// Format a request duration for status lines
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 1.0 {
        format!("{} ms", elapsed.as_millis())
    } else {
        format!("{:.1} s", secs)
    }
}

/// Render a metadata value for display; strings lose their quotes
pub fn format_meta_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One-line summary of the last applied request
pub fn request_summary(stats: &RequestStats) -> String {
    format!(
        "#{} {} in {} at {}",
        stats.id,
        format_size(stats.answer_bytes),
        format_elapsed(stats.elapsed),
        stats.finished_at.format("%H:%M:%S")
    )
}
