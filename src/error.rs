//! Error types for the GreenMind client core.

use thiserror::Error;

/// Errors raised by the scoring pipeline and its service clients.
#[derive(Debug, Error)]
pub enum GreenMindError {
    /// Something the operation depends on is not available yet
    /// (no logged-in user, no current OCEAN score).
    #[error("Missing precondition: {0}")]
    MissingPrecondition(String),

    /// Caller supplied inputs the remote service would reject.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A remote service answered with a non-success status.
    #[error("{service} service error{}: {message}", status_suffix(.status))]
    Service {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration could not be resolved.
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GreenMindError {
    /// Message suitable for a user-facing notice.
    ///
    /// Service errors surface the message the remote service sent back
    /// rather than the full diagnostic string.
    pub fn user_message(&self) -> String {
        match self {
            Self::Service { message, .. } => message.clone(),
            Self::MissingPrecondition(msg) | Self::InvalidInput(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GreenMindError>;
