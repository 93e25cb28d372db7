//! User-facing notices (the toast layer).
//!
//! The pipeline reports outcomes the user should see through a
//! [`Notifier`]; diagnostics go to the `log` facade instead.

use std::fmt;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    /// ANSI escape code used by [`ConsoleNotifier`].
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Info => "\x1b[1;34m",
            Self::Success => "\x1b[1;32m",
            Self::Warning => "\x1b[1;33m",
            Self::Error => "\x1b[1;31m",
        }
    }
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Sink for user-facing notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn info(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Info, message));
    }

    fn success(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Success, message));
    }

    fn warning(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Warning, message));
    }

    fn error(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Error, message));
    }
}

const RESET: &str = "\x1b[0m";

/// Prints notices to stdout with a timestamp and level colour.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier {
    /// Disable ANSI colours (e.g. when stdout is not a terminal).
    pub plain: bool,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain() -> Self {
        Self { plain: true }
    }

    fn format(&self, notice: &Notice, at: DateTime<Local>) -> String {
        let line = format!(
            "[{}][{}]: {}",
            at.format("%Y-%m-%d %H:%M:%S"),
            notice.level,
            notice.message
        );
        if self.plain {
            line
        } else {
            format!("{}{}{}", notice.level.ansi_code(), line, RESET)
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        println!("{}", self.format(&notice, Local::now()));
    }
}

/// Keeps every notice in memory, for embedders that render them later.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
