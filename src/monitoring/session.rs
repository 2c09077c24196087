use std::fmt;

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

/// Severity of a user-facing session line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    /// `[HH:MM:SS] LEVEL: message`
    pub fn plain(&self) -> String {
        format!("[{}] {}: {}", self.at.format("%H:%M:%S"), self.level, self.message)
    }
}

/// Lines shown to the user during a session, kept for the session log file.
///
/// Every line is mirrored to `tracing` under the `session` target.
#[derive(Clone, Debug)]
pub struct SessionLog {
    started_at: DateTime<Local>,
    entries: Vec<LogEntry>,
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLog {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            entries: Vec::new(),
        }
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info | LogLevel::Success => {
                info!(target: "session", level = level.as_str(), "{message}")
            }
            LogLevel::Warning => warn!(target: "session", "{message}"),
            LogLevel::Error => error!(target: "session", "{message}"),
        }
        self.entries.push(LogEntry {
            at: Local::now(),
            level,
            message,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.add(LogLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.add(LogLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.add(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.add(LogLevel::Error, message);
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = (LogLevel, String)>) {
        for (level, message) in lines {
            self.add(level, message);
        }
    }

    /// All lines in plain text, newline separated.
    pub fn plain_text(&self) -> String {
        self.entries
            .iter()
            .map(LogEntry::plain)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_carry_level_and_time() {
        let mut log = SessionLog::new();
        log.success("Configuración guardada");
        log.error("Sin conexión a internet");

        let text = log.plain_text();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] SUCCESS: Configuración guardada"));
        assert!(lines[1].ends_with("] ERROR: Sin conexión a internet"));
        assert_eq!(lines[0].find(']'), Some(9));
    }
}
