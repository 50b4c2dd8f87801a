//! The user-facing log stream.
//!
//! Every line the application reports about its progress goes through a [LogSink]. The
//! binary writes to stdout with [StdoutSink]; tests capture lines with [MemorySink].

use nu_ansi_term::Color;
use std::{
    fmt,
    io::{self, IsTerminal, Write},
};

/// Severity of a log line.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn color(self) -> Color {
        match self {
            Self::Info => Color::Green,
            Self::Warn => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        })
    }
}

/// A destination for severity-tagged log lines.
pub trait LogSink {
    /// Writes a single line with the given severity.
    fn write_line(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.write_line(Level::Info, message)
    }

    fn warn(&self, message: &str) {
        self.write_line(Level::Warn, message)
    }

    fn error(&self, message: &str) {
        self.write_line(Level::Error, message)
    }
}

/// Writes `[LEVEL] message` lines to stdout.
#[derive(Debug, Clone, Copy)]
pub struct StdoutSink {
    /// Whether the level tag is painted.
    colored: bool,
}

impl StdoutSink {
    /// Creates a new [StdoutSink], painting level tags only when stdout is a terminal.
    pub fn new() -> Self {
        Self {
            colored: io::stdout().is_terminal(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StdoutSink {
    fn write_line(&self, level: Level, message: &str) {
        let tag = format!("[{}]", level);
        let tag = if self.colored {
            level.color().bold().paint(tag).to_string()
        } else {
            tag
        };

        // A closed stdout is not worth aborting a push over.
        let _ = writeln!(io::stdout().lock(), "{} {}", tag, message);
    }
}

/// Captures log lines in memory, in the order they were written.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: std::cell::RefCell<Vec<(Level, String)>>,
}

#[cfg(test)]
impl MemorySink {
    /// Returns every captured line.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.borrow().clone()
    }

    /// Returns `true` if a line with `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines
            .borrow()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    /// Renders the captured lines exactly as [StdoutSink] would without color.
    pub fn rendered(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .map(|(level, message)| format!("[{}] {}", level, message))
            .collect()
    }
}

#[cfg(test)]
impl LogSink for MemorySink {
    fn write_line(&self, level: Level, message: &str) {
        self.lines.borrow_mut().push((level, message.to_string()));
    }
}
