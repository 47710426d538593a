// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable console rendering of log events.
//!
//! This is the side channel next to the JSON files, and the fallback sink the
//! writer reports failed records to. Writing to the console never fails the
//! caller.

use std::io::{IsTerminal, Write};

use crate::event::LogEvent;
use crate::level::Level;
use crate::record::format_timestamp;

const RESET: &str = "\x1b[0m";

pub mod codes {
    pub const BLUE: u8 = 34;
    pub const CYAN: u8 = 36;
    pub const GREEN: u8 = 32;
    pub const YELLOW: u8 = 33;
    pub const RED: u8 = 31;
    pub const BG_RED: u8 = 41;
    pub const BG_GREY: u8 = 100;
}

/// Determine if console output should be colored.
///
/// Priority: `NO_COLOR` disables → `COLOR=1` forces → TTY check on stderr.
pub fn should_colorize() -> bool {
    if crate::env::no_color() {
        return false;
    }
    if crate::env::force_color() {
        return true;
    }
    std::io::stderr().is_terminal()
}

/// ANSI code used for a level's label and message.
pub fn level_code(level: Level) -> u8 {
    match level {
        Level::Debug => codes::BG_GREY,
        Level::Info => codes::CYAN,
        Level::Success => codes::GREEN,
        Level::Warning => codes::YELLOW,
        Level::Error => codes::RED,
        Level::Critical => codes::BG_RED,
    }
}

fn paint(code: u8, text: &str) -> String {
    format!("\x1b[{code}m{text}{RESET}")
}

/// Renders events as single lines:
/// `[<timestamp>] [pid:<pid>] [<function>] [<LEVEL>] : <message>`
#[derive(Debug, Clone, Copy)]
pub struct ConsoleFormatter {
    colorize: bool,
}

impl Default for ConsoleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleFormatter {
    /// Formatter that colors according to [`should_colorize`].
    pub fn new() -> Self {
        Self {
            colorize: should_colorize(),
        }
    }

    pub fn plain() -> Self {
        Self { colorize: false }
    }

    pub fn colored() -> Self {
        Self { colorize: true }
    }

    pub fn is_colored(&self) -> bool {
        self.colorize
    }

    pub fn render(&self, event: &LogEvent) -> String {
        let timestamp = format_timestamp(event.timestamp());
        let function = event.call_site().map(|s| s.function.as_str()).unwrap_or("-");
        let level = event.level().as_str();

        if self.colorize {
            let code = level_code(event.level());
            format!(
                "[{}] [pid:{}] [{}] [{}] : {}",
                paint(codes::BLUE, &timestamp),
                event.process_id(),
                function,
                paint(code, level),
                paint(code, event.message()),
            )
        } else {
            format!(
                "[{}] [pid:{}] [{}] [{}] : {}",
                timestamp,
                event.process_id(),
                function,
                level,
                event.message(),
            )
        }
    }

    /// Write the rendered event to stderr, ignoring write errors.
    pub fn emit(&self, event: &LogEvent) {
        self.emit_line(&self.render(event));
    }

    /// Write an arbitrary line to stderr, ignoring write errors.
    pub fn emit_line(&self, line: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
    }
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
