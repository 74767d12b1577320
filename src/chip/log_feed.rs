use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::chip::chip8::constants::{CHIP8_LOG_LINES, CHIP8_LOG_LINE_LEN};

/// A logger that keeps the most recent lines in memory for the log panel,
/// since the terminal belongs to the user interface.
pub struct LogFeed {
    lines: Mutex<VecDeque<String>>,
    capacity: usize,
    line_len: usize,
    level: LevelFilter,
    dirty: AtomicBool,
}

impl LogFeed {
    pub fn new(capacity: usize, line_len: usize, level: LevelFilter) -> Self {
        LogFeed {
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            line_len,
            level,
            dirty: AtomicBool::new(false),
        }
    }

    /// Registers a feed of 18 lines, 64 characters each, as the global
    /// logger.
    pub fn install(level: LevelFilter) -> Result<&'static LogFeed, SetLoggerError> {
        let feed: &'static LogFeed =
            Box::leak(Box::new(LogFeed::new(CHIP8_LOG_LINES, CHIP8_LOG_LINE_LEN, level)));
        log::set_logger(feed)?;
        log::set_max_level(level);
        Ok(feed)
    }

    /// Adds a line, truncating it and dropping the oldest line if full.
    pub fn push(&self, line: &str) {
        let line: String = line.chars().take(self.line_len).collect();
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        if lines.len() == self.capacity {
            lines.pop_back();
        }
        lines.push_front(line);
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// The stored lines, newest first.
    pub fn lines(&self) -> Vec<String> {
        let lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        lines.iter().cloned().collect()
    }

    /// Returns whether lines were added since the last call.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::SeqCst)
    }
}

impl Log for LogFeed {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.push(&record.args().to_string());
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_keeps_most_recent_lines() {
        let feed = LogFeed::new(3, 64, LevelFilter::Info);
        for i in 0..5 {
            feed.push(&format!("line {}", i));
        }
        assert_eq!(feed.lines(), vec!["line 4", "line 3", "line 2"]);
    }

    #[test]
    fn test_truncates_long_lines() {
        let feed = LogFeed::new(3, 4, LevelFilter::Info);
        feed.push("Loading roms/pong.ch8");
        assert_eq!(feed.lines(), vec!["Load"]);
    }

    #[test]
    fn test_dirty_flag() {
        let feed = LogFeed::new(3, 64, LevelFilter::Info);
        assert!(!feed.take_dirty());
        feed.push("hello");
        assert!(feed.take_dirty());
        assert!(!feed.take_dirty());
    }

    #[test]
    fn test_filters_by_level() {
        let feed = LogFeed::new(3, 64, LevelFilter::Info);
        feed.log(
            &Record::builder()
                .args(format_args!("noisy"))
                .level(Level::Debug)
                .build(),
        );
        feed.log(
            &Record::builder()
                .args(format_args!("Invalid ROM"))
                .level(Level::Warn)
                .build(),
        );
        assert_eq!(feed.lines(), vec!["Invalid ROM"]);
    }
}
