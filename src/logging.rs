//! Client activity log persistence.
//!
//! Writes a line-per-event log of board activity (posts, copies, errors,
//! unknown message types) without blocking the UI thread. Files land in
//! the platform data dir with the structure: logs/YYYY-MM-DD.log

use chrono::Local;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// A log entry to be written to disk
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Logger manages file-based activity logging without blocking the UI thread
pub struct Logger {
    /// Channel to send log entries to the background thread
    tx: Sender<LogEntry>,
}

impl Logger {
    /// Create a new logger and spawn background thread for async I/O
    pub fn new() -> Result<Self, String> {
        let log_dir = get_log_directory()?;

        fs::create_dir_all(&log_dir)
            .map_err(|e| format!("Failed to create log directory: {}", e))?;

        let (tx, rx) = unbounded::<LogEntry>();

        // Spawn background thread for non-blocking I/O
        let log_dir_clone = log_dir.clone();
        thread::spawn(move || {
            run_logger_thread(rx, log_dir_clone);
        });

        Ok(Self { tx })
    }

    /// Log an entry (non-blocking, queued for background writing)
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        // If send fails, the logger thread has stopped - silently ignore
        let _ = self.tx.send(LogEntry {
            level,
            message: message.into(),
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }
}

/// Background thread that handles all file I/O
fn run_logger_thread(rx: Receiver<LogEntry>, log_dir: PathBuf) {
    // Keep the current day's file open; roll over when the date changes
    let mut current: Option<(String, BufWriter<File>)> = None;

    while let Ok(entry) = rx.recv() {
        if let Err(e) = write_log_entry(&mut current, &log_dir, &entry) {
            eprintln!("Logger error: {}", e);
        }
    }

    if let Some((_, mut writer)) = current.take() {
        let _ = writer.flush();
    }
}

/// Write a single log entry to the current day's file
fn write_log_entry(
    current: &mut Option<(String, BufWriter<File>)>,
    log_dir: &std::path::Path,
    entry: &LogEntry,
) -> Result<(), String> {
    let date = Local::now().format("%Y-%m-%d").to_string();

    let needs_reopen = match current {
        Some((open_date, _)) => *open_date != date,
        None => true,
    };

    if needs_reopen {
        if let Some((_, mut writer)) = current.take() {
            let _ = writer.flush();
        }
        let path = log_dir.join(format!("{}.log", date));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| format!("Failed to open log file: {}", e))?;
        *current = Some((date, BufWriter::new(file)));
    }

    let (_, writer) = current
        .as_mut()
        .ok_or_else(|| "log file unavailable".to_string())?;

    // Format: [HH:MM:SS] LEVEL message
    let timestamp = Local::now().format("%H:%M:%S").to_string();
    writeln!(writer, "[{}] {} {}", timestamp, entry.level.as_str(), entry.message)
        .map_err(|e| format!("Failed to write log entry: {}", e))?;

    writer
        .flush()
        .map_err(|e| format!("Failed to flush log: {}", e))?;

    Ok(())
}

/// Get the platform-specific log directory using XDG conventions
fn get_log_directory() -> Result<PathBuf, String> {
    let base = directories::BaseDirs::new().ok_or("Failed to determine home directory")?;

    // Use XDG_DATA_HOME on Linux, equivalent on other platforms
    let data_dir = base.data_dir();
    Ok(data_dir.join("pasteboard-client").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_exists() {
        let result = get_log_directory();
        assert!(result.is_ok());
        let path = result.unwrap();
        assert!(path.to_string_lossy().contains("pasteboard-client"));
    }

    #[test]
    fn test_log_levels_format() {
        assert_eq!(LogLevel::Info.as_str(), "INFO");
        assert_eq!(LogLevel::Warn.as_str(), "WARN");
        assert_eq!(LogLevel::Error.as_str(), "ERROR");
    }
}
