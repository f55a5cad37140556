//! Core application state, separated from UI logic.
//!
//! `ClientState` holds everything that represents the board session: the
//! rebuilt message views, fetched preview bytes, upload progress, toasts,
//! and the system log. UI components receive state as a parameter rather
//! than owning it.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Local;

use crate::logging::Logger;
use crate::view::MessageView;

/// Maximum lines kept in the in-memory system log before trimming
const MAX_SYSTEM_LOG_LINES: usize = 500;

/// Progress of the current compose upload. `Failed` is terminal until the
/// next send attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Idle,
    InFlight,
    Failed(String),
}

/// Core application state for the board client.
pub struct ClientState {
    /// Views for the current message list, newest first. Rebuilt wholesale
    /// on every accepted poll.
    pub views: Vec<MessageView>,

    /// Bumped whenever `views` is rebuilt, so caches keyed on message ids
    /// (e.g. decoded textures) know when to prune.
    pub views_generation: u64,

    /// Fetched image bytes per message id, or the fetch error.
    pub image_bytes: HashMap<String, Result<Vec<u8>, String>>,

    /// Compose upload progress.
    pub upload: UploadState,

    /// Id of the message currently highlighted for a rich copy. Cleared
    /// unconditionally when the copy outcome arrives.
    pub copying: Option<String>,

    /// System log lines (shown in the activity view).
    pub system_log: Vec<String>,

    /// Status toast messages with creation time (auto-expire).
    pub status_messages: Vec<(String, Instant)>,

    /// Activity logger for persisting events to disk.
    pub logger: Option<Logger>,
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientState {
    /// Create a new ClientState with default values.
    pub fn new() -> Self {
        Self {
            views: Vec::new(),
            views_generation: 0,
            image_bytes: HashMap::new(),
            upload: UploadState::Idle,
            copying: None,
            system_log: vec!["Welcome to Pasteboard!".into()],
            status_messages: Vec::new(),
            logger: Logger::new().ok(),
        }
    }

    /// The newest rendered message, the target of the focus-copy shortcut.
    pub fn newest_view(&self) -> Option<&MessageView> {
        self.views.first()
    }

    /// Show a status toast.
    pub fn push_toast(&mut self, message: impl Into<String>) {
        self.status_messages.push((message.into(), Instant::now()));
    }

    /// Append a timestamped line to the system log, trimming old lines.
    pub fn push_log_line(&mut self, line: impl Into<String>) {
        let ts = Local::now().format("%H:%M:%S").to_string();
        self.system_log.push(format!("[{}] {}", ts, line.into()));
        if self.system_log.len() > MAX_SYSTEM_LOG_LINES {
            self.system_log.remove(0);
        }
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        let message = message.into();
        if let Some(logger) = &self.logger {
            logger.info(message.clone());
        }
        self.push_log_line(message);
    }

    pub fn log_warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        if let Some(logger) = &self.logger {
            logger.warn(message.clone());
        }
        self.push_log_line(format!("⚠ {}", message));
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        if let Some(logger) = &self.logger {
            logger.error(message.clone());
        }
        self.push_log_line(format!("✗ {}", message));
    }

    /// Purge status messages older than the given duration.
    pub fn purge_old_status_messages(&mut self, max_age_secs: u64) {
        self.status_messages
            .retain(|(_, created)| created.elapsed().as_secs() < max_age_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_state() -> ClientState {
        // Skip the file logger in tests
        ClientState {
            logger: None,
            ..ClientState::new()
        }
    }

    #[test]
    fn test_new_state_defaults() {
        let state = bare_state();
        assert!(state.views.is_empty());
        assert_eq!(state.upload, UploadState::Idle);
        assert!(state.copying.is_none());
        assert!(state.newest_view().is_none());
    }

    #[test]
    fn test_system_log_is_trimmed() {
        let mut state = bare_state();
        for i in 0..(MAX_SYSTEM_LOG_LINES + 50) {
            state.push_log_line(format!("line {}", i));
        }
        assert!(state.system_log.len() <= MAX_SYSTEM_LOG_LINES);
    }

    #[test]
    fn test_toast_purge() {
        let mut state = bare_state();
        state.push_toast("hello");
        assert_eq!(state.status_messages.len(), 1);
        // Fresh toasts survive a purge with a generous age limit
        state.purge_old_status_messages(60);
        assert_eq!(state.status_messages.len(), 1);
        // A zero age limit purges everything
        state.purge_old_status_messages(0);
        assert!(state.status_messages.is_empty());
    }
}
