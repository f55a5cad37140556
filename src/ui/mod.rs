//! UI rendering modules for the Pasteboard client.
//!
//! This module contains all egui-based UI rendering code, organized by
//! component:
//! - `compose`: Bottom compose panel (text, attachment, send/clear)
//! - `messages`: Message list rendering with per-message controls
//! - `markup`: Sanitized-HTML to styled text rendering
//! - `toasts`: Floating status toasts

pub mod compose;
pub mod markup;
pub mod messages;
pub mod toasts;
