//! Per-message view construction and the raw/rendered toggle.
//!
//! A `MessageView` is the client-side representation of one board message
//! for one render pass. The whole view list is thrown away and rebuilt from
//! server truth on every accepted poll; nothing here survives a refresh, so
//! the view can own its message snapshot outright and the toggle can be a
//! pure function of (mode, snapshot).

use crate::classify::{classify, Classification};
use crate::protocol::{Message, MessageKind};
use crate::sanitize;

/// Filename given to pasted image blobs; used as the "this name carries no
/// information" marker when deciding whether to show a caption.
pub const DEFAULT_UPLOAD_NAME: &str = "image.png";

/// Label for file links whose filename is missing or blank.
const GENERIC_FILE_LABEL: &str = "Download file";

/// Placeholder body for messages whose type the client does not recognize.
pub const UNKNOWN_TYPE_PLACEHOLDER: &str = "Unknown message type";

/// What is currently displayed for one message, and therefore what a copy
/// of that message will act on. Holds data, not UI handles, so the
/// clipboard side stays independent of the widget tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    /// Verbatim text, shown in a monospace block.
    LiteralText { text: String },
    /// Sanitized markup plus its flattened text content.
    RenderedMarkup { sanitized: String, plain: String },
    /// An image resource, previewed inline.
    Image {
        url: String,
        filename: Option<String>,
    },
    /// A video resource; playback is handed off, only metadata shows.
    Video {
        url: String,
        filename: Option<String>,
    },
    /// A downloadable file presented as a link.
    FileLink { url: String, label: String },
    /// Inert placeholder for unrecognized message types.
    Unknown { kind: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Rendered,
    Raw,
}

/// One message's view state for the current render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    /// Snapshot of the server message this view was built from.
    pub message: Message,
    /// Classifier verdict, fixed at creation and never recomputed.
    pub is_markup: bool,
    /// Which side of the raw/rendered duality is showing. Only meaningful
    /// when `is_markup` is true; single-path kinds ignore it.
    pub mode: DisplayMode,
    /// The displayed node; always the copy target.
    pub node: ContentNode,
}

impl MessageView {
    /// The node a clipboard copy of this message acts on.
    pub fn copy_target(&self) -> &ContentNode {
        &self.node
    }

    /// Flip between rendered and raw for markup-classified text.
    ///
    /// The old node is discarded and a fresh one built (markup is
    /// re-sanitized rather than cached) so no partially-applied state can
    /// leak across toggles. No-op for single-path kinds.
    pub fn toggle(&mut self, base_url: &str) {
        if !self.is_markup {
            return;
        }
        self.mode = match self.mode {
            DisplayMode::Rendered => DisplayMode::Raw,
            DisplayMode::Raw => DisplayMode::Rendered,
        };
        self.node = node_for(&self.message, self.is_markup, self.mode, base_url);
    }
}

/// Resolve a possibly server-relative content URL against the board base.
pub fn join_url(base_url: &str, content: &str) -> String {
    if content.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), content)
    } else {
        content.to_string()
    }
}

/// Caption for media nodes; suppressed when the filename is absent, blank,
/// or the meaningless default given to pasted blobs.
fn caption_for(filename: &Option<String>) -> Option<String> {
    match filename {
        Some(name) if !name.trim().is_empty() && name != DEFAULT_UPLOAD_NAME => {
            Some(name.clone())
        }
        _ => None,
    }
}

/// Build the content node for a message in a given display mode. Pure; the
/// toggle and the initial build both go through here.
fn node_for(message: &Message, is_markup: bool, mode: DisplayMode, base_url: &str) -> ContentNode {
    match &message.kind {
        MessageKind::Text => {
            if is_markup && mode == DisplayMode::Rendered {
                let sanitized = sanitize::sanitize(&message.content);
                let plain = sanitize::plain_text(&sanitized);
                ContentNode::RenderedMarkup { sanitized, plain }
            } else {
                ContentNode::LiteralText {
                    text: message.content.clone(),
                }
            }
        }
        MessageKind::Image => ContentNode::Image {
            url: join_url(base_url, &message.content),
            filename: caption_for(&message.filename),
        },
        MessageKind::Video => ContentNode::Video {
            url: join_url(base_url, &message.content),
            filename: caption_for(&message.filename),
        },
        MessageKind::File => {
            let label = match caption_for(&message.filename) {
                Some(name) => name,
                None => GENERIC_FILE_LABEL.to_string(),
            };
            ContentNode::FileLink {
                url: join_url(base_url, &message.content),
                label,
            }
        }
        MessageKind::Unknown(raw) => ContentNode::Unknown { kind: raw.clone() },
    }
}

/// Build the view for a single message. Markup-classified text starts in
/// the rendered state; everything else is single-path.
pub fn build_view(message: &Message, base_url: &str) -> MessageView {
    let is_markup = matches!(message.kind, MessageKind::Text)
        && classify(&message.content) == Classification::Markup;
    let node = node_for(message, is_markup, DisplayMode::Rendered, base_url);
    MessageView {
        message: message.clone(),
        is_markup,
        mode: DisplayMode::Rendered,
        node,
    }
}

/// Rebuild the whole view list from a fresh message list. No error building
/// one view may take down the rest; the per-kind builders are total, with
/// unrecognized kinds degrading to placeholders.
pub fn build_views(messages: &[Message], base_url: &str) -> Vec<MessageView> {
    messages.iter().map(|m| build_view(m, base_url)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://127.0.0.1:5000";

    fn text_message(content: &str) -> Message {
        Message {
            id: "t1".into(),
            kind: MessageKind::Text,
            content: content.into(),
            filename: Some("t1.txt".into()),
            timestamp: 100,
        }
    }

    fn media_message(kind: MessageKind, content: &str, filename: Option<&str>) -> Message {
        Message {
            id: "m1".into(),
            kind,
            content: content.into(),
            filename: filename.map(|f| f.to_string()),
            timestamp: 100,
        }
    }

    #[test]
    fn test_literal_text_has_no_duality() {
        let mut view = build_view(&text_message("just words"), BASE);
        assert!(!view.is_markup);
        assert_eq!(
            view.node,
            ContentNode::LiteralText {
                text: "just words".into()
            }
        );

        // Toggling a non-markup view is a no-op
        let before = view.clone();
        view.toggle(BASE);
        assert_eq!(view, before);
    }

    #[test]
    fn test_markup_starts_rendered() {
        let view = build_view(&text_message("<b>hi</b>"), BASE);
        assert!(view.is_markup);
        assert_eq!(view.mode, DisplayMode::Rendered);
        match &view.node {
            ContentNode::RenderedMarkup { sanitized, plain } => {
                assert!(sanitized.contains("<b>hi</b>"));
                assert_eq!(plain, "hi");
            }
            other => panic!("expected rendered markup, got {:?}", other),
        }
    }

    #[test]
    fn test_toggle_round_trip_restores_raw_payload() {
        let raw = "<b>bold</b> and <i>italic</i>";
        let mut view = build_view(&text_message(raw), BASE);

        view.toggle(BASE);
        assert_eq!(view.mode, DisplayMode::Raw);
        assert_eq!(
            view.node,
            ContentNode::LiteralText { text: raw.into() },
            "raw view must show the payload verbatim"
        );

        view.toggle(BASE);
        assert_eq!(view.mode, DisplayMode::Rendered);
        let again = build_view(&text_message(raw), BASE);
        assert_eq!(view.node, again.node, "re-rendering must be reproducible");
    }

    #[test]
    fn test_relative_urls_resolve_against_base() {
        let view = build_view(
            &media_message(MessageKind::Image, "/image/abc", Some("shot.png")),
            BASE,
        );
        assert_eq!(
            view.node,
            ContentNode::Image {
                url: "http://127.0.0.1:5000/image/abc".into(),
                filename: Some("shot.png".into()),
            }
        );

        // Absolute URLs pass through untouched
        let view = build_view(
            &media_message(MessageKind::Image, "https://cdn.example.com/x.png", None),
            BASE,
        );
        match view.node {
            ContentNode::Image { url, .. } => assert_eq!(url, "https://cdn.example.com/x.png"),
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_default_upload_name_suppresses_caption() {
        let view = build_view(
            &media_message(MessageKind::Image, "/image/p", Some(DEFAULT_UPLOAD_NAME)),
            BASE,
        );
        match view.node {
            ContentNode::Image { filename, .. } => assert_eq!(filename, None),
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_file_label_falls_back_when_unnamed() {
        let view = build_view(&media_message(MessageKind::File, "/file/f", None), BASE);
        assert_eq!(
            view.node,
            ContentNode::FileLink {
                url: "http://127.0.0.1:5000/file/f".into(),
                label: GENERIC_FILE_LABEL.into(),
            }
        );
    }

    #[test]
    fn test_one_node_per_message_including_invalid_kind() {
        let messages = vec![
            text_message("plain"),
            text_message("<p>markup</p>"),
            media_message(MessageKind::Image, "/image/a", Some("a.png")),
            media_message(MessageKind::Video, "/video/b", Some("b.mp4")),
            media_message(MessageKind::File, "/file/c", Some("c.pdf")),
            media_message(MessageKind::Unknown("hologram".into()), "???", None),
        ];

        let views = build_views(&messages, BASE);
        assert_eq!(views.len(), messages.len());
        assert_eq!(
            views[5].node,
            ContentNode::Unknown {
                kind: "hologram".into()
            }
        );
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let messages = vec![
            text_message("<b>x</b>"),
            media_message(MessageKind::Image, "/image/a", Some("a.png")),
        ];
        let first = build_views(&messages, BASE);
        let second = build_views(&messages, BASE);
        assert_eq!(first, second);
    }
}
