//! Backend event processing: drains `GuiEvent`s into `ClientState`.

use crossbeam_channel::{Receiver, Sender};

use crate::protocol::{BackendAction, GuiEvent, MessageKind};
use crate::state::{ClientState, UploadState};
use crate::view::{self, ContentNode};

/// Process all pending events from the backend.
pub fn process_events(
    event_rx: &Receiver<GuiEvent>,
    action_tx: &Sender<BackendAction>,
    state: &mut ClientState,
    base_url: &str,
) {
    // Drain all pending events from the backend
    while let Ok(event) = event_rx.try_recv() {
        match event {
            GuiEvent::MessagesUpdated(messages) => {
                for msg in &messages {
                    if let MessageKind::Unknown(raw) = &msg.kind {
                        state.log_warn(format!(
                            "Unknown message type '{}' for message {}",
                            raw, msg.id
                        ));
                    }
                }

                state.views = view::build_views(&messages, base_url);
                state.views_generation += 1;
                state.log_info(format!("Board updated ({} messages)", state.views.len()));

                // Drop cached bytes for messages that no longer exist
                let ids: std::collections::HashSet<&str> =
                    messages.iter().map(|m| m.id.as_str()).collect();
                state
                    .image_bytes
                    .retain(|id, _| ids.contains(id.as_str()));
                if let Some(copying) = &state.copying {
                    if !ids.contains(copying.as_str()) {
                        state.copying = None;
                    }
                }

                // Kick off preview fetches for images we haven't seen yet
                for v in &state.views {
                    if let ContentNode::Image { url, .. } = &v.node {
                        if !state.image_bytes.contains_key(&v.message.id) {
                            let _ = action_tx.send(BackendAction::FetchImage {
                                id: v.message.id.clone(),
                                url: url.clone(),
                            });
                        }
                    }
                }
            }

            GuiEvent::UploadFinished { success, detail } => {
                if success {
                    state.upload = UploadState::Idle;
                    state.push_toast(&detail);
                    state.log_info(detail);
                } else {
                    state.upload = UploadState::Failed(detail.clone());
                    state.push_toast(&detail);
                    state.log_error(detail);
                }
            }

            GuiEvent::CopyFinished(outcome) => {
                // Release the copy highlight no matter how the copy went
                state.copying = None;
                state.push_toast(outcome.detail());
                if outcome.is_success() {
                    state.log_info(outcome.detail());
                } else {
                    state.log_error(outcome.detail());
                }
            }

            GuiEvent::ImageFetched { id, bytes } => {
                state.image_bytes.insert(id, Ok(bytes));
            }

            GuiEvent::ImageFetchFailed { id, error } => {
                state.log_warn(format!("Preview fetch failed for {}: {}", id, error));
                state.image_bytes.insert(id, Err(error));
            }

            GuiEvent::Error(msg) => {
                state.push_toast(&msg);
                state.log_error(msg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::CopyOutcome;
    use crate::protocol::Message;
    use crossbeam_channel::unbounded;

    const BASE: &str = "http://127.0.0.1:5000";

    fn bare_state() -> ClientState {
        ClientState {
            logger: None,
            ..ClientState::new()
        }
    }

    fn message(id: &str, kind: &str, content: &str) -> Message {
        Message {
            id: id.into(),
            kind: MessageKind::from(kind),
            content: content.into(),
            filename: None,
            timestamp: 1,
        }
    }

    #[test]
    fn test_messages_updated_rebuilds_views_and_requests_previews() {
        let (event_tx, event_rx) = unbounded();
        let (action_tx, action_rx) = unbounded();
        let mut state = bare_state();

        event_tx
            .send(GuiEvent::MessagesUpdated(vec![
                message("a", "image", "/image/a"),
                message("b", "text", "hi"),
            ]))
            .unwrap();
        process_events(&event_rx, &action_tx, &mut state, BASE);

        assert_eq!(state.views.len(), 2);
        assert_eq!(state.views_generation, 1);

        // Exactly one preview fetch, for the image
        let fetches: Vec<_> = action_rx.try_iter().collect();
        assert_eq!(fetches.len(), 1);
        match &fetches[0] {
            BackendAction::FetchImage { id, url } => {
                assert_eq!(id, "a");
                assert_eq!(url, "http://127.0.0.1:5000/image/a");
            }
            other => panic!("expected FetchImage, got {:?}", other),
        }
    }

    #[test]
    fn test_cached_previews_are_not_refetched() {
        let (event_tx, event_rx) = unbounded();
        let (action_tx, action_rx) = unbounded();
        let mut state = bare_state();
        state.image_bytes.insert("a".into(), Ok(vec![1, 2, 3]));

        event_tx
            .send(GuiEvent::MessagesUpdated(vec![message(
                "a", "image", "/image/a",
            )]))
            .unwrap();
        process_events(&event_rx, &action_tx, &mut state, BASE);

        assert!(action_rx.try_iter().next().is_none());
        assert!(state.image_bytes.contains_key("a"));
    }

    #[test]
    fn test_stale_preview_bytes_are_pruned() {
        let (event_tx, event_rx) = unbounded();
        let (action_tx, _action_rx) = unbounded();
        let mut state = bare_state();
        state.image_bytes.insert("gone".into(), Ok(vec![1]));
        state.copying = Some("gone".into());

        event_tx
            .send(GuiEvent::MessagesUpdated(vec![message("a", "text", "hi")]))
            .unwrap();
        process_events(&event_rx, &action_tx, &mut state, BASE);

        assert!(!state.image_bytes.contains_key("gone"));
        assert!(state.copying.is_none());
    }

    #[test]
    fn test_upload_failure_is_terminal_until_next_send() {
        let (event_tx, event_rx) = unbounded();
        let (action_tx, _action_rx) = unbounded();
        let mut state = bare_state();

        event_tx
            .send(GuiEvent::UploadFinished {
                success: false,
                detail: "Upload failed: HTTP 500".into(),
            })
            .unwrap();
        process_events(&event_rx, &action_tx, &mut state, BASE);

        assert_eq!(
            state.upload,
            UploadState::Failed("Upload failed: HTTP 500".into())
        );
        assert_eq!(state.status_messages.len(), 1);
    }

    #[test]
    fn test_copy_outcome_clears_highlight_and_toasts() {
        let (event_tx, event_rx) = unbounded();
        let (action_tx, _action_rx) = unbounded();
        let mut state = bare_state();
        state.copying = Some("a".into());

        event_tx
            .send(GuiEvent::CopyFinished(CopyOutcome::Failure {
                reason: "Nothing to copy".into(),
            }))
            .unwrap();
        process_events(&event_rx, &action_tx, &mut state, BASE);

        assert!(state.copying.is_none());
        assert_eq!(state.status_messages.len(), 1);
        assert_eq!(state.status_messages[0].0, "Nothing to copy");
    }

    #[test]
    fn test_unknown_kind_logs_a_warning() {
        let (event_tx, event_rx) = unbounded();
        let (action_tx, _action_rx) = unbounded();
        let mut state = bare_state();

        event_tx
            .send(GuiEvent::MessagesUpdated(vec![message("x", "hologram", "?")]))
            .unwrap();
        process_events(&event_rx, &action_tx, &mut state, BASE);

        assert!(state
            .system_log
            .iter()
            .any(|line| line.contains("Unknown message type 'hologram'")));
        // The view itself degrades to a placeholder
        assert_eq!(state.views.len(), 1);
    }
}
