//! Network backend: runs on its own thread with a Tokio runtime and talks
//! to the board server over HTTP. The UI never blocks on the network; it
//! sends `BackendAction`s in and drains `GuiEvent`s out.

use crossbeam_channel::{Receiver, Sender};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::time::Instant;

use crate::clipboard::{self, ClipboardContent, SystemClipboard};
use crate::protocol::{
    Attachment, AttachmentKind, BackendAction, GuiEvent, LastUpdate, Message, MessageList,
};
use crate::view::DEFAULT_UPLOAD_NAME;

/// Result of one poll cycle: the marker to carry forward, and the fresh
/// message list when the board actually changed.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub marker: i64,
    pub messages: Option<Vec<Message>>,
}

/// Check the board's update marker and fetch the message list only when it
/// moved past `last_seen`. The marker is opaque to the client apart from
/// the strictly-greater comparison, so second- and nanosecond-resolution
/// servers both work.
pub async fn poll_once(
    client: &reqwest::Client,
    base_url: &str,
    last_seen: i64,
) -> Result<PollOutcome, String> {
    let update: LastUpdate = client
        .get(format!("{}/last-update", base_url))
        .send()
        .await
        .map_err(|e| format!("Update check failed: {}", e))?
        .json()
        .await
        .map_err(|e| format!("Bad /last-update response: {}", e))?;

    if update.last_update > last_seen {
        let list: MessageList = client
            .get(format!("{}/messages", base_url))
            .send()
            .await
            .map_err(|e| format!("Message fetch failed: {}", e))?
            .json()
            .await
            .map_err(|e| format!("Bad /messages response: {}", e))?;
        Ok(PollOutcome {
            marker: update.last_update,
            messages: Some(list.messages),
        })
    } else {
        Ok(PollOutcome {
            marker: last_seen,
            messages: None,
        })
    }
}

/// GET a resource and return its body bytes (used for image copies and
/// inline previews).
async fn fetch_bytes(client: &reqwest::Client, url: String) -> Result<Vec<u8>, String> {
    let resp = client.get(&url).send().await.map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let bytes = resp.bytes().await.map_err(|e| e.to_string())?;
    Ok(bytes.to_vec())
}

/// POST a message as a multipart form. The `message` text field is always
/// present (possibly empty), matching what the server expects; at most one
/// binary part rides along.
async fn post_message(
    client: &reqwest::Client,
    base_url: &str,
    text: &str,
    attachment: Option<Attachment>,
) -> Result<reqwest::StatusCode, String> {
    let mut form = reqwest::multipart::Form::new().text("message", text.to_string());
    if let Some(att) = attachment {
        let part = reqwest::multipart::Part::bytes(att.bytes).file_name(att.filename);
        form = form.part(att.kind.field_name(), part);
    }

    let resp = client
        .post(format!("{}/message", base_url))
        .multipart(form)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    Ok(resp.status())
}

async fn delete_message(
    client: &reqwest::Client,
    base_url: &str,
    id: &str,
) -> Result<(), String> {
    let resp = client
        .post(format!("{}/delete/{}", base_url, id))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", resp.status()))
    }
}

async fn delete_all(client: &reqwest::Client, base_url: &str) -> Result<(), String> {
    let resp = client
        .post(format!("{}/delete_all", base_url))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", resp.status()))
    }
}

/// Run an upload and report the outcome. Returns true when the board
/// should be re-polled right away (any 2xx result).
async fn handle_post(
    client: &reqwest::Client,
    base_url: &str,
    text: &str,
    attachment: Option<Attachment>,
    event_tx: &Sender<GuiEvent>,
) -> bool {
    match post_message(client, base_url, text, attachment).await {
        Ok(status) if status.is_success() => {
            let _ = event_tx.send(GuiEvent::UploadFinished {
                success: true,
                detail: "Message posted".to_string(),
            });
            true
        }
        Ok(status) => {
            let _ = event_tx.send(GuiEvent::UploadFinished {
                success: false,
                detail: format!("Upload failed: HTTP {}", status),
            });
            false
        }
        Err(e) => {
            let _ = event_tx.send(GuiEvent::UploadFinished {
                success: false,
                detail: format!("Upload failed: {}", e),
            });
            false
        }
    }
}

pub fn run_backend(
    initial_server: String,
    poll_interval: Duration,
    action_rx: Receiver<BackendAction>,
    event_tx: Sender<GuiEvent>,
) {
    // Create a Tokio runtime for this thread
    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = event_tx.send(GuiEvent::Error(format!(
                "Failed to create Tokio runtime: {}",
                e
            )));
            return;
        }
    };

    rt.block_on(async move {
        // No request timeouts: a hung request stalls only its own poll
        // cycle, and the next scheduled cycle is the retry mechanism.
        let client = reqwest::Client::new();

        let mut base_url = initial_server;
        // Last-observed update marker, owned here rather than at process
        // scope. Starts at zero so the first poll always fetches.
        let mut marker: i64 = 0;
        let mut next_poll = Instant::now();

        loop {
            // Check for actions from the UI (non-blocking)
            while let Ok(action) = action_rx.try_recv() {
                match action {
                    BackendAction::SetServer(url) => {
                        base_url = url;
                        marker = 0;
                        next_poll = Instant::now();
                    }

                    BackendAction::Refresh => {
                        next_poll = Instant::now();
                    }

                    BackendAction::Post { text, attachment } => {
                        if handle_post(&client, &base_url, &text, attachment, &event_tx).await {
                            next_poll = Instant::now();
                        }
                    }

                    BackendAction::PostFromClipboard => {
                        match clipboard::read_system_clipboard() {
                            Ok(ClipboardContent::Text(text)) => {
                                if handle_post(&client, &base_url, &text, None, &event_tx).await {
                                    next_poll = Instant::now();
                                }
                            }
                            Ok(ClipboardContent::ImagePng(png)) => {
                                let attachment = Attachment {
                                    kind: AttachmentKind::Image,
                                    filename: DEFAULT_UPLOAD_NAME.to_string(),
                                    bytes: png,
                                };
                                if handle_post(&client, &base_url, "", Some(attachment), &event_tx)
                                    .await
                                {
                                    next_poll = Instant::now();
                                }
                            }
                            Ok(ClipboardContent::Empty) => {
                                let _ = event_tx
                                    .send(GuiEvent::Error("Clipboard is empty".to_string()));
                            }
                            Err(e) => {
                                let _ = event_tx.send(GuiEvent::Error(format!(
                                    "Clipboard read failed: {}",
                                    e
                                )));
                            }
                        }
                    }

                    BackendAction::Delete(id) => {
                        match delete_message(&client, &base_url, &id).await {
                            Ok(()) => next_poll = Instant::now(),
                            Err(e) => {
                                let _ = event_tx
                                    .send(GuiEvent::Error(format!("Delete failed: {}", e)));
                            }
                        }
                    }

                    BackendAction::DeleteAll => match delete_all(&client, &base_url).await {
                        Ok(()) => next_poll = Instant::now(),
                        Err(e) => {
                            let _ =
                                event_tx.send(GuiEvent::Error(format!("Clear failed: {}", e)));
                        }
                    },

                    BackendAction::Copy(node) => {
                        let mut sink = SystemClipboard;
                        let outcome = clipboard::copy_node(node.as_ref(), &mut sink, |url| {
                            fetch_bytes(&client, url)
                        })
                        .await;
                        let _ = event_tx.send(GuiEvent::CopyFinished(outcome));
                    }

                    BackendAction::FetchImage { id, url } => {
                        match fetch_bytes(&client, url).await {
                            Ok(bytes) => {
                                let _ = event_tx.send(GuiEvent::ImageFetched { id, bytes });
                            }
                            Err(error) => {
                                let _ =
                                    event_tx.send(GuiEvent::ImageFetchFailed { id, error });
                            }
                        }
                    }

                    BackendAction::Shutdown => return,
                }
            }

            // Scheduled poll. Mutations above pull `next_poll` forward so
            // the board refreshes right after a local change.
            if Instant::now() >= next_poll {
                match poll_once(&client, &base_url, marker).await {
                    Ok(outcome) => {
                        marker = outcome.marker;
                        if let Some(messages) = outcome.messages {
                            let _ = event_tx.send(GuiEvent::MessagesUpdated(messages));
                        }
                    }
                    Err(e) => {
                        let _ = event_tx.send(GuiEvent::Error(e));
                    }
                }
                next_poll = Instant::now() + poll_interval;
            }

            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    });
}
