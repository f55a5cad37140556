//! Bottom compose panel: message text, staged attachment, send controls.

use eframe::egui::{self, Color32};

use crate::protocol::Attachment;
use crate::state::UploadState;

/// Compose form state owned by the app.
#[derive(Default)]
pub struct ComposeState {
    pub text: String,
    /// At most one staged attachment per post.
    pub attachment: Option<Attachment>,
    /// Whether the text box had focus last frame; paste capture and the
    /// focus-copy shortcut stand down while the user is typing here.
    pub has_focus: bool,
}

impl ComposeState {
    pub fn clear(&mut self) {
        self.text.clear();
        self.attachment = None;
    }
}

/// Interactions from the compose panel, applied by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeEvent {
    Send,
    ClearBoard,
}

/// Render the compose panel. Returns the interactions to apply.
pub fn render_compose(
    ctx: &egui::Context,
    compose: &mut ComposeState,
    upload: &UploadState,
) -> Vec<ComposeEvent> {
    let mut events = Vec::new();

    egui::TopBottomPanel::bottom("compose_panel")
        .resizable(false)
        .show(ctx, |ui| {
            ui.add_space(6.0);

            // Staged attachment chip
            let mut remove_attachment = false;
            if let Some(att) = &compose.attachment {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "📎 {} ({} KiB)",
                            att.filename,
                            att.bytes.len() / 1024
                        ))
                        .size(12.0)
                        .color(Color32::from_gray(160)),
                    );
                    if ui.small_button("✕").clicked() {
                        remove_attachment = true;
                    }
                });
            }
            if remove_attachment {
                compose.attachment = None;
            }

            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::multiline(&mut compose.text)
                        .desired_rows(2)
                        .desired_width(ui.available_width() - 150.0)
                        .hint_text("Type a message… (Ctrl+Enter to send)"),
                );
                compose.has_focus = response.has_focus();

                let in_flight = *upload == UploadState::InFlight;

                ui.vertical(|ui| {
                    let send_clicked = ui
                        .add_enabled(!in_flight, egui::Button::new("Send"))
                        .clicked();
                    let ctrl_enter = response.has_focus()
                        && ui.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Enter));

                    if (send_clicked || ctrl_enter) && !in_flight {
                        events.push(ComposeEvent::Send);
                    }

                    if ui.button("Clear").clicked() {
                        compose.clear();
                    }

                    if ui
                        .add_enabled(!in_flight, egui::Button::new("Clear board"))
                        .clicked()
                    {
                        events.push(ComposeEvent::ClearBoard);
                    }
                });
            });

            // Upload progress line
            match upload {
                UploadState::InFlight => {
                    ui.horizontal(|ui| {
                        ui.add(egui::Spinner::new().size(12.0));
                        ui.label(
                            egui::RichText::new("Uploading…")
                                .size(12.0)
                                .color(Color32::from_gray(160)),
                        );
                    });
                }
                UploadState::Failed(reason) => {
                    ui.label(
                        egui::RichText::new(reason)
                            .size(12.0)
                            .color(Color32::from_rgb(230, 110, 110)),
                    );
                }
                UploadState::Idle => {}
            }

            ui.add_space(6.0);
        });

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_text_and_attachment() {
        let mut compose = ComposeState {
            text: "draft".into(),
            attachment: Some(Attachment {
                kind: crate::protocol::AttachmentKind::File,
                filename: "notes.pdf".into(),
                bytes: vec![1, 2, 3],
            }),
            has_focus: false,
        };
        compose.clear();
        assert!(compose.text.is_empty());
        assert!(compose.attachment.is_none());
    }
}
