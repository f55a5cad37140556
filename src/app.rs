//! Application shell: owns the state, the backend channels, and the
//! eframe update loop, including the global drop/paste/copy handling.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use eframe::egui;

use crate::backend::run_backend;
use crate::config::{load_settings, save_settings, Settings};
use crate::events::process_events;
use crate::protocol::{Attachment, AttachmentKind, BackendAction, GuiEvent};
use crate::state::{ClientState, UploadState};
use crate::ui::compose::{render_compose, ComposeEvent, ComposeState};
use crate::ui::messages::{render_messages, MessageEvent};
use crate::ui::toasts::render_status_toasts;
use crate::validation;
use crate::view::ContentNode;

pub struct PasteboardApp {
    pub settings: Settings,
    pub state: ClientState,
    pub compose: ComposeState,

    // Channels for backend communication
    pub action_tx: Sender<BackendAction>,
    pub event_rx: Receiver<GuiEvent>,

    // Decoded preview textures, pruned when the view list changes
    textures: HashMap<String, egui::TextureHandle>,
    textures_generation: u64,

    // Settings dialog
    show_settings: bool,
    show_activity: bool,
    settings_draft_url: String,
    settings_error: Option<String>,
}

impl PasteboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings = load_settings().unwrap_or_default();

        // Create channels for UI <-> Backend
        let (action_tx, action_rx) = unbounded::<BackendAction>();
        let (event_tx, event_rx) = unbounded::<GuiEvent>();

        // Spawn the backend thread
        let server = settings.server_url.clone();
        let interval = Duration::from_secs(settings.poll_interval_secs.max(1));
        thread::spawn(move || {
            run_backend(server, interval, action_rx, event_tx);
        });

        let mut state = ClientState::new();
        state.log_info(format!("Watching board at {}", settings.server_url));

        Self {
            settings_draft_url: settings.server_url.clone(),
            settings,
            state,
            compose: ComposeState::default(),
            action_tx,
            event_rx,
            textures: HashMap::new(),
            textures_generation: 0,
            show_settings: false,
            show_activity: false,
            settings_error: None,
        }
    }

    /// Send a post to the backend and flip the upload indicator.
    fn submit_post(&mut self, text: String, attachment: Option<Attachment>) {
        self.state.upload = UploadState::InFlight;
        let _ = self.action_tx.send(BackendAction::Post { text, attachment });
    }

    fn handle_compose_events(&mut self, events: Vec<ComposeEvent>) {
        for event in events {
            match event {
                ComposeEvent::Send => {
                    let has_attachment = self.compose.attachment.is_some();
                    match validation::validate_compose(&self.compose.text, has_attachment) {
                        Ok(()) => {
                            let text = self.compose.text.clone();
                            let attachment = self.compose.attachment.take();
                            self.compose.clear();
                            self.submit_post(text, attachment);
                        }
                        Err(reason) => {
                            self.state.push_toast(reason);
                        }
                    }
                }
                ComposeEvent::ClearBoard => {
                    let _ = self.action_tx.send(BackendAction::DeleteAll);
                    self.state.log_info("Requested board clear");
                }
            }
        }
    }

    fn handle_message_events(&mut self, events: Vec<MessageEvent>) {
        for event in events {
            match event {
                MessageEvent::Copy(index) => {
                    if let Some(view) = self.state.views.get(index) {
                        let node = view.copy_target().clone();
                        // The rich-copy path highlights its message until
                        // the outcome event releases it
                        if matches!(node, ContentNode::RenderedMarkup { .. }) {
                            self.state.copying = Some(view.message.id.clone());
                        }
                        let _ = self.action_tx.send(BackendAction::Copy(Some(node)));
                    }
                }
                MessageEvent::Delete(id) => {
                    let _ = self.action_tx.send(BackendAction::Delete(id));
                }
                MessageEvent::Toggle(index) => {
                    if let Some(view) = self.state.views.get_mut(index) {
                        view.toggle(&self.settings.server_url);
                    }
                }
            }
        }
    }

    /// Ctrl+C with no widget focused copies the newest message instead of
    /// relying on the platform's default (empty) copy.
    fn handle_focus_copy(&mut self) {
        let node = self
            .state
            .newest_view()
            .map(|view| view.copy_target().clone());
        if let Some(ContentNode::RenderedMarkup { .. }) = &node {
            self.state.copying = self
                .state
                .newest_view()
                .map(|view| view.message.id.clone());
        }
        let _ = self.action_tx.send(BackendAction::Copy(node));
    }

    /// Files dropped onto the window: images post immediately (one message
    /// per file), everything else is staged as the compose attachment.
    fn handle_dropped_files(&mut self, dropped: Vec<egui::DroppedFile>) {
        for file in dropped {
            let filename = file
                .path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| {
                    if file.name.is_empty() {
                        "dropped.bin".to_string()
                    } else {
                        file.name.clone()
                    }
                });

            let bytes = match (&file.bytes, &file.path) {
                (Some(bytes), _) => bytes.to_vec(),
                (None, Some(path)) => match std::fs::read(path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        self.state
                            .push_toast(format!("Could not read {}: {}", filename, e));
                        continue;
                    }
                },
                (None, None) => continue,
            };

            let kind = validation::attachment_kind(&filename, &bytes);
            let attachment = Attachment {
                kind,
                filename,
                bytes,
            };

            if kind == AttachmentKind::Image {
                self.submit_post(String::new(), Some(attachment));
            } else {
                self.state
                    .push_toast(format!("Attached {}", attachment.filename));
                self.compose.attachment = Some(attachment);
            }
        }
    }

    /// Global input: drops, paste capture, and the focus-copy shortcut.
    fn handle_global_input(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            self.handle_dropped_files(dropped);
        }

        // Shortcuts stand down while any widget (compose box, a text
        // selection) owns keyboard focus.
        let nothing_focused = ctx.memory(|m| m.focused().is_none());
        if !nothing_focused || self.compose.has_focus {
            return;
        }

        let (copy_pressed, paste_pressed, pasted_text) = ctx.input(|i| {
            let copy = i.modifiers.command && i.key_pressed(egui::Key::C);
            let paste = i.modifiers.command && i.key_pressed(egui::Key::V);
            let text = i.events.iter().find_map(|e| match e {
                egui::Event::Paste(text) if !text.trim().is_empty() => Some(text.clone()),
                _ => None,
            });
            (copy, paste, text)
        });

        if copy_pressed {
            self.handle_focus_copy();
        }

        if let Some(text) = pasted_text {
            // Text paste outside the compose box posts straight to the board
            self.submit_post(text, None);
        } else if paste_pressed {
            // No text in the paste event: likely an image on the clipboard
            self.state.upload = UploadState::InFlight;
            let _ = self.action_tx.send(BackendAction::PostFromClipboard);
        }
    }

    fn render_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading("Pasteboard");
                ui.label(
                    egui::RichText::new(&self.settings.server_url)
                        .size(12.0)
                        .color(egui::Color32::from_gray(140)),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Settings").clicked() {
                        self.settings_draft_url = self.settings.server_url.clone();
                        self.settings_error = None;
                        self.show_settings = !self.show_settings;
                    }
                    if ui.button("Activity").clicked() {
                        self.show_activity = !self.show_activity;
                    }
                    if ui.button("Refresh").clicked() {
                        let _ = self.action_tx.send(BackendAction::Refresh);
                    }
                });
            });
            ui.add_space(4.0);
        });
    }

    fn render_settings_window(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }

        let mut open = self.show_settings;
        let mut apply = false;
        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Board server URL:");
                ui.text_edit_singleline(&mut self.settings_draft_url);

                if let Some(error) = &self.settings_error {
                    ui.label(
                        egui::RichText::new(error)
                            .size(12.0)
                            .color(egui::Color32::from_rgb(230, 110, 110)),
                    );
                }

                ui.label(
                    egui::RichText::new(format!(
                        "Polling every {} s (edit settings.json to change)",
                        self.settings.poll_interval_secs
                    ))
                    .size(11.0)
                    .color(egui::Color32::from_gray(130)),
                );

                if ui.button("Apply").clicked() {
                    apply = true;
                }
            });

        if apply {
            match validation::validate_server_url(&self.settings_draft_url) {
                Ok(url) => {
                    self.settings.server_url = url.clone();
                    if let Err(e) = save_settings(&self.settings) {
                        self.state.push_toast(format!("Could not save settings: {}", e));
                    }
                    let _ = self.action_tx.send(BackendAction::SetServer(url.clone()));
                    self.state.log_info(format!("Watching board at {}", url));
                    self.settings_error = None;
                    open = false;
                }
                Err(e) => {
                    self.settings_error = Some(e);
                }
            }
        }
        self.show_settings = open;
    }

    fn render_activity_panel(&mut self, ctx: &egui::Context) {
        if !self.show_activity {
            return;
        }
        egui::SidePanel::right("activity_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Activity");
                ui.separator();
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in &self.state.system_log {
                            ui.label(
                                egui::RichText::new(line)
                                    .size(12.0)
                                    .color(egui::Color32::from_gray(170)),
                            );
                        }
                    });
            });
    }
}

impl eframe::App for PasteboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process backend events
        process_events(
            &self.event_rx,
            &self.action_tx,
            &mut self.state,
            &self.settings.server_url,
        );

        // Drop textures for messages that left the board
        if self.textures_generation != self.state.views_generation {
            self.textures_generation = self.state.views_generation;
            let ids: std::collections::HashSet<String> = self
                .state
                .views
                .iter()
                .map(|v| v.message.id.clone())
                .collect();
            self.textures.retain(|id, _| ids.contains(id));
        }

        self.handle_global_input(ctx);

        // Request repaint to keep checking for events
        ctx.request_repaint_after(Duration::from_millis(100));
        // Purge old status messages (toasts) older than 4 seconds
        self.state.purge_old_status_messages(4);

        self.render_top_panel(ctx);
        self.render_activity_panel(ctx);

        let compose_events = render_compose(ctx, &mut self.compose, &self.state.upload);
        self.handle_compose_events(compose_events);

        let mut message_events = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            message_events = render_messages(
                ui,
                &self.state.views,
                &self.state.image_bytes,
                &mut self.textures,
                self.state.copying.as_deref(),
            );
        });
        self.handle_message_events(message_events);

        self.render_settings_window(ctx);
        render_status_toasts(ctx, &self.state.status_messages);
    }
}
