//! Message list rendering with per-message controls.

use std::collections::HashMap;

use eframe::egui::{self, Color32};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ui::markup;
use crate::view::{ContentNode, DisplayMode, MessageView, UNKNOWN_TYPE_PLACEHOLDER};

/// User interactions collected during one render pass, applied by the app
/// after the pass so rendering itself stays read-only.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageEvent {
    /// Copy the view at this index to the clipboard
    Copy(usize),
    /// Delete the message with this id
    Delete(String),
    /// Flip the raw/rendered view at this index
    Toggle(usize),
}

/// Render the scrollable message list. Returns the interactions to apply.
pub fn render_messages(
    ui: &mut egui::Ui,
    views: &[MessageView],
    image_bytes: &HashMap<String, Result<Vec<u8>, String>>,
    textures: &mut HashMap<String, egui::TextureHandle>,
    copying: Option<&str>,
) -> Vec<MessageEvent> {
    let mut events = Vec::new();

    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            ui.add_space(8.0);

            if views.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.label(
                        egui::RichText::new("The board is empty")
                            .size(14.0)
                            .color(Color32::from_gray(120)),
                    );
                });
            }

            for (index, view) in views.iter().enumerate() {
                render_message(ui, index, view, image_bytes, textures, copying, &mut events);
                ui.add_space(10.0);
            }

            ui.add_space(8.0);
        });

    events
}

fn render_message(
    ui: &mut egui::Ui,
    index: usize,
    view: &MessageView,
    image_bytes: &HashMap<String, Result<Vec<u8>, String>>,
    textures: &mut HashMap<String, egui::TextureHandle>,
    copying: Option<&str>,
    events: &mut Vec<MessageEvent>,
) {
    let highlighted = copying == Some(view.message.id.as_str());
    let stroke = if highlighted {
        egui::Stroke::new(1.5, Color32::from_rgb(110, 170, 255))
    } else {
        egui::Stroke::new(1.0, Color32::from_gray(60))
    };

    egui::Frame::new()
        .fill(Color32::from_gray(25))
        .stroke(stroke)
        .corner_radius(6.0)
        .inner_margin(egui::Margin::symmetric(12, 10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());

            render_node(ui, view, image_bytes, textures);

            ui.add_space(6.0);

            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format_timestamp(view.message.timestamp))
                        .size(11.0)
                        .color(Color32::from_gray(130)),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Delete").clicked() {
                        events.push(MessageEvent::Delete(view.message.id.clone()));
                    }
                    if ui.button("Copy").clicked() {
                        events.push(MessageEvent::Copy(index));
                    }
                    if view.is_markup {
                        let label = match view.mode {
                            DisplayMode::Rendered => "View raw",
                            DisplayMode::Raw => "View rendered",
                        };
                        if ui.button(label).clicked() {
                            events.push(MessageEvent::Toggle(index));
                        }
                    }
                });
            });
        });
}

fn render_node(
    ui: &mut egui::Ui,
    view: &MessageView,
    image_bytes: &HashMap<String, Result<Vec<u8>, String>>,
    textures: &mut HashMap<String, egui::TextureHandle>,
) {
    match &view.node {
        ContentNode::LiteralText { text } => {
            render_literal_text(ui, text);
        }

        ContentNode::RenderedMarkup { sanitized, .. } => {
            markup::render_markup(ui, sanitized);
        }

        ContentNode::Image { url, filename } => {
            match image_bytes.get(&view.message.id) {
                Some(Ok(bytes)) => {
                    if let Some(texture) =
                        preview_texture(ui.ctx(), textures, &view.message.id, bytes)
                    {
                        ui.add(egui::Image::new(&texture).max_width(420.0));
                    } else {
                        render_media_fallback(ui, "Image", url);
                    }
                }
                Some(Err(_)) => {
                    render_media_fallback(ui, "Image", url);
                }
                None => {
                    ui.horizontal(|ui| {
                        ui.add(egui::Spinner::new().size(14.0));
                        ui.label(
                            egui::RichText::new("Loading preview…")
                                .size(12.0)
                                .color(Color32::from_gray(130)),
                        );
                    });
                }
            }
            if let Some(name) = filename {
                ui.label(
                    egui::RichText::new(name)
                        .size(11.0)
                        .color(Color32::from_gray(150)),
                );
            }
        }

        ContentNode::Video { url, filename } => {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("▶").size(16.0));
                let label = filename.as_deref().unwrap_or("Video");
                ui.hyperlink_to(
                    egui::RichText::new(label).size(14.0),
                    url,
                );
            });
            ui.label(
                egui::RichText::new("Opens in your browser or media player")
                    .size(11.0)
                    .color(Color32::from_gray(130)),
            );
        }

        ContentNode::FileLink { url, label } => {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("📎").size(14.0));
                ui.hyperlink_to(egui::RichText::new(label).size(14.0), url);
            });
        }

        ContentNode::Unknown { .. } => {
            ui.label(
                egui::RichText::new(UNKNOWN_TYPE_PLACEHOLDER)
                    .size(13.0)
                    .italics()
                    .color(Color32::from_gray(130)),
            );
        }
    }
}

/// Literal text: monospace block with clickable URLs.
fn render_literal_text(ui: &mut egui::Ui, text: &str) {
    static URL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(https?://[^\s]+)").expect("URL regex pattern is valid"));

    egui::Frame::new()
        .fill(Color32::from_gray(18))
        .corner_radius(4.0)
        .inner_margin(egui::Margin::symmetric(8, 6))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            for line in text.lines() {
                if line.is_empty() {
                    ui.add_space(6.0);
                    continue;
                }
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    for word in line.split_inclusive(char::is_whitespace) {
                        if URL_RE.is_match(word.trim()) {
                            let url = word.trim();
                            ui.hyperlink_to(
                                egui::RichText::new(url).monospace().size(13.0),
                                url,
                            );
                            if word.ends_with(char::is_whitespace) {
                                ui.label(egui::RichText::new(" ").monospace().size(13.0));
                            }
                        } else {
                            ui.label(egui::RichText::new(word).monospace().size(13.0));
                        }
                    }
                });
            }
        });
}

fn render_media_fallback(ui: &mut egui::Ui, what: &str, url: &str) {
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(format!("{} preview unavailable", what))
                .size(12.0)
                .color(Color32::from_gray(130)),
        );
        ui.hyperlink_to(egui::RichText::new("open").size(12.0), url);
    });
}

/// Decode preview bytes into a cached texture, capped to a sane size.
fn preview_texture(
    ctx: &egui::Context,
    textures: &mut HashMap<String, egui::TextureHandle>,
    id: &str,
    bytes: &[u8],
) -> Option<egui::TextureHandle> {
    if let Some(texture) = textures.get(id) {
        return Some(texture.clone());
    }

    let decoded = image::load_from_memory(bytes).ok()?;
    let rgba = decoded.thumbnail(1024, 1024).to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    let texture = ctx.load_texture(format!("msg-{}", id), color_image, egui::TextureOptions::LINEAR);
    textures.insert(id.to_string(), texture.clone());
    Some(texture)
}

/// Local wall-clock rendering of a server timestamp.
fn format_timestamp(timestamp: i64) -> String {
    match chrono::DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => utc
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => format!("t={}", timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_handles_bad_values() {
        // Way out of chrono's range: fall back to the raw value
        let formatted = format_timestamp(i64::MAX);
        assert!(formatted.contains(&i64::MAX.to_string()));
    }

    #[test]
    fn test_format_timestamp_formats_epoch_seconds() {
        let formatted = format_timestamp(1722470400);
        // 2024-08-01 UTC; exact local rendering depends on the timezone
        assert!(formatted.starts_with("2024-"));
    }
}
