//! Copying board content to the system clipboard.
//!
//! Every content kind needs a different clipboard primitive: plain text for
//! literal blocks and URLs, an HTML entry (with a text companion) for
//! rendered markup, and a PNG image entry for images. The adapter never
//! panics and never propagates errors; every path resolves to a
//! `CopyOutcome` that the UI turns into a toast.

use std::borrow::Cow;
use std::future::Future;
use std::io::Cursor;

use arboard::{Clipboard, ImageData};

use crate::view::ContentNode;

/// Result of a copy attempt. Both arms carry a one-line human message.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyOutcome {
    Success { detail: String },
    Failure { reason: String },
}

impl CopyOutcome {
    fn success(detail: &str) -> Self {
        CopyOutcome::Success {
            detail: detail.to_string(),
        }
    }

    fn failure(reason: String) -> Self {
        CopyOutcome::Failure { reason }
    }

    /// The toast line for this outcome.
    pub fn detail(&self) -> &str {
        match self {
            CopyOutcome::Success { detail } => detail,
            CopyOutcome::Failure { reason } => reason,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CopyOutcome::Success { .. })
    }
}

/// Capability interface over the platform clipboard. Production uses
/// `SystemClipboard` (arboard); tests use a recording fake.
pub trait ClipboardSink {
    /// Whether rich image entries can be written at all. When false, image
    /// copies fall back to copying the source URL as text.
    fn supports_images(&self) -> bool;
    fn write_text(&mut self, text: &str) -> Result<(), String>;
    /// Write an HTML entry alongside its plain-text rendering.
    fn write_html(&mut self, html: &str, alt: &str) -> Result<(), String>;
    /// Write a PNG-encoded image entry. Callers guarantee PNG bytes.
    fn write_image_png(&mut self, png: &[u8]) -> Result<(), String>;
}

/// The real clipboard. A fresh handle per operation keeps the adapter free
/// of long-lived platform state.
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn supports_images(&self) -> bool {
        true
    }

    fn write_text(&mut self, text: &str) -> Result<(), String> {
        let mut clipboard = Clipboard::new().map_err(|err| err.to_string())?;
        clipboard.set_text(text.to_string()).map_err(|err| err.to_string())
    }

    fn write_html(&mut self, html: &str, alt: &str) -> Result<(), String> {
        let mut clipboard = Clipboard::new().map_err(|err| err.to_string())?;
        clipboard
            .set_html(html.to_string(), Some(alt.to_string()))
            .map_err(|err| err.to_string())
    }

    fn write_image_png(&mut self, png: &[u8]) -> Result<(), String> {
        let (rgba, width, height) = decode_image_rgba(png)?;
        let mut clipboard = Clipboard::new().map_err(|err| err.to_string())?;
        clipboard
            .set_image(ImageData {
                width,
                height,
                bytes: Cow::Owned(rgba),
            })
            .map_err(|err| err.to_string())
    }
}

/// Decode any supported image format into raw RGBA.
fn decode_image_rgba(bytes: &[u8]) -> Result<(Vec<u8>, usize, usize), String> {
    let decoded = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let rgba = decoded.to_rgba8();
    Ok((
        rgba.as_raw().to_vec(),
        rgba.width() as usize,
        rgba.height() as usize,
    ))
}

/// Encode raw RGBA into PNG bytes.
pub fn encode_rgba_png(rgba: &[u8], width: usize, height: usize) -> Result<Vec<u8>, String> {
    let img = image::RgbaImage::from_raw(width as u32, height as u32, rgba.to_vec())
        .ok_or_else(|| "invalid RGBA buffer".to_string())?;
    let dynamic = image::DynamicImage::ImageRgba8(img);
    let mut out = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|err| err.to_string())?;
    Ok(out.into_inner())
}

/// Make sure image bytes are PNG before they hit the clipboard.
///
/// Clipboard image entries are PNG-only; the source format must not be
/// assumed to match. PNG bytes pass through untouched, anything else is
/// decoded to a raster surface and re-encoded. The flag reports whether a
/// transcode happened.
pub fn ensure_png(bytes: Vec<u8>) -> Result<(Vec<u8>, bool), String> {
    match image::guess_format(&bytes) {
        Ok(image::ImageFormat::Png) => Ok((bytes, false)),
        Ok(_) => {
            let decoded = image::load_from_memory(&bytes).map_err(|err| err.to_string())?;
            let mut out = Cursor::new(Vec::new());
            decoded
                .write_to(&mut out, image::ImageFormat::Png)
                .map_err(|err| err.to_string())?;
            Ok((out.into_inner(), true))
        }
        Err(err) => Err(format!("unrecognized image data: {}", err)),
    }
}

/// Copy a content node to the clipboard, choosing a strategy per kind.
///
/// `fetch_bytes` supplies image bytes for the one path that needs them (an
/// async HTTP fetch in production, a canned closure in tests).
pub async fn copy_node<F, Fut>(
    node: Option<&ContentNode>,
    sink: &mut dyn ClipboardSink,
    fetch_bytes: F,
) -> CopyOutcome
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Vec<u8>, String>>,
{
    let node = match node {
        Some(node) => node,
        None => return CopyOutcome::failure("Nothing to copy".to_string()),
    };

    match node {
        ContentNode::LiteralText { text } => match sink.write_text(text) {
            Ok(()) => CopyOutcome::success("Text copied to clipboard!"),
            Err(err) => CopyOutcome::failure(format!("Failed to copy text: {}", err)),
        },

        ContentNode::RenderedMarkup { sanitized, plain } => {
            match sink.write_html(sanitized, plain) {
                Ok(()) => CopyOutcome::success("HTML copied to clipboard!"),
                Err(err) => CopyOutcome::failure(format!("Failed to copy HTML: {}", err)),
            }
        }

        ContentNode::Image { url, .. } => {
            if !sink.supports_images() {
                return match sink.write_text(url) {
                    Ok(()) => CopyOutcome::success("Image URL copied to clipboard!"),
                    Err(err) => {
                        CopyOutcome::failure(format!("Failed to copy image URL: {}", err))
                    }
                };
            }
            let bytes = match fetch_bytes(url.clone()).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    return CopyOutcome::failure(format!("Failed to fetch image: {}", err))
                }
            };
            let (png, _transcoded) = match ensure_png(bytes) {
                Ok(png) => png,
                Err(err) => {
                    return CopyOutcome::failure(format!("Failed to copy image: {}", err))
                }
            };
            match sink.write_image_png(&png) {
                Ok(()) => CopyOutcome::success("Image copied to clipboard!"),
                Err(err) => CopyOutcome::failure(format!("Failed to copy image: {}", err)),
            }
        }

        ContentNode::FileLink { url, .. } => match sink.write_text(url) {
            Ok(()) => CopyOutcome::success("Link copied to clipboard!"),
            Err(err) => CopyOutcome::failure(format!("Failed to copy link: {}", err)),
        },

        ContentNode::Video { url, .. } => match sink.write_text(url) {
            Ok(()) => CopyOutcome::success("Video URL copied to clipboard!"),
            Err(err) => CopyOutcome::failure(format!("Failed to copy video URL: {}", err)),
        },

        ContentNode::Unknown { .. } => {
            CopyOutcome::failure("Unsupported content".to_string())
        }
    }
}

/// What the system clipboard currently holds, for paste capture.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardContent {
    Text(String),
    ImagePng(Vec<u8>),
    Empty,
}

/// Read the system clipboard for paste capture: text wins over images,
/// images come back PNG-encoded, anything else is `Empty`.
pub fn read_system_clipboard() -> Result<ClipboardContent, String> {
    let mut clipboard = Clipboard::new().map_err(|err| err.to_string())?;

    if let Ok(text) = clipboard.get_text() {
        if !text.trim().is_empty() {
            return Ok(ClipboardContent::Text(text));
        }
    }

    if let Ok(img) = clipboard.get_image() {
        let png = encode_rgba_png(&img.bytes, img.width, img.height)?;
        return Ok(ClipboardContent::ImagePng(png));
    }

    Ok(ClipboardContent::Empty)
}
