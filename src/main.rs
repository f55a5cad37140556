//! Pasteboard - a desktop client for a self-hosted clipboard board
//!
//! Architecture:
//! - Main thread: runs the egui UI
//! - Backend thread: runs a Tokio runtime for HTTP polling and uploads
//! - Communication via crossbeam channels (lock-free, sync-safe)

use eframe::egui;

use pasteboard_client::app::PasteboardApp;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 640.0])
            .with_min_inner_size([420.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Pasteboard",
        options,
        Box::new(|cc| Ok(Box::new(PasteboardApp::new(cc)))),
    )
}
