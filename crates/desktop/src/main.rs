//! Cue Desktop — application entry.

mod app;

use eframe::egui;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 760.0])
            .with_min_inner_size([360.0, 540.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Cue",
        options,
        Box::new(|cc| Box::new(app::CueApp::new(cc))),
    )
}
