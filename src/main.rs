#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use crop_sidebar::CropConfig;
use crop_sidebar::app::CropSidebarApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = CropConfig::load().unwrap_or_else(|err| {
        log::error!("{err}, falling back to defaults");
        CropConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Crop Sidebar")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Crop Sidebar",
        options,
        Box::new(|cc| Ok(Box::new(CropSidebarApp::new(cc, config)))),
    )
}
