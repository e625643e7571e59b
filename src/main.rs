#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod io;
mod model;
mod services;
mod ui;

use tracing_subscriber::EnvFilter;

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn main() -> eframe::Result<()> {
    let config = config::AppConfig::load();
    init_tracing(&config.log_filter);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 500.0])
            .with_title("Lane Planner"),
        ..Default::default()
    };

    eframe::run_native(
        "Lane Planner",
        options,
        Box::new(move |cc| Ok(Box::new(app::TimelineApp::new(cc, config)?))),
    )
}
