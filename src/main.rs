mod app;
mod cli;
mod color;
mod state;
mod ui;

use app::EvDashboardApp;
use clap::Parser;
use eframe::egui;

fn main() -> eframe::Result {
    let args = cli::Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    let config = args.into_config();
    log::debug!("start-up config: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "EV Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(EvDashboardApp::new(&config)))),
    )
}
