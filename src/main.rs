mod app;
mod color;
mod config;
mod data;
mod session;
mod state;
mod ui;

use anyhow::Context;
use app::SiteViewerApp;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let workdir = std::env::current_dir().context("resolving working directory")?;
    let config = config::load_config(&workdir)?;
    if config.uses_default_password() {
        log::warn!(
            "Using the built-in password; set [credentials] in {}",
            config::CONFIG_FILE_NAME
        );
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Site Data Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(SiteViewerApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("running the viewer: {e}"))
}
