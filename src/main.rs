mod app;
mod gui;

use app::SpectralViewApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    log::info!("Starting spectral view demo v{}", env!("CARGO_PKG_VERSION"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Spectral View"),
        ..Default::default()
    };

    eframe::run_native(
        "Spectral View",
        options,
        Box::new(|cc| Ok(Box::new(SpectralViewApp::new(cc)))),
    )
}
