//! ECG Desktop Application - parameter-driven waveform with sweep display

mod app;
mod ui;

use anyhow::Context;
use app::EcgApp;
use ecg_simulation::EngineConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn load_config() -> anyhow::Result<EngineConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(EngineConfig::default());
    };

    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    let config = EngineConfig::from_json(&json)
        .with_context(|| format!("Invalid config file {}", path))?;

    info!(%path, "Loaded engine config");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    info!(
        duration = config.simulation.duration_seconds,
        rate = config.simulation.sampling_rate,
        step = config.reveal.step_size,
        "Starting ECG desktop"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 760.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ECG Simulator",
        options,
        Box::new(move |cc| {
            let app = EcgApp::new(config, cc.egui_ctx.clone())?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run native app: {}", e))?;

    Ok(())
}
