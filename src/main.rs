use anyhow::{Context, anyhow, bail};
use beatfx::config::VisualizerConfig;
use beatfx::consts;
use beatfx::gui::{AppState, RunSummary};
use log::{debug, error, info};
use std::sync::{Arc, Mutex};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting up...");

    let config = VisualizerConfig::default();
    config.validate().context("invalid configuration")?;
    debug!(
        "Config loaded: sample_rate={}, block_size={}, queue={}, patterns={}",
        config.sample_rate, config.block_size, config.queue_capacity, config.total_patterns
    );

    let summary = Arc::new(Mutex::new(RunSummary::default()));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(consts::WINDOW_SIZE)
            .with_title("BeatFX"),
        ..Default::default()
    };

    debug!("Launching GUI...");
    let app_summary = summary.clone();
    eframe::run_native(
        "BeatFX audio visualizer",
        options,
        Box::new(move |_cc| Ok(Box::new(AppState::new(config, app_summary)))),
    )
    .map_err(|e| anyhow!("window error: {e}"))?;

    let summary = summary
        .lock()
        .map_err(|_| anyhow!("run summary lock poisoned"))?
        .clone();

    if summary.elapsed_secs > 0.0 {
        info!("Frames rendered: {}", summary.frames_rendered);
        info!("Elapsed: {:.1}s", summary.elapsed_secs);
        info!(
            "Average FPS: {:.1}",
            summary.frames_rendered as f64 / summary.elapsed_secs
        );
    }

    if let Some(failure) = summary.failure {
        error!("{failure}");
        bail!(failure);
    }

    info!("Clean shutdown complete");
    Ok(())
}
