use crate::audio::audio_stream::CaptureStats;
use crate::state::FrameState;
use eframe::egui;
use std::sync::atomic::Ordering;

/// Debug overlay with the live frame state.
pub fn render_live_monitoring(
    ui: &mut egui::Ui,
    state: &FrameState,
    threshold: f32,
    stats: &CaptureStats,
) {
    render_levels(ui, state);
    ui.add_space(8.0);

    render_beat_info(ui, state, threshold);
    ui.add_space(8.0);

    render_capture_stats(ui, stats);
}

fn render_levels(ui: &mut egui::Ui, state: &FrameState) {
    ui.group(|ui| {
        ui.colored_label(egui::Color32::LIGHT_BLUE, "Levels:");
        egui::Grid::new("levels_grid")
            .num_columns(2)
            .spacing([20.0, 4.0])
            .show(ui, |ui| {
                for (label, value) in [
                    ("Amplitude", state.current_amplitude),
                    ("Smoothed", state.smoothed_amplitude),
                    ("Bass", state.bass_energy),
                    ("Mid", state.mid_energy),
                    ("Treble", state.treble_energy),
                ] {
                    ui.label(label);
                    ui.add(egui::ProgressBar::new(value.min(1.0)).text(format!("{value:.2}")));
                    ui.end_row();
                }
            });
    });
}

fn render_beat_info(ui: &mut egui::Ui, state: &FrameState, threshold: f32) {
    ui.group(|ui| {
        ui.colored_label(egui::Color32::LIGHT_GREEN, "Beats:");
        ui.horizontal(|ui| {
            ui.label("Pattern:");
            ui.strong(format!("{} ({})", state.pattern_index, state.pattern_mode.label()));
            ui.separator();
            ui.label("Progress:");
            ui.strong(format!("{}/{}", state.beat_count, state.current_beat_target));
        });
        ui.horizontal(|ui| {
            ui.label("Threshold:");
            ui.strong(format!("{threshold:.3}"));
            ui.separator();
            ui.label("Intensity:");
            ui.strong(format!("{:.2}", state.beat_intensity));
        });
    });
}

fn render_capture_stats(ui: &mut egui::Ui, stats: &CaptureStats) {
    let evicted = stats.blocks_evicted.load(Ordering::Relaxed);
    ui.group(|ui| {
        ui.colored_label(egui::Color32::LIGHT_YELLOW, "Capture:");
        ui.horizontal(|ui| {
            ui.label(format!(
                "Blocks: {}",
                stats.blocks_delivered.load(Ordering::Relaxed)
            ));
            ui.separator();
            if evicted > 0 {
                ui.colored_label(egui::Color32::ORANGE, format!("Dropped: {evicted}"));
            } else {
                ui.label("Dropped: 0");
            }
            ui.separator();
            ui.label(format!(
                "Errors: {}",
                stats.stream_errors.load(Ordering::Relaxed)
            ));
        });
    });
}
