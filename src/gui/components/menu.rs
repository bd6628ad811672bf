use crate::config::VisualizerConfig;
use crate::consts::ORDER_BEAT_OPTIONS;
use crate::scheduler::MenuSelection;
use crate::state::PatternMode;
use eframe::egui;

/// Start screen. Returns `true` once the user asks to start.
pub fn render_menu(
    ui: &mut egui::Ui,
    selection: &mut MenuSelection,
    config: &VisualizerConfig,
) -> bool {
    ui.label(egui::RichText::new("Pattern Mode").size(16.0));
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.selectable_value(&mut selection.mode, PatternMode::Random, "Random")
            .on_hover_text("Random pattern after a random number of beats");
        ui.selectable_value(&mut selection.mode, PatternMode::Order, "Order")
            .on_hover_text("Next pattern every fixed number of beats");
        ui.selectable_value(&mut selection.mode, PatternMode::Admin, "Admin")
            .on_hover_text("Pin a single pattern");
    });

    ui.add_space(8.0);

    match selection.mode {
        PatternMode::Random => {
            let (min, max) = config.random_beat_range;
            ui.label(format!("Pattern changes every {min}-{max} beats"));
        }
        PatternMode::Order => render_order_options(ui, selection),
        PatternMode::Admin => render_pattern_picker(ui, selection, config.total_patterns),
    }

    ui.add_space(20.0);
    ui.button("Start").clicked()
}

fn render_order_options(ui: &mut egui::Ui, selection: &mut MenuSelection) {
    ui.horizontal(|ui| {
        ui.label("Beats per pattern:");
        egui::ComboBox::from_id_salt("order_beats")
            .selected_text(selection.beat_target.to_string())
            .show_ui(ui, |ui| {
                for beats in ORDER_BEAT_OPTIONS {
                    ui.selectable_value(&mut selection.beat_target, beats, beats.to_string());
                }
            });
    });
}

fn render_pattern_picker(ui: &mut egui::Ui, selection: &mut MenuSelection, total_patterns: usize) {
    ui.horizontal(|ui| {
        ui.label("Pattern:");
        ui.add(egui::Slider::new(
            &mut selection.initial_pattern,
            0..=total_patterns.saturating_sub(1),
        ));
    });
    ui.label("Space and beat count are ignored; the pattern stays fixed.");
}
