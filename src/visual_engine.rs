use crate::render::{Renderer, UniformSet, UniformValue};
use crate::state::FrameState;
use eframe::egui;
use std::f32::consts::TAU;

/// Seconds a drop marker stays visible.
const DROP_LIFETIME: f32 = 1.5;

/// Painter-based renderer drawing into the window's central panel.
///
/// Stands in for a shader pipeline: it reads the same uniforms and draws a
/// tinted background, a pulsing polygon per pattern and fading drop rings.
pub struct VisualEngine {
    ctx: egui::Context,
    resolution: [f32; 2],
}

impl VisualEngine {
    pub fn new(ctx: egui::Context, resolution: [f32; 2]) -> Self {
        Self { ctx, resolution }
    }
}

impl Renderer for VisualEngine {
    fn resolution(&self) -> [f32; 2] {
        self.resolution
    }

    fn render(&mut self, state: &FrameState, uniforms: &UniformSet) {
        let base = match uniforms.get("u_base_color") {
            Some(UniformValue::Vec3(rgb)) => *rgb,
            _ => [1.0, 1.0, 1.0],
        };
        let amplitude = uniforms.float("u_smooth_amplitude").unwrap_or(0.0);
        let bass = uniforms.float("u_bass").unwrap_or(0.0);
        let beat = uniforms.float("u_beat_intensity").unwrap_or(0.0);
        let fade = uniforms.float("u_transition_progress").unwrap_or(1.0);
        let vignette = uniforms.float("u_vignette_intensity").unwrap_or(0.0);
        let time = uniforms.float("u_time").unwrap_or(0.0);

        let glow = (0.08 + 0.12 * bass.min(1.0)) * (1.0 - vignette * 0.5);
        let background = tint(base, glow, 1.0);
        let accent = tint(base, 1.0, 1.0);

        let mut size = egui::Vec2::ZERO;
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(background).inner_margin(0.0))
            .show(&self.ctx, |ui| {
                let rect = ui.max_rect();
                size = rect.size();
                let painter = ui.painter();
                let center = rect.center();
                let radius =
                    rect.width().min(rect.height()) * 0.2 * (1.0 + amplitude.min(2.0) * 0.5);

                // Outgoing pattern fades while the new one comes in
                if fade < 1.0 {
                    let outgoing = accent.gamma_multiply(1.0 - fade);
                    draw_pattern(painter, center, radius, state.prev_pattern_index, time, outgoing);
                }
                let incoming = accent.gamma_multiply(fade);
                draw_pattern(painter, center, radius, state.pattern_index, time, incoming);

                for (pos, &born) in state.drop_positions.iter().zip(&state.drop_times) {
                    let age = time - born;
                    if born <= 0.0 || !(0.0..DROP_LIFETIME).contains(&age) {
                        continue;
                    }
                    let life = 1.0 - age / DROP_LIFETIME;
                    let origin = egui::pos2(
                        rect.left() + pos[0] * rect.width(),
                        rect.top() + pos[1] * rect.height(),
                    );
                    painter.circle_stroke(
                        origin,
                        10.0 + age * 120.0 * (1.0 + beat),
                        egui::Stroke::new(2.0 * life, accent.gamma_multiply(life)),
                    );
                }
            });

        self.resolution = [size.x, size.y];
        self.ctx.request_repaint();
    }
}

fn draw_pattern(
    painter: &egui::Painter,
    center: egui::Pos2,
    radius: f32,
    pattern: usize,
    time: f32,
    color: egui::Color32,
) {
    let sides = 3 + pattern % 8;
    let spin = time * (0.2 + (pattern / 8) as f32 * 0.15);
    let points: Vec<egui::Pos2> = (0..=sides)
        .map(|i| {
            let angle = spin + i as f32 / sides as f32 * TAU;
            center + radius * egui::vec2(angle.cos(), angle.sin())
        })
        .collect();
    painter.add(egui::Shape::line(points, egui::Stroke::new(3.0, color)));
}

fn tint(rgb: [f32; 3], scale: f32, alpha: f32) -> egui::Color32 {
    let channel = |c: f32| (c * scale).clamp(0.0, 1.0) * 255.0;
    egui::Color32::from_rgba_unmultiplied(
        channel(rgb[0]) as u8,
        channel(rgb[1]) as u8,
        channel(rgb[2]) as u8,
        (alpha.clamp(0.0, 1.0) * 255.0) as u8,
    )
}
