use crate::audio::devices;
use crate::audio::{BlockQueue, CaptureStream};
use crate::config::{APP_VERSION, VisualizerConfig};
use crate::consts;
use crate::controller::Controller;
use crate::error::CaptureError;
use crate::scheduler::MenuSelection;
use crate::visual_engine::VisualEngine;
use eframe::egui;
use log::{debug, error, info};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::components::{render_live_monitoring, render_menu};

/// Frames between stats lines while the debug overlay is open.
const STATS_INTERVAL: u64 = 300;

/// Reported back to `main` once the window closes.
#[derive(Clone, Default, Debug)]
pub struct RunSummary {
    pub frames_rendered: u64,
    pub elapsed_secs: f64,
    pub failure: Option<String>,
}

struct Session {
    controller: Controller,
    queue: BlockQueue,
    capture: CaptureStream,
    renderer: VisualEngine,
    started: Instant,
    show_debug: bool,
}

enum Phase {
    Menu(MenuSelection),
    Running(Box<Session>),
    Failed(String),
}

pub struct AppState {
    config: VisualizerConfig,
    phase: Phase,
    summary: Arc<Mutex<RunSummary>>,
}

impl eframe::App for AppState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match &mut self.phase {
            Phase::Menu(selection) => {
                if Self::render_menu_panel(ctx, selection, &self.config) {
                    let selection = *selection;
                    self.start_session(ctx, selection);
                }
            }
            Phase::Running(session) => {
                Self::run_frame(ctx, session, &self.config);
                self.publish_summary();
            }
            Phase::Failed(message) => Self::render_failure(ctx, message),
        }
    }
}

impl AppState {
    pub fn new(config: VisualizerConfig, summary: Arc<Mutex<RunSummary>>) -> Self {
        debug!("Initializing GUI state...");
        let selection = MenuSelection {
            beat_target: config.pattern_change_beats,
            ..Default::default()
        };

        Self {
            config,
            phase: Phase::Menu(selection),
            summary,
        }
    }

    fn start_session(&mut self, ctx: &egui::Context, selection: MenuSelection) {
        info!(
            "Starting visualizer in '{}' mode (pattern {}, beats {})",
            selection.mode.label(),
            selection.initial_pattern,
            selection.beat_target
        );

        match self.open_capture() {
            Ok((capture, queue)) => {
                let session = Session {
                    controller: Controller::new(self.config.clone(), &selection),
                    queue,
                    capture,
                    renderer: VisualEngine::new(ctx.clone(), consts::WINDOW_SIZE),
                    started: Instant::now(),
                    show_debug: false,
                };
                self.phase = Phase::Running(Box::new(session));
            }
            Err(e) => {
                error!("Failed to start audio capture: {e}");
                let message = format!("Could not open an audio input: {e}");
                if let Ok(mut summary) = self.summary.lock() {
                    summary.failure = Some(message.clone());
                }
                self.phase = Phase::Failed(message);
            }
        }
    }

    fn open_capture(&self) -> Result<(CaptureStream, BlockQueue), CaptureError> {
        let available = devices::list_input_devices()?;
        let device = devices::select_capture_device(&available, &self.config.preferred_device_name);
        let queue = BlockQueue::new(self.config.queue_capacity);
        let capture = CaptureStream::start(device, &self.config, queue.clone())?;
        Ok((capture, queue))
    }

    fn publish_summary(&self) {
        let Phase::Running(session) = &self.phase else {
            return;
        };
        if let Ok(mut summary) = self.summary.lock() {
            summary.frames_rendered = session.controller.state().frames_rendered;
            summary.elapsed_secs = session.started.elapsed().as_secs_f64();
        }
    }

    fn render_menu_panel(
        ctx: &egui::Context,
        selection: &mut MenuSelection,
        config: &VisualizerConfig,
    ) -> bool {
        let mut start = false;
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.heading(format!("BeatFX {APP_VERSION}"));
            ui.add_space(4.0);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            start = render_menu(ui, selection, config);
            ui.add_space(20.0);
            ui.label("Esc quit | Space next pattern | C next colour | D debug overlay");
        });
        start
    }

    fn render_failure(ctx: &egui::Context, message: &str) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.colored_label(egui::Color32::RED, message);
            });
        });
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn run_frame(ctx: &egui::Context, session: &mut Session, config: &VisualizerConfig) {
        Self::handle_keys(ctx, session);

        let now = session.started.elapsed().as_secs_f64();
        session.controller.drain(now, &session.queue);

        let frame_interval = Duration::from_secs_f64(1.0 / f64::from(config.target_fps.max(1)));
        ctx.request_repaint_after(frame_interval);

        // Minimised: keep the queue drained but skip drawing.
        if ctx.input(|i| i.viewport().minimized.unwrap_or(false)) {
            return;
        }

        session.controller.render(&mut session.renderer);

        if session.show_debug {
            Self::render_debug_overlay(ctx, session);

            let state = session.controller.state();
            if state.frames_rendered % STATS_INTERVAL == 0 {
                info!(
                    "Frame {}: pattern {}, beats {}/{}, amplitude {:.2}, fps {:.1}",
                    state.frames_rendered,
                    state.pattern_index,
                    state.beat_count,
                    state.current_beat_target,
                    state.smoothed_amplitude,
                    state.frames_rendered as f64 / now.max(f64::EPSILON)
                );
            }
        }
    }

    fn handle_keys(ctx: &egui::Context, session: &mut Session) {
        let (quit, next_pattern, next_color, toggle_debug) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::C),
                i.key_pressed(egui::Key::D),
            )
        });

        if quit {
            info!("Quit requested");
            session.capture.stop();
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if next_pattern && !session.controller.manual_pattern_change() {
            debug!("Manual pattern change ignored in admin mode");
        }
        if next_color {
            session.controller.manual_color_change();
        }
        if toggle_debug {
            session.show_debug = !session.show_debug;
            debug!("Debug overlay {}", if session.show_debug { "on" } else { "off" });
        }
    }

    fn render_debug_overlay(ctx: &egui::Context, session: &Session) {
        egui::Window::new("Debug")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Device: {}", session.capture.device_name()));
                ui.label(format!("Sample rate: {} Hz", session.capture.sample_rate()));
                ui.add_space(4.0);
                render_live_monitoring(
                    ui,
                    session.controller.state(),
                    session.controller.threshold(),
                    session.queue.stats(),
                );
            });
    }
}
