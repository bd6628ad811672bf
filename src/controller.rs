use crate::audio::{AudioBlock, BeatDetector, BeatEvent, BlockQueue, SpectralAnalyzer, TemporalSmoother};
use crate::config::VisualizerConfig;
use crate::render::{Renderer, UniformSet};
use crate::scheduler::{MenuSelection, PatternScheduler};
use crate::state::FrameState;
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Blocks between periodic analysis dumps.
const DEBUG_DUMP_INTERVAL: u64 = 60;

/// What happened during one tick.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct TickOutput {
    pub analyzed: bool,
    pub beat: Option<BeatEvent>,
    pub pattern_changed: bool,
}

/// Single-threaded frame pipeline.
///
/// Owns the frame state and every analysis stage. Each tick consumes at most
/// one block: analyzer, beat detector, smoother, then the scheduler. With no
/// block the levels decay instead.
pub struct Controller {
    config: VisualizerConfig,
    analyzer: SpectralAnalyzer,
    detector: BeatDetector,
    smoother: TemporalSmoother,
    scheduler: PatternScheduler,
    state: FrameState,
    rng: StdRng,
    blocks_processed: u64,
}

impl Controller {
    pub fn new(config: VisualizerConfig, selection: &MenuSelection) -> Self {
        Self::with_rng(config, selection, StdRng::from_os_rng())
    }

    pub fn with_rng(config: VisualizerConfig, selection: &MenuSelection, mut rng: StdRng) -> Self {
        let scheduler = PatternScheduler::new(&config, selection);
        let mut state = FrameState::new(&config, selection.mode, selection.initial_pattern, &mut rng);
        scheduler.seed(&mut state, &mut rng);

        debug!(
            "Controller ready: block_size={}, patterns={}, start pattern={}",
            config.block_size, config.total_patterns, state.pattern_index
        );

        Self {
            analyzer: SpectralAnalyzer::new(&config),
            detector: BeatDetector::new(&config),
            smoother: TemporalSmoother::new(&config),
            scheduler,
            state,
            rng,
            blocks_processed: 0,
            config,
        }
    }

    pub fn state(&self) -> &FrameState {
        &self.state
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn threshold(&self) -> f32 {
        self.detector.threshold()
    }

    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }

    /// Advances the pipeline to `now` seconds.
    pub fn tick(&mut self, now: f64, block: Option<AudioBlock>) -> TickOutput {
        self.state.current_time = now;
        let mut output = TickOutput::default();

        match block {
            Some(block) => {
                let spectrum = self.analyzer.analyze(&block.samples, block.sample_rate);
                output.beat = self
                    .detector
                    .process(spectrum.beat_energy, &mut self.state, &mut self.rng);
                self.smoother.apply(&spectrum, &mut self.state);
                output.analyzed = true;
                self.blocks_processed += 1;

                if let Some(beat) = output.beat {
                    debug!(
                        "Beat #{} at {:.2}s, intensity {:.2}",
                        self.state.beat_count, beat.time, beat.intensity
                    );
                }

                if self.blocks_processed % DEBUG_DUMP_INTERVAL == 0 {
                    debug!(
                        "Amp: {:.3}, Bass: {:.3}, Mid: {:.3}, Treble: {:.3}, Beat energy: {:.3}, Threshold: {:.3}",
                        self.state.current_amplitude,
                        self.state.bass_energy,
                        self.state.mid_energy,
                        self.state.treble_energy,
                        spectrum.beat_energy,
                        self.detector.threshold()
                    );
                }
            }
            None => self.smoother.decay(&mut self.state),
        }

        output.pattern_changed = self.scheduler.update(&mut self.state, &mut self.rng);
        output
    }

    /// Pops at most one block from `queue` and ticks with it.
    pub fn drain(&mut self, now: f64, queue: &BlockQueue) -> TickOutput {
        let block = queue.try_pop();
        self.tick(now, block)
    }

    /// Hands the current state and its uniforms to `renderer`.
    pub fn render<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        self.state.frames_rendered += 1;
        let uniforms = UniformSet::from_frame(&self.state, &self.config, renderer.resolution());
        renderer.render(&self.state, &uniforms);
    }

    /// Manual pattern change. Ignored in Admin mode.
    pub fn manual_pattern_change(&mut self) -> bool {
        self.scheduler.force_change(&mut self.state, &mut self.rng)
    }

    pub fn manual_color_change(&mut self) {
        self.state.advance_color(self.config.color_palette.len());
        info!("Color changed manually to {}", self.state.color_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PatternMode;
    use std::f32::consts::PI;

    fn controller(mode: PatternMode, beat_target: u32) -> Controller {
        let selection = MenuSelection {
            mode,
            initial_pattern: 0,
            beat_target,
        };
        Controller::with_rng(
            VisualizerConfig::default(),
            &selection,
            StdRng::seed_from_u64(11),
        )
    }

    fn sine(freq: f32, amplitude: f32) -> AudioBlock {
        let samples = (0..2048)
            .map(|i| amplitude * (2.0 * PI * freq * i as f32 / 44100.0).sin())
            .collect();
        AudioBlock {
            samples,
            sample_rate: 44100,
        }
    }

    #[test]
    fn tick_with_block_updates_levels() {
        let mut ctrl = controller(PatternMode::Order, 0);
        let out = ctrl.tick(0.016, Some(sine(100.0, 0.5)));

        assert!(out.analyzed);
        assert_eq!(ctrl.blocks_processed(), 1);
        assert!(ctrl.state().current_amplitude > 0.0);
        assert!(ctrl.state().bass_energy > ctrl.state().mid_energy);
        assert_eq!(ctrl.state().current_time, 0.016);
    }

    #[test]
    fn empty_tick_decays_levels() {
        let mut ctrl = controller(PatternMode::Order, 0);
        ctrl.tick(0.0, Some(sine(100.0, 0.5)));
        let before = ctrl.state().current_amplitude;

        let out = ctrl.tick(0.1, None);

        assert!(!out.analyzed);
        assert!((ctrl.state().current_amplitude - before * 0.98).abs() < 1e-6);
    }

    #[test]
    fn reaching_beat_target_changes_pattern() {
        let mut ctrl = controller(PatternMode::Order, 8);
        ctrl.state.beat_count = 8;

        let out = ctrl.tick(3.0, None);

        assert!(out.pattern_changed);
        assert_eq!(ctrl.state().pattern_index, 1);
        assert_eq!(ctrl.state().beat_count, 0);
    }

    #[test]
    fn manual_change_is_ignored_in_admin_mode() {
        let mut ctrl = controller(PatternMode::Admin, 0);
        assert!(!ctrl.manual_pattern_change());
        assert_eq!(ctrl.state().pattern_index, 0);

        ctrl.manual_color_change();
        assert_eq!(ctrl.state().color_index, 1);
    }

    #[test]
    fn drain_consumes_one_block_per_tick() {
        let mut ctrl = controller(PatternMode::Random, 0);
        let queue = BlockQueue::new(4);
        queue.push(sine(100.0, 0.5));
        queue.push(sine(100.0, 0.5));

        assert!(ctrl.drain(0.0, &queue).analyzed);
        assert_eq!(queue.len(), 1);
        assert!(ctrl.drain(0.016, &queue).analyzed);
        assert!(!ctrl.drain(0.032, &queue).analyzed);
    }
}
