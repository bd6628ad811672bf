//! Per-frame state shared between the analysis stages and the renderer

use crate::config::VisualizerConfig;
use rand::Rng;

/// How pattern changes are scheduled.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum PatternMode {
    /// Pattern pinned by the user, no beat-driven changes
    Admin,
    /// Advance one pattern every fixed number of beats
    Order,
    /// Jump to a random pattern after a random number of beats
    #[default]
    Random,
}

impl PatternMode {
    pub fn label(&self) -> &'static str {
        match self {
            PatternMode::Admin => "admin",
            PatternMode::Order => "order",
            PatternMode::Random => "random",
        }
    }
}

/// Everything the renderer needs for one frame.
///
/// Owned by the frame loop and mutated in sequence by each pipeline stage;
/// the renderer only ever sees a shared reference.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameState {
    /// Seconds since the stream started
    pub current_time: f64,

    pub current_amplitude: f32,
    pub smoothed_amplitude: f32,

    pub bass_energy: f32,
    pub mid_energy: f32,
    pub treble_energy: f32,

    pub beat_last_time: f64,
    pub beat_count: u32,
    pub beat_intensity: f32,
    pub current_beat_target: u32,

    pub color_index: usize,
    pub pattern_index: usize,
    pub prev_pattern_index: usize,
    pub pattern_change_time: f64,

    /// Ring of impulse origins in [0, 1)², written on every beat
    pub drop_positions: Vec<[f32; 2]>,
    pub drop_times: Vec<f32>,
    pub drop_index: usize,

    pub pattern_mode: PatternMode,

    pub frames_rendered: u64,
}

impl FrameState {
    /// Fresh state for `mode` starting at `initial_pattern`. The caller seeds
    /// `current_beat_target` through the scheduler.
    pub fn new<R: Rng>(
        config: &VisualizerConfig,
        mode: PatternMode,
        initial_pattern: usize,
        rng: &mut R,
    ) -> Self {
        let initial_pattern = initial_pattern.min(config.total_patterns.saturating_sub(1));
        let drop_positions = (0..config.drop_capacity)
            .map(|_| [rng.random::<f32>(), rng.random::<f32>()])
            .collect();

        Self {
            current_time: 0.0,
            current_amplitude: 0.0,
            smoothed_amplitude: 0.0,
            bass_energy: 0.0,
            mid_energy: 0.0,
            treble_energy: 0.0,
            beat_last_time: 0.0,
            beat_count: 0,
            beat_intensity: 0.0,
            current_beat_target: config.pattern_change_beats.max(1),
            color_index: 0,
            pattern_index: initial_pattern,
            prev_pattern_index: initial_pattern,
            pattern_change_time: 0.0,
            drop_positions,
            drop_times: vec![0.0; config.drop_capacity],
            drop_index: 0,
            pattern_mode: mode,
            frames_rendered: 0,
        }
    }

    pub fn drop_capacity(&self) -> usize {
        self.drop_positions.len()
    }

    /// Writes `count` markers at random positions stamped with the current
    /// time and advances the ring index by `count`.
    pub fn emit_drops<R: Rng>(&mut self, count: usize, rng: &mut R) {
        let capacity = self.drop_capacity();
        if capacity == 0 {
            return;
        }
        for i in 0..count {
            let idx = (self.drop_index + i) % capacity;
            self.drop_positions[idx] = [rng.random::<f32>(), rng.random::<f32>()];
            self.drop_times[idx] = self.current_time as f32;
        }
        self.drop_index = (self.drop_index + count) % capacity;
    }

    pub fn advance_color(&mut self, palette_len: usize) {
        if palette_len > 0 {
            self.color_index = (self.color_index + 1) % palette_len;
        }
    }

    /// Cross-fade progress from the previous pattern, 0.0 to 1.0.
    pub fn transition_progress(&self, transition_time: f32) -> f32 {
        if transition_time <= 0.0 {
            return 1.0;
        }
        let elapsed = (self.current_time - self.pattern_change_time).max(0.0) as f32;
        (elapsed / transition_time).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn new_state_is_silent() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = VisualizerConfig::default();
        let state = FrameState::new(&config, PatternMode::Order, 5, &mut rng);

        assert_eq!(state.current_amplitude, 0.0);
        assert_eq!(state.beat_count, 0);
        assert_eq!(state.pattern_index, 5);
        assert_eq!(state.prev_pattern_index, 5);
        assert_eq!(state.drop_positions.len(), config.drop_capacity);
        assert_eq!(state.drop_times, vec![0.0; config.drop_capacity]);
        assert!(
            state
                .drop_positions
                .iter()
                .all(|p| (0.0..1.0).contains(&p[0]) && (0.0..1.0).contains(&p[1]))
        );
    }

    #[test]
    fn initial_pattern_is_clamped() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = VisualizerConfig::default();
        let state = FrameState::new(&config, PatternMode::Admin, 500, &mut rng);
        assert_eq!(state.pattern_index, config.total_patterns - 1);
    }

    #[test]
    fn drop_ring_wraps_after_full_cycle() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = VisualizerConfig {
            drop_capacity: 16,
            events_per_beat: 4,
            ..Default::default()
        };
        let mut state = FrameState::new(&config, PatternMode::Random, 0, &mut rng);

        for beat in 1..=4 {
            state.current_time = beat as f64;
            state.emit_drops(config.events_per_beat, &mut rng);
        }
        assert_eq!(state.drop_index, 0);
        assert!(state.drop_times.iter().all(|&t| t > 0.0));
    }

    #[test]
    fn drop_index_tracks_total_markers_modulo_capacity() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = VisualizerConfig::default();
        let mut state = FrameState::new(&config, PatternMode::Random, 0, &mut rng);

        for beats in 1..=7 {
            state.emit_drops(config.events_per_beat, &mut rng);
            assert_eq!(
                state.drop_index,
                (beats * config.events_per_beat) % config.drop_capacity
            );
        }
    }

    #[test]
    fn transition_progress_saturates() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = FrameState::new(&VisualizerConfig::default(), PatternMode::Order, 0, &mut rng);
        state.pattern_change_time = 1.0;
        state.current_time = 1.25;
        assert!((state.transition_progress(0.5) - 0.5).abs() < 1e-6);
        state.current_time = 3.0;
        assert_eq!(state.transition_progress(0.5), 1.0);
        assert_eq!(state.transition_progress(0.0), 1.0);
    }

    #[test]
    fn color_cycles_through_palette() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = FrameState::new(&VisualizerConfig::default(), PatternMode::Order, 0, &mut rng);
        state.color_index = 11;
        state.advance_color(12);
        assert_eq!(state.color_index, 0);
    }
}
