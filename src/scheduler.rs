//! Beat-counted pattern scheduling

use crate::config::VisualizerConfig;
use crate::state::{FrameState, PatternMode};
use log::{debug, info};
use rand::Rng;

/// Run mode picked on the start screen, consumed once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuSelection {
    pub mode: PatternMode,
    pub initial_pattern: usize,
    /// Beats per change for Order mode; 0 keeps the configured default
    pub beat_target: u32,
}

impl Default for MenuSelection {
    fn default() -> Self {
        Self {
            mode: PatternMode::Random,
            initial_pattern: 0,
            beat_target: 0,
        }
    }
}

pub struct PatternScheduler {
    mode: PatternMode,
    order_target: u32,
    random_range: (u32, u32),
    total_patterns: usize,
}

impl PatternScheduler {
    pub fn new(config: &VisualizerConfig, selection: &MenuSelection) -> Self {
        let order_target = if selection.mode == PatternMode::Order && selection.beat_target > 0 {
            selection.beat_target
        } else {
            config.pattern_change_beats
        };

        Self {
            mode: selection.mode,
            order_target: order_target.max(1),
            random_range: config.random_beat_range,
            total_patterns: config.total_patterns.max(1),
        }
    }

    pub fn mode(&self) -> PatternMode {
        self.mode
    }

    pub fn order_target(&self) -> u32 {
        self.order_target
    }

    /// Beats until the next change: drawn from the random range in Random
    /// mode, the fixed target otherwise.
    pub fn next_beat_target<R: Rng>(&self, rng: &mut R) -> u32 {
        match self.mode {
            PatternMode::Random => {
                let (min, max) = self.random_range;
                rng.random_range(min..=max.max(min)).max(1)
            }
            PatternMode::Order | PatternMode::Admin => self.order_target,
        }
    }

    /// Seeds the first beat target into a fresh state.
    pub fn seed<R: Rng>(&self, state: &mut FrameState, rng: &mut R) {
        state.pattern_mode = self.mode;
        state.current_beat_target = self.next_beat_target(rng);
        if self.mode != PatternMode::Admin {
            info!(
                "Pattern mode '{}', next change in {} beats",
                self.mode.label(),
                state.current_beat_target
            );
        }
    }

    /// Per-frame check. Returns `true` when the pattern changed.
    pub fn update<R: Rng>(&self, state: &mut FrameState, rng: &mut R) -> bool {
        if self.mode == PatternMode::Admin || state.beat_count < state.current_beat_target {
            return false;
        }
        self.change_pattern(state, rng);
        debug!(
            "Pattern change to {}, next in {} beats",
            state.pattern_index, state.current_beat_target
        );
        true
    }

    /// Manual trigger: same transition as a reached beat target, without
    /// checking the count. Ignored in Admin mode.
    pub fn force_change<R: Rng>(&self, state: &mut FrameState, rng: &mut R) -> bool {
        if self.mode == PatternMode::Admin {
            return false;
        }
        self.change_pattern(state, rng);
        info!(
            "Pattern changed manually to {}, next in {} beats",
            state.pattern_index, state.current_beat_target
        );
        true
    }

    fn change_pattern<R: Rng>(&self, state: &mut FrameState, rng: &mut R) {
        state.beat_count = 0;
        state.prev_pattern_index = state.pattern_index;
        state.pattern_change_time = state.current_time;
        state.pattern_index = self.next_pattern_index(state.pattern_index, rng);
        state.current_beat_target = self.next_beat_target(rng);
    }

    fn next_pattern_index<R: Rng>(&self, current: usize, rng: &mut R) -> usize {
        match self.mode {
            PatternMode::Random if self.total_patterns > 1 => {
                // Uniform over every index except `current`
                let pick = rng.random_range(0..self.total_patterns - 1);
                if pick >= current { pick + 1 } else { pick }
            }
            PatternMode::Random => 0,
            PatternMode::Order | PatternMode::Admin => (current + 1) % self.total_patterns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup(mode: PatternMode, beat_target: u32) -> (PatternScheduler, FrameState, StdRng) {
        let config = VisualizerConfig::default();
        let mut rng = StdRng::seed_from_u64(99);
        let selection = MenuSelection {
            mode,
            initial_pattern: 0,
            beat_target,
        };
        let scheduler = PatternScheduler::new(&config, &selection);
        let mut state = FrameState::new(&config, mode, 0, &mut rng);
        scheduler.seed(&mut state, &mut rng);
        (scheduler, state, rng)
    }

    #[test]
    fn order_mode_advances_cyclically() {
        let (scheduler, mut state, mut rng) = setup(PatternMode::Order, 8);
        assert_eq!(state.current_beat_target, 8);

        state.beat_count = 7;
        assert!(!scheduler.update(&mut state, &mut rng));

        state.beat_count = 8;
        state.current_time = 4.0;
        assert!(scheduler.update(&mut state, &mut rng));
        assert_eq!(state.pattern_index, 1);
        assert_eq!(state.prev_pattern_index, 0);
        assert_eq!(state.beat_count, 0);
        assert_eq!(state.pattern_change_time, 4.0);
        assert_eq!(state.current_beat_target, 8);

        state.pattern_index = 42;
        state.beat_count = 8;
        scheduler.update(&mut state, &mut rng);
        assert_eq!(state.pattern_index, 0);
    }

    #[test]
    fn order_mode_without_menu_target_uses_config() {
        let (scheduler, state, _) = setup(PatternMode::Order, 0);
        assert_eq!(scheduler.order_target(), 16);
        assert_eq!(state.current_beat_target, 16);
    }

    #[test]
    fn admin_mode_never_changes_pattern() {
        let (scheduler, mut state, mut rng) = setup(PatternMode::Admin, 0);
        state.pattern_index = 12;

        for beats in 0..10_000 {
            state.beat_count = beats;
            assert!(!scheduler.update(&mut state, &mut rng));
        }
        assert!(!scheduler.force_change(&mut state, &mut rng));
        assert_eq!(state.pattern_index, 12);
    }

    #[test]
    fn random_mode_never_repeats_current_pattern() {
        let (scheduler, mut state, mut rng) = setup(PatternMode::Random, 0);

        for _ in 0..2000 {
            let before = state.pattern_index;
            state.beat_count = state.current_beat_target;
            assert!(scheduler.update(&mut state, &mut rng));
            assert_ne!(state.pattern_index, before);
            assert!(state.pattern_index < 43);
            assert!((30..=70).contains(&state.current_beat_target));
        }
    }

    #[test]
    fn random_mode_with_two_patterns_alternates() {
        let config = VisualizerConfig {
            total_patterns: 2,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let selection = MenuSelection::default();
        let scheduler = PatternScheduler::new(&config, &selection);
        let mut state = FrameState::new(&config, PatternMode::Random, 0, &mut rng);

        for expected in [1, 0, 1, 0] {
            scheduler.force_change(&mut state, &mut rng);
            assert_eq!(state.pattern_index, expected);
        }
    }

    #[test]
    fn manual_change_bypasses_beat_count() {
        let (scheduler, mut state, mut rng) = setup(PatternMode::Order, 16);
        state.beat_count = 3;
        state.current_time = 9.5;

        assert!(scheduler.force_change(&mut state, &mut rng));
        assert_eq!(state.pattern_index, 1);
        assert_eq!(state.beat_count, 0);
        assert_eq!(state.pattern_change_time, 9.5);
    }
}
