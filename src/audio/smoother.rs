//! Temporal smoothing of amplitude and band energies

use super::analyzer::SpectrumResult;
use crate::config::VisualizerConfig;
use crate::state::FrameState;
use std::collections::VecDeque;

/// Fixed-length moving average.
#[derive(Clone, Debug)]
pub struct RollingAverage {
    values: VecDeque<f32>,
    capacity: usize,
}

impl RollingAverage {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Adds a sample and returns the new average.
    pub fn push(&mut self, value: f32) -> f32 {
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
        self.mean()
    }

    pub fn mean(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Damps frame-to-frame jitter.
///
/// Amplitude follows an instant-attack, geometric-decay envelope and then a
/// short moving average; band energies only get the moving average.
pub struct TemporalSmoother {
    amplitude: RollingAverage,
    bass: RollingAverage,
    mid: RollingAverage,
    treble: RollingAverage,
    sensitivity: f32,
    decay_rate: f32,
}

impl TemporalSmoother {
    pub fn new(config: &VisualizerConfig) -> Self {
        Self {
            amplitude: RollingAverage::new(config.smoothing_frames),
            bass: RollingAverage::new(config.smoothing_frames),
            mid: RollingAverage::new(config.smoothing_frames),
            treble: RollingAverage::new(config.smoothing_frames),
            sensitivity: config.sensitivity,
            decay_rate: config.decay_rate,
        }
    }

    /// Folds a freshly analyzed block into the frame state.
    pub fn apply(&mut self, spectrum: &SpectrumResult, state: &mut FrameState) {
        state.bass_energy = self.bass.push(spectrum.bass_energy);
        state.mid_energy = self.mid.push(spectrum.mid_energy);
        state.treble_energy = self.treble.push(spectrum.treble_energy);

        let new_amplitude = spectrum.rms * self.sensitivity;
        state.current_amplitude = new_amplitude.max(state.current_amplitude * self.decay_rate);
        state.smoothed_amplitude = self.amplitude.push(state.current_amplitude);
    }

    /// No block this tick: fade everything toward silence.
    pub fn decay(&self, state: &mut FrameState) {
        state.current_amplitude *= self.decay_rate;
        state.smoothed_amplitude *= self.decay_rate;
        state.bass_energy *= self.decay_rate;
        state.mid_energy *= self.decay_rate;
        state.treble_energy *= self.decay_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PatternMode;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_approx(actual: f32, expected: f32, tolerance: f32) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    fn state(config: &VisualizerConfig) -> FrameState {
        let mut rng = StdRng::seed_from_u64(0);
        FrameState::new(config, PatternMode::Order, 0, &mut rng)
    }

    fn spectrum(rms: f32) -> SpectrumResult {
        SpectrumResult {
            rms,
            ..Default::default()
        }
    }

    #[test]
    fn rolling_average_keeps_last_samples() {
        let mut avg = RollingAverage::new(3);
        assert_eq!(avg.mean(), 0.0);
        avg.push(3.0);
        avg.push(6.0);
        assert_approx(avg.push(9.0), 6.0, 1e-6);
        assert_approx(avg.push(0.0), 5.0, 1e-6);
        assert_eq!(avg.len(), 3);
    }

    #[test]
    fn amplitude_envelope_decays_geometrically() {
        let config = VisualizerConfig::default();
        let mut smoother = TemporalSmoother::new(&config);
        let mut state = state(&config);

        smoother.apply(&spectrum(1.0), &mut state);
        assert_approx(state.current_amplitude, 2.5, 1e-6);

        for n in 1..=20 {
            smoother.apply(&spectrum(0.0), &mut state);
            assert_approx(
                state.current_amplitude,
                2.5 * config.decay_rate.powi(n),
                1e-4,
            );
        }
    }

    #[test]
    fn louder_input_attacks_instantly() {
        let config = VisualizerConfig::default();
        let mut smoother = TemporalSmoother::new(&config);
        let mut state = state(&config);

        smoother.apply(&spectrum(0.1), &mut state);
        smoother.apply(&spectrum(0.8), &mut state);
        assert_approx(state.current_amplitude, 0.8 * config.sensitivity, 1e-6);
    }

    #[test]
    fn bands_are_averaged() {
        let config = VisualizerConfig::default();
        let mut smoother = TemporalSmoother::new(&config);
        let mut state = state(&config);

        for bass in [0.9, 0.6, 0.3] {
            let result = SpectrumResult {
                bass_energy: bass,
                mid_energy: 0.3,
                ..Default::default()
            };
            smoother.apply(&result, &mut state);
        }
        assert_approx(state.bass_energy, 0.6, 1e-6);
        assert_approx(state.mid_energy, 0.3, 1e-6);
        assert_eq!(state.treble_energy, 0.0);
    }

    #[test]
    fn decay_fades_all_levels() {
        let config = VisualizerConfig::default();
        let smoother = TemporalSmoother::new(&config);
        let mut state = state(&config);
        state.current_amplitude = 1.0;
        state.smoothed_amplitude = 1.0;
        state.bass_energy = 0.5;
        state.mid_energy = 0.5;
        state.treble_energy = 0.5;

        smoother.decay(&mut state);

        assert_approx(state.current_amplitude, config.decay_rate, 1e-6);
        assert_approx(state.smoothed_amplitude, config.decay_rate, 1e-6);
        assert_approx(state.bass_energy, 0.5 * config.decay_rate, 1e-6);
        assert_approx(state.mid_energy, 0.5 * config.decay_rate, 1e-6);
        assert_approx(state.treble_energy, 0.5 * config.decay_rate, 1e-6);
    }
}
