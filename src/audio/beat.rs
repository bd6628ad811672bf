//! Beat detection against an adaptive threshold

use crate::config::VisualizerConfig;
use crate::state::FrameState;
use rand::Rng;
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeatEvent {
    pub time: f64,
    pub intensity: f32,
}

/// Tracks recent beat-band energy and fires beats when a sample stands
/// out from it.
///
/// The threshold follows `mean + k * stddev` of the last samples through a
/// slow exponential filter, so a single loud transient cannot yank it
/// around, and stays clamped to a fixed range.
pub struct BeatDetector {
    history: VecDeque<f32>,
    history_len: usize,
    min_history: usize,
    std_factor: f32,
    adaptation: f32,
    clamp: (f32, f32),
    adaptive_threshold: f32,
    cooldown: f64,
    max_intensity: f32,
    events_per_beat: usize,
    palette_len: usize,
}

impl BeatDetector {
    pub fn new(config: &VisualizerConfig) -> Self {
        Self {
            history: VecDeque::with_capacity(config.threshold_history),
            history_len: config.threshold_history,
            min_history: config.threshold_min_history,
            std_factor: config.threshold_std_factor,
            adaptation: config.threshold_adaptation,
            clamp: config.threshold_clamp,
            adaptive_threshold: config.beat_threshold,
            cooldown: config.beat_cooldown,
            max_intensity: config.max_beat_intensity,
            events_per_beat: config.events_per_beat,
            palette_len: config.color_palette.len(),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.adaptive_threshold
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Feeds one sample into the history and re-derives the threshold.
    pub fn adapt_threshold(&mut self, energy: f32) {
        self.history.push_back(energy);
        while self.history.len() > self.history_len {
            self.history.pop_front();
        }

        if self.history.len() < self.min_history {
            return;
        }

        let n = self.history.len() as f32;
        let mean = self.history.iter().sum::<f32>() / n;
        let variance = self
            .history
            .iter()
            .map(|v| {
                let d = v - mean;
                d * d
            })
            .sum::<f32>()
            / n;
        let target = mean + variance.sqrt() * self.std_factor;

        self.adaptive_threshold =
            self.adaptive_threshold * (1.0 - self.adaptation) + target * self.adaptation;
        self.adaptive_threshold = self.adaptive_threshold.clamp(self.clamp.0, self.clamp.1);
    }

    /// Runs one analyzed block through the detector.
    ///
    /// The threshold adapts on every call. Only when `energy` beats the
    /// threshold outside the cooldown window does the beat touch the frame
    /// state: beat time, count, intensity, colour and drop markers.
    pub fn process<R: Rng>(
        &mut self,
        energy: f32,
        state: &mut FrameState,
        rng: &mut R,
    ) -> Option<BeatEvent> {
        self.adapt_threshold(energy);

        let since_last = state.current_time - state.beat_last_time;
        if energy <= self.adaptive_threshold || since_last <= self.cooldown {
            return None;
        }

        let intensity = (energy / self.adaptive_threshold).min(self.max_intensity);

        state.beat_last_time = state.current_time;
        state.beat_count += 1;
        state.beat_intensity = intensity;
        state.advance_color(self.palette_len);
        state.emit_drops(self.events_per_beat, rng);

        Some(BeatEvent {
            time: state.current_time,
            intensity,
        })
    }
}
