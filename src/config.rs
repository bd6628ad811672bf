use crate::consts;
use crate::error::ConfigError;

pub const APP_VERSION: &str = "v0.1.0";

/// Inclusive frequency range in Hz.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct FrequencyBand {
    pub lo_hz: f32,
    pub hi_hz: f32,
}

impl FrequencyBand {
    pub const fn new(lo_hz: f32, hi_hz: f32) -> Self {
        Self { lo_hz, hi_hz }
    }

    pub fn contains(&self, freq: f32) -> bool {
        freq >= self.lo_hz && freq <= self.hi_hz
    }
}

impl From<(f32, f32)> for FrequencyBand {
    fn from((lo_hz, hi_hz): (f32, f32)) -> Self {
        Self { lo_hz, hi_hz }
    }
}

/// Process-wide tuning, built once at startup and shared by reference.
#[derive(Clone, PartialEq, Debug)]
pub struct VisualizerConfig {
    /// Sample rate requested from the device. The analyzer uses the rate
    /// the stream actually runs at.
    pub sample_rate: u32,

    /// Number of samples per analysis block. Must be a power of 2 for FFT.
    pub block_size: usize,

    /// Blocks buffered between the audio callback and the frame loop.
    pub queue_capacity: usize,

    /// Rolling average length for amplitude and band energies.
    pub smoothing_frames: usize,

    pub bass_band: FrequencyBand,
    pub mid_band: FrequencyBand,
    pub treble_band: FrequencyBand,

    /// Band used for beat detection only.
    pub beat_band: FrequencyBand,

    /// Initial adaptive threshold.
    pub beat_threshold: f32,

    /// Minimum seconds between beats.
    pub beat_cooldown: f64,

    /// Exponential smoothing factor of the adaptive threshold.
    pub threshold_adaptation: f32,
    pub threshold_history: usize,
    pub threshold_min_history: usize,
    pub threshold_std_factor: f32,
    pub threshold_clamp: (f32, f32),
    pub max_beat_intensity: f32,

    /// Multiplier applied to RMS loudness.
    pub sensitivity: f32,

    /// Per-block amplitude decay.
    pub decay_rate: f32,

    /// Beats per pattern change in Order mode.
    pub pattern_change_beats: u32,

    /// Inclusive beat target range for Random mode.
    pub random_beat_range: (u32, u32),

    pub total_patterns: usize,

    /// Drop marker ring capacity.
    pub drop_capacity: usize,

    /// Drop markers written per beat.
    pub events_per_beat: usize,

    pub pattern_transition_time: f32,
    pub color_palette: Vec<[f32; 3]>,

    pub bloom_intensity: f32,
    pub vignette_intensity: f32,
    pub contrast: f32,
    pub saturation: f32,

    /// Substring looked for in device names before falling back to
    /// loopback classification.
    pub preferred_device_name: String,

    pub target_fps: u32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            sample_rate: consts::SAMPLE_RATE,
            block_size: consts::BLOCK_SIZE,
            queue_capacity: consts::QUEUE_CAPACITY,
            smoothing_frames: consts::SMOOTHING_FRAMES,
            bass_band: consts::BASS_FREQ_RANGE.into(),
            mid_band: consts::MID_FREQ_RANGE.into(),
            treble_band: consts::TREBLE_FREQ_RANGE.into(),
            beat_band: consts::BEAT_FREQ_RANGE.into(),
            beat_threshold: consts::BEAT_THRESHOLD,
            beat_cooldown: consts::BEAT_COOLDOWN,
            threshold_adaptation: consts::BEAT_THRESHOLD_ADAPTATION,
            threshold_history: consts::BEAT_HISTORY_LEN,
            threshold_min_history: consts::BEAT_HISTORY_MIN,
            threshold_std_factor: consts::BEAT_STD_FACTOR,
            threshold_clamp: (consts::BEAT_THRESHOLD_MIN, consts::BEAT_THRESHOLD_MAX),
            max_beat_intensity: consts::MAX_BEAT_INTENSITY,
            sensitivity: consts::SENSITIVITY,
            decay_rate: consts::DECAY_RATE,
            pattern_change_beats: consts::SHAPE_CHANGE_BEATS,
            random_beat_range: consts::RANDOM_BEAT_RANGE,
            total_patterns: consts::TOTAL_PATTERNS,
            drop_capacity: consts::MAX_PARTICLES,
            events_per_beat: consts::RAYS_PER_BEAT,
            pattern_transition_time: consts::PATTERN_TRANSITION_TIME,
            color_palette: hue_palette(consts::PALETTE_SIZE, 0.9, 1.0),
            bloom_intensity: consts::BLOOM_INTENSITY,
            vignette_intensity: consts::VIGNETTE_INTENSITY,
            contrast: consts::CONTRAST,
            saturation: consts::SATURATION,
            preferred_device_name: consts::DEVICE_NAME.to_string(),
            target_fps: consts::TARGET_FPS,
        }
    }
}

impl VisualizerConfig {
    /// Checks every value once at startup. Any error here is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::SampleRate);
        }
        if !self.block_size.is_power_of_two() || self.block_size < 2 {
            return Err(ConfigError::BlockSize(self.block_size));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Empty("queue_capacity"));
        }
        if self.smoothing_frames == 0 {
            return Err(ConfigError::Empty("smoothing_frames"));
        }

        for (name, band) in [
            ("bass", self.bass_band),
            ("mid", self.mid_band),
            ("treble", self.treble_band),
            ("beat", self.beat_band),
        ] {
            if band.lo_hz < 0.0 || band.lo_hz >= band.hi_hz {
                return Err(ConfigError::Band {
                    name,
                    lo: band.lo_hz,
                    hi: band.hi_hz,
                });
            }
        }

        if !(self.beat_threshold > 0.0 && self.beat_threshold < 1.0) {
            return Err(ConfigError::BeatThreshold(self.beat_threshold));
        }
        if self.beat_cooldown <= 0.0 {
            return Err(ConfigError::Cooldown(self.beat_cooldown));
        }
        if !(0.0..=1.0).contains(&self.threshold_adaptation) {
            return Err(ConfigError::Adaptation(self.threshold_adaptation));
        }
        if self.threshold_history == 0 || self.threshold_min_history > self.threshold_history {
            return Err(ConfigError::History {
                len: self.threshold_history,
                min: self.threshold_min_history,
            });
        }
        let (lo, hi) = self.threshold_clamp;
        if !(lo > 0.0 && lo <= hi) {
            return Err(ConfigError::ThresholdClamp { lo, hi });
        }
        if !(0.0..=1.0).contains(&self.decay_rate) {
            return Err(ConfigError::DecayRate(self.decay_rate));
        }
        if self.pattern_change_beats == 0 {
            return Err(ConfigError::Empty("pattern_change_beats"));
        }
        let (min, max) = self.random_beat_range;
        if min == 0 || max < min {
            return Err(ConfigError::RandomBeatRange { min, max });
        }
        if self.total_patterns == 0 {
            return Err(ConfigError::Empty("total_patterns"));
        }
        if self.color_palette.is_empty() {
            return Err(ConfigError::Empty("color_palette"));
        }
        if self.drop_capacity == 0 {
            return Err(ConfigError::Empty("drop_capacity"));
        }
        if self.events_per_beat == 0 {
            return Err(ConfigError::Empty("events_per_beat"));
        }

        Ok(())
    }
}

/// Evenly spaced hues at fixed saturation and value.
pub fn hue_palette(count: usize, saturation: f32, value: f32) -> Vec<[f32; 3]> {
    (0..count)
        .map(|i| hsv_to_rgb(i as f32 / count as f32, saturation, value))
        .collect()
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    if s == 0.0 {
        return [v, v, v];
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as i32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(VisualizerConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_power_of_two_block() {
        let config = VisualizerConfig {
            block_size: 1000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BlockSize(1000))
        ));
    }

    #[test]
    fn rejects_inverted_band() {
        let config = VisualizerConfig {
            mid_band: FrequencyBand::new(2000.0, 250.0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Band { name: "mid", .. })
        ));
    }

    #[test]
    fn rejects_bad_random_range() {
        let config = VisualizerConfig {
            random_beat_range: (10, 5),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn palette_starts_at_red() {
        let palette = hue_palette(12, 0.9, 1.0);
        assert_eq!(palette.len(), 12);
        let [r, g, b] = palette[0];
        assert_eq!(r, 1.0);
        assert!((g - 0.1).abs() < 1e-5);
        assert!((b - 0.1).abs() < 1e-5);
    }

    #[test]
    fn band_bounds_are_inclusive() {
        let band = FrequencyBand::new(20.0, 250.0);
        assert!(band.contains(20.0));
        assert!(band.contains(250.0));
        assert!(!band.contains(250.1));
    }
}
