use crate::config::{FrequencyBand, VisualizerConfig};
use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// Everything the later pipeline stages need from one block.
#[derive(Clone, Debug, Default)]
pub struct SpectrumResult {
    /// `block_size / 2 + 1` non-negative magnitudes
    pub magnitudes: Vec<f32>,
    pub bass_energy: f32,
    pub mid_energy: f32,
    pub treble_energy: f32,
    /// Energy fraction of the rhythm band
    pub beat_energy: f32,
    /// RMS of the raw, unwindowed block
    pub rms: f32,
}

pub struct SpectralAnalyzer {
    block_size: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    bass_band: FrequencyBand,
    mid_band: FrequencyBand,
    treble_band: FrequencyBand,
    beat_band: FrequencyBand,
}

impl SpectralAnalyzer {
    pub fn new(config: &VisualizerConfig) -> Self {
        let block_size = config.block_size;
        let fft = FftPlanner::new().plan_fft_forward(block_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            block_size,
            window: hann_window(block_size),
            fft,
            fft_buffer: vec![Complex::new(0.0, 0.0); block_size],
            scratch,
            bass_band: config.bass_band,
            mid_band: config.mid_band,
            treble_band: config.treble_band,
            beat_band: config.beat_band,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Windows the block, takes its magnitude spectrum and splits it into
    /// band energies. `sample_rate` must be the rate the samples were
    /// actually captured at.
    ///
    /// Short blocks are zero-padded and long ones truncated to the block size.
    pub fn analyze(&mut self, block: &[f32], sample_rate: u32) -> SpectrumResult {
        let rms = rms(block);

        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            let sample = block.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch);

        // Real input: bins above N/2 mirror the lower half
        let magnitudes: Vec<f32> = self.fft_buffer[..=self.block_size / 2]
            .iter()
            .map(|c| c.norm())
            .collect();

        let bin_hz = sample_rate as f32 / self.block_size as f32;
        let total: f32 = magnitudes.iter().sum();

        SpectrumResult {
            bass_energy: band_energy(&magnitudes, bin_hz, total, self.bass_band),
            mid_energy: band_energy(&magnitudes, bin_hz, total, self.mid_band),
            treble_energy: band_energy(&magnitudes, bin_hz, total, self.treble_band),
            beat_energy: band_energy(&magnitudes, bin_hz, total, self.beat_band),
            magnitudes,
            rms,
        }
    }
}

/// Symmetric Hann window of length `len`.
pub fn hann_window(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (len - 1) as f32).cos()))
        .collect()
}

pub fn rms(block: &[f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = block.iter().map(|&x| x * x).sum();
    (sum_squares / block.len() as f32).sqrt()
}

/// Fraction of the total magnitude that falls inside `band`. Zero for silence.
pub fn band_energy(magnitudes: &[f32], bin_hz: f32, total: f32, band: FrequencyBand) -> f32 {
    if total <= 0.0 {
        return 0.0;
    }
    let in_band: f32 = magnitudes
        .iter()
        .enumerate()
        .filter(|(i, _)| band.contains(*i as f32 * bin_hz))
        .map(|(_, &m)| m)
        .sum();
    in_band / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, amplitude: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin()
            })
            .collect()
    }

    #[test]
    fn silence_has_no_energy() {
        let config = VisualizerConfig::default();
        let mut analyzer = SpectralAnalyzer::new(&config);

        let result = analyzer.analyze(&vec![0.0; config.block_size], 44100);

        assert_eq!(result.magnitudes.len(), config.block_size / 2 + 1);
        assert_eq!(result.bass_energy, 0.0);
        assert_eq!(result.mid_energy, 0.0);
        assert_eq!(result.treble_energy, 0.0);
        assert_eq!(result.beat_energy, 0.0);
        assert_eq!(result.rms, 0.0);
    }

    #[test]
    fn bass_sine_lands_in_bass_band() {
        let config = VisualizerConfig::default();
        let mut analyzer = SpectralAnalyzer::new(&config);
        let block = sine(100.0, 0.5, 44100, 2048);

        let result = analyzer.analyze(&block, 44100);

        assert!(result.bass_energy > 0.9, "bass = {}", result.bass_energy);
        assert!(result.mid_energy < 0.05, "mid = {}", result.mid_energy);
        assert!(result.treble_energy < 0.05, "treble = {}", result.treble_energy);
        assert!(result.beat_energy >= result.bass_energy);
    }

    #[test]
    fn treble_sine_lands_in_treble_band() {
        let config = VisualizerConfig::default();
        let mut analyzer = SpectralAnalyzer::new(&config);
        let block = sine(4000.0, 0.5, 44100, 2048);

        let result = analyzer.analyze(&block, 44100);

        assert!(result.treble_energy > result.mid_energy);
        assert!(result.treble_energy > result.bass_energy);
        assert!(result.treble_energy > 0.5);
    }

    #[test]
    fn rms_uses_unwindowed_block() {
        let config = VisualizerConfig::default();
        let mut analyzer = SpectralAnalyzer::new(&config);

        let result = analyzer.analyze(&vec![0.5; config.block_size], 44100);

        assert!((result.rms - 0.5).abs() < 1e-6);
    }

    #[test]
    fn bins_follow_actual_sample_rate() {
        let config = VisualizerConfig::default();
        let mut analyzer = SpectralAnalyzer::new(&config);
        // 2100 Hz at 48 kHz is treble, but would read as ~1930 Hz (mid)
        // if the bins were computed at 44.1 kHz
        let block = sine(2100.0, 0.5, 48000, 2048);

        let result = analyzer.analyze(&block, 48000);

        assert!(result.treble_energy > result.mid_energy);
    }

    #[test]
    fn hann_window_is_symmetric_with_zero_edges() {
        let window = hann_window(8);
        assert_eq!(window[0], 0.0);
        assert!(window[7].abs() < 1e-6);
        for i in 0..4 {
            assert!((window[i] - window[7 - i]).abs() < 1e-6);
        }
    }
}
