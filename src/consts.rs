/// Requested sample rate in Hz. Standard CD quality is 44100 Hz.
/// The device may run at its own native rate; the analyzer always uses
/// the rate the stream actually reports.
pub const SAMPLE_RATE: u32 = 44100;

/// Number of samples per analysis block. Must be a power of 2 for FFT.
/// 2048 samples at 44.1kHz = ~46ms of audio
pub const BLOCK_SIZE: usize = 2048;

/// Maximum number of blocks waiting between the audio callback and the
/// frame loop. When full, the oldest block is dropped.
pub const QUEUE_CAPACITY: usize = 10;

/// Length of the rolling average applied to amplitude and band energies.
pub const SMOOTHING_FRAMES: usize = 3;

/// Frequency ranges (Hz) for the visual bands.
pub const BASS_FREQ_RANGE: (f32, f32) = (20.0, 250.0);
pub const MID_FREQ_RANGE: (f32, f32) = (250.0, 2000.0);
pub const TREBLE_FREQ_RANGE: (f32, f32) = (2000.0, 8000.0);

/// Range used only for rhythm detection. Wider than the bass band so that
/// kick drums with upper harmonics still register.
pub const BEAT_FREQ_RANGE: (f32, f32) = (20.0, 500.0);

/// Starting value of the adaptive beat threshold (fraction of total energy).
/// Lower = more sensitive (triggers more often)
/// Recommended range: 0.2 - 0.4
pub const BEAT_THRESHOLD: f32 = 0.28;

/// Minimum time in seconds between two beats.
pub const BEAT_COOLDOWN: f64 = 0.15;

/// How fast the adaptive threshold follows the recent beat energy (0.0 - 1.0).
pub const BEAT_THRESHOLD_ADAPTATION: f32 = 0.02;

/// Number of beat-energy samples kept for the adaptive threshold.
pub const BEAT_HISTORY_LEN: usize = 50;

/// History needed before the threshold starts adapting.
pub const BEAT_HISTORY_MIN: usize = 10;

/// Standard deviations above the mean that count as a beat.
pub const BEAT_STD_FACTOR: f32 = 0.5;

/// Bounds for the adaptive threshold.
pub const BEAT_THRESHOLD_MIN: f32 = 0.1;
pub const BEAT_THRESHOLD_MAX: f32 = 0.5;

/// Upper bound for `beat_intensity`.
pub const MAX_BEAT_INTENSITY: f32 = 2.0;

/// Multiplier applied to RMS loudness.
/// Higher = more sensitive to quiet sounds
/// Recommended range: 1.5 - 4.0
pub const SENSITIVITY: f32 = 2.5;

/// Per-block decay of amplitude and band energies when the signal quiets.
/// Closer to 1.0 = slower fade
pub const DECAY_RATE: f32 = 0.98;

/// Beats per pattern change in Order mode.
pub const SHAPE_CHANGE_BEATS: u32 = 16;

/// Inclusive range the Random mode draws its beat target from.
pub const RANDOM_BEAT_RANGE: (u32, u32) = (30, 70);

/// Beat targets offered by the start menu for Order mode.
pub const ORDER_BEAT_OPTIONS: [u32; 6] = [8, 16, 24, 32, 48, 64];

/// Number of visual patterns the renderer knows about.
pub const TOTAL_PATTERNS: usize = 43;

/// Capacity of the drop marker ring written on every beat.
pub const MAX_PARTICLES: usize = 10;

/// Markers written per beat.
pub const RAYS_PER_BEAT: usize = 8;

/// Cross-fade time between two patterns, in seconds.
pub const PATTERN_TRANSITION_TIME: f32 = 0.5;

/// Number of hues in the default palette.
pub const PALETTE_SIZE: usize = 12;

/// Post-processing values handed to the renderer as uniforms.
pub const BLOOM_INTENSITY: f32 = 0.3;
pub const VIGNETTE_INTENSITY: f32 = 0.2;
pub const CONTRAST: f32 = 1.1;
pub const SATURATION: f32 = 1.15;

/// Device name searched first when choosing a capture device.
pub const DEVICE_NAME: &str = "Stereo Mix";

/// Frame rate the host window aims for.
pub const TARGET_FPS: u32 = 60;

/// Initial window size in logical pixels.
pub const WINDOW_SIZE: [f32; 2] = [1280.0, 720.0];
