//! Error types shared by the capture and configuration layers

use thiserror::Error;

/// Invalid configuration values
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Sample rate must be greater than 0")]
    SampleRate,

    #[error("Block size must be a power of 2, got {0}")]
    BlockSize(usize),

    #[error("{0} must be greater than 0")]
    Empty(&'static str),

    #[error("Invalid {name} band: {lo} Hz - {hi} Hz")]
    Band { name: &'static str, lo: f32, hi: f32 },

    #[error("Beat threshold must be between 0 and 1, got {0}")]
    BeatThreshold(f32),

    #[error("Beat cooldown must be greater than 0, got {0}")]
    Cooldown(f64),

    #[error("Threshold adaptation must be between 0 and 1, got {0}")]
    Adaptation(f32),

    #[error("Threshold history of {len} cannot require {min} samples")]
    History { len: usize, min: usize },

    #[error("Invalid threshold clamp: {lo} - {hi}")]
    ThresholdClamp { lo: f32, hi: f32 },

    #[error("Decay rate must be between 0 and 1, got {0}")]
    DecayRate(f32),

    #[error("Invalid random beat range: {min} - {max}")]
    RandomBeatRange { min: u32, max: u32 },
}

/// Device discovery errors
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Failed to enumerate devices: {0}")]
    Enumeration(String),

    #[error("No input device available")]
    NoInputDevice,

    #[error("Device not found: {0}")]
    NotFound(usize),
}

/// Audio capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("Failed to get device config: {0}")]
    Config(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to build audio stream: {0}")]
    Stream(String),

    #[error("Failed to start stream: {0}")]
    Play(String),
}
