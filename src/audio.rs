pub mod analyzer;
pub mod audio_stream;
pub mod beat;
pub mod devices;
pub mod smoother;

pub use analyzer::{SpectralAnalyzer, SpectrumResult};
pub use audio_stream::{AudioBlock, BlockQueue, CaptureStream};
pub use beat::{BeatDetector, BeatEvent};
pub use devices::{DeviceId, DeviceInfo, DeviceKind};
pub use smoother::TemporalSmoother;
