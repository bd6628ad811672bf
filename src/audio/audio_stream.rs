use super::devices::{self, DeviceId};
use crate::config::VisualizerConfig;
use crate::error::CaptureError;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// One fixed-size mono block plus the rate the device actually runs at.
#[derive(Clone, Debug)]
pub struct AudioBlock {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

#[derive(Default, Debug)]
pub struct CaptureStats {
    pub blocks_delivered: AtomicU64,
    pub blocks_evicted: AtomicU64,
    pub stream_errors: AtomicU64,
}

/// Bounded hand-off between the audio callback and the frame loop.
///
/// Pushing never blocks: when the queue is full the oldest block is
/// dropped to make room for the newest one.
#[derive(Clone)]
pub struct BlockQueue {
    tx: Sender<AudioBlock>,
    rx: Receiver<AudioBlock>,
    stats: Arc<CaptureStats>,
}

impl BlockQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        Self {
            tx,
            rx,
            stats: Arc::new(CaptureStats::default()),
        }
    }

    /// Returns `true` when an older block had to be evicted.
    pub fn push(&self, mut block: AudioBlock) -> bool {
        let mut evicted = false;
        loop {
            match self.tx.try_send(block) {
                Ok(()) => {
                    self.stats.blocks_delivered.fetch_add(1, Ordering::Relaxed);
                    return evicted;
                }
                Err(TrySendError::Full(rejected)) => {
                    if self.rx.try_recv().is_ok() {
                        self.stats.blocks_evicted.fetch_add(1, Ordering::Relaxed);
                        evicted = true;
                    }
                    block = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return evicted,
            }
        }
    }

    pub fn try_pop(&self) -> Option<AudioBlock> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn stats(&self) -> &Arc<CaptureStats> {
        &self.stats
    }
}

/// Downmixes interleaved frames and cuts them into fixed-size blocks.
pub struct BlockAssembler {
    pending: Vec<f32>,
    block_size: usize,
    channels: usize,
}

impl BlockAssembler {
    pub fn new(block_size: usize, channels: usize) -> Self {
        Self {
            pending: Vec::with_capacity(block_size),
            block_size,
            channels: channels.max(1),
        }
    }

    pub fn push_interleaved<T>(&mut self, data: &[T], mut emit: impl FnMut(Vec<f32>))
    where
        T: Sample,
        f32: FromSample<T>,
    {
        for frame in data.chunks(self.channels) {
            let sum: f32 = frame.iter().map(|&s| s.to_sample::<f32>()).sum();
            self.pending.push(sum / frame.len() as f32);

            if self.pending.len() == self.block_size {
                let block = std::mem::replace(
                    &mut self.pending,
                    Vec::with_capacity(self.block_size),
                );
                emit(block);
            }
        }
    }
}

/// A running input stream feeding a [`BlockQueue`].
pub struct CaptureStream {
    stream: Option<cpal::Stream>,
    running: Arc<AtomicBool>,
    sample_rate: u32,
    device_name: String,
}

impl CaptureStream {
    /// Opens `device` (or the default input) at its native rate and starts
    /// pushing `config.block_size` mono blocks into `queue`.
    pub fn start(
        device: Option<DeviceId>,
        config: &VisualizerConfig,
        queue: BlockQueue,
    ) -> Result<Self, CaptureError> {
        let device = devices::open_device(device)?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported_config = device
            .default_input_config()
            .map_err(|e| CaptureError::Config(e.to_string()))?;
        let sample_format = supported_config.sample_format();
        let stream_config: cpal::StreamConfig = supported_config.into();
        let sample_rate = stream_config.sample_rate.0;

        info!("Configuring audio capture on '{device_name}':");
        info!("  Sample rate: {sample_rate} Hz (requested {})", config.sample_rate);
        info!("  Channels: {}", stream_config.channels);
        info!("  Block size: {} samples", config.block_size);

        let running = Arc::new(AtomicBool::new(true));
        let stream = match sample_format {
            SampleFormat::F32 => {
                build_stream::<f32>(&device, &stream_config, config, &queue, &running)?
            }
            SampleFormat::I16 => {
                build_stream::<i16>(&device, &stream_config, config, &queue, &running)?
            }
            SampleFormat::U16 => {
                build_stream::<u16>(&device, &stream_config, config, &queue, &running)?
            }
            other => return Err(CaptureError::UnsupportedFormat(format!("{other:?}"))),
        };

        stream
            .play()
            .map_err(|e| CaptureError::Play(e.to_string()))?;
        info!("Audio capture started");

        Ok(Self {
            stream: Some(stream),
            running,
            sample_rate,
            device_name,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Stops the stream. Once this returns the callback will not run again.
    /// Calling it twice is harmless.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                warn!("Error pausing audio stream: {e}");
            }
            // Dropping the stream joins the backend's callback thread.
            drop(stream);
            info!("Audio stream stopped");
        }
    }
}

impl Drop for CaptureStream {
    fn drop(&mut self) {
        self.stop();
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    config: &VisualizerConfig,
    queue: &BlockQueue,
    running: &Arc<AtomicBool>,
) -> Result<cpal::Stream, CaptureError>
where
    T: Sample + cpal::SizedSample,
    f32: FromSample<T>,
{
    let sample_rate = stream_config.sample_rate.0;
    let mut assembler = BlockAssembler::new(config.block_size, stream_config.channels as usize);
    let queue = queue.clone();
    let error_stats = queue.stats().clone();
    let running = running.clone();

    let stream = device
        .build_input_stream(
            stream_config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if !running.load(Ordering::Acquire) {
                    return;
                }
                assembler.push_interleaved(data, |samples| {
                    if queue.push(AudioBlock {
                        samples,
                        sample_rate,
                    }) {
                        debug!("Audio queue full, dropped oldest block");
                    }
                });
            },
            move |err| {
                error_stats.stream_errors.fetch_add(1, Ordering::Relaxed);
                warn!("Audio callback status: {err}");
            },
            None,
        )
        .map_err(|e| CaptureError::Stream(e.to_string()))?;

    Ok(stream)
}
