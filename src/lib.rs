//! Audio-reactive visualizer core: capture, spectral analysis, adaptive
//! beat detection, smoothing and beat-driven pattern scheduling.

pub mod audio;
pub mod config;
pub mod consts;
pub mod controller;
pub mod error;
pub mod gui;
pub mod render;
pub mod scheduler;
pub mod state;
pub mod visual_engine;
