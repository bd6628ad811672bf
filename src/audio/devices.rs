//! Audio input device enumeration and capture device selection

use crate::error::DeviceError;
use cpal::traits::{DeviceTrait, HostTrait};
use log::{debug, info, warn};

/// Index of a device in the host's input device list.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DeviceId(pub usize);

/// Rough category guessed from the device name.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeviceKind {
    /// Captures whatever the system is playing (stereo mix, loopback)
    Loopback,
    Headset,
    Microphone,
    Speaker,
    LineIn,
    Other,
}

#[derive(Clone, PartialEq, Debug)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub name: String,
    pub max_input_channels: u16,
    pub default_sample_rate: u32,
}

impl DeviceInfo {
    pub fn kind(&self) -> DeviceKind {
        classify(&self.name)
    }
}

const LOOPBACK_KEYWORDS: &[&str] = &[
    "mezcla",
    "stereo mix",
    "wave out",
    "loopback",
    "what u hear",
    "what you hear",
    "monitor of",
    "wave",
];
const HEADSET_KEYWORDS: &[&str] = &["auricular", "headphone", "headset", "cascos"];
const MICROPHONE_KEYWORDS: &[&str] = &["micrófono", "microphone", "mic"];
const SPEAKER_KEYWORDS: &[&str] = &["altavoz", "speaker", "parlante"];
const LINE_IN_KEYWORDS: &[&str] = &["line", "entrada", "input"];

pub fn classify(name: &str) -> DeviceKind {
    let name = name.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| name.contains(k));

    if matches(LOOPBACK_KEYWORDS) {
        DeviceKind::Loopback
    } else if matches(HEADSET_KEYWORDS) {
        DeviceKind::Headset
    } else if matches(MICROPHONE_KEYWORDS) {
        DeviceKind::Microphone
    } else if matches(SPEAKER_KEYWORDS) {
        DeviceKind::Speaker
    } else if matches(LINE_IN_KEYWORDS) {
        DeviceKind::LineIn
    } else {
        DeviceKind::Other
    }
}

/// Lists every input device of the default host.
pub fn list_input_devices() -> Result<Vec<DeviceInfo>, DeviceError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| DeviceError::Enumeration(e.to_string()))?;

    let infos: Vec<DeviceInfo> = devices
        .enumerate()
        .map(|(idx, device)| {
            let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
            let max_input_channels = device
                .supported_input_configs()
                .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
                .unwrap_or(0);
            let default_sample_rate = device
                .default_input_config()
                .map(|c| c.sample_rate().0)
                .unwrap_or(0);

            DeviceInfo {
                id: DeviceId(idx),
                name,
                max_input_channels,
                default_sample_rate,
            }
        })
        .collect();

    debug!("Found {} audio input devices", infos.len());
    Ok(infos)
}

/// Picks the device to capture from.
///
/// A device whose name contains `preferred_name` wins, then the first
/// device that looks like a loopback. `None` means "use the system
/// default input".
pub fn select_capture_device(devices: &[DeviceInfo], preferred_name: &str) -> Option<DeviceId> {
    let usable = || devices.iter().filter(|d| d.max_input_channels > 0);

    if !preferred_name.is_empty() {
        if let Some(device) = usable().find(|d| d.name.contains(preferred_name)) {
            info!(
                "Audio device found: '{}' (ID: {}, {} channels, {} Hz)",
                device.name, device.id.0, device.max_input_channels, device.default_sample_rate
            );
            return Some(device.id);
        }
    }

    if let Some(device) = usable().find(|d| d.kind() == DeviceKind::Loopback) {
        info!(
            "Using loopback device '{}' (ID: {})",
            device.name, device.id.0
        );
        return Some(device.id);
    }

    warn!("No '{preferred_name}' or loopback device found, using default input");
    None
}

/// Resolves an id back into a cpal device, or the default input for `None`.
pub fn open_device(id: Option<DeviceId>) -> Result<cpal::Device, DeviceError> {
    let host = cpal::default_host();

    match id {
        Some(DeviceId(idx)) => host
            .input_devices()
            .map_err(|e| DeviceError::Enumeration(e.to_string()))?
            .nth(idx)
            .ok_or(DeviceError::NotFound(idx)),
        None => host.default_input_device().ok_or(DeviceError::NoInputDevice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: usize, name: &str, channels: u16) -> DeviceInfo {
        DeviceInfo {
            id: DeviceId(id),
            name: name.to_string(),
            max_input_channels: channels,
            default_sample_rate: 48000,
        }
    }

    #[test]
    fn classifies_common_device_names() {
        assert_eq!(classify("Stereo Mix (Realtek Audio)"), DeviceKind::Loopback);
        assert_eq!(classify("Monitor of Built-in Audio"), DeviceKind::Loopback);
        assert_eq!(classify("Headset Microphone"), DeviceKind::Headset);
        assert_eq!(classify("USB Microphone"), DeviceKind::Microphone);
        assert_eq!(classify("Speakers"), DeviceKind::Speaker);
        assert_eq!(classify("Line In"), DeviceKind::LineIn);
        assert_eq!(classify("pulse"), DeviceKind::Other);
    }

    #[test]
    fn preferred_name_wins() {
        let devices = vec![
            device(0, "Loopback Device", 2),
            device(1, "Stereo Mix (Realtek)", 2),
        ];
        assert_eq!(
            select_capture_device(&devices, "Stereo Mix"),
            Some(DeviceId(1))
        );
    }

    #[test]
    fn falls_back_to_loopback_then_default() {
        let devices = vec![device(0, "USB Microphone", 1), device(1, "Loopback", 2)];
        assert_eq!(
            select_capture_device(&devices, "Stereo Mix"),
            Some(DeviceId(1))
        );

        let devices = vec![device(0, "USB Microphone", 1)];
        assert_eq!(select_capture_device(&devices, "Stereo Mix"), None);
    }

    #[test]
    fn ignores_devices_without_inputs() {
        let devices = vec![device(0, "Stereo Mix", 0)];
        assert_eq!(select_capture_device(&devices, "Stereo Mix"), None);
    }
}
