//! Capture Engine
//!
//! Manages the cpal input stream feeding the level meter. The capture
//! callback runs on the audio thread and must be real-time safe: it downmixes
//! each frame to mono and pushes into a lock-free ring buffer, dropping
//! samples when the UI falls behind rather than blocking.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, SampleRate, Stream, StreamConfig};
use rtrb::{Producer, RingBuffer};
use std::sync::{Arc, Mutex};

use super::level_tap::LevelTap;
use crate::dsp::BLOCK_SIZE;

/// Capacity of the sample ring buffer between the capture callback and the
/// UI thread. A few blocks of headroom absorbs a slow frame.
pub const SAMPLE_QUEUE_CAPACITY: usize = BLOCK_SIZE * 8;

/// Errors that can occur during capture engine operation.
#[derive(Debug, Clone)]
pub enum AudioError {
    /// No audio input device was found.
    NoInputDevice,
    /// Failed to get device configuration.
    ConfigurationFailed(String),
    /// Failed to create the audio stream.
    StreamCreationFailed(String),
    /// Failed to start/stop capture.
    StreamPlaybackFailed(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::NoInputDevice => write!(f, "No audio input device found"),
            AudioError::ConfigurationFailed(msg) => {
                write!(f, "Failed to get device configuration: {}", msg)
            }
            AudioError::StreamCreationFailed(msg) => {
                write!(f, "Failed to create audio stream: {}", msg)
            }
            AudioError::StreamPlaybackFailed(msg) => {
                write!(f, "Failed to control audio capture: {}", msg)
            }
        }
    }
}

impl std::error::Error for AudioError {}

/// Information about an audio input device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the default input device.
    pub is_default: bool,
    /// Index in the device list (for selection).
    pub index: usize,
}

/// Averages one interleaved frame down to a single mono sample.
fn mix_to_mono(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    frame.iter().sum::<f32>() / frame.len() as f32
}

/// The capture engine that manages the cpal input stream.
///
/// The sample producer lives behind a mutex so it can be reused across
/// stream rebuilds (device switches); only the capture callback ever locks
/// it, so the lock is uncontested in practice and taken with `try_lock`.
pub struct CaptureEngine {
    host: Host,
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    sample_tx: Arc<Mutex<Producer<f32>>>,
}

impl CaptureEngine {
    /// Creates a capture engine on the default input device, returning the
    /// engine and the [`LevelTap`] that receives its samples.
    pub fn new() -> Result<(Self, LevelTap), AudioError> {
        let host = cpal::default_host();

        let device = host.default_input_device().ok_or(AudioError::NoInputDevice)?;
        let config = Self::input_config(&device)?;

        let (sample_tx, sample_rx) = RingBuffer::new(SAMPLE_QUEUE_CAPACITY);

        let engine = Self {
            host,
            device,
            config,
            stream: None,
            sample_tx: Arc::new(Mutex::new(sample_tx)),
        };
        Ok((engine, LevelTap::new(sample_rx)))
    }

    fn input_config(device: &Device) -> Result<StreamConfig, AudioError> {
        let supported_config = device
            .default_input_config()
            .map_err(|e| AudioError::ConfigurationFailed(e.to_string()))?;

        Ok(StreamConfig {
            channels: supported_config.channels(),
            sample_rate: SampleRate(supported_config.sample_rate().0),
            buffer_size: cpal::BufferSize::Default,
        })
    }

    /// Get information about all available input devices.
    pub fn enumerate_devices(&self) -> Vec<DeviceInfo> {
        let default_name = self.host.default_input_device().and_then(|d| d.name().ok());

        self.host
            .input_devices()
            .map(|devices| {
                devices
                    .enumerate()
                    .filter_map(|(index, device)| {
                        device.name().ok().map(|name| DeviceInfo {
                            is_default: Some(&name) == default_name.as_ref(),
                            name,
                            index,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the name of the currently selected device.
    pub fn current_device_name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "Unknown".to_string())
    }

    /// Select a different input device by index.
    ///
    /// Stops the current stream if running and restarts capture on the new
    /// device; the existing ring buffer (and its [`LevelTap`]) carries over.
    pub fn select_device(&mut self, index: usize) -> Result<(), AudioError> {
        let was_running = self.is_running();
        if was_running {
            self.stop()?;
        }

        let device = self
            .host
            .input_devices()
            .map_err(|e| AudioError::ConfigurationFailed(e.to_string()))?
            .nth(index)
            .ok_or(AudioError::NoInputDevice)?;

        self.config = Self::input_config(&device)?;
        self.device = device;

        if was_running {
            self.start()?;
        }

        Ok(())
    }

    /// Get the current stream configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Get the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Get the number of input channels.
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Start capturing. Starting while already running warns and is a no-op.
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.stream.is_some() {
            log::warn!("capture already running; ignoring start");
            return Ok(());
        }

        let channels = (self.config.channels as usize).max(1);
        let sample_tx = Arc::clone(&self.sample_tx);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // REAL-TIME SAFE: no allocations, no blocking. The lock
                    // is uncontested (nothing else ever takes it) and push
                    // drops samples when the buffer is full.
                    let Ok(mut tx) = sample_tx.try_lock() else {
                        return;
                    };
                    for frame in data.chunks(channels) {
                        let _ = tx.push(mix_to_mono(frame));
                    }
                },
                move |err| {
                    log::warn!("input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::StreamCreationFailed(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlaybackFailed(e.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }

    /// Stop capturing.
    pub fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(stream) = self.stream.take() {
            stream
                .pause()
                .map_err(|e| AudioError::StreamPlaybackFailed(e.to_string()))?;
        }
        Ok(())
    }

    /// Check if capture is currently running.
    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_to_mono_averages_channels() {
        assert_eq!(mix_to_mono(&[0.5]), 0.5);
        assert!((mix_to_mono(&[0.2, 0.4]) - 0.3).abs() < 1e-6);
        assert_eq!(mix_to_mono(&[]), 0.0);
    }

    #[test]
    fn test_mix_to_mono_cancelling_channels() {
        assert_eq!(mix_to_mono(&[1.0, -1.0]), 0.0);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AudioError::NoInputDevice.to_string(),
            "No audio input device found"
        );
        assert!(AudioError::StreamCreationFailed("backend".into())
            .to_string()
            .contains("backend"));
    }

    #[test]
    fn test_queue_capacity_holds_multiple_blocks() {
        assert!(SAMPLE_QUEUE_CAPACITY >= BLOCK_SIZE * 2);
    }
}
