//! Live audio capture using CPAL (Cross-Platform Audio Library).
//!
//! The hardware data callback runs on its own (potentially realtime
//! priority) thread and must never block: it only carves the incoming
//! samples into fixed-size frames and hands them to the session queue with a
//! non-blocking push. Driver status problems are logged, not treated as
//! fatal.

use crate::audio::chunker::FrameChunker;
use crate::config::SessionConfig;
use crate::error::{Result, VoxlistError};
use crate::stream::queue::QueueProducer;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// Suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers when
/// probing audio backends; they are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2.
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Device names preferred for voice input on desktop Linux setups.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns that are never useful for voice input.
const FILTERED_PATTERNS: &[&str] = &["surround", "front:", "rear:", "HDMI", "S/PDIF"];

fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List usable audio input devices, preferred ones first.
///
/// # Errors
/// Returns `AudioCapture` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let devices = with_suppressed_stderr(|| cpal::default_host().input_devices()).map_err(|e| {
        VoxlistError::AudioCapture {
            message: format!("Failed to enumerate input devices: {}", e),
        }
    })?;

    let mut preferred = Vec::new();
    let mut rest = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }
            if is_preferred_device(&name) {
                preferred.push(name);
            } else {
                rest.push(name);
            }
        }
    }
    preferred.extend(rest);
    Ok(preferred)
}

/// Resolve the capture device: by name when configured, otherwise the first
/// preferred device, otherwise the system default.
fn resolve_device(device_name: Option<&str>) -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Some(name) = device_name {
            let devices = host.input_devices().map_err(|e| VoxlistError::AudioCapture {
                message: format!("Failed to enumerate devices: {}", e),
            })?;
            for device in devices {
                if device.name().map(|n| n == name).unwrap_or(false) {
                    return Ok(device);
                }
            }
            return Err(VoxlistError::AudioDeviceNotFound {
                device: name.to_string(),
            });
        }

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if device.name().map(|n| is_preferred_device(&n)).unwrap_or(false) {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| VoxlistError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only touched through the Mutex in `LiveCapture`,
/// so it is never accessed from two threads at once.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Live capture source feeding the session queue.
///
/// Built from the session configuration; `start` opens the device stream at
/// the configured rate and channel count (i16 preferred, f32 converted in
/// the callback for devices that only expose float formats).
pub struct LiveCapture {
    device: cpal::Device,
    config: SessionConfig,
    stream: Arc<Mutex<Option<SendableStream>>>,
}

impl LiveCapture {
    /// Resolves the configured device without opening a stream yet.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let device = resolve_device(config.device.as_deref())?;
        Ok(Self {
            device,
            config: config.clone(),
            stream: Arc::new(Mutex::new(None)),
        })
    }

    /// Starts capturing; completed frames are pushed to `producer`.
    pub fn start(&mut self, producer: QueueProducer) -> Result<()> {
        {
            let guard = self.lock_stream()?;
            if guard.is_some() {
                return Ok(()); // Already started
            }
        }

        let stream = self.build_stream(producer)?;
        stream.play().map_err(|e| VoxlistError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        *self.lock_stream()? = Some(SendableStream(stream));
        Ok(())
    }

    /// Stops capturing and releases the device stream.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.lock_stream()?.take() {
            stream.0.pause().map_err(|e| VoxlistError::AudioCapture {
                message: format!("Failed to stop audio stream: {}", e),
            })?;
        }
        Ok(())
    }

    fn lock_stream(&self) -> Result<std::sync::MutexGuard<'_, Option<SendableStream>>> {
        self.stream.lock().map_err(|e| VoxlistError::AudioCapture {
            message: format!("Failed to lock stream: {}", e),
        })
    }

    fn build_stream(&self, producer: QueueProducer) -> Result<cpal::Stream> {
        let stream_config = cpal::StreamConfig {
            channels: self.config.channels,
            sample_rate: cpal::SampleRate(self.config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let frame_samples = self.config.frame_samples();

        // A non-zero driver status is logged, never fatal; capture
        // continues unless the stream itself dies.
        let err_callback = |err| {
            warn!(error = %err, "Audio stream reported an error");
        };

        // Try i16 first — PipeWire/PulseAudio convert transparently
        let mut chunker = FrameChunker::new(frame_samples);
        let frame_producer = producer.clone();
        if let Ok(stream) = self.device.build_input_stream(
            &stream_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                for frame in chunker.push(data) {
                    if !frame_producer.push(frame) {
                        return; // Consumer gone; session is over
                    }
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        // Fall back to f32 for devices that only expose float formats
        let mut chunker = FrameChunker::new(frame_samples);
        self.device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                        .collect();
                    for frame in chunker.push(&converted) {
                        if !producer.push(frame) {
                            return;
                        }
                    }
                },
                err_callback,
                None,
            )
            .map_err(|e| VoxlistError::AudioCapture {
                message: format!("Failed to build input stream: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_filter_device() {
        assert!(should_filter_device("surround51"));
        assert!(should_filter_device("front:CARD=PCH"));
        assert!(should_filter_device("HDMI Output"));
        assert!(!should_filter_device("pipewire"));
        assert!(!should_filter_device("Built-in Audio"));
    }

    #[test]
    fn test_is_preferred_device() {
        assert!(is_preferred_device("pipewire"));
        assert!(is_preferred_device("PipeWire"));
        assert!(is_preferred_device("PulseAudio"));
        assert!(!is_preferred_device("hw:0,0"));
        assert!(!is_preferred_device("default"));
    }

    #[test]
    fn test_create_with_invalid_device_name() {
        let mut config = SessionConfig::default();
        config.device = Some("NonExistentDevice12345".to_string());

        match LiveCapture::new(&config) {
            Err(VoxlistError::AudioDeviceNotFound { device }) => {
                assert_eq!(device, "NonExistentDevice12345");
            }
            // Headless machines may fail enumeration before the name
            // lookup even runs; that is also a valid failure here.
            Err(VoxlistError::AudioCapture { .. }) => {}
            Err(other) => panic!("Expected AudioDeviceNotFound, got {:?}", other),
            Ok(_) => panic!("Expected lookup failure for a bogus device name"),
        }
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_start_stop_with_default_device() {
        let config = SessionConfig::default();
        let mut capture = LiveCapture::new(&config).expect("Failed to resolve device");

        let (producer, _consumer) = crate::stream::queue::session_queue();
        assert!(capture.start(producer).is_ok());
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(capture.stop().is_ok());
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_list_devices_filters_unusable_entries() {
        let devices = list_devices().expect("Failed to list devices");
        for device in &devices {
            assert!(!device.to_lowercase().contains("surround"));
            assert!(!device.to_lowercase().contains("hdmi"));
        }
    }
}
