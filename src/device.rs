//! CPAL output device discovery.

use cpal::traits::{DeviceTrait, HostTrait};

use crate::error::BackendError;
use crate::nodes::CpalSink;

/// A discovered audio output device.
///
/// Use [`CpalDevice::default_output`] to get the system default, then
/// [`create_sink`](Self::create_sink) to open a stream on it.
pub struct CpalDevice {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,

    name: String,
    sample_rate: u32,
}

impl CpalDevice {
    fn from_device(device: cpal::Device) -> Option<Self> {
        let config = device.default_output_config().ok()?;
        let name = device.name().unwrap_or_else(|_| "Unknown".into());

        Some(Self {
            sample_rate: config.sample_rate().0,
            name,
            device,
            config,
        })
    }

    /// Get the system's default output device.
    ///
    /// Returns `None` if no audio device is available.
    pub fn default_output() -> Option<Self> {
        let host = cpal::default_host();
        Self::from_device(host.default_output_device()?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the device's sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Open an output stream and wrap it in a sink node.
    pub fn create_sink(&self) -> Result<CpalSink, BackendError> {
        CpalSink::new(&self.device, &self.config)
    }
}
