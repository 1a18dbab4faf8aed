//! Stream configuration.

use crate::{AudioBusFormat, Error, Result};

/// Configuration for a voice-changer stream.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxConfig {
    pub sample_rate: u32,
    pub channels: usize,
    pub frames_per_buffer: usize,
}

impl Default for VoxConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            frames_per_buffer: 512,
        }
    }
}

impl VoxConfig {
    pub const MIN_SAMPLE_RATE: u32 = 8000;
    pub const MAX_SAMPLE_RATE: u32 = 384000;
    pub const MAX_CHANNELS: usize = 8;
    pub const MIN_FRAMES: usize = 16;
    pub const MAX_FRAMES: usize = 8192;

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate < Self::MIN_SAMPLE_RATE || self.sample_rate > Self::MAX_SAMPLE_RATE {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.channels == 0 || self.channels > Self::MAX_CHANNELS {
            return Err(Error::InvalidConfig(format!(
                "channels {} out of range (1-8)",
                self.channels
            )));
        }
        if self.frames_per_buffer < Self::MIN_FRAMES || self.frames_per_buffer > Self::MAX_FRAMES {
            return Err(Error::InvalidConfig(format!(
                "frames_per_buffer {} out of range (16-8192)",
                self.frames_per_buffer
            )));
        }
        Ok(())
    }

    /// Bus format used for negotiation.
    pub fn format(&self) -> AudioBusFormat {
        AudioBusFormat::new(self.sample_rate, self.channels, self.frames_per_buffer)
    }
}
