//! Audio bus format shared by every node in a chain.

use crate::{Error, Result};

/// Sample rate, channel count and maximum buffer size agreed during negotiation.
///
/// The default value is the unset format (all zero), which negotiation rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AudioBusFormat {
    pub sample_rate: u32,
    pub channels: usize,
    pub frames_per_buffer: usize,
}

impl AudioBusFormat {
    pub fn new(sample_rate: u32, channels: usize, frames_per_buffer: usize) -> Self {
        Self {
            sample_rate,
            channels,
            frames_per_buffer,
        }
    }

    /// True when every field is non-zero.
    pub fn is_set(&self) -> bool {
        self.sample_rate > 0 && self.channels > 0 && self.frames_per_buffer > 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidFormat("sample rate is zero".to_string()));
        }
        if self.channels == 0 {
            return Err(Error::InvalidFormat("channel count is zero".to_string()));
        }
        if self.frames_per_buffer == 0 {
            return Err(Error::InvalidFormat("frames per buffer is zero".to_string()));
        }
        Ok(())
    }

    #[inline]
    pub fn sample_rate_f64(&self) -> f64 {
        self.sample_rate as f64
    }

    /// Total samples across all channels of one full buffer.
    #[inline]
    pub fn buffer_len(&self) -> usize {
        self.channels * self.frames_per_buffer
    }
}
