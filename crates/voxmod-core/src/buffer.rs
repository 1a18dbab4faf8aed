//! Planar (non-interleaved) audio buffers and borrowed views.
//!
//! Channel `c` of a view occupies `data[c * stride .. c * stride + frames]`. Views
//! never allocate, so nodes can hand sub-ranges of their scratch storage to each
//! other on the audio path.

use crate::{Error, Result};

/// Owned planar buffer with a fixed capacity per channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioBuffer {
    data: Vec<f32>,
    channels: usize,
    frames: usize,
}

impl AudioBuffer {
    /// Zeroed buffer of `channels * frames` samples.
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            data: vec![0.0; channels * frames],
            channels,
            frames,
        }
    }

    /// Build from one `Vec` per channel. All channels must have the same length.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Result<Self> {
        let frames = channels.first().map_or(0, Vec::len);
        if channels.iter().any(|ch| ch.len() != frames) {
            return Err(Error::InvalidFormat(
                "channels have different lengths".to_string(),
            ));
        }
        let count = channels.len();
        Ok(Self {
            data: channels.into_iter().flatten().collect(),
            channels: count,
            frames,
        })
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn channel(&self, ch: usize) -> &[f32] {
        &self.data[ch * self.frames..(ch + 1) * self.frames]
    }

    #[inline]
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        &mut self.data[ch * self.frames..(ch + 1) * self.frames]
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Read view over every frame.
    pub fn view(&self) -> AudioBufferRef<'_> {
        self.view_frames(self.frames)
    }

    /// Read view over the first `frames` frames (capped at capacity).
    pub fn view_frames(&self, frames: usize) -> AudioBufferRef<'_> {
        AudioBufferRef {
            data: &self.data,
            channels: self.channels,
            frames: frames.min(self.frames),
            stride: self.frames,
        }
    }

    /// Write view over every frame.
    pub fn view_mut(&mut self) -> AudioBufferMut<'_> {
        let frames = self.frames;
        self.view_mut_frames(frames)
    }

    /// Write view over the first `frames` frames (capped at capacity).
    pub fn view_mut_frames(&mut self, frames: usize) -> AudioBufferMut<'_> {
        AudioBufferMut {
            channels: self.channels,
            frames: frames.min(self.frames),
            stride: self.frames,
            data: &mut self.data,
        }
    }
}

/// Borrowed read-only planar buffer.
#[derive(Debug, Clone, Copy)]
pub struct AudioBufferRef<'a> {
    data: &'a [f32],
    channels: usize,
    frames: usize,
    stride: usize,
}

impl<'a> AudioBufferRef<'a> {
    /// Wrap contiguous planar data (`channels` runs of `frames` samples).
    pub fn new(data: &'a [f32], channels: usize, frames: usize) -> Result<Self> {
        if data.len() < channels * frames {
            return Err(Error::InvalidFormat(format!(
                "{} samples cannot hold {} channels of {} frames",
                data.len(),
                channels,
                frames
            )));
        }
        Ok(Self {
            data,
            channels,
            frames,
            stride: frames,
        })
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn channel(&self, ch: usize) -> &'a [f32] {
        let start = ch * self.stride;
        &self.data[start..start + self.frames]
    }
}

/// Borrowed writable planar buffer.
#[derive(Debug)]
pub struct AudioBufferMut<'a> {
    data: &'a mut [f32],
    channels: usize,
    frames: usize,
    stride: usize,
}

impl<'a> AudioBufferMut<'a> {
    /// Wrap contiguous planar data (`channels` runs of `frames` samples).
    pub fn new(data: &'a mut [f32], channels: usize, frames: usize) -> Result<Self> {
        if data.len() < channels * frames {
            return Err(Error::InvalidFormat(format!(
                "{} samples cannot hold {} channels of {} frames",
                data.len(),
                channels,
                frames
            )));
        }
        Ok(Self {
            data,
            channels,
            frames,
            stride: frames,
        })
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn channel(&self, ch: usize) -> &[f32] {
        let start = ch * self.stride;
        &self.data[start..start + self.frames]
    }

    #[inline]
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        let start = ch * self.stride;
        &mut self.data[start..start + self.frames]
    }

    /// Read-only view of the same region.
    pub fn as_view(&self) -> AudioBufferRef<'_> {
        AudioBufferRef {
            data: &*self.data,
            channels: self.channels,
            frames: self.frames,
            stride: self.stride,
        }
    }

    /// Zero every frame of every channel.
    pub fn fill_silence(&mut self) {
        for ch in 0..self.channels {
            self.channel_mut(ch).fill(0.0);
        }
    }

    /// Copy `input` channel by channel. Both views must have the same shape.
    pub fn copy_from(&mut self, input: &AudioBufferRef<'_>) {
        let channels = self.channels.min(input.channels());
        for ch in 0..channels {
            let src = input.channel(ch);
            let dst = self.channel_mut(ch);
            let n = dst.len().min(src.len());
            dst[..n].copy_from_slice(&src[..n]);
        }
    }
}
