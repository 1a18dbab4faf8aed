//! Circular delay line shared by the delay-based effects.

/// Single-channel circular buffer.
///
/// `read(d)` returns the sample written `d` writes ago; reads happen before the
/// write of the current frame.
#[derive(Debug, Clone)]
pub(crate) struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(2)],
            write_pos: 0,
        }
    }

    #[inline]
    pub(crate) fn read(&self, delay: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay.clamp(1, len);
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Linearly interpolated read at a fractional delay.
    #[inline]
    pub(crate) fn read_fractional(&self, delay: f32) -> f32 {
        let max = (self.buffer.len() - 1) as f32;
        let delay = delay.clamp(1.0, max);
        let whole = delay as usize;
        let frac = delay - whole as f32;
        let a = self.read(whole);
        let b = self.read(whole + 1);
        a + (b - a) * frac
    }

    #[inline]
    pub(crate) fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    pub(crate) fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
