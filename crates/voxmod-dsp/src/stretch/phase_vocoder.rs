//! Phase vocoder pitch shifter with spectral-envelope formant correction.
//!
//! ## Algorithm Overview
//!
//! 1. **Analysis**: Hann-windowed STFT with 4x overlap; each bin's true frequency is
//!    recovered from the phase advance between frames
//! 2. **Bin shifting**: bin `k` moves to `k * ratio` carrying its frequency scaled by `ratio`
//! 3. **Formant correction**: a smoothed magnitude envelope re-weights each moved bin so
//!    the output envelope is the input envelope stretched by `ratio * formant_factor`
//! 4. **Synthesis**: phases are accumulated per bin, inverse FFT, overlap-add
//!
//! ## RT-Safety
//!
//! FFT plans and all buffers are allocated in `configure()`. `process()` performs no
//! allocations.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::TAU;
use std::sync::Arc;
use voxmod_core::{AudioBufferMut, AudioBufferRef, Error, Result};

use super::PitchTransform;

const OVERSAMPLING: usize = 4;

/// Half-width of the envelope smoothing window, in Hz.
const ENVELOPE_RADIUS_HZ: f32 = 200.0;

/// Upper bound on the per-bin formant correction gain.
const MAX_FORMANT_GAIN: f32 = 16.0;

/// FFT size preset (latency/frequency-resolution trade-off)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FftSize {
    /// 1024 samples
    Small,
    /// 2048 samples
    #[default]
    Medium,
    /// 4096 samples
    Large,
}

impl FftSize {
    pub fn size(&self) -> usize {
        match self {
            FftSize::Small => 1024,
            FftSize::Medium => 2048,
            FftSize::Large => 4096,
        }
    }

    pub fn hop_size(&self) -> usize {
        self.size() / OVERSAMPLING
    }
}

/// Per-channel FIFOs and phase history.
struct ChannelState {
    in_fifo: Vec<f32>,
    out_fifo: Vec<f32>,
    accum: Vec<f32>,
    last_phase: Vec<f32>,
    sum_phase: Vec<f32>,
    rover: usize,
}

impl ChannelState {
    fn new(size: usize, latency: usize) -> Self {
        let bins = size / 2 + 1;
        Self {
            in_fifo: vec![0.0; size],
            out_fifo: vec![0.0; size],
            accum: vec![0.0; size],
            last_phase: vec![0.0; bins],
            sum_phase: vec![0.0; bins],
            rover: latency,
        }
    }

    fn reset(&mut self, latency: usize) {
        self.in_fifo.fill(0.0);
        self.out_fifo.fill(0.0);
        self.accum.fill(0.0);
        self.last_phase.fill(0.0);
        self.sum_phase.fill(0.0);
        self.rover = latency;
    }
}

/// FFT plans and scratch shared by every channel.
struct Kernel {
    size: usize,
    hop: usize,
    latency: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    ana_magn: Vec<f32>,
    ana_freq: Vec<f32>,
    syn_magn: Vec<f32>,
    syn_freq: Vec<f32>,
    envelope: Vec<f32>,
    prefix: Vec<f32>,
    envelope_radius: usize,
}

impl Kernel {
    fn new(fft_size: FftSize, sample_rate: u32) -> Self {
        let size = fft_size.size();
        let hop = fft_size.hop_size();
        let bins = size / 2 + 1;

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        let bin_hz = sample_rate as f32 / size as f32;
        let envelope_radius = ((ENVELOPE_RADIUS_HZ / bin_hz).round() as usize).max(2);

        Self {
            size,
            hop,
            latency: size - hop,
            forward,
            inverse,
            window: create_hann_window(size),
            spectrum: vec![Complex::new(0.0, 0.0); size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            ana_magn: vec![0.0; bins],
            ana_freq: vec![0.0; bins],
            syn_magn: vec![0.0; bins],
            syn_freq: vec![0.0; bins],
            envelope: vec![0.0; bins],
            prefix: vec![0.0; bins + 1],
            envelope_radius,
        }
    }

    /// Run one analysis/synthesis frame on a full input FIFO.
    fn process_frame(&mut self, state: &mut ChannelState, ratio: f32, formant_factor: f32) {
        let size = self.size;
        let half = size / 2;
        let expected = TAU * self.hop as f32 / size as f32;
        let osamp = OVERSAMPLING as f32;

        for ((bin, &x), &w) in self.spectrum.iter_mut().zip(&state.in_fifo).zip(&self.window) {
            *bin = Complex::new(x * w, 0.0);
        }
        self.forward
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        // Analysis: magnitude and true frequency (in bins) per bin
        for k in 0..=half {
            let c = self.spectrum[k];
            let phase = c.im.atan2(c.re);
            let delta = phase - state.last_phase[k] - k as f32 * expected;
            state.last_phase[k] = phase;

            self.ana_magn[k] = 2.0 * c.norm();
            self.ana_freq[k] = k as f32 + osamp * wrap_phase(delta) / TAU;
        }

        self.update_envelope();

        // Bin shifting with formant correction
        self.syn_magn.fill(0.0);
        self.syn_freq.fill(0.0);
        let correct_formants = (formant_factor - 1.0).abs() > 1e-6;
        let floor = self.envelope.iter().fold(0.0f32, |m, &e| m.max(e)) * 1e-3 + 1e-12;
        for k in 0..=half {
            let index = (k as f32 * ratio) as usize;
            if index > half {
                break;
            }
            let gain = if correct_formants {
                let target = self.envelope_at(k as f32 / formant_factor);
                ((target + floor) / (self.envelope[k] + floor)).clamp(0.0, MAX_FORMANT_GAIN)
            } else {
                1.0
            };
            self.syn_magn[index] += self.ana_magn[k] * gain;
            self.syn_freq[index] = self.ana_freq[k] * ratio;
        }

        // Synthesis: accumulate phase from each bin's frequency
        for k in 0..=half {
            let deviation = self.syn_freq[k] - k as f32;
            let advance = TAU * deviation / osamp + k as f32 * expected;
            state.sum_phase[k] = wrap_phase(state.sum_phase[k] + advance);
            self.spectrum[k] = Complex::from_polar(self.syn_magn[k], state.sum_phase[k]);
        }
        for bin in &mut self.spectrum[half + 1..] {
            *bin = Complex::new(0.0, 0.0);
        }
        self.inverse
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        // Overlap-add
        let scale = 2.0 / (half as f32 * osamp);
        for ((acc, &w), c) in state.accum.iter_mut().zip(&self.window).zip(&self.spectrum) {
            *acc += w * c.re * scale;
        }

        let hop = self.hop;
        state.out_fifo[..hop].copy_from_slice(&state.accum[..hop]);
        state.accum.copy_within(hop.., 0);
        state.accum[size - hop..].fill(0.0);
        state.in_fifo.copy_within(hop.., 0);
    }

    /// Moving-average magnitude envelope over `envelope_radius` bins each side.
    fn update_envelope(&mut self) {
        let bins = self.ana_magn.len();
        self.prefix[0] = 0.0;
        for k in 0..bins {
            self.prefix[k + 1] = self.prefix[k] + self.ana_magn[k];
        }
        let r = self.envelope_radius;
        for k in 0..bins {
            let lo = k.saturating_sub(r);
            let hi = (k + r + 1).min(bins);
            self.envelope[k] = (self.prefix[hi] - self.prefix[lo]) / (hi - lo) as f32;
        }
    }

    /// Linearly interpolated envelope; zero above Nyquist.
    fn envelope_at(&self, bin: f32) -> f32 {
        let last = self.envelope.len() - 1;
        if bin >= last as f32 {
            return 0.0;
        }
        let i = bin as usize;
        let frac = bin - i as f32;
        self.envelope[i] * (1.0 - frac) + self.envelope[i + 1] * frac
    }
}

/// Create a periodic Hann window of the specified size
fn create_hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (TAU * i as f32 / size as f32).cos()))
        .collect()
}

/// Wrap phase to [-PI, PI]
#[inline]
fn wrap_phase(phase: f32) -> f32 {
    phase - TAU * (phase / TAU).round()
}

/// Streaming phase-vocoder pitch shifter.
///
/// Latency is `fft_size - hop` frames; for the default 2048-point FFT that is 1536
/// frames. Output before that point is silence or a faint pre-echo of the first frame.
pub struct PhaseVocoderShifter {
    fft_size: FftSize,
    kernel: Option<Kernel>,
    channels: Vec<ChannelState>,
    ratio: f32,
    formant_factor: f32,
}

impl PhaseVocoderShifter {
    pub fn new(fft_size: FftSize) -> Self {
        Self {
            fft_size,
            kernel: None,
            channels: Vec::new(),
            ratio: 1.0,
            formant_factor: 1.0,
        }
    }

    pub fn fft_size(&self) -> FftSize {
        self.fft_size
    }

    /// Current frequency ratio (`2^(semitones/12)`).
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn formant_factor(&self) -> f32 {
        self.formant_factor
    }
}

impl Default for PhaseVocoderShifter {
    fn default() -> Self {
        Self::new(FftSize::default())
    }
}

impl PitchTransform for PhaseVocoderShifter {
    fn configure(&mut self, channels: usize, sample_rate: u32, _max_frames: usize) -> Result<()> {
        if channels == 0 || sample_rate == 0 {
            return Err(Error::InvalidFormat(format!(
                "phase vocoder needs at least one channel and a non-zero rate \
                 (got {channels} ch @ {sample_rate} Hz)"
            )));
        }
        let kernel = Kernel::new(self.fft_size, sample_rate);
        self.channels = (0..channels)
            .map(|_| ChannelState::new(kernel.size, kernel.latency))
            .collect();
        tracing::debug!(
            fft_size = kernel.size,
            hop = kernel.hop,
            latency = kernel.latency,
            channels,
            "phase vocoder configured"
        );
        self.kernel = Some(kernel);
        Ok(())
    }

    fn set_transpose_semitones(&mut self, semitones: f32) {
        self.ratio = 2.0f32.powf(semitones / 12.0);
    }

    fn set_formant_factor(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.formant_factor = factor;
        }
    }

    fn process(
        &mut self,
        input: &AudioBufferRef<'_>,
        output: &mut AudioBufferMut<'_>,
    ) -> Result<()> {
        let kernel = self.kernel.as_mut().ok_or(Error::NotConfigured)?;
        let channels = self.channels.len();
        if input.channels() != channels
            || output.channels() != channels
            || input.frames() != output.frames()
        {
            return Err(Error::BufferMismatch {
                expected_channels: channels,
                actual_channels: input.channels(),
                max_frames: output.frames(),
                frames: input.frames(),
            });
        }

        for (ch, state) in self.channels.iter_mut().enumerate() {
            let src = input.channel(ch);
            let dst = output.channel_mut(ch);
            for (&x, y) in src.iter().zip(dst.iter_mut()) {
                state.in_fifo[state.rover] = x;
                *y = state.out_fifo[state.rover - kernel.latency];
                state.rover += 1;
                if state.rover >= kernel.size {
                    state.rover = kernel.latency;
                    kernel.process_frame(state, self.ratio, self.formant_factor);
                }
            }
        }
        Ok(())
    }

    fn latency_frames(&self) -> usize {
        self.fft_size.size() - self.fft_size.hop_size()
    }

    fn reset(&mut self) {
        if let Some(kernel) = &self.kernel {
            let latency = kernel.latency;
            for state in &mut self.channels {
                state.reset(latency);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;
    use voxmod_core::AudioBuffer;

    const SR: u32 = 44100;

    fn sine(freq: f32, len: usize, amp: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amp * (TAU * freq * i as f32 / SR as f32).sin())
            .collect()
    }

    /// Signal power at `freq` (Goertzel).
    fn goertzel(samples: &[f32], freq: f32) -> f32 {
        let w = TAU * freq / SR as f32;
        let coeff = 2.0 * w.cos();
        let (mut s1, mut s2) = (0.0f32, 0.0f32);
        for &x in samples {
            let s0 = x + coeff * s1 - s2;
            s2 = s1;
            s1 = s0;
        }
        s1 * s1 + s2 * s2 - coeff * s1 * s2
    }

    /// Run a mono signal through the shifter in 512-frame blocks.
    fn run(shifter: &mut PhaseVocoderShifter, signal: &[f32]) -> Vec<f32> {
        let mut out = Vec::with_capacity(signal.len());
        for block in signal.chunks(512) {
            let input = AudioBufferRef::new(block, 1, block.len()).unwrap();
            let mut data = vec![0.0; block.len()];
            let mut output = AudioBufferMut::new(&mut data, 1, block.len()).unwrap();
            shifter.process(&input, &mut output).unwrap();
            out.extend_from_slice(&data);
        }
        out
    }

    fn configured(semitones: f32, formant_factor: f32) -> PhaseVocoderShifter {
        let mut shifter = PhaseVocoderShifter::default();
        shifter.configure(1, SR, 512).unwrap();
        shifter.set_transpose_semitones(semitones);
        shifter.set_formant_factor(formant_factor);
        shifter
    }

    #[test]
    fn test_fft_size_presets() {
        assert_eq!(FftSize::Small.size(), 1024);
        assert_eq!(FftSize::default().size(), 2048);
        assert_eq!(FftSize::Large.hop_size(), 1024);
    }

    #[test]
    fn test_latency() {
        let shifter = PhaseVocoderShifter::new(FftSize::Medium);
        assert_eq!(shifter.latency_frames(), 1536);
        assert_eq!(PhaseVocoderShifter::new(FftSize::Small).latency_frames(), 768);
    }

    #[test]
    fn test_wrap_phase() {
        // 3π is a tie between -π and π; either end is in range
        assert_relative_eq!(wrap_phase(3.0 * PI).abs(), PI, epsilon = 1e-5);
        assert_relative_eq!(wrap_phase(2.5 * PI), 0.5 * PI, epsilon = 1e-5);
        assert_relative_eq!(wrap_phase(-2.5 * PI), -0.5 * PI, epsilon = 1e-5);
        assert_relative_eq!(wrap_phase(0.25), 0.25);
    }

    #[test]
    fn test_hann_window() {
        let window = create_hann_window(8);
        assert_relative_eq!(window[0], 0.0);
        assert_relative_eq!(window[4], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_process_before_configure() {
        let mut shifter = PhaseVocoderShifter::default();
        let input = AudioBuffer::new(1, 64);
        let mut output = AudioBuffer::new(1, 64);
        assert_eq!(
            shifter.process(&input.view(), &mut output.view_mut()),
            Err(Error::NotConfigured)
        );
    }

    #[test]
    fn test_channel_mismatch() {
        let mut shifter = configured(0.0, 1.0);
        let input = AudioBuffer::new(2, 64);
        let mut output = AudioBuffer::new(2, 64);
        assert!(matches!(
            shifter.process(&input.view(), &mut output.view_mut()),
            Err(Error::BufferMismatch { .. })
        ));
    }

    #[test]
    fn test_silence_in_silence_out() {
        let mut shifter = configured(7.0, 0.8);
        let out = run(&mut shifter, &vec![0.0; 8192]);
        assert!(out.iter().all(|&s| s.abs() < 1e-6));
    }

    #[test]
    fn test_first_hop_is_silent() {
        let mut shifter = configured(0.0, 1.0);
        let out = run(&mut shifter, &sine(440.0, 4096, 0.5));
        let hop = FftSize::default().hop_size();
        assert!(out[..hop].iter().all(|&s| s == 0.0));
        assert!(out[shifter.latency_frames()..].iter().any(|&s| s.abs() > 0.01));
    }

    #[test]
    fn test_unity_ratio_keeps_frequency() {
        let mut shifter = configured(0.0, 1.0);
        let out = run(&mut shifter, &sine(440.0, SR as usize, 0.5));
        let tail = &out[8192..];
        assert!(goertzel(tail, 440.0) > 10.0 * goertzel(tail, 880.0));
        assert!(goertzel(tail, 440.0) > 10.0 * goertzel(tail, 220.0));
    }

    #[test]
    fn test_octave_up_doubles_frequency() {
        let mut shifter = configured(12.0, 1.0);
        let out = run(&mut shifter, &sine(330.0, SR as usize, 0.5));
        let tail = &out[8192..];
        assert!(goertzel(tail, 660.0) > 10.0 * goertzel(tail, 330.0));
    }

    #[test]
    fn test_octave_down_halves_frequency() {
        let mut shifter = configured(-12.0, 1.0);
        let out = run(&mut shifter, &sine(660.0, SR as usize, 0.5));
        let tail = &out[8192..];
        assert!(goertzel(tail, 330.0) > 10.0 * goertzel(tail, 660.0));
    }

    #[test]
    fn test_formant_factor_rejects_non_positive() {
        let mut shifter = PhaseVocoderShifter::default();
        shifter.set_formant_factor(0.5);
        shifter.set_formant_factor(0.0);
        shifter.set_formant_factor(f32::NAN);
        assert_relative_eq!(shifter.formant_factor(), 0.5);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut shifter = configured(5.0, 1.0);
        run(&mut shifter, &sine(440.0, 8192, 0.5));
        shifter.reset();
        let out = run(&mut shifter, &vec![0.0; 4096]);
        assert!(out.iter().all(|&s| s.abs() < 1e-6));
    }
}
