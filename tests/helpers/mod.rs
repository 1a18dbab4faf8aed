//! Test helpers and fixtures for voxmod integration tests
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (passthrough, unity gain)
//! - `DSP_EPSILON` (1e-4): DSP processing (oscillators, interpolated delays)
//! - `SILENCE_THRESHOLD` (0.0001): Silence detection (-80dB)

#![allow(dead_code)]

pub mod tolerances;

use voxmod::prelude::*;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: u32 = 44100;

/// Standard buffer size for deterministic testing
pub const TEST_BUFFER_SIZE: usize = 512;

/// Frames discarded before measuring a pitch-shifted signal.
///
/// Comfortably longer than the phase vocoder's latency plus its ramp-in.
pub const WARMUP_FRAMES: usize = 8192;

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Mono bus format at the test rate.
pub fn mono_format() -> AudioBusFormat {
    AudioBusFormat::new(TEST_SAMPLE_RATE, 1, TEST_BUFFER_SIZE)
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f64, amplitude: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / TEST_SAMPLE_RATE as f64;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32 * amplitude
        })
        .collect()
}

/// Tone with a fundamental and a few decaying harmonics, closer to a voice than a sine.
pub fn generate_harmonic_tone(fundamental: f64, num_samples: usize) -> Vec<f32> {
    let mut out = vec![0.0; num_samples];
    for harmonic in 1..=5 {
        let partial =
            generate_sine(fundamental * harmonic as f64, 0.4 / harmonic as f32, num_samples);
        for (o, p) in out.iter_mut().zip(partial) {
            *o += p;
        }
    }
    out
}

/// Generate a DC offset signal (constant value).
pub fn generate_dc(value: f32, num_samples: usize) -> Vec<f32> {
    vec![value; num_samples]
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// RMS of the sample-wise difference of two equally long signals.
pub fn rms_difference(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "signals must be the same length");
    let diff: Vec<f32> = a.iter().zip(b).map(|(x, y)| x - y).collect();
    rms(&diff)
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Sign changes per second.
pub fn zero_crossing_rate(samples: &[f32]) -> f32 {
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
        .count();
    crossings as f32 * TEST_SAMPLE_RATE as f32 / samples.len() as f32
}

/// Power of `samples` at `frequency` (Goertzel).
pub fn goertzel(samples: &[f32], frequency: f32) -> f32 {
    let w = std::f32::consts::TAU * frequency / TEST_SAMPLE_RATE as f32;
    let coeff = 2.0 * w.cos();
    let (mut s1, mut s2) = (0.0f32, 0.0f32);
    for &x in samples {
        let s0 = x + coeff * s1 - s2;
        s2 = s1;
        s1 = s0;
    }
    s1 * s1 + s2 * s2 - coeff * s1 * s2
}

/// Strongest frequency between 50 Hz and 2 kHz, scanned in 2 Hz steps.
pub fn dominant_frequency(samples: &[f32]) -> f32 {
    (25..=1000)
        .map(|step| step as f32 * 2.0)
        .map(|freq| (freq, goertzel(samples, freq)))
        .fold((0.0, f32::MIN), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        })
        .0
}

/// Run a mono signal through `node` in `TEST_BUFFER_SIZE` blocks.
pub fn render_node(node: &mut dyn EffectNode, signal: &[f32]) -> Vec<f32> {
    let mut out = Vec::with_capacity(signal.len());
    let mut block_out = AudioBuffer::new(1, TEST_BUFFER_SIZE);
    for block in signal.chunks(TEST_BUFFER_SIZE) {
        let input = AudioBufferRef::new(block, 1, block.len()).expect("valid block");
        let mut output = block_out.view_mut_frames(block.len());
        node.process(&input, &mut output).expect("process failed");
        out.extend_from_slice(&block_out.channel(0)[..block.len()]);
    }
    out
}

/// Run a mono signal through a chain in `TEST_BUFFER_SIZE` blocks.
pub fn render_chain(chain: &mut EffectChain, signal: &[f32]) -> Vec<f32> {
    let mut out = Vec::with_capacity(signal.len());
    let mut block_out = AudioBuffer::new(1, TEST_BUFFER_SIZE);
    for block in signal.chunks(TEST_BUFFER_SIZE) {
        let input = AudioBufferRef::new(block, 1, block.len()).expect("valid block");
        let mut output = block_out.view_mut_frames(block.len());
        chain.process(&input, &mut output).expect("process failed");
        out.extend_from_slice(&block_out.channel(0)[..block.len()]);
    }
    out
}

/// Assert that a signal is approximately silent (all values near zero).
pub fn assert_silence(samples: &[f32], tolerance: f32) {
    let max = peak(samples);
    assert!(
        max <= tolerance,
        "Expected silence, but peak amplitude was {}",
        max
    );
}

/// Assert that a signal has content (not silent).
pub fn assert_has_audio(samples: &[f32], min_rms: f32) {
    let r = rms(samples);
    assert!(
        r >= min_rms,
        "Expected audio content with RMS >= {}, but RMS was {}",
        min_rms,
        r
    );
}

/// Assert that `values` never decreases (`rising`) or never increases.
pub fn assert_monotonic(values: &[f32], rising: bool, context: &str) {
    for pair in values.windows(2) {
        let ok = if rising {
            pair[1] >= pair[0] - tolerances::FLOAT_EPSILON
        } else {
            pair[1] <= pair[0] + tolerances::FLOAT_EPSILON
        };
        assert!(ok, "{}: not monotonic: {:?}", context, values);
    }
}
