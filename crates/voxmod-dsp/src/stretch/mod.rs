//! Pitch transform capability used by the pitch/formant shifter.
//!
//! The shifter only relies on this trait, so any phase-vocoder or PSOLA style
//! engine can be substituted. [`PhaseVocoderShifter`] is the bundled implementation.

mod phase_vocoder;
pub use phase_vocoder::{FftSize, PhaseVocoderShifter};

use voxmod_core::{AudioBufferMut, AudioBufferRef, Result};

/// A streaming pitch transposer with independent formant scaling.
///
/// `formant_factor` scales the spectral envelope on top of the transposition:
/// `1.0` lets formants move with the pitch, `2^(-semitones/12)` keeps them in place.
pub trait PitchTransform: Send {
    /// Allocate state for `channels` channels. Called from the setup context only.
    fn configure(&mut self, channels: usize, sample_rate: u32, max_frames: usize) -> Result<()>;

    fn set_transpose_semitones(&mut self, semitones: f32);

    fn set_formant_factor(&mut self, factor: f32);

    /// Transform one block. Output may lag input by [`latency_frames`](Self::latency_frames).
    fn process(
        &mut self,
        input: &AudioBufferRef<'_>,
        output: &mut AudioBufferMut<'_>,
    ) -> Result<()>;

    /// Frames of delay between input and output.
    fn latency_frames(&self) -> usize;

    /// Clear analysis and synthesis history.
    fn reset(&mut self);
}
