//! Pitch shifting with adjustable formant preservation.

use crate::stretch::{PhaseVocoderShifter, PitchTransform};
use std::sync::Arc;
use voxmod_core::{
    apply_params, check_buffers, AudioBuffer, AudioBufferMut, AudioBufferRef, AudioBusFormat,
    EffectNode, Error, NodeParams, ParamSpec, ParameterStore, Result,
};

const PITCH_SHIFT: usize = 0;
const FORMANT_PRESERVE: usize = 1;
const MIX: usize = 2;
const OUTPUT_GAIN: usize = 3;

/// Formant scale handed to the pitch transform.
///
/// Interpolates between `1.0` (formants follow the pitch) at `preserve = 0` and
/// `2^(-semitones/12)` (formants stay put) at `preserve = 1`.
pub fn formant_factor(semitones: f32, preserve: f32) -> f32 {
    let pitch_factor = 2.0f64.powf(semitones as f64 / 12.0);
    let full_compensation = 1.0 / pitch_factor;
    (1.0 + preserve as f64 * (full_compensation - 1.0)) as f32
}

/// Pitch shifter node built on a [`PitchTransform`].
///
/// Parameters: `pitchShift` (semitones, -24 to 24, default 0), `formantPreserve`
/// (0-1, default 1), `mix` (0-1, default 1), `outputGain` (0-4, default 1).
///
/// The transform's latency is not compensated: the wet signal lags the dry one by
/// [`latency_frames`](EffectNode::latency_frames).
pub struct PitchFormantShifter {
    params: Arc<ParameterStore>,
    transform: Box<dyn PitchTransform>,
    format: Option<AudioBusFormat>,
    dry: AudioBuffer,
    wet: AudioBuffer,
    last_applied: Option<(f32, f32)>,
}

impl PitchFormantShifter {
    pub const TYPE_NAME: &'static str = "PitchShift";

    /// Create with the bundled phase vocoder.
    pub fn new() -> Self {
        Self::with_transform(Box::new(PhaseVocoderShifter::default()))
    }

    /// Create around a caller-supplied transform.
    pub fn with_transform(transform: Box<dyn PitchTransform>) -> Self {
        Self {
            params: Arc::new(ParameterStore::new(Self::TYPE_NAME, Self::param_specs())),
            transform,
            format: None,
            dry: AudioBuffer::default(),
            wet: AudioBuffer::default(),
            last_applied: None,
        }
    }

    /// Create with initial values taken from a configuration map.
    pub fn with_params(params: &NodeParams) -> Result<Self> {
        let node = Self::new();
        apply_params(&node.params, params)?;
        Ok(node)
    }

    pub fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::float("pitchShift", -24.0, 24.0, 0.0),
            ParamSpec::float("formantPreserve", 0.0, 1.0, 1.0),
            ParamSpec::float("mix", 0.0, 1.0, 1.0),
            ParamSpec::float("outputGain", 0.0, 4.0, 1.0),
        ]
    }

    /// Push transform settings when the (pitch, preservation) pair has changed.
    fn update_transform(&mut self) {
        let pitch = self.params.float(PITCH_SHIFT);
        let preserve = self.params.float(FORMANT_PRESERVE);
        if self.last_applied == Some((pitch, preserve)) {
            return;
        }
        self.transform.set_transpose_semitones(pitch);
        self.transform.set_formant_factor(formant_factor(pitch, preserve));
        self.last_applied = Some((pitch, preserve));
    }
}

impl Default for PitchFormantShifter {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectNode for PitchFormantShifter {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn negotiate_format(&mut self, input: AudioBusFormat) -> Result<AudioBusFormat> {
        input.validate()?;
        self.transform
            .configure(input.channels, input.sample_rate, input.frames_per_buffer)?;
        self.dry = AudioBuffer::new(input.channels, input.frames_per_buffer);
        self.wet = AudioBuffer::new(input.channels, input.frames_per_buffer);
        self.last_applied = None;
        self.format = Some(input);
        tracing::debug!(
            sample_rate = input.sample_rate,
            channels = input.channels,
            frames = input.frames_per_buffer,
            latency = self.transform.latency_frames(),
            "pitch shifter configured"
        );
        Ok(input)
    }

    fn format(&self) -> Option<AudioBusFormat> {
        self.format
    }

    fn process(
        &mut self,
        input: &AudioBufferRef<'_>,
        output: &mut AudioBufferMut<'_>,
    ) -> Result<()> {
        let format = self.format.ok_or(Error::NotConfigured)?;
        let frames = check_buffers(&format, input, output)?;

        self.update_transform();
        let mix = self.params.float(MIX);
        let gain = self.params.float(OUTPUT_GAIN);

        self.dry.view_mut_frames(frames).copy_from(input);
        self.transform
            .process(&self.dry.view_frames(frames), &mut self.wet.view_mut_frames(frames))?;

        for ch in 0..format.channels {
            let dry = &self.dry.channel(ch)[..frames];
            let wet = &self.wet.channel(ch)[..frames];
            for ((y, &d), &w) in output.channel_mut(ch).iter_mut().zip(dry).zip(wet) {
                *y = (w * mix + d * (1.0 - mix)) * gain;
            }
        }

        Ok(())
    }

    fn parameters(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    fn latency_frames(&self) -> usize {
        self.transform.latency_frames()
    }

    fn reset(&mut self) {
        self.transform.reset();
    }
}
