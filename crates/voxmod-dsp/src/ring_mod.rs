//! Ring modulator with an input amplitude gate.

use std::f64::consts::TAU;
use std::sync::Arc;
use voxmod_core::{
    apply_params, check_buffers, AudioBufferMut, AudioBufferRef, AudioBusFormat, EffectNode,
    Error, NodeParams, ParamSpec, ParameterStore, Result,
};

const CARRIER_FREQUENCY: usize = 0;
const MIX: usize = 1;
const THRESHOLD: usize = 2;

/// Multiplies the input by a sine carrier.
///
/// A single oscillator phase drives every channel and carries over from one buffer
/// to the next, so changing `carrierFrequency` only changes the increment and never
/// produces a jump in the carrier. Samples whose magnitude is below `threshold`
/// contribute no modulated signal.
///
/// Parameters: `carrierFrequency` (Hz, 10-1000, default 100), `mix` (0-1, default 1),
/// `threshold` (0-1, default 0.02).
pub struct RingModulator {
    params: Arc<ParameterStore>,
    format: Option<AudioBusFormat>,
    phase: f64,
    phase_increment: f64,
}

impl RingModulator {
    pub const TYPE_NAME: &'static str = "RingMod";

    pub fn new() -> Self {
        Self {
            params: Arc::new(ParameterStore::new(Self::TYPE_NAME, Self::param_specs())),
            format: None,
            phase: 0.0,
            phase_increment: 0.0,
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
            ParamSpec::float("carrierFrequency", 10.0, 1000.0, 100.0),
            ParamSpec::float("mix", 0.0, 1.0, 1.0),
            ParamSpec::float("threshold", 0.0, 1.0, 0.02),
        ]
    }

    /// Current oscillator phase in radians, in `[0, 2π)`.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Phase increment used for the most recent buffer.
    pub fn phase_increment(&self) -> f64 {
        self.phase_increment
    }

    fn update_increment(&mut self, sample_rate: f64) {
        let carrier = self.params.float(CARRIER_FREQUENCY) as f64;
        self.phase_increment = TAU * carrier / sample_rate;
    }
}

impl Default for RingModulator {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectNode for RingModulator {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn negotiate_format(&mut self, input: AudioBusFormat) -> Result<AudioBusFormat> {
        input.validate()?;
        self.format = Some(input);
        self.update_increment(input.sample_rate_f64());
        tracing::debug!(
            sample_rate = input.sample_rate,
            channels = input.channels,
            "ring modulator configured"
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

        self.update_increment(format.sample_rate_f64());
        let mix = self.params.float(MIX);
        let threshold = self.params.float(THRESHOLD);
        let dry = 1.0 - mix;

        for frame in 0..frames {
            let carrier = self.phase.sin() as f32;
            // The increment can exceed a full cycle when the carrier is above the sample rate
            self.phase = (self.phase + self.phase_increment).rem_euclid(TAU);

            for ch in 0..format.channels {
                let x = input.channel(ch)[frame];
                let wet = if x.abs() < threshold { 0.0 } else { x * carrier };
                output.channel_mut(ch)[frame] = wet * mix + x * dry;
            }
        }

        Ok(())
    }

    fn parameters(&self) -> &Arc<ParameterStore> {
        &self.params
    }
}
