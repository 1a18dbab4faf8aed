//! LFO-modulated delay effects: chorus, flanger and vibrato.
//!
//! All three share one implementation and differ only in base delay, feedback and
//! wet level. Parameters: `isEnabled` (default true), `sweepWidth` (seconds of
//! delay swing, 0.0005-0.05) and `frequency` (LFO rate in Hz, 0.05-10).

use crate::delay_line::DelayLine;
use crate::lfo::{Lfo, LfoShape};
use std::sync::Arc;
use voxmod_core::{
    apply_params, check_buffers, AudioBufferMut, AudioBufferRef, AudioBusFormat, EffectNode,
    Error, NodeParams, ParamSpec, ParameterStore, Result,
};

const IS_ENABLED: usize = 0;
const SWEEP_WIDTH: usize = 1;
const FREQUENCY: usize = 2;

const MAX_SWEEP_WIDTH: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModulationKind {
    /// 20 ms base delay, half wet
    Chorus,
    /// 1 ms base delay with feedback, half wet
    Flanger,
    /// Pure pitch wobble, fully wet
    Vibrato,
}

impl ModulationKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ModulationKind::Chorus => "Chorus",
            ModulationKind::Flanger => "Flanger",
            ModulationKind::Vibrato => "Vibrato",
        }
    }

    fn base_delay_secs(&self) -> f32 {
        match self {
            ModulationKind::Chorus => 0.020,
            ModulationKind::Flanger => 0.001,
            ModulationKind::Vibrato => 0.0,
        }
    }

    fn feedback(&self) -> f32 {
        match self {
            ModulationKind::Flanger => 0.5,
            _ => 0.0,
        }
    }

    fn wet(&self) -> f32 {
        match self {
            ModulationKind::Vibrato => 1.0,
            _ => 0.5,
        }
    }

    fn shape(&self) -> LfoShape {
        match self {
            ModulationKind::Flanger => LfoShape::Triangle,
            _ => LfoShape::Sine,
        }
    }

    fn param_specs(&self) -> Vec<ParamSpec> {
        let (width, rate) = match self {
            ModulationKind::Chorus => (0.01, 0.5),
            ModulationKind::Flanger => (0.005, 0.25),
            ModulationKind::Vibrato => (0.003, 5.0),
        };
        vec![
            ParamSpec::toggle("isEnabled", true),
            ParamSpec::float("sweepWidth", 0.0005, MAX_SWEEP_WIDTH, width),
            ParamSpec::float("frequency", 0.05, 10.0, rate),
        ]
    }
}

/// Delay line whose read position is swept by a shared LFO.
pub struct ModulatedDelay {
    kind: ModulationKind,
    params: Arc<ParameterStore>,
    format: Option<AudioBusFormat>,
    lines: Vec<DelayLine>,
    lfo: Lfo,
}

impl ModulatedDelay {
    pub fn new(kind: ModulationKind) -> Self {
        Self {
            kind,
            params: Arc::new(ParameterStore::new(kind.type_name(), kind.param_specs())),
            format: None,
            lines: Vec::new(),
            lfo: Lfo::new(kind.shape()),
        }
    }

    pub fn chorus() -> Self {
        Self::new(ModulationKind::Chorus)
    }

    pub fn flanger() -> Self {
        Self::new(ModulationKind::Flanger)
    }

    pub fn vibrato() -> Self {
        Self::new(ModulationKind::Vibrato)
    }

    /// Create with initial values taken from a configuration map.
    pub fn with_params(kind: ModulationKind, params: &NodeParams) -> Result<Self> {
        let node = Self::new(kind);
        apply_params(&node.params, params)?;
        Ok(node)
    }

    pub fn kind(&self) -> ModulationKind {
        self.kind
    }
}

impl EffectNode for ModulatedDelay {
    fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    fn negotiate_format(&mut self, input: AudioBusFormat) -> Result<AudioBusFormat> {
        input.validate()?;
        let max_delay = (self.kind.base_delay_secs() + MAX_SWEEP_WIDTH) * input.sample_rate as f32;
        let capacity = max_delay.ceil() as usize + 2;
        self.lines = (0..input.channels).map(|_| DelayLine::new(capacity)).collect();
        self.lfo.reset();
        self.format = Some(input);
        tracing::debug!(kind = self.kind.type_name(), capacity, "modulated delay configured");
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

        if !self.params.flag(IS_ENABLED) {
            output.copy_from(input);
            return Ok(());
        }

        let sample_rate = format.sample_rate as f32;
        let width = self.params.float(SWEEP_WIDTH);
        let rate = self.params.float(FREQUENCY);
        let base = self.kind.base_delay_secs();
        let feedback = self.kind.feedback();
        let wet = self.kind.wet();

        for frame in 0..frames {
            let m = self.lfo.next(rate, sample_rate);
            let delay = (base + width * 0.5 * (1.0 + m)) * sample_rate;

            for (ch, line) in self.lines.iter_mut().enumerate() {
                let x = input.channel(ch)[frame];
                let delayed = line.read_fractional(delay);
                line.write(x + delayed * feedback);
                output.channel_mut(ch)[frame] = x * (1.0 - wet) + delayed * wet;
            }
        }

        Ok(())
    }

    fn parameters(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.lfo.reset();
    }
}
