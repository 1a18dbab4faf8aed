//! Feedback echo.

use crate::delay_line::DelayLine;
use std::sync::Arc;
use voxmod_core::{
    apply_params, check_buffers, AudioBufferMut, AudioBufferRef, AudioBusFormat, EffectNode,
    Error, NodeParams, ParamSpec, ParameterStore, Result,
};

const IS_ENABLED: usize = 0;
const DELAY_MS: usize = 1;
const FEEDBACK: usize = 2;
const WET_MIX: usize = 3;
const DRY_MIX: usize = 4;

const MAX_DELAY_MS: i32 = 1000;

/// Fixed-time echo with feedback.
///
/// Parameters: `isEnabled` (default true), `delayMs` (integer, 10-1000, default 250),
/// `feedbackLevel` (0-0.95, default 0.3), `wetMix` (0-1, default 0.5), `dryMix`
/// (0-1, default 1).
pub struct EchoDelay {
    params: Arc<ParameterStore>,
    format: Option<AudioBusFormat>,
    lines: Vec<DelayLine>,
}

impl EchoDelay {
    pub const TYPE_NAME: &'static str = "Delay";

    pub fn new() -> Self {
        Self {
            params: Arc::new(ParameterStore::new(Self::TYPE_NAME, Self::param_specs())),
            format: None,
            lines: Vec::new(),
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
            ParamSpec::toggle("isEnabled", true),
            ParamSpec::int("delayMs", 10, MAX_DELAY_MS, 250),
            ParamSpec::float("feedbackLevel", 0.0, 0.95, 0.3),
            ParamSpec::float("wetMix", 0.0, 1.0, 0.5),
            ParamSpec::float("dryMix", 0.0, 1.0, 1.0),
        ]
    }
}

impl Default for EchoDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectNode for EchoDelay {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn negotiate_format(&mut self, input: AudioBusFormat) -> Result<AudioBusFormat> {
        input.validate()?;
        let capacity = (MAX_DELAY_MS as usize * input.sample_rate as usize).div_ceil(1000) + 1;
        self.lines = (0..input.channels).map(|_| DelayLine::new(capacity)).collect();
        self.format = Some(input);
        tracing::debug!(capacity, channels = input.channels, "echo delay configured");
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
        check_buffers(&format, input, output)?;

        if !self.params.flag(IS_ENABLED) {
            output.copy_from(input);
            return Ok(());
        }

        let delay = self.params.int(DELAY_MS).max(1) as usize * format.sample_rate as usize / 1000;
        let feedback = self.params.float(FEEDBACK);
        let wet = self.params.float(WET_MIX);
        let dry = self.params.float(DRY_MIX);

        for (ch, line) in self.lines.iter_mut().enumerate() {
            for (y, &x) in output.channel_mut(ch).iter_mut().zip(input.channel(ch)) {
                let delayed = line.read(delay);
                line.write(x + delayed * feedback);
                *y = x * dry + delayed * wet;
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
    }
}
