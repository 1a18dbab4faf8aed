//! VoiceChanger: a negotiated voice chain plus its preset controller.

use crate::builder::VoiceChangerBuilder;
use crate::chain::EffectChain;
use crate::controller::PresetController;
use crate::Result;
use voxmod_core::{AudioBufferMut, AudioBufferRef, AudioBusFormat};

/// Ready-to-run voice changer.
///
/// `process` belongs to the audio context. Preset changes go through
/// [`controller`](Self::controller), which can be cloned onto any thread; use
/// [`into_parts`](Self::into_parts) to move the chain into an audio callback.
///
/// # Example
///
/// ```
/// use voxmod::{AudioBuffer, VoiceChanger};
///
/// let mut changer = VoiceChanger::builder().channels(1).frames_per_buffer(256).build()?;
/// let input = AudioBuffer::new(1, 256);
/// let mut output = AudioBuffer::new(1, 256);
///
/// changer.controller().next()?;
/// changer.process(&input.view(), &mut output.view_mut())?;
/// # Ok::<(), voxmod::Error>(())
/// ```
pub struct VoiceChanger {
    chain: EffectChain,
    controller: PresetController,
}

impl VoiceChanger {
    pub fn builder() -> VoiceChangerBuilder {
        VoiceChangerBuilder::default()
    }

    pub(crate) fn from_parts(chain: EffectChain, controller: PresetController) -> Self {
        Self { chain, controller }
    }

    /// Process one buffer of at most `frames_per_buffer` frames.
    #[inline]
    pub fn process(
        &mut self,
        input: &AudioBufferRef<'_>,
        output: &mut AudioBufferMut<'_>,
    ) -> Result<()> {
        self.chain.process(input, output)
    }

    pub fn controller(&self) -> &PresetController {
        &self.controller
    }

    pub fn chain(&self) -> &EffectChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut EffectChain {
        &mut self.chain
    }

    pub fn format(&self) -> Option<AudioBusFormat> {
        self.chain.format()
    }

    /// Total chain latency in frames.
    pub fn latency_frames(&self) -> usize {
        self.chain.latency_frames()
    }

    /// Clear delay lines and analysis history. Parameters are kept.
    pub fn reset(&mut self) {
        self.chain.reset();
    }

    pub fn into_parts(self) -> (EffectChain, PresetController) {
        (self.chain, self.controller)
    }
}
