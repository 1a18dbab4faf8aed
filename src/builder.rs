//! Builder for configuring and constructing a `VoiceChanger`.

use crate::chain::{ids, EffectChain};
use crate::controller::PresetController;
use crate::preset::{builtin_presets, VoicePreset};
use crate::{Result, VoiceChanger};
use voxmod_core::{NodeParams, NodeRegistry, VoxConfig};
use voxmod_dsp::{voice_registry, EchoDelay, ModulationKind, PitchFormantShifter, RingModulator};

/// Build the standard voice chain from `registry`.
///
/// Order: pitch shift, ring modulator, then (when `modulation_effects` is set)
/// vibrato, chorus, flanger and delay. Every node starts at its defaults.
pub fn voice_chain(registry: &NodeRegistry, modulation_effects: bool) -> Result<EffectChain> {
    let mut layout = vec![
        (ids::PITCH_SHIFT, PitchFormantShifter::TYPE_NAME),
        (ids::RING_MOD, RingModulator::TYPE_NAME),
    ];
    if modulation_effects {
        layout.extend([
            (ids::VIBRATO, ModulationKind::Vibrato.type_name()),
            (ids::CHORUS, ModulationKind::Chorus.type_name()),
            (ids::FLANGER, ModulationKind::Flanger.type_name()),
            (ids::DELAY, EchoDelay::TYPE_NAME),
        ]);
    }

    let mut chain = EffectChain::new();
    let defaults = NodeParams::new();
    for (id, type_name) in layout {
        chain.push(id, registry.create(type_name, &defaults)?)?;
    }
    Ok(chain)
}

/// The stream format is fixed at build time; nodes negotiate it once.
///
/// # Example
///
/// ```
/// use voxmod::VoiceChanger;
///
/// let changer = VoiceChanger::builder()
///     .sample_rate(48000)
///     .channels(1)
///     .preset(2)
///     .build()?;
///
/// assert_eq!(changer.controller().current().name, "Robot");
/// # Ok::<(), voxmod::Error>(())
/// ```
pub struct VoiceChangerBuilder {
    config: VoxConfig,
    presets: Vec<VoicePreset>,
    initial: Initial,
    modulation_effects: bool,
    registry: Option<NodeRegistry>,
}

enum Initial {
    Index(usize),
    Named(String),
}

impl Default for VoiceChangerBuilder {
    fn default() -> Self {
        Self {
            config: VoxConfig::default(),
            presets: builtin_presets(),
            initial: Initial::Index(0),
            modulation_effects: true,
            registry: None,
        }
    }
}

impl VoiceChangerBuilder {
    pub fn config(mut self, config: VoxConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 44100
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Default: 2
    pub fn channels(mut self, channels: usize) -> Self {
        self.config.channels = channels;
        self
    }

    /// Default: 512
    pub fn frames_per_buffer(mut self, frames: usize) -> Self {
        self.config.frames_per_buffer = frames;
        self
    }

    /// Preset applied after construction. Default: 0
    pub fn preset(mut self, index: usize) -> Self {
        self.initial = Initial::Index(index);
        self
    }

    pub fn preset_named(mut self, name: impl Into<String>) -> Self {
        self.initial = Initial::Named(name.into());
        self
    }

    /// Replace the built-in preset list.
    pub fn presets(mut self, presets: Vec<VoicePreset>) -> Self {
        self.presets = presets;
        self
    }

    /// Include vibrato, chorus, flanger and delay. Default: true
    pub fn modulation_effects(mut self, enabled: bool) -> Self {
        self.modulation_effects = enabled;
        self
    }

    /// Create nodes from a custom registry instead of the voice registry.
    pub fn registry(mut self, registry: NodeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<VoiceChanger> {
        self.config.validate()?;

        let registry = self.registry.unwrap_or_else(voice_registry);
        let mut chain = voice_chain(&registry, self.modulation_effects)?;
        chain.negotiate_format(self.config.format())?;

        let controller = PresetController::new(chain.control(), self.presets)?;
        let report = match &self.initial {
            Initial::Index(index) => controller.select(*index)?,
            Initial::Named(name) => controller.select_by_name(name)?,
        };
        if let Some(err) = report.rejected.first() {
            return Err(err.clone());
        }

        tracing::info!(
            sample_rate = self.config.sample_rate,
            channels = self.config.channels,
            latency = chain.latency_frames(),
            preset = %controller.current().name,
            "voice changer ready"
        );

        Ok(VoiceChanger::from_parts(chain, controller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_voice_chain_order() {
        let registry = voice_registry();
        let chain = voice_chain(&registry, true).unwrap();
        assert_eq!(
            chain.ids().collect::<Vec<_>>(),
            vec!["pitchShift", "ringMod", "vibrato", "chorus", "flanger", "delay"]
        );
        let minimal = voice_chain(&registry, false).unwrap();
        assert_eq!(minimal.ids().collect::<Vec<_>>(), vec!["pitchShift", "ringMod"]);
    }

    #[test]
    fn test_voice_chain_needs_registered_types() {
        let empty = NodeRegistry::new();
        assert!(matches!(
            voice_chain(&empty, false),
            Err(Error::Core(voxmod_core::Error::UnknownNodeType(_)))
        ));
    }

    #[test]
    fn test_build_rejects_bad_config() {
        let result = VoiceChangerBuilder::default().channels(0).build();
        assert!(matches!(
            result,
            Err(Error::Core(voxmod_core::Error::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_build_rejects_unknown_preset() {
        assert!(matches!(
            VoiceChangerBuilder::default().preset(42).build(),
            Err(Error::UnknownPreset(_))
        ));
        assert!(matches!(
            VoiceChangerBuilder::default().preset_named("Banshee").build(),
            Err(Error::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_build_applies_initial_preset() {
        let changer = VoiceChangerBuilder::default()
            .preset_named("monster")
            .build()
            .unwrap();
        assert_eq!(changer.controller().current_index(), 4);
        assert_eq!(
            changer.chain().get_value(ids::PITCH_SHIFT, "pitchShift").unwrap(),
            voxmod_core::ParamValue::Float(-14.0)
        );
    }
}
