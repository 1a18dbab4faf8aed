//! Registration of the voice effects with a [`NodeRegistry`].

use crate::{EchoDelay, ModulatedDelay, ModulationKind, PitchFormantShifter, RingModulator};
use voxmod_core::NodeRegistry;

/// Register every voice effect under its type name.
///
/// | Type name    | Node                    |
/// |--------------|-------------------------|
/// | `PitchShift` | [`PitchFormantShifter`] |
/// | `RingMod`    | [`RingModulator`]       |
/// | `Chorus`     | [`ModulatedDelay`]      |
/// | `Flanger`    | [`ModulatedDelay`]      |
/// | `Vibrato`    | [`ModulatedDelay`]      |
/// | `Delay`      | [`EchoDelay`]           |
pub fn register_voice_nodes(registry: &NodeRegistry) {
    registry.register(PitchFormantShifter::TYPE_NAME, |p| {
        Ok(Box::new(PitchFormantShifter::with_params(p)?))
    });

    registry.register(RingModulator::TYPE_NAME, |p| {
        Ok(Box::new(RingModulator::with_params(p)?))
    });

    for kind in [
        ModulationKind::Chorus,
        ModulationKind::Flanger,
        ModulationKind::Vibrato,
    ] {
        registry.register(kind.type_name(), move |p| {
            Ok(Box::new(ModulatedDelay::with_params(kind, p)?))
        });
    }

    registry.register(EchoDelay::TYPE_NAME, |p| Ok(Box::new(EchoDelay::with_params(p)?)));
}

/// A registry holding every voice effect.
pub fn voice_registry() -> NodeRegistry {
    let registry = NodeRegistry::new();
    register_voice_nodes(&registry);
    registry
}
