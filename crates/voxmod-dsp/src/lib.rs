//! Real-time voice effects: pitch shifting with formant preservation, ring
//! modulation with a noise gate, and LFO-modulated delays. Every effect implements
//! [`voxmod_core::EffectNode`] and keeps its parameters in lock-free atomics.

mod delay;
pub use delay::EchoDelay;

mod delay_line;

mod lfo;
pub use lfo::{Lfo, LfoShape};

mod modulation;
pub use modulation::{ModulatedDelay, ModulationKind};

mod pitch_formant;
pub use pitch_formant::{formant_factor, PitchFormantShifter};

mod register;
pub use register::{register_voice_nodes, voice_registry};

mod ring_mod;
pub use ring_mod::RingModulator;

pub mod stretch;
pub use stretch::{FftSize, PhaseVocoderShifter, PitchTransform};
