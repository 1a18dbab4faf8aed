//! # voxmod - Real-time Voice Changer
//!
//! Chainable voice effects with lock-free parameter control.
//!
//! ## Architecture
//!
//! voxmod is an umbrella crate that coordinates:
//! - **voxmod-core** - Effect node contract, parameter stores, buffers, node registry
//! - **voxmod-dsp** - Pitch/formant shifter, ring modulator, chorus, flanger, vibrato, echo
//!
//! On top of those it provides the [`EffectChain`], the ten built-in
//! [`VoicePreset`]s and the [`PresetController`] that writes them into a running chain.
//!
//! ## Quick Start
//!
//! ```
//! use voxmod::prelude::*;
//!
//! let changer = VoiceChanger::builder()
//!     .sample_rate(48000)
//!     .preset_named("Deep Villain")
//!     .build()?;
//!
//! // Move the chain to the audio thread, keep the controller for the UI
//! let (mut chain, controller) = changer.into_parts();
//! controller.select_by_name("Chipmunk")?;
//!
//! let input = AudioBuffer::new(2, 512);
//! let mut output = AudioBuffer::new(2, 512);
//! chain.process(&input.view(), &mut output.view_mut())?;
//! # Ok::<(), voxmod::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Serialize presets, configs and parameter values

/// Re-export of voxmod-core for direct access
pub use voxmod_core as core;

/// Re-export of voxmod-dsp for direct access
pub use voxmod_dsp as dsp;

pub use voxmod_core::{
    params, AtomicFlag, AtomicFloat, AtomicInt, AudioBuffer, AudioBufferMut, AudioBufferRef,
    AudioBusFormat, EffectNode, NodeParams, NodeRegistry, ParamKind, ParamSpec, ParamValue,
    ParameterStore, VoxConfig,
};

pub use voxmod_dsp::{
    formant_factor, register_voice_nodes, voice_registry, EchoDelay, FftSize, ModulatedDelay,
    ModulationKind, PhaseVocoderShifter, PitchFormantShifter, PitchTransform, RingModulator,
};

pub mod error;
pub use error::{Error, Result};

pub mod chain;
pub use chain::{ChainControl, EffectChain};

pub mod preset;
pub use preset::{builtin_presets, preset_by_name, ApplyReport, VoicePreset};

mod controller;
pub use controller::PresetController;

mod builder;
pub use builder::{voice_chain, VoiceChangerBuilder};

mod engine;
pub use engine::VoiceChanger;

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::params;
    pub use crate::{
        AudioBuffer, AudioBufferMut, AudioBufferRef, AudioBusFormat, ChainControl, EffectChain,
        EffectNode, Error, ParamValue, PresetController, Result, VoiceChanger, VoicePreset,
        VoxConfig,
    };
}
