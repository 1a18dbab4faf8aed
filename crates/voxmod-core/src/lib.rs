//! Real-time effect node model for voxmod.
//!
//! # Primary API
//!
//! - [`EffectNode`]: per-buffer processing contract (negotiate, process, get/set)
//! - [`ParameterStore`]: lock-free, range-clamped parameter cells shared with control threads
//! - [`AudioBuffer`] / [`AudioBufferRef`] / [`AudioBufferMut`]: planar buffers and views
//! - [`NodeRegistry`]: create nodes by type name from a [`NodeParams`] map
//!
//! # Example
//!
//! ```ignore
//! use voxmod_core::prelude::*;
//!
//! let mut node = registry.create("RingMod", &params! { "carrierFrequency" => 250.0 })?;
//! node.negotiate_format(AudioBusFormat::new(44100, 2, 512))?;
//! node.process(&input.view(), &mut output.view_mut())?;
//! ```

pub mod error;
pub use error::{Error, Result};

mod buffer;
pub use buffer::{AudioBuffer, AudioBufferMut, AudioBufferRef};

mod config;
pub use config::VoxConfig;

mod format;
pub use format::AudioBusFormat;

mod lockfree;
pub use lockfree::{AtomicFlag, AtomicFloat, AtomicInt};

mod node;
pub use node::{check_buffers, EffectNode};

mod parameter;
pub use parameter::{ParamKind, ParamSpec, ParamValue, ParameterStore};

pub mod registry;
pub use registry::{apply_params, NodeConstructor, NodeParams, NodeRegistry};

pub mod prelude {
    pub use crate::params;
    pub use crate::{
        AudioBuffer, AudioBufferMut, AudioBufferRef, AudioBusFormat, EffectNode, Error,
        NodeParams, NodeRegistry, ParamValue, ParameterStore, Result, VoxConfig,
    };
}
