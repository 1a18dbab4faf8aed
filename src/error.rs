//! Centralized error type for the voxmod umbrella crate.
//!
//! Wraps node-level errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] voxmod_core::Error),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Preset list is empty")]
    EmptyPresetList,
}

pub type Result<T> = std::result::Result<T, Error>;
