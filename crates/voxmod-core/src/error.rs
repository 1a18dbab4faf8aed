//! Error types for voxmod-core.

use crate::ParamKind;
use thiserror::Error;

/// Error type for node, parameter and format operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unknown parameter '{name}' on node {node}")]
    UnknownParameter { node: String, name: String },

    #[error("Type mismatch for '{name}': expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: ParamKind,
        actual: ParamKind,
    },

    #[error("Node not configured: negotiate a format before processing")]
    NotConfigured,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Missing audio buffer")]
    MissingBuffer,

    #[error(
        "Buffer mismatch: expected {expected_channels} channels of at most {max_frames} frames, \
         got {actual_channels} channels of {frames} frames"
    )]
    BufferMismatch {
        expected_channels: usize,
        actual_channels: usize,
        max_frames: usize,
        frames: usize,
    },

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
