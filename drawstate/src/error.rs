//! Error types for snapshot construction and configuration loading
//!
//! Setters and comparisons never fail. Contract violations (an out-of-range
//! array index, an unmapped group ordinal) panic instead of returning one of
//! these.

use std::io;
use std::path::PathBuf;

use crate::arena::ArrayField;

/// Errors raised while building a snapshot or its arena
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawStateError {
    /// Reserved byte size does not fit in `usize`
    #[error("arena size overflow while reserving {field:?} ({count} elements)")]
    ArenaOverflow { field: ArrayField, count: usize },

    /// The backing block could not be allocated
    #[error("failed to allocate {bytes} byte draw-state arena")]
    ArenaAllocation { bytes: usize },
}

/// Errors raised while loading a `DrawStateConfig`
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("limit {name} = {value} exceeds maximum {max}")]
    LimitTooLarge {
        name: &'static str,
        value: u32,
        max: u32,
    },
}
