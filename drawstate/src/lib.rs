//! Nether-DrawState: draw-state snapshots and incremental pipeline cache keys
//!
//! A graphics interception layer mirrors every piece of mutable draw state it
//! sees into a [`DrawStateSnapshot`], one per recording context. Before each
//! draw it asks the snapshot whether anything changed, for a cache key, and
//! whether a cached pipeline (or pipeline-library part) can be reused.
//!
//! # Architecture
//!
//! - [`catalog`] - Field table, state groups, pipeline subsets, device limits
//! - [`DrawStateSnapshot`] - Field storage, setters/getters, hashing, equality
//! - [`DirtyTracker`] - Per-group and global dirty bits
//! - [`arena`] - Two-pass layout and single block for limit-sized arrays
//! - [`DrawStateKey`] - Owned cache key with borrowed lookups
//! - [`DrawStateConfig`] - TOML device description (extensions + limits)
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use nether_drawstate::{DrawStateConfig, DrawStateKey, DrawStateSnapshot, PipelineSubset};
//!
//! let config = DrawStateConfig::load(path)?;
//! let mut state = DrawStateSnapshot::new(Arc::new(config.catalog()), config.limits())?;
//! state.apply_default_state();
//!
//! if state.is_dirty() {
//!     let pipeline = cache.get(&state.lookup_key());
//!     state.clear_dirty();
//! }
//! let reusable = state.compare_state_subset(&cached, PipelineSubset::FragmentShader);
//! ```

pub mod arena;
pub mod catalog;
pub mod config;
pub mod dirty;
pub mod error;
pub mod key;
pub mod snapshot;
pub mod types;

pub use catalog::{
    Arity, DeviceLimits, FieldId, FieldInfo, LimitKind, PipelineSubset, StateCatalog, StateGroup,
    StateGroups,
};
pub use config::DrawStateConfig;
pub use dirty::DirtyTracker;
pub use error::{ConfigError, DrawStateError};
pub use key::{DrawStateKey, LookupKey};
pub use snapshot::DrawStateSnapshot;
pub use types::{ShaderIdentity, ShaderStage};
