//! Draw-state snapshot
//!
//! One snapshot mirrors the draw state of a single recording context. Setters
//! are no-ops when the incoming value equals the stored one; otherwise they
//! overwrite it and mark the owning group dirty.
//!
//! - `groups`: field storage and the generated setters/getters
//! - `hash`: partial hashes, combined cache hash, full and subset equality

mod groups;
mod hash;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use bytemuck::Zeroable;

use crate::arena::{Arena, ArenaLayout};
use crate::catalog::{DeviceLimits, StateCatalog, StateGroup, StateGroups};
use crate::dirty::DirtyTracker;
use crate::error::DrawStateError;
use crate::types::{
    BlendFactor, BlendOp, Bool32, ColorBlendAttachmentState, ColorComponentFlags, CompareOp,
    CullModeFlags, Format, PolygonMode, PrimitiveTopology,
};

use groups::{Eds2State, Eds3State, EdsState, MiscState, VertexInputState};
use hash::HashCache;

/// Current draw state of one recording context
#[derive(Debug)]
pub struct DrawStateSnapshot {
    catalog: Arc<StateCatalog>,
    limits: DeviceLimits,
    misc: MiscState,
    eds: EdsState,
    eds2: Eds2State,
    eds3: Eds3State,
    vertex_input: VertexInputState,
    /// Init-time arrays sized from `limits`
    arena: Arena,
    dirty: DirtyTracker,
    hash_cache: HashCache,
}

impl DrawStateSnapshot {
    /// Create a zeroed snapshot for a device.
    ///
    /// Reserves and allocates the arena for the init-time arrays. The new
    /// snapshot is globally dirty with no group bits set.
    ///
    /// # Errors
    ///
    /// Returns an error if the arena size overflows or cannot be allocated.
    pub fn new(catalog: Arc<StateCatalog>, limits: DeviceLimits) -> Result<Self, DrawStateError> {
        let layout = ArenaLayout::reserve(&limits)?;
        let arena = Arena::new(&layout)?;

        let mut dirty = DirtyTracker::new();
        dirty.mark_global();

        tracing::debug!(
            "Created draw-state snapshot: groups={:?}, arena={} bytes",
            catalog.active_groups(),
            arena.size_bytes()
        );

        Ok(Self {
            catalog,
            limits,
            misc: MiscState::zeroed(),
            eds: EdsState::zeroed(),
            eds2: Eds2State::zeroed(),
            eds3: Eds3State::zeroed(),
            vertex_input: VertexInputState::zeroed(),
            arena,
            dirty,
            hash_cache: HashCache::new(),
        })
    }

    /// Deep copy with its own arena.
    pub fn try_clone(&self) -> Result<Self, DrawStateError> {
        Ok(Self {
            catalog: Arc::clone(&self.catalog),
            limits: self.limits,
            misc: self.misc,
            eds: self.eds,
            eds2: self.eds2,
            eds3: self.eds3,
            vertex_input: self.vertex_input,
            arena: self.arena.try_clone()?,
            dirty: self.dirty,
            hash_cache: self.hash_cache,
        })
    }

    pub fn catalog(&self) -> &StateCatalog {
        &self.catalog
    }

    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    /// Bytes held by the arena
    pub fn arena_size(&self) -> usize {
        self.arena.size_bytes()
    }

    /// Apply the state a freshly bound command buffer starts from.
    ///
    /// Single RGBA8 color attachment with standard blending, triangle lists,
    /// filled polygons, front-face culling and less-than depth testing with
    /// writes enabled. When unused attachment formats may be ignored every
    /// color slot gets the attachment defaults and depth/stencil use D24S8.
    pub fn apply_default_state(&mut self) {
        let blend = ColorBlendAttachmentState {
            blend_enable: Bool32::TRUE,
            src_color_blend_factor: BlendFactor::SRC_COLOR,
            dst_color_blend_factor: BlendFactor::DST_COLOR,
            color_blend_op: BlendOp::ADD,
            src_alpha_blend_factor: BlendFactor::SRC_ALPHA,
            dst_alpha_blend_factor: BlendFactor::DST_ALPHA,
            alpha_blend_op: BlendOp::ADD,
            color_write_mask: ColorComponentFlags::RGBA,
        };
        let slots = self.limits.max_color_attachments as usize;
        let default_slots = if self.catalog.ignores_unused_attachments() {
            slots
        } else {
            slots.min(1)
        };
        for index in 0..default_slots {
            self.set_color_blend_attachment_state(index, blend);
            self.set_color_attachment_format(index, Format::R8G8B8A8_UNORM);
        }
        self.set_num_color_attachments(slots.min(1) as u32);

        if self.catalog.ignores_unused_attachments() {
            self.set_depth_attachment_format(Format::D24_UNORM_S8_UINT);
            self.set_stencil_attachment_format(Format::D24_UNORM_S8_UINT);
        }

        self.set_primitive_topology(PrimitiveTopology::TRIANGLE_LIST);
        self.set_polygon_mode(PolygonMode::FILL);
        self.set_cull_mode(CullModeFlags::FRONT);
        self.set_depth_compare_op(CompareOp::LESS);
        self.set_depth_test_enable(Bool32::TRUE);
        self.set_depth_write_enable(Bool32::TRUE);
        self.set_depth_bounds_test_enable(Bool32::TRUE);
        self.set_stencil_test_enable(Bool32::TRUE);
    }

    /// True when any state changed (or the snapshot was created) since the
    /// last [`clear_dirty`](Self::clear_dirty)
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn is_group_dirty(&self, group: StateGroup) -> bool {
        self.dirty.is_group_dirty(group)
    }

    pub fn dirty_groups(&self) -> StateGroups {
        self.dirty.dirty_groups()
    }

    /// Mark the current state as consumed. Clears every group bit and the
    /// global flag; the cached hash stays valid.
    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    fn touch(&mut self, group: StateGroup) {
        self.dirty.mark(group);
        self.hash_cache.invalidate(group);
    }
}
