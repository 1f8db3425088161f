//! Hashing and comparison
//!
//! A group's partial hash starts at 17 and folds each scalar field in with
//! `result * 31 + hash(field)`. Array fields are left out of the partial hash
//! but are compared by full equality, so a cache keyed on
//! [`DrawStateSnapshot::cache_hash`] resolves collisions through `Eq`.
//!
//! When unused attachment formats may be ignored, the relaxed fields (depth
//! and stencil formats, color attachment count) are also left out of that
//! snapshot's MISC hash, keeping `Hash` consistent with the relaxed `Eq`.
//!
//! The hash depends on the catalog (active groups and relaxation), so `Eq`
//! only holds between snapshots with equal catalogs. [`DrawStateSnapshot::field_eq`]
//! and [`DrawStateSnapshot::compare_state_subset`] still compare across
//! catalogs, relaxing a field when either side allows it.

use std::hash::{Hash, Hasher};

use super::DrawStateSnapshot;
use crate::arena::ArrayField;
use crate::catalog::{FieldId, PipelineSubset, Relaxation, StateGroup, StateGroups};
use crate::types::{
    ColorBlendAttachmentState, Format, StateValue, VertexInputAttributeDescription,
    VertexInputBindingDescription, ViewportSwizzle,
};

/// Running `result * 31 + hash(field)` fold
pub(crate) struct PartialHasher {
    relaxed: bool,
    result: u64,
}

impl PartialHasher {
    const SEED: u64 = 17;
    const MULTIPLIER: u64 = 31;

    pub(crate) fn new(relaxed: bool) -> Self {
        Self {
            relaxed,
            result: Self::SEED,
        }
    }

    pub(crate) fn fold<T: StateValue>(&mut self, field: FieldId, value: &T) {
        if self.relaxed && field.relaxation() != Relaxation::Strict {
            return;
        }
        self.result = self
            .result
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(value.state_hash());
    }

    pub(crate) fn finish(self) -> u64 {
        self.result
    }
}

/// Relaxation flags of the two snapshots being compared
#[derive(Debug, Clone, Copy)]
pub(crate) struct Relax {
    lhs: bool,
    rhs: bool,
}

impl Relax {
    pub(crate) fn new(lhs: bool, rhs: bool) -> Self {
        Self { lhs, rhs }
    }

    pub(crate) fn value_eq<T: StateValue>(self, field: FieldId, lhs: &T, rhs: &T) -> bool {
        if lhs.state_eq(rhs) {
            return true;
        }
        match field.relaxation() {
            Relaxation::Strict => false,
            Relaxation::UndefinedFormat => {
                (self.lhs && lhs.is_undefined()) || (self.rhs && rhs.is_undefined())
            }
            Relaxation::AttachmentCount => self.lhs || self.rhs,
        }
    }

    pub(crate) fn slice_eq<T: StateValue>(self, field: FieldId, lhs: &[T], rhs: &[T]) -> bool {
        lhs.len() == rhs.len()
            && lhs
                .iter()
                .zip(rhs)
                .all(|(a, b)| self.value_eq(field, a, b))
    }
}

/// Cached per-group partial hashes and their combination
#[derive(Debug, Clone, Copy)]
pub(crate) struct HashCache {
    stale: StateGroups,
    partials: [u64; StateGroup::COUNT],
    combined: u64,
}

impl HashCache {
    pub(crate) fn new() -> Self {
        Self {
            stale: StateGroups::all(),
            partials: [0; StateGroup::COUNT],
            combined: 0,
        }
    }

    pub(crate) fn invalidate(&mut self, group: StateGroup) {
        self.stale |= group.flag();
    }
}

impl DrawStateSnapshot {
    /// Partial hash of one group's scalar fields.
    pub fn partial_hash(&self, group: StateGroup) -> u64 {
        let relaxed = self.catalog.ignores_unused_attachments();
        match group {
            StateGroup::Misc => self.misc.partial_hash(relaxed),
            StateGroup::ExtendedDynamicState => self.eds.partial_hash(relaxed),
            StateGroup::ExtendedDynamicState2 => self.eds2.partial_hash(relaxed),
            StateGroup::ExtendedDynamicState3 => self.eds3.partial_hash(relaxed),
            StateGroup::VertexInputDynamicState => self.vertex_input.partial_hash(relaxed),
        }
    }

    /// Partial hash of the group with the given ordinal.
    ///
    /// # Panics
    ///
    /// Panics if `ordinal` does not name a group.
    pub fn partial_hash_by_ordinal(&self, ordinal: u32) -> u64 {
        match StateGroup::from_ordinal(ordinal) {
            Some(group) => self.partial_hash(group),
            None => panic!("state group ordinal {} is not mapped to a group", ordinal),
        }
    }

    /// Combined hash of every active group, recomputing only the groups
    /// changed since the previous call.
    pub fn cache_hash(&mut self) -> u64 {
        let active = self.catalog.active_groups();
        let stale = self.hash_cache.stale & active;
        if stale.is_empty() {
            return self.hash_cache.combined;
        }

        for group in stale.groups() {
            let partial = self.partial_hash(group);
            tracing::trace!("Recomputed {} partial hash: {:#018x}", group, partial);
            self.hash_cache.partials[group.ordinal() as usize] = partial;
        }
        self.hash_cache.stale.remove(active);
        let partials = self.hash_cache.partials;
        self.hash_cache.combined = active
            .groups()
            .fold(0, |acc, group| acc ^ partials[group.ordinal() as usize]);
        self.hash_cache.combined
    }

    /// Combined hash computed from scratch. Always equals [`Self::cache_hash`].
    pub fn compute_hash(&self) -> u64 {
        self.catalog
            .active_groups()
            .groups()
            .fold(0, |acc, group| acc ^ self.partial_hash(group))
    }

    /// Compare only the state that gates relinking `subset`: its shader slots
    /// first, then the fields mapped into it.
    pub fn compare_state_subset(&self, other: &Self, subset: PipelineSubset) -> bool {
        subset
            .shader_stages()
            .iter()
            .all(|&stage| self.comparable_shader(stage) == other.comparable_shader(stage))
            && subset.fields().all(|field| self.field_eq(other, field))
    }

    /// Compare a single field of two snapshots.
    pub fn field_eq(&self, other: &Self, field: FieldId) -> bool {
        let relax = self.relax_with(other);
        let stored = match field.group() {
            StateGroup::Misc => self.misc.field_eq(&other.misc, field, relax),
            StateGroup::ExtendedDynamicState => self.eds.field_eq(&other.eds, field, relax),
            StateGroup::ExtendedDynamicState2 => self.eds2.field_eq(&other.eds2, field, relax),
            StateGroup::ExtendedDynamicState3 => self.eds3.field_eq(&other.eds3, field, relax),
            StateGroup::VertexInputDynamicState => {
                self.vertex_input.field_eq(&other.vertex_input, field, relax)
            }
        };
        match (stored, ArrayField::from_field(field)) {
            (Some(eq), _) => eq,
            (None, Some(array)) => self.arena_eq(other, array, relax),
            (None, None) => unreachable!("{:?} has no storage", field),
        }
    }

    fn relax_with(&self, other: &Self) -> Relax {
        Relax::new(
            self.catalog.ignores_unused_attachments(),
            other.catalog.ignores_unused_attachments(),
        )
    }

    fn group_eq(&self, other: &Self, group: StateGroup, relax: Relax) -> bool {
        match group {
            StateGroup::Misc => {
                self.misc.fields_eq(&other.misc, relax)
                    && self.arena_eq(other, ArrayField::ColorAttachmentFormats, relax)
                    && self.arena_eq(other, ArrayField::ColorBlendAttachmentStates, relax)
            }
            StateGroup::ExtendedDynamicState => self.eds.fields_eq(&other.eds, relax),
            StateGroup::ExtendedDynamicState2 => self.eds2.fields_eq(&other.eds2, relax),
            StateGroup::ExtendedDynamicState3 => {
                self.eds3.fields_eq(&other.eds3, relax)
                    && self.arena_eq(other, ArrayField::ViewportSwizzles, relax)
            }
            StateGroup::VertexInputDynamicState => {
                self.vertex_input.fields_eq(&other.vertex_input, relax)
                    && self.arena_eq(other, ArrayField::VertexInputAttributeDescriptions, relax)
                    && self.arena_eq(other, ArrayField::VertexInputBindingDescriptions, relax)
            }
        }
    }

    /// Limit-sized arrays compare length (the device limit) first, then every element
    fn arena_eq(&self, other: &Self, array: ArrayField, relax: Relax) -> bool {
        if self.limits.get(array.limit()) != other.limits.get(array.limit()) {
            return false;
        }
        let field = array.field();
        match array {
            ArrayField::ColorAttachmentFormats => relax.slice_eq::<Format>(
                field,
                self.arena.slice(array),
                other.arena.slice(array),
            ),
            ArrayField::ColorBlendAttachmentStates => relax.slice_eq::<ColorBlendAttachmentState>(
                field,
                self.arena.slice(array),
                other.arena.slice(array),
            ),
            ArrayField::ViewportSwizzles => relax.slice_eq::<ViewportSwizzle>(
                field,
                self.arena.slice(array),
                other.arena.slice(array),
            ),
            ArrayField::VertexInputAttributeDescriptions => relax
                .slice_eq::<VertexInputAttributeDescription>(
                    field,
                    self.arena.slice(array),
                    other.arena.slice(array),
                ),
            ArrayField::VertexInputBindingDescriptions => relax
                .slice_eq::<VertexInputBindingDescription>(
                    field,
                    self.arena.slice(array),
                    other.arena.slice(array),
                ),
        }
    }
}

/// Full equality over every group, in declaration order.
///
/// Snapshots from different catalogs are never equal.
impl PartialEq for DrawStateSnapshot {
    fn eq(&self, other: &Self) -> bool {
        if self.catalog != other.catalog {
            return false;
        }
        let relax = self.relax_with(other);
        StateGroup::ALL
            .iter()
            .all(|&group| self.group_eq(other, group, relax))
    }
}

impl Eq for DrawStateSnapshot {}

impl Hash for DrawStateSnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.compute_hash());
    }
}
