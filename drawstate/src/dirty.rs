//! Dirty tracking
//!
//! Per-group bits plus one global flag. Bits are set when a setter writes a
//! value different from the stored one; the consumer clears everything at once
//! after it has built or looked up a pipeline from the current state.

use smallvec::SmallVec;

use crate::catalog::{StateGroup, StateGroups};

/// Dirty bits for one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyTracker {
    groups: StateGroups,
    global: bool,
}

impl DirtyTracker {
    /// Clean tracker
    pub fn new() -> Self {
        Self {
            groups: StateGroups::empty(),
            global: false,
        }
    }

    /// Record a value change in `group`
    pub fn mark(&mut self, group: StateGroup) {
        self.groups |= group.flag();
        self.global = true;
    }

    /// Record an event that invalidates the whole state without touching a
    /// specific group (snapshot creation, arena setup)
    pub fn mark_global(&mut self) {
        self.global = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.global
    }

    pub fn is_group_dirty(&self, group: StateGroup) -> bool {
        self.groups.contains(group.flag())
    }

    pub fn dirty_groups(&self) -> StateGroups {
        self.groups
    }

    /// Dirty groups in ordinal order
    pub fn dirty_group_list(&self) -> SmallVec<[StateGroup; StateGroup::COUNT]> {
        self.groups.groups().collect()
    }

    /// Clear every group bit together with the global flag
    pub fn clear(&mut self) {
        self.groups = StateGroups::empty();
        self.global = false;
    }
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}
