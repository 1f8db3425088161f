//! Cache keys
//!
//! [`DrawStateKey`] owns a deep copy of a snapshot and is stored in pipeline
//! maps. Lookups go through [`LookupKey`], which borrows the live snapshot and
//! only copies it when a new entry has to be inserted.

use std::hash::{Hash, Hasher};

use hashbrown::Equivalent;

use crate::error::DrawStateError;
use crate::snapshot::DrawStateSnapshot;

/// Owned snapshot copy keyed by its combined hash
///
/// `Eq` runs full equality, so keys whose hashes collide are still told apart.
#[derive(Debug)]
pub struct DrawStateKey {
    snapshot: DrawStateSnapshot,
    hash: u64,
}

impl DrawStateKey {
    /// Copy the current state of `snapshot` into a key.
    pub fn new(snapshot: &mut DrawStateSnapshot) -> Result<Self, DrawStateError> {
        let hash = snapshot.cache_hash();
        Ok(Self {
            snapshot: snapshot.try_clone()?,
            hash,
        })
    }

    pub fn snapshot(&self) -> &DrawStateSnapshot {
        &self.snapshot
    }

    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for DrawStateKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.snapshot == other.snapshot
    }
}

impl Eq for DrawStateKey {}

impl Hash for DrawStateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Borrowed lookup key for a live snapshot
#[derive(Debug, Clone, Copy)]
pub struct LookupKey<'a> {
    snapshot: &'a DrawStateSnapshot,
    hash: u64,
}

impl LookupKey<'_> {
    pub fn hash_value(&self) -> u64 {
        self.hash
    }

    /// Copy the borrowed state into an owned key for insertion.
    pub fn to_owned_key(&self) -> Result<DrawStateKey, DrawStateError> {
        Ok(DrawStateKey {
            snapshot: self.snapshot.try_clone()?,
            hash: self.hash,
        })
    }
}

impl Hash for LookupKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl Equivalent<DrawStateKey> for LookupKey<'_> {
    fn equivalent(&self, key: &DrawStateKey) -> bool {
        self.hash == key.hash && *self.snapshot == key.snapshot
    }
}

impl DrawStateSnapshot {
    /// Borrow this snapshot as a map lookup key, refreshing the cached hash
    /// for any groups changed since the last call.
    pub fn lookup_key(&mut self) -> LookupKey<'_> {
        let hash = self.cache_hash();
        LookupKey {
            snapshot: self,
            hash,
        }
    }
}
