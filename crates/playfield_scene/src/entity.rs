//! Entity identity and location tracking.
//!
//! An [`EntityId`] is a lightweight `u64` identifier with no inherent data;
//! the values an entity carries live in the columns of whichever table the
//! entity currently belongs to. Where that is — the `(table, row)` pair — is
//! held in the [`EntityIndex`] and mutated in place whenever a row moves, so
//! externally held ids stay valid across every structural change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::table::TableId;

/// A unique entity identifier.
///
/// Entities are pure identifiers — components are attached to them to give
/// them meaning. Ids are allocated per scene and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an entity id from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) entity.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity ids.
///
/// Ids start at 1; 0 is reserved for [`EntityId::INVALID`].
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates a new allocator.
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocates a fresh entity id.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }

    /// Returns the number of ids allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }

    /// Advances this allocator past everything `other` has handed out.
    ///
    /// Used when merging scenes, so ids allocated afterwards cannot collide
    /// with adopted ones.
    pub fn advance_past(&mut self, other: &EntityAllocator) {
        self.next_id = self.next_id.max(other.next_id);
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Where an entity's row currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLocation {
    /// The owning table.
    pub table: TableId,
    /// The row inside that table.
    pub row: usize,
}

/// The back-reference store: entity id → current location.
///
/// Every mutation that moves a row — destroy, splice, merge — funnels its
/// fixup through [`EntityIndex::set_row`], so the "a row moved, update its
/// owner's stored index" logic exists exactly once.
#[derive(Debug, Default)]
pub struct EntityIndex {
    locations: HashMap<EntityId, EntityLocation>,
}

impl EntityIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current location of an entity, if it is alive.
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<EntityLocation> {
        self.locations.get(&entity).copied()
    }

    /// Returns `true` if the entity is tracked.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.locations.contains_key(&entity)
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns `true` if no entity is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Iterates over all tracked entity ids, in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.locations.keys().copied()
    }

    /// Records or overwrites the location of an entity.
    pub(crate) fn set(&mut self, entity: EntityId, location: EntityLocation) {
        self.locations.insert(entity, location);
    }

    /// Corrects the stored row of an entity whose row was relocated inside
    /// its table. The entity must be tracked.
    pub(crate) fn set_row(&mut self, entity: EntityId, row: usize) {
        let entry = self.locations.get_mut(&entity);
        debug_assert!(entry.is_some(), "row fixup for untracked entity");
        if let Some(location) = entry {
            location.row = row;
        }
    }

    /// Stops tracking an entity.
    pub(crate) fn remove(&mut self, entity: EntityId) -> Option<EntityLocation> {
        self.locations.remove(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_produces_unique_ids() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();
        let e2 = alloc.allocate();
        assert_eq!(e1.id(), 1);
        assert_eq!(e2.id(), 2);
        assert_eq!(alloc.count(), 2);
    }

    #[test]
    fn test_invalid_sentinel() {
        assert!(!EntityId::INVALID.is_valid());
        assert!(EntityId::from_raw(7).is_valid());
    }

    #[test]
    fn test_advance_past_prevents_reuse() {
        let mut a = EntityAllocator::new();
        let mut b = EntityAllocator::new();
        for _ in 0..5 {
            b.allocate();
        }
        a.advance_past(&b);
        assert_eq!(a.allocate().id(), 6);
    }

    #[test]
    fn test_index_tracks_and_fixes_rows() {
        let mut index = EntityIndex::new();
        let entity = EntityId::from_raw(1);
        index.set(entity, EntityLocation { table: TableId(0), row: 3 });

        index.set_row(entity, 0);
        assert_eq!(
            index.get(entity),
            Some(EntityLocation { table: TableId(0), row: 0 })
        );

        index.remove(entity);
        assert!(!index.contains(entity));
    }
}
