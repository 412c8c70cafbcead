//! Pass-owned working copy of entity state.
//!
//! The roster is rebuilt from the tick's immutable snapshot and absorbs all
//! mutations while the pass runs, so resolution never re-reads pre-pass
//! state and deactivated entities drop out of later checks immediately.

use tank_arena_core::{Damage, EntityId, EntityKind, EntityView, Health, WorldRect};

/// Working copy of one entity for the duration of a pass.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RosterEntry {
    pub(crate) id: EntityId,
    pub(crate) bounds: WorldRect,
    pub(crate) kind: EntityKind,
    pub(crate) active: bool,
    pub(crate) health: Option<Health>,
}

/// Result of applying damage to a roster entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DamageOutcome {
    pub(crate) remaining: Health,
    pub(crate) destroyed: bool,
}

/// Mutable entity table scoped to a single detection-and-resolution pass.
#[derive(Debug, Default)]
pub(crate) struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Rebuilds the roster from the active portion of a snapshot.
    ///
    /// The view is already sorted by id, so the roster inherits its order.
    pub(crate) fn rebuild_from(&mut self, view: &EntityView) {
        self.entries.clear();
        self.entries.extend(view.iter().filter(|entity| entity.active).map(|entity| {
            RosterEntry {
                id: entity.id,
                bounds: entity.bounds,
                kind: entity.kind,
                active: true,
                health: entity.health,
            }
        }));
    }

    /// Copies out the entry for an id, if tracked.
    pub(crate) fn entry(&self, id: EntityId) -> Option<RosterEntry> {
        self.index_of(id).map(|index| self.entries[index])
    }

    /// Reports whether the id is tracked and still active.
    pub(crate) fn is_active(&self, id: EntityId) -> bool {
        self.entry(id).is_some_and(|entry| entry.active)
    }

    /// Iterator over entries that are still active, in id order.
    pub(crate) fn iter_active(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter().filter(|entry| entry.active)
    }

    /// Number of entries that are still active.
    pub(crate) fn active_len(&self) -> usize {
        self.iter_active().count()
    }

    /// Applies damage to an active, damageable entry.
    ///
    /// Returns `None` when the id is unknown, inactive, or carries no
    /// health pool. Reaching zero health deactivates the entry.
    pub(crate) fn apply_damage(&mut self, id: EntityId, amount: Damage) -> Option<DamageOutcome> {
        let index = self.index_of(id)?;
        let entry = &mut self.entries[index];
        if !entry.active {
            return None;
        }
        let health = entry.health?;

        let remaining = health.saturating_sub(amount);
        entry.health = Some(remaining);
        let destroyed = remaining.is_zero();
        if destroyed {
            entry.active = false;
        }
        Some(DamageOutcome {
            remaining,
            destroyed,
        })
    }

    /// Removes an entry from play without applying damage.
    ///
    /// Returns whether the entry was active before the call.
    pub(crate) fn deactivate(&mut self, id: EntityId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let entry = &mut self.entries[index];
        let was_active = entry.active;
        entry.active = false;
        was_active
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entries
            .binary_search_by_key(&id, |entry| entry.id)
            .ok()
    }
}
