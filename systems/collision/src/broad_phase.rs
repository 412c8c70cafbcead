//! Broad-phase candidate pair generation.
//!
//! Small populations are paired exhaustively; past the configured threshold
//! the spatial grid narrows candidates to entities sharing at least one
//! cell. Either way the output is a sorted, deduplicated list of unordered
//! id pairs, so narrow-phase resolution order is reproducible.

use std::collections::HashSet;

use tank_arena_core::EntityId;
use tank_arena_spatial::SpatialGrid;

use crate::roster::Roster;

#[derive(Debug)]
pub(crate) struct BroadPhase {
    exhaustive_threshold: usize,
    pairs: Vec<(EntityId, EntityId)>,
    seen: HashSet<(EntityId, EntityId)>,
    stale: Vec<EntityId>,
}

impl BroadPhase {
    pub(crate) fn new(exhaustive_threshold: usize) -> Self {
        Self {
            exhaustive_threshold,
            pairs: Vec::new(),
            seen: HashSet::new(),
            stale: Vec::new(),
        }
    }

    /// Produces the candidate pairs for this pass.
    ///
    /// The grid is reconciled with the roster on every call regardless of
    /// the pairing strategy, so region queries stay valid for the explosion
    /// resolver even when the population is below the threshold.
    pub(crate) fn detect(
        &mut self,
        roster: &Roster,
        grid: &mut SpatialGrid,
    ) -> &[(EntityId, EntityId)] {
        self.pairs.clear();
        self.seen.clear();
        self.reconcile(roster, grid);

        if roster.active_len() <= self.exhaustive_threshold {
            self.pair_exhaustively(roster);
        } else {
            self.pair_via_grid(roster, grid);
        }

        self.pairs.sort_unstable();
        &self.pairs
    }

    /// Drops stale registrations and upserts every active entity.
    fn reconcile(&mut self, roster: &Roster, grid: &mut SpatialGrid) {
        self.stale.clear();
        self.stale.extend(
            grid.ids()
                .into_iter()
                .filter(|id| !roster.is_active(*id)),
        );
        for &id in &self.stale {
            grid.remove(id);
        }

        for entry in roster.iter_active() {
            grid.update(entry.id, entry.bounds);
        }
    }

    fn pair_exhaustively(&mut self, roster: &Roster) {
        let actives: Vec<EntityId> = roster.iter_active().map(|entry| entry.id).collect();
        for (index, &first) in actives.iter().enumerate() {
            for &second in &actives[index + 1..] {
                self.pairs.push((first, second));
            }
        }
    }

    fn pair_via_grid(&mut self, roster: &Roster, grid: &SpatialGrid) {
        for entry in roster.iter_active() {
            for neighbor in grid.query_neighbors(entry.id) {
                let key = ordered(entry.id, neighbor);
                if self.seen.insert(key) {
                    self.pairs.push(key);
                }
            }
        }
    }
}

fn ordered(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
