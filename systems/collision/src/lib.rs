#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Detection-and-resolution system for arena combat contacts.
//!
//! Once per tick the system consumes an immutable entity snapshot, narrows
//! the population to candidate pairs through the spatial grid, confirms each
//! candidate with an exact bounding-box test, resolves confirmed pairs
//! through the registered rule table, and drains the resulting detonation
//! worklist. All mutations land on a pass-owned roster and leave the system
//! as [`Command`] batches for the world to apply; the shared entity state is
//! never touched directly.

mod broad_phase;
mod explosion;
mod roster;
mod rules;

use std::collections::VecDeque;

use tank_arena_core::{
    CollisionConfig, CollisionStats, Command, Damage, DetonationEvent, EntityId, EntityKind,
    EntityView, ResolvedEvent,
};
use tank_arena_spatial::SpatialGrid;

pub use tank_arena_spatial::GridConfigError;

use broad_phase::BroadPhase;
use roster::{DamageOutcome, Roster, RosterEntry};
use rules::RuleTable;

/// Mutable surfaces shared by the pair resolvers and the explosion resolver.
///
/// Bundles the pass-owned roster with the output buffers so resolution code
/// records commands, events, pending detonations, and destroyed
/// destructibles through one seam.
pub(crate) struct ResolveContext<'a> {
    pub(crate) roster: &'a mut Roster,
    pub(crate) commands: &'a mut Vec<Command>,
    pub(crate) events: &'a mut Vec<ResolvedEvent>,
    pub(crate) worklist: &'a mut VecDeque<DetonationEvent>,
    pub(crate) destroyed: &'a mut Vec<EntityId>,
}

impl ResolveContext<'_> {
    /// Applies damage through the roster along with its destruction
    /// side effects: destroyed destructibles are recorded for the map
    /// collaborator and destroyed explosives enqueue their detonation.
    pub(crate) fn damage(
        &mut self,
        target: &RosterEntry,
        amount: Damage,
    ) -> Option<DamageOutcome> {
        let outcome = self.roster.apply_damage(target.id, amount)?;
        self.commands.push(Command::ApplyDamage {
            entity: target.id,
            amount,
        });
        log::trace!(
            "entity {} took {} damage, {} hit points remain",
            target.id.get(),
            amount.get(),
            outcome.remaining.get()
        );

        if outcome.destroyed {
            if target.kind.is_destructible() {
                self.destroyed.push(target.id);
            }
            if let EntityKind::ExplosiveObstacle { blast } = target.kind {
                self.worklist.push_back(DetonationEvent::from_blast(
                    target.bounds.center(),
                    blast,
                    target.id,
                ));
            }
        }

        Some(outcome)
    }

    /// Deactivates an entity without damage, mirroring it as a command.
    ///
    /// Returns `false` when the entity was already out of play.
    pub(crate) fn halt(&mut self, entity: EntityId) -> bool {
        if self.roster.deactivate(entity) {
            self.commands.push(Command::Deactivate { entity });
            true
        } else {
            false
        }
    }
}

/// Pure system running the per-tick collision pass.
#[derive(Debug)]
pub struct Collision {
    grid: SpatialGrid,
    broad: BroadPhase,
    rules: RuleTable,
    roster: Roster,
    worklist: VecDeque<DetonationEvent>,
    destroyed: Vec<EntityId>,
    stats: CollisionStats,
}

impl Collision {
    /// Creates the system from its once-per-startup configuration.
    pub fn new(config: CollisionConfig) -> Result<Self, GridConfigError> {
        Ok(Self {
            grid: SpatialGrid::from_config(&config)?,
            broad: BroadPhase::new(config.exhaustive_threshold()),
            rules: RuleTable::standard(),
            roster: Roster::default(),
            worklist: VecDeque::new(),
            destroyed: Vec::new(),
            stats: CollisionStats::default(),
        })
    }

    /// Runs one detection-and-resolution pass over the snapshot.
    ///
    /// `notify_destroyed` is invoked once, in destruction order, for every
    /// destructible obstacle destroyed during the pass so the map
    /// collaborator can clear the corresponding tile. Mutations are appended
    /// to `out` as commands and resolution records to `out_events`.
    pub fn handle<F>(
        &mut self,
        view: &EntityView,
        mut notify_destroyed: F,
        out: &mut Vec<Command>,
        out_events: &mut Vec<ResolvedEvent>,
    ) where
        F: FnMut(EntityId),
    {
        self.roster.rebuild_from(view);
        self.worklist.clear();
        self.destroyed.clear();

        let objects_checked = self.roster.active_len();
        let pairs = self.broad.detect(&self.roster, &mut self.grid);
        let pairs_tested = pairs.len();

        let mut collisions_found = 0;
        let detonations_resolved;
        {
            let mut ctx = ResolveContext {
                roster: &mut self.roster,
                commands: out,
                events: out_events,
                worklist: &mut self.worklist,
                destroyed: &mut self.destroyed,
            };

            for &(first, second) in pairs {
                let (Some(a), Some(b)) = (ctx.roster.entry(first), ctx.roster.entry(second))
                else {
                    continue;
                };
                // Freshness guard: earlier resolutions may have taken either
                // participant out of play.
                if !a.active || !b.active {
                    continue;
                }
                if !a.bounds.overlaps(&b.bounds) {
                    continue;
                }
                collisions_found += 1;

                if is_owner_pair(&a, &b) {
                    continue;
                }
                let _ = self.rules.dispatch(&a, &b, &mut ctx);
            }

            detonations_resolved = explosion::drain(&self.grid, &mut ctx);
        }

        for &id in &self.destroyed {
            notify_destroyed(id);
        }

        self.stats = CollisionStats {
            objects_checked,
            pairs_tested,
            collisions_found,
            detonations_resolved,
            grid: self.grid.stats(),
        };
        log::debug!(
            "collision pass: {objects_checked} objects, {pairs_tested} candidates, \
             {collisions_found} contacts, {detonations_resolved} detonations"
        );
    }

    /// Counters from the most recent pass.
    #[must_use]
    pub fn stats(&self) -> CollisionStats {
        self.stats
    }
}

/// A projectile never collides with the tank that fired it.
fn is_owner_pair(a: &RosterEntry, b: &RosterEntry) -> bool {
    let owns = |shooter: &RosterEntry, other: &RosterEntry| {
        matches!(
            shooter.kind,
            EntityKind::Projectile { owner: Some(owner), .. } if owner == other.id
        )
    };
    owns(a, b) || owns(b, a)
}
