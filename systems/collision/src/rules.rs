//! Ordered rule table mapping kind pairs to resolution functions.
//!
//! Classification is symmetric: a rule matches an unordered pair of kind
//! classes and its resolver always receives the participants in the order
//! the rule declares, so `(A, B)` and `(B, A)` resolve identically. New pair
//! kinds are added by registering another rule entry; the dispatch loop
//! itself never changes.

use tank_arena_core::{EntityKind, ResolvedEvent};

use crate::roster::RosterEntry;
use crate::ResolveContext;

/// Kind tag stripped of its payload, used as the rule-matching key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum KindClass {
    Wall,
    Tank,
    Projectile,
    Obstacle,
    ExplosiveObstacle,
}

pub(crate) fn class_of(kind: &EntityKind) -> KindClass {
    match kind {
        EntityKind::Wall => KindClass::Wall,
        EntityKind::Tank => KindClass::Tank,
        EntityKind::Projectile { .. } => KindClass::Projectile,
        EntityKind::Obstacle => KindClass::Obstacle,
        EntityKind::ExplosiveObstacle { .. } => KindClass::ExplosiveObstacle,
    }
}

type ResolveFn = fn(&RosterEntry, &RosterEntry, &mut ResolveContext<'_>);

struct PairRule {
    first: KindClass,
    second: KindClass,
    resolve: ResolveFn,
}

impl PairRule {
    const fn new(first: KindClass, second: KindClass, resolve: ResolveFn) -> Self {
        Self {
            first,
            second,
            resolve,
        }
    }
}

/// Rule set registered once when the collision system is constructed.
pub(crate) struct RuleTable {
    rules: Vec<PairRule>,
}

impl RuleTable {
    /// Registers the standard arena rules.
    pub(crate) fn standard() -> Self {
        Self {
            rules: vec![
                PairRule::new(KindClass::Projectile, KindClass::Wall, stop_on_barrier),
                PairRule::new(KindClass::Projectile, KindClass::Tank, strike_damageable),
                PairRule::new(KindClass::Projectile, KindClass::Obstacle, strike_damageable),
                PairRule::new(
                    KindClass::Projectile,
                    KindClass::ExplosiveObstacle,
                    strike_damageable,
                ),
                // Movement blocking is enforced by the motion system; the
                // entry exists so the boundary is visible in the table.
                PairRule::new(KindClass::Tank, KindClass::Wall, ignore_pair),
            ],
        }
    }

    /// Resolves a confirmed pair through the first matching rule.
    ///
    /// Returns whether any rule matched; unmatched combinations are not an
    /// error, they simply resolve to nothing.
    pub(crate) fn dispatch(
        &self,
        a: &RosterEntry,
        b: &RosterEntry,
        ctx: &mut ResolveContext<'_>,
    ) -> bool {
        let class_a = class_of(&a.kind);
        let class_b = class_of(&b.kind);

        for rule in &self.rules {
            if rule.first == class_a && rule.second == class_b {
                (rule.resolve)(a, b, ctx);
                return true;
            }
            if rule.first == class_b && rule.second == class_a {
                (rule.resolve)(b, a, ctx);
                return true;
            }
        }
        false
    }
}

impl std::fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleTable")
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Walls absorb the shell without taking damage.
fn stop_on_barrier(projectile: &RosterEntry, barrier: &RosterEntry, ctx: &mut ResolveContext<'_>) {
    if ctx.halt(projectile.id) {
        ctx.events.push(ResolvedEvent::ProjectileStopped {
            projectile: projectile.id,
            obstruction: barrier.id,
        });
    }
}

/// The shell stops and transfers its damage to the struck entity.
///
/// Destruction side effects (map notification, detonation enqueue) are
/// handled by the damage path shared with the explosion resolver.
fn strike_damageable(projectile: &RosterEntry, target: &RosterEntry, ctx: &mut ResolveContext<'_>) {
    let EntityKind::Projectile { damage, .. } = projectile.kind else {
        return;
    };
    if !ctx.halt(projectile.id) {
        return;
    }
    if ctx.damage(target, damage).is_some() {
        ctx.events.push(ResolvedEvent::ImpactDamage {
            projectile: projectile.id,
            target: target.id,
            amount: damage,
        });
    }
}

fn ignore_pair(_first: &RosterEntry, _second: &RosterEntry, _ctx: &mut ResolveContext<'_>) {}
