//! Detonation worklist resolution with radial damage falloff.
//!
//! Chain reactions run through an explicit FIFO queue instead of recursion:
//! resolving one event may enqueue the detonations of obstacles it destroys,
//! and the loop continues until the queue empties. Deactivated entities are
//! skipped at the top of the per-target loop, which bounds every chain by
//! the number of explosive entities in the arena.

use tank_arena_core::{Damage, ResolvedEvent, WorldRect};
use tank_arena_spatial::SpatialGrid;

use crate::ResolveContext;

/// Drains the context's detonation worklist to completion.
///
/// Returns how many valid events were resolved, chained ones included.
pub(crate) fn drain(grid: &SpatialGrid, ctx: &mut ResolveContext<'_>) -> usize {
    let mut resolved = 0;

    while let Some(event) = ctx.worklist.pop_front() {
        if !event.radius.is_finite() || event.radius <= 0.0 {
            log::warn!(
                "dropping malformed detonation event with radius {}",
                event.radius
            );
            continue;
        }

        resolved += 1;
        ctx.events.push(ResolvedEvent::Detonation {
            center: event.center,
            radius: event.radius,
            source: event.source,
        });

        // Square circumscribing the blast circle; the distance check below
        // discards the corners.
        let reach = WorldRect::new(
            event.center.x() - event.radius,
            event.center.y() - event.radius,
            event.radius * 2.0,
            event.radius * 2.0,
        );

        for id in grid.query_region(reach) {
            if Some(id) == event.source {
                continue;
            }
            let Some(target) = ctx.roster.entry(id) else {
                continue;
            };
            if !target.active || !target.kind.is_damageable() {
                continue;
            }

            let distance = target.bounds.center().distance_to(event.center);
            if distance >= event.radius {
                continue;
            }

            let amount = falloff(event.base_damage, distance, event.radius);
            if ctx.damage(&target, amount).is_some() {
                ctx.events.push(ResolvedEvent::BlastDamage { target: id, amount });
            }
        }
    }

    resolved
}

/// Distance-scaled blast damage.
///
/// Full damage at the center, linear falloff toward the rim, floored, and
/// never less than 1 for a target strictly inside the radius.
pub(crate) fn falloff(base: Damage, distance: f32, radius: f32) -> Damage {
    let ratio = 1.0 - distance / radius;
    let scaled = (base.get() as f32 * ratio).floor() as u32;
    Damage::new(scaled.max(1))
}
