#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tank Arena.
//!
//! The world owns every entity. All mutation flows through [`apply`], which
//! executes one [`Command`] and broadcasts the resulting [`Event`] values;
//! systems only ever see the immutable snapshots served by [`query`].

use tank_arena_core::{
    BlastSpec, Command, Damage, EntityId, EntityKind, Event, Health, WorldRect, WELCOME_BANNER,
};

const DEFAULT_ARENA_WIDTH: f32 = 800.0;
const DEFAULT_ARENA_HEIGHT: f32 = 600.0;

/// Hit points assigned to tanks spawned without an explicit value.
pub const DEFAULT_TANK_HEALTH: Health = Health::new(100);

/// Hit points assigned to plain obstacles.
pub const DEFAULT_OBSTACLE_HEALTH: Health = Health::new(50);

/// Hit points assigned to explosive obstacles.
pub const DEFAULT_EXPLOSIVE_HEALTH: Health = Health::new(30);

/// Payload carried by explosive obstacles spawned with defaults.
pub const DEFAULT_BLAST: BlastSpec = BlastSpec::new(96.0, Damage::new(75));

/// Damage dealt by projectiles fired with default armament.
pub const DEFAULT_PROJECTILE_DAMAGE: Damage = Damage::new(20);

#[derive(Clone, Debug)]
struct Entity {
    id: EntityId,
    bounds: WorldRect,
    kind: EntityKind,
    health: Option<Health>,
    active: bool,
}

/// Represents the authoritative Tank Arena world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    arena_width: f32,
    arena_height: f32,
    entities: Vec<Entity>,
    next_entity: u32,
}

impl World {
    /// Creates a new arena ready for simulation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            arena_width: DEFAULT_ARENA_WIDTH,
            arena_height: DEFAULT_ARENA_HEIGHT,
            entities: Vec::new(),
            next_entity: 0,
        }
    }

    fn spawn(
        &mut self,
        bounds: WorldRect,
        kind: EntityKind,
        health: Option<Health>,
        out_events: &mut Vec<Event>,
    ) {
        let entity = EntityId::new(self.next_entity);
        self.next_entity = self.next_entity.saturating_add(1);
        self.entities.push(Entity {
            id: entity,
            bounds,
            kind,
            health,
            active: true,
        });
        out_events.push(Event::EntitySpawned { entity, kind });
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureArena { width, height } => {
            world.arena_width = width;
            world.arena_height = height;
            world.entities.clear();
            world.next_entity = 0;
            out_events.push(Event::ArenaConfigured { width, height });
        }
        Command::SpawnWall { bounds } => {
            world.spawn(bounds, EntityKind::Wall, None, out_events);
        }
        Command::SpawnTank { bounds, health } => {
            world.spawn(bounds, EntityKind::Tank, Some(health), out_events);
        }
        Command::SpawnObstacle { bounds, health } => {
            world.spawn(bounds, EntityKind::Obstacle, Some(health), out_events);
        }
        Command::SpawnExplosiveObstacle {
            bounds,
            health,
            blast,
        } => {
            world.spawn(
                bounds,
                EntityKind::ExplosiveObstacle { blast },
                Some(health),
                out_events,
            );
        }
        Command::SpawnProjectile {
            bounds,
            damage,
            owner,
        } => {
            world.spawn(
                bounds,
                EntityKind::Projectile { damage, owner },
                None,
                out_events,
            );
        }
        Command::ApplyDamage { entity, amount } => {
            let Some(target) = world.entity_mut(entity) else {
                return;
            };
            if !target.active {
                return;
            }
            let Some(health) = target.health else {
                return;
            };

            let remaining = health.saturating_sub(amount);
            target.health = Some(remaining);
            out_events.push(Event::EntityDamaged {
                entity,
                amount,
                remaining,
            });
            if remaining.is_zero() {
                target.active = false;
                out_events.push(Event::EntityDestroyed { entity });
            }
        }
        Command::Deactivate { entity } => {
            let Some(target) = world.entity_mut(entity) else {
                return;
            };
            if target.active {
                target.active = false;
                out_events.push(Event::EntityDeactivated { entity });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use tank_arena_core::{EntityId, EntitySnapshot, EntityView};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Reports the configured arena dimensions in world units.
    #[must_use]
    pub fn arena_size(world: &World) -> (f32, f32) {
        (world.arena_width, world.arena_height)
    }

    /// Captures a read-only view of every entity, inactive ones included.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        let snapshots: Vec<EntitySnapshot> = world
            .entities
            .iter()
            .map(|entity| EntitySnapshot {
                id: entity.id,
                bounds: entity.bounds,
                active: entity.active,
                health: entity.health,
                kind: entity.kind,
            })
            .collect();
        EntityView::from_snapshots(snapshots)
    }

    /// Looks up a single entity snapshot by identifier.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<EntitySnapshot> {
        world
            .entities
            .iter()
            .find(|entity| entity.id == id)
            .map(|entity| EntitySnapshot {
                id: entity.id,
                bounds: entity.bounds,
                active: entity.active,
                health: entity.health,
                kind: entity.kind,
            })
    }

    /// Number of entities still participating in the simulation.
    #[must_use]
    pub fn active_count(world: &World) -> usize {
        world.entities.iter().filter(|entity| entity.active).count()
    }
}

#[cfg(test)]
mod tests {
    use super::{apply, query, World, DEFAULT_BLAST};
    use tank_arena_core::{Command, Damage, EntityId, EntityKind, Event, Health, WorldRect};

    #[test]
    fn spawns_allocate_sequential_ids() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(&mut world, spawn_wall(0.0), &mut events);
        apply(&mut world, spawn_wall(40.0), &mut events);

        assert_eq!(
            events,
            vec![
                Event::EntitySpawned {
                    entity: EntityId::new(0),
                    kind: EntityKind::Wall,
                },
                Event::EntitySpawned {
                    entity: EntityId::new(1),
                    kind: EntityKind::Wall,
                },
            ]
        );
        assert_eq!(query::active_count(&world), 2);
    }

    #[test]
    fn damage_reaching_zero_destroys_and_deactivates() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnObstacle {
                bounds: rect(0.0),
                health: Health::new(50),
            },
            &mut events,
        );
        events.clear();

        let id = EntityId::new(0);
        apply(
            &mut world,
            Command::ApplyDamage {
                entity: id,
                amount: Damage::new(30),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::ApplyDamage {
                entity: id,
                amount: Damage::new(30),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::EntityDamaged {
                    entity: id,
                    amount: Damage::new(30),
                    remaining: Health::new(20),
                },
                Event::EntityDamaged {
                    entity: id,
                    amount: Damage::new(30),
                    remaining: Health::new(0),
                },
                Event::EntityDestroyed { entity: id },
            ]
        );
        let snapshot = query::entity(&world, id).expect("entity exists");
        assert!(!snapshot.active);
    }

    #[test]
    fn destroyed_entities_ignore_further_damage() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnObstacle {
                bounds: rect(0.0),
                health: Health::new(10),
            },
            &mut events,
        );
        let id = EntityId::new(0);
        apply(
            &mut world,
            Command::ApplyDamage {
                entity: id,
                amount: Damage::new(10),
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::ApplyDamage {
                entity: id,
                amount: Damage::new(10),
            },
            &mut events,
        );

        assert!(events.is_empty());
    }

    #[test]
    fn walls_shrug_off_damage_commands() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, spawn_wall(0.0), &mut events);
        events.clear();

        apply(
            &mut world,
            Command::ApplyDamage {
                entity: EntityId::new(0),
                amount: Damage::new(99),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::active_count(&world), 1);
    }

    #[test]
    fn deactivate_is_idempotent_and_tolerates_unknown_ids() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, spawn_wall(0.0), &mut events);
        events.clear();

        let id = EntityId::new(0);
        apply(&mut world, Command::Deactivate { entity: id }, &mut events);
        apply(&mut world, Command::Deactivate { entity: id }, &mut events);
        apply(
            &mut world,
            Command::Deactivate {
                entity: EntityId::new(42),
            },
            &mut events,
        );

        assert_eq!(events, vec![Event::EntityDeactivated { entity: id }]);
    }

    #[test]
    fn configure_clears_entities_and_restarts_ids() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, spawn_wall(0.0), &mut events);
        apply(
            &mut world,
            Command::SpawnExplosiveObstacle {
                bounds: rect(40.0),
                health: Health::new(30),
                blast: DEFAULT_BLAST,
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::ConfigureArena {
                width: 1024.0,
                height: 768.0,
            },
            &mut events,
        );
        apply(&mut world, spawn_wall(0.0), &mut events);

        assert_eq!(query::arena_size(&world), (1024.0, 768.0));
        assert_eq!(query::active_count(&world), 1);
        assert_eq!(
            events,
            vec![
                Event::ArenaConfigured {
                    width: 1024.0,
                    height: 768.0,
                },
                Event::EntitySpawned {
                    entity: EntityId::new(0),
                    kind: EntityKind::Wall,
                },
            ]
        );
    }

    #[test]
    fn entity_view_is_sorted_and_complete() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, spawn_wall(0.0), &mut events);
        apply(&mut world, spawn_wall(40.0), &mut events);
        apply(
            &mut world,
            Command::Deactivate {
                entity: EntityId::new(0),
            },
            &mut events,
        );

        let view = query::entity_view(&world);
        assert_eq!(view.len(), 2);
        let first = view.get(EntityId::new(0)).expect("snapshot exists");
        assert!(!first.active);
    }

    fn spawn_wall(x: f32) -> Command {
        Command::SpawnWall { bounds: rect(x) }
    }

    fn rect(x: f32) -> WorldRect {
        WorldRect::new(x, 0.0, 32.0, 32.0)
    }
}
