use tank_arena_core::{
    BlastSpec, CollisionConfig, Command, Damage, EntityId, Event, Health, ResolvedEvent, WorldRect,
};
use tank_arena_system_collision::Collision;
use tank_arena_world::{self as world, query, World};

#[test]
fn overlapping_pair_is_resolved_exactly_once() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnObstacle {
            bounds: WorldRect::new(100.0, 100.0, 32.0, 32.0),
            health: Health::new(50),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnProjectile {
            bounds: WorldRect::new(110.0, 110.0, 32.0, 32.0),
            damage: Damage::new(20),
            owner: None,
        },
        &mut events,
    );

    let mut collision = collision();
    let (commands, resolved) = run_pass(&mut collision, &world);

    let impacts: Vec<_> = resolved
        .iter()
        .filter(|event| matches!(event, ResolvedEvent::ImpactDamage { .. }))
        .collect();
    assert_eq!(impacts.len(), 1);
    assert_eq!(collision.stats().collisions_found, 1);
    assert_eq!(
        commands,
        vec![
            Command::Deactivate {
                entity: EntityId::new(1),
            },
            Command::ApplyDamage {
                entity: EntityId::new(0),
                amount: Damage::new(20),
            },
        ]
    );
}

#[test]
fn projectiles_stop_at_walls_without_damaging_them() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnWall {
            bounds: WorldRect::new(100.0, 100.0, 32.0, 32.0),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnProjectile {
            bounds: WorldRect::new(120.0, 110.0, 8.0, 8.0),
            damage: Damage::new(20),
            owner: None,
        },
        &mut events,
    );

    let mut collision = collision();
    let (commands, resolved) = run_pass(&mut collision, &world);

    assert_eq!(
        commands,
        vec![Command::Deactivate {
            entity: EntityId::new(1),
        }]
    );
    assert_eq!(
        resolved,
        vec![ResolvedEvent::ProjectileStopped {
            projectile: EntityId::new(1),
            obstruction: EntityId::new(0),
        }]
    );

    let mut world_events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut world_events);
    }
    let wall = query::entity(&world, EntityId::new(0)).expect("wall exists");
    assert!(wall.active);
}

#[test]
fn destroyed_barrel_chains_into_its_neighbor() {
    let mut world = World::new();
    let mut events = Vec::new();
    // Barrel X under fire; barrel Y 40 units from X's center.
    world::apply(
        &mut world,
        Command::SpawnExplosiveObstacle {
            bounds: WorldRect::new(100.0, 100.0, 32.0, 32.0),
            health: Health::new(50),
            blast: BlastSpec::new(96.0, Damage::new(75)),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnExplosiveObstacle {
            bounds: WorldRect::new(140.0, 100.0, 32.0, 32.0),
            health: Health::new(30),
            blast: BlastSpec::new(96.0, Damage::new(75)),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnProjectile {
            bounds: WorldRect::new(110.0, 110.0, 8.0, 8.0),
            damage: Damage::new(50),
            owner: None,
        },
        &mut events,
    );

    let barrel_x = EntityId::new(0);
    let barrel_y = EntityId::new(1);
    let shell = EntityId::new(2);

    let mut collision = collision();
    let mut destroyed = Vec::new();
    let mut commands = Vec::new();
    let mut resolved = Vec::new();
    collision.handle(
        &query::entity_view(&world),
        |id| destroyed.push(id),
        &mut commands,
        &mut resolved,
    );

    // Y takes floor(75 * (1 - 40/96)) = 43, beating its 30 health, so it
    // detonates in turn.
    assert_eq!(
        commands,
        vec![
            Command::Deactivate { entity: shell },
            Command::ApplyDamage {
                entity: barrel_x,
                amount: Damage::new(50),
            },
            Command::ApplyDamage {
                entity: barrel_y,
                amount: Damage::new(43),
            },
        ]
    );
    assert_eq!(destroyed, vec![barrel_x, barrel_y]);
    assert_eq!(collision.stats().detonations_resolved, 2);

    let secondary: Vec<_> = resolved
        .iter()
        .filter_map(|event| match event {
            ResolvedEvent::Detonation { source, .. } => *source,
            _ => None,
        })
        .collect();
    assert_eq!(secondary, vec![barrel_x, barrel_y]);

    let mut world_events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut world_events);
    }
    assert!(world_events.contains(&Event::EntityDestroyed { entity: barrel_x }));
    assert!(world_events.contains(&Event::EntityDestroyed { entity: barrel_y }));
    assert_eq!(query::active_count(&world), 0);
}

#[test]
fn cell_boundary_candidates_are_discarded_silently() {
    let mut world = World::new();
    let mut events = Vec::new();
    // Same 64-unit cell, no actual overlap.
    world::apply(
        &mut world,
        Command::SpawnObstacle {
            bounds: WorldRect::new(0.0, 0.0, 16.0, 16.0),
            health: Health::new(50),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnProjectile {
            bounds: WorldRect::new(40.0, 40.0, 8.0, 8.0),
            damage: Damage::new(20),
            owner: None,
        },
        &mut events,
    );

    let mut collision = collision();
    let (commands, resolved) = run_pass(&mut collision, &world);

    assert!(commands.is_empty());
    assert!(resolved.is_empty());
    assert_eq!(collision.stats().pairs_tested, 1);
    assert_eq!(collision.stats().collisions_found, 0);
}

#[test]
fn grid_mode_finds_the_one_true_overlap() {
    let mut world = World::new();
    let mut events = Vec::new();
    // Eleven walls push the population past the exhaustive threshold.
    for index in 0..11 {
        world::apply(
            &mut world,
            Command::SpawnWall {
                bounds: WorldRect::new(index as f32 * 70.0, 500.0, 32.0, 32.0),
            },
            &mut events,
        );
    }
    world::apply(
        &mut world,
        Command::SpawnObstacle {
            bounds: WorldRect::new(100.0, 100.0, 32.0, 32.0),
            health: Health::new(50),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnProjectile {
            bounds: WorldRect::new(110.0, 110.0, 8.0, 8.0),
            damage: Damage::new(20),
            owner: None,
        },
        &mut events,
    );

    let mut collision = collision();
    let (commands, _) = run_pass(&mut collision, &world);

    assert_eq!(collision.stats().objects_checked, 13);
    assert_eq!(collision.stats().collisions_found, 1);
    assert_eq!(
        commands,
        vec![
            Command::Deactivate {
                entity: EntityId::new(12),
            },
            Command::ApplyDamage {
                entity: EntityId::new(11),
                amount: Damage::new(20),
            },
        ]
    );
}

#[test]
fn identical_inputs_yield_identical_batches() {
    let build = || {
        let mut world = World::new();
        let mut events = Vec::new();
        for index in 0..6 {
            world::apply(
                &mut world,
                Command::SpawnWall {
                    bounds: WorldRect::new(index as f32 * 64.0, 0.0, 64.0, 16.0),
                },
                &mut events,
            );
        }
        for index in 0..4 {
            world::apply(
                &mut world,
                Command::SpawnExplosiveObstacle {
                    bounds: WorldRect::new(100.0 + index as f32 * 40.0, 100.0, 32.0, 32.0),
                    health: Health::new(30),
                    blast: BlastSpec::new(96.0, Damage::new(75)),
                },
                &mut events,
            );
        }
        world::apply(
            &mut world,
            Command::SpawnTank {
                bounds: WorldRect::new(260.0, 160.0, 32.0, 32.0),
                health: Health::new(100),
            },
            &mut events,
        );
        world::apply(
            &mut world,
            Command::SpawnProjectile {
                bounds: WorldRect::new(110.0, 110.0, 8.0, 8.0),
                damage: Damage::new(50),
                owner: None,
            },
            &mut events,
        );
        world
    };

    let mut first = collision();
    let (first_commands, first_events) = run_pass(&mut first, &build());

    let mut second = collision();
    let (second_commands, second_events) = run_pass(&mut second, &build());

    assert_eq!(first_commands, second_commands);
    assert_eq!(first_events, second_events);
    assert_eq!(first.stats(), second.stats());
    assert!(!first_commands.is_empty());
}

#[test]
fn inactive_entities_never_enter_the_pass() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnObstacle {
            bounds: WorldRect::new(100.0, 100.0, 32.0, 32.0),
            health: Health::new(50),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnProjectile {
            bounds: WorldRect::new(110.0, 110.0, 8.0, 8.0),
            damage: Damage::new(20),
            owner: None,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::Deactivate {
            entity: EntityId::new(1),
        },
        &mut events,
    );

    let mut collision = collision();
    let (commands, resolved) = run_pass(&mut collision, &world);

    assert!(commands.is_empty());
    assert!(resolved.is_empty());
    assert_eq!(collision.stats().objects_checked, 1);
    assert_eq!(collision.stats().pairs_tested, 0);
}

fn collision() -> Collision {
    Collision::new(CollisionConfig::sized(800.0, 600.0)).expect("valid configuration")
}

fn run_pass(collision: &mut Collision, world: &World) -> (Vec<Command>, Vec<ResolvedEvent>) {
    let mut commands = Vec::new();
    let mut resolved = Vec::new();
    collision.handle(
        &query::entity_view(world),
        |_| {},
        &mut commands,
        &mut resolved,
    );
    (commands, resolved)
}
