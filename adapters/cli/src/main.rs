#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs one Tank Arena demonstration skirmish.
//!
//! Builds a walled arena with a deterministic scatter of obstacles and fuel
//! barrels, fires a shell into the field, runs a single
//! detection-and-resolution pass, applies the resulting commands, and prints
//! what happened. There is no timed loop; the frame loop is a separate
//! concern.

use anyhow::Result;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use tank_arena_core::{
    CollisionConfig, Command, Damage, EntityId, EntityKind, Event, WorldRect, DEFAULT_CELL_SIZE,
    DEFAULT_EXHAUSTIVE_THRESHOLD,
};
use tank_arena_system_collision::Collision;
use tank_arena_system_telemetry::Telemetry;
use tank_arena_world::{
    self as world, query, World, DEFAULT_BLAST, DEFAULT_EXPLOSIVE_HEALTH, DEFAULT_OBSTACLE_HEALTH,
    DEFAULT_TANK_HEALTH,
};

const WALL_SEGMENT: f32 = 32.0;
const ENTITY_EXTENT: f32 = 32.0;
const DEFAULT_SEED: u64 = 0x7a6b_a12e;

/// Heavier than the stock 20-damage round so a direct hit pops a barrel.
const OPENING_SHOT_DAMAGE: Damage = Damage::new(40);

/// Arguments controlling the demonstration skirmish.
#[derive(Debug, Parser)]
#[command(name = "tank-arena", about = "Run one Tank Arena collision pass")]
struct Args {
    /// Arena width in world units.
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Arena height in world units.
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Plain obstacles scattered across the arena.
    #[arg(long, default_value_t = 12)]
    obstacles: u32,

    /// Explosive fuel barrels scattered across the arena.
    #[arg(long, default_value_t = 6)]
    barrels: u32,

    /// Seed for the deterministic scatter.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Spatial grid cell size in world units.
    #[arg(long, default_value_t = DEFAULT_CELL_SIZE)]
    cell_size: f32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureArena {
            width: args.width,
            height: args.height,
        },
        &mut events,
    );
    println!("{}", query::welcome_banner(&world));

    build_perimeter(&mut world, &mut events, args.width, args.height);
    let player = spawn(
        &mut world,
        &mut events,
        Command::SpawnTank {
            bounds: WorldRect::new(args.width / 2.0, args.height - 96.0, ENTITY_EXTENT, ENTITY_EXTENT),
            health: DEFAULT_TANK_HEALTH,
        },
    );
    let _opponent = spawn(
        &mut world,
        &mut events,
        Command::SpawnTank {
            bounds: WorldRect::new(args.width / 2.0, 64.0, ENTITY_EXTENT, ENTITY_EXTENT),
            health: DEFAULT_TANK_HEALTH,
        },
    );
    scatter_obstacles(&mut world, &mut events, &args);
    fire_opening_shot(&mut world, &mut events, player);

    let config = CollisionConfig::new(
        args.width,
        args.height,
        args.cell_size,
        DEFAULT_EXHAUSTIVE_THRESHOLD,
    );
    let mut collision = Collision::new(config)?;
    let mut telemetry = Telemetry::new();

    let mut commands = Vec::new();
    let mut resolved = Vec::new();
    let mut cleared_tiles = Vec::new();
    collision.handle(
        &query::entity_view(&world),
        |id| cleared_tiles.push(id),
        &mut commands,
        &mut resolved,
    );
    telemetry.record(collision.stats());

    println!("resolved {} contact(s):", resolved.len());
    for event in &resolved {
        println!("  {event:?}");
    }

    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    for id in &cleared_tiles {
        println!("map tile cleared for entity {}", id.get());
    }

    let stats = collision.stats();
    println!(
        "pass: {} objects, {} candidate pairs, {} collisions, {} detonations",
        stats.objects_checked, stats.pairs_tested, stats.collisions_found,
        stats.detonations_resolved
    );
    let report = telemetry.report();
    println!(
        "grid: {}/{} cells occupied ({:.1}% utilization), {} entities still active",
        stats.grid.occupied_cells,
        stats.grid.total_cells,
        report.last_cell_utilization * 100.0,
        query::active_count(&world)
    );

    Ok(())
}

/// Applies a spawn command and returns the id the world allocated.
fn spawn(world: &mut World, events: &mut Vec<Event>, command: Command) -> EntityId {
    let before = events.len();
    world::apply(world, command, events);
    events[before..]
        .iter()
        .find_map(|event| match event {
            Event::EntitySpawned { entity, .. } => Some(*entity),
            _ => None,
        })
        .unwrap_or(EntityId::new(0))
}

/// Rings the arena with wall segments.
fn build_perimeter(world: &mut World, events: &mut Vec<Event>, width: f32, height: f32) {
    let columns = (width / WALL_SEGMENT).ceil() as u32;
    let rows = (height / WALL_SEGMENT).ceil() as u32;

    for column in 0..columns {
        let x = column as f32 * WALL_SEGMENT;
        let _ = spawn(
            world,
            events,
            Command::SpawnWall {
                bounds: WorldRect::new(x, 0.0, WALL_SEGMENT, WALL_SEGMENT),
            },
        );
        let _ = spawn(
            world,
            events,
            Command::SpawnWall {
                bounds: WorldRect::new(x, height - WALL_SEGMENT, WALL_SEGMENT, WALL_SEGMENT),
            },
        );
    }
    for row in 1..rows.saturating_sub(1) {
        let y = row as f32 * WALL_SEGMENT;
        let _ = spawn(
            world,
            events,
            Command::SpawnWall {
                bounds: WorldRect::new(0.0, y, WALL_SEGMENT, WALL_SEGMENT),
            },
        );
        let _ = spawn(
            world,
            events,
            Command::SpawnWall {
                bounds: WorldRect::new(width - WALL_SEGMENT, y, WALL_SEGMENT, WALL_SEGMENT),
            },
        );
    }
}

/// Scatters obstacles and barrels over the arena interior.
fn scatter_obstacles(world: &mut World, events: &mut Vec<Event>, args: &Args) {
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let min = WALL_SEGMENT + 8.0;
    let max_x = (args.width - WALL_SEGMENT - ENTITY_EXTENT - 8.0).max(min + 1.0);
    let max_y = (args.height - WALL_SEGMENT - ENTITY_EXTENT - 8.0).max(min + 1.0);

    for _ in 0..args.obstacles {
        let bounds = WorldRect::new(
            rng.gen_range(min..max_x),
            rng.gen_range(min..max_y),
            ENTITY_EXTENT,
            ENTITY_EXTENT,
        );
        let _ = spawn(
            world,
            events,
            Command::SpawnObstacle {
                bounds,
                health: DEFAULT_OBSTACLE_HEALTH,
            },
        );
    }
    for _ in 0..args.barrels {
        let bounds = WorldRect::new(
            rng.gen_range(min..max_x),
            rng.gen_range(min..max_y),
            ENTITY_EXTENT,
            ENTITY_EXTENT,
        );
        let _ = spawn(
            world,
            events,
            Command::SpawnExplosiveObstacle {
                bounds,
                health: DEFAULT_EXPLOSIVE_HEALTH,
                blast: DEFAULT_BLAST,
            },
        );
    }
}

/// Drops a heavy shell onto a fuel barrel so the pass has work to do.
fn fire_opening_shot(world: &mut World, events: &mut Vec<Event>, shooter: EntityId) {
    let view = query::entity_view(world);
    let target = view
        .iter()
        .find(|entity| matches!(entity.kind, EntityKind::ExplosiveObstacle { .. }))
        .or_else(|| view.iter().find(|entity| entity.kind.is_destructible()))
        .map(|entity| entity.bounds);

    let Some(bounds) = target else {
        log::warn!("no destructible target to fire at; the pass will be quiet");
        return;
    };

    let shell = WorldRect::new(bounds.x() + 12.0, bounds.y() + 12.0, 8.0, 8.0);
    let _ = spawn(
        world,
        events,
        Command::SpawnProjectile {
            bounds: shell,
            damage: OPENING_SHOT_DAMAGE,
            owner: Some(shooter),
        },
    );
}
