#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tank Arena engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values. Systems consume
//! immutable snapshots and respond exclusively with new command batches, so
//! the detection-and-resolution pass never touches shared state directly.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the Tank Arena.";

/// Default edge length of a spatial grid cell in world units.
pub const DEFAULT_CELL_SIZE: f32 = 64.0;

/// Population at or below which exhaustive pair testing beats the grid.
pub const DEFAULT_EXHAUSTIVE_THRESHOLD: usize = 10;

/// Substitute extent used when an entity reports zero or negative geometry.
pub const FALLBACK_EXTENT: f32 = 32.0;

/// Unique identifier assigned to an arena entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Hit points carried by tanks and destructible obstacles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the remaining hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the health pool is exhausted.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts damage, saturating at zero.
    #[must_use]
    pub const fn saturating_sub(self, damage: Damage) -> Self {
        Self(self.0.saturating_sub(damage.get()))
    }
}

/// Damage dealt by a projectile impact or a blast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Damage(u32);

impl Damage {
    /// Creates a new damage amount.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric damage amount.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Location in continuous world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the point.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the point.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(&self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned bounding box expressed in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl WorldRect {
    /// Creates a new rectangle anchored at its upper-left corner.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Horizontal coordinate of the upper-left corner.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the upper-left corner.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Width of the rectangle.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the rectangle.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Reports whether two rectangles strictly overlap.
    ///
    /// Edge-touching rectangles do not count as overlapping: under discrete
    /// per-tick sampling a projectile resting exactly on a wall edge has not
    /// yet entered it.
    #[must_use]
    pub fn overlaps(&self, other: &WorldRect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Detonation payload carried by explosive obstacles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlastSpec {
    radius: f32,
    damage: Damage,
}

impl BlastSpec {
    /// Creates a new blast payload.
    #[must_use]
    pub const fn new(radius: f32, damage: Damage) -> Self {
        Self { radius, damage }
    }

    /// Blast radius in world units.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Damage applied at the blast center before falloff.
    #[must_use]
    pub const fn damage(&self) -> Damage {
        self.damage
    }
}

/// Closed set of entity kinds recognized by the combat core.
///
/// Each variant carries only the fields relevant to it; code that needs a
/// capability asks through the predicate methods instead of probing for
/// fields.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Indestructible static barrier.
    Wall,
    /// Player or opponent combat unit.
    Tank,
    /// Shell in flight, deactivated on its first impact.
    Projectile {
        /// Damage dealt to whatever the projectile strikes.
        damage: Damage,
        /// Tank that fired the shell; used only to suppress self-damage.
        owner: Option<EntityId>,
    },
    /// Plain destructible obstacle that crumbles without side effects.
    Obstacle,
    /// Destructible obstacle that detonates when destroyed.
    ExplosiveObstacle {
        /// Payload released when the obstacle is destroyed.
        blast: BlastSpec,
    },
}

impl EntityKind {
    /// Reports whether the kind can lose health.
    #[must_use]
    pub const fn is_damageable(&self) -> bool {
        matches!(
            self,
            Self::Tank | Self::Obstacle | Self::ExplosiveObstacle { .. }
        )
    }

    /// Reports whether the kind is a destructible obstacle.
    ///
    /// Destroyed destructibles are reported to the map collaborator so the
    /// corresponding tile can be cleared; tanks and projectiles are not.
    #[must_use]
    pub const fn is_destructible(&self) -> bool {
        matches!(self, Self::Obstacle | Self::ExplosiveObstacle { .. })
    }
}

/// Immutable representation of a single entity used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// Bounding box of the entity in world space.
    pub bounds: WorldRect,
    /// Indicates whether the entity participates in the simulation.
    pub active: bool,
    /// Remaining hit points for damageable kinds, `None` otherwise.
    pub health: Option<Health>,
    /// Kind tag with kind-specific payload.
    pub kind: EntityKind,
}

/// Read-only snapshot describing all entities within the arena.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic id order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by entity identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// One pending explosion: where it happens and how hard it hits.
///
/// Ephemeral by design; events live only inside the detonation worklist of
/// the pass that produced them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetonationEvent {
    /// Center of the blast in world space.
    pub center: WorldPoint,
    /// Blast radius in world units; events with a non-positive or
    /// non-finite radius are rejected.
    pub radius: f32,
    /// Damage applied at the center before distance falloff.
    pub base_damage: Damage,
    /// Entity that detonated, excluded from its own blast.
    pub source: Option<EntityId>,
}

impl DetonationEvent {
    /// Builds the detonation released by a destroyed explosive obstacle.
    #[must_use]
    pub fn from_blast(center: WorldPoint, blast: BlastSpec, source: EntityId) -> Self {
        Self {
            center,
            radius: blast.radius(),
            base_damage: blast.damage(),
            source: Some(source),
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resizes the arena and clears all entities.
    ConfigureArena {
        /// Arena width in world units.
        width: f32,
        /// Arena height in world units.
        height: f32,
    },
    /// Requests an indestructible wall segment.
    SpawnWall {
        /// Bounding box occupied by the wall.
        bounds: WorldRect,
    },
    /// Requests a combat unit.
    SpawnTank {
        /// Bounding box occupied by the tank.
        bounds: WorldRect,
        /// Starting hit points.
        health: Health,
    },
    /// Requests a plain destructible obstacle.
    SpawnObstacle {
        /// Bounding box occupied by the obstacle.
        bounds: WorldRect,
        /// Starting hit points.
        health: Health,
    },
    /// Requests an explosive destructible obstacle.
    SpawnExplosiveObstacle {
        /// Bounding box occupied by the obstacle.
        bounds: WorldRect,
        /// Starting hit points.
        health: Health,
        /// Payload released when the obstacle is destroyed.
        blast: BlastSpec,
    },
    /// Requests a shell in flight.
    SpawnProjectile {
        /// Bounding box occupied by the projectile.
        bounds: WorldRect,
        /// Damage dealt on impact.
        damage: Damage,
        /// Tank that fired the shell, if any.
        owner: Option<EntityId>,
    },
    /// Reduces an entity's health by the provided amount.
    ApplyDamage {
        /// Identifier of the damaged entity.
        entity: EntityId,
        /// Damage to subtract from the entity's health.
        amount: Damage,
    },
    /// Removes an entity from play without applying damage.
    Deactivate {
        /// Identifier of the entity leaving play.
        entity: EntityId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the arena was resized and cleared.
    ArenaConfigured {
        /// Arena width in world units.
        width: f32,
        /// Arena height in world units.
        height: f32,
    },
    /// Confirms that an entity entered the arena.
    EntitySpawned {
        /// Identifier allocated by the world.
        entity: EntityId,
        /// Kind of the spawned entity.
        kind: EntityKind,
    },
    /// Reports that an entity lost health.
    EntityDamaged {
        /// Identifier of the damaged entity.
        entity: EntityId,
        /// Damage that was applied.
        amount: Damage,
        /// Hit points remaining after the damage.
        remaining: Health,
    },
    /// Reports that damage reduced an entity's health to zero.
    EntityDestroyed {
        /// Identifier of the destroyed entity.
        entity: EntityId,
    },
    /// Reports that an entity was removed from play without destruction.
    EntityDeactivated {
        /// Identifier of the deactivated entity.
        entity: EntityId,
    },
}

/// Resolution records emitted by the collision pass for optional logging.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResolvedEvent {
    /// A projectile struck something it cannot damage and stopped.
    ProjectileStopped {
        /// Identifier of the stopped projectile.
        projectile: EntityId,
        /// Identifier of the entity that stopped it.
        obstruction: EntityId,
    },
    /// A projectile struck a damageable entity.
    ImpactDamage {
        /// Identifier of the projectile.
        projectile: EntityId,
        /// Identifier of the struck entity.
        target: EntityId,
        /// Damage that was applied.
        amount: Damage,
    },
    /// A blast reached an entity within its radius.
    BlastDamage {
        /// Identifier of the damaged entity.
        target: EntityId,
        /// Falloff-adjusted damage that was applied.
        amount: Damage,
    },
    /// An explosive obstacle detonated.
    Detonation {
        /// Center of the blast in world space.
        center: WorldPoint,
        /// Blast radius in world units.
        radius: f32,
        /// Entity that detonated, if the blast had a source.
        source: Option<EntityId>,
    },
}

/// Configuration for the detection-and-resolution pass, set once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionConfig {
    world_width: f32,
    world_height: f32,
    cell_size: f32,
    exhaustive_threshold: usize,
}

impl CollisionConfig {
    /// Creates a configuration with explicit tuning parameters.
    #[must_use]
    pub const fn new(
        world_width: f32,
        world_height: f32,
        cell_size: f32,
        exhaustive_threshold: usize,
    ) -> Self {
        Self {
            world_width,
            world_height,
            cell_size,
            exhaustive_threshold,
        }
    }

    /// Creates a configuration using the default cell size and threshold.
    #[must_use]
    pub const fn sized(world_width: f32, world_height: f32) -> Self {
        Self::new(
            world_width,
            world_height,
            DEFAULT_CELL_SIZE,
            DEFAULT_EXHAUSTIVE_THRESHOLD,
        )
    }

    /// Arena width in world units.
    #[must_use]
    pub const fn world_width(&self) -> f32 {
        self.world_width
    }

    /// Arena height in world units.
    #[must_use]
    pub const fn world_height(&self) -> f32 {
        self.world_height
    }

    /// Edge length of a spatial grid cell.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Population at or below which the broad phase tests pairs exhaustively.
    #[must_use]
    pub const fn exhaustive_threshold(&self) -> usize {
        self.exhaustive_threshold
    }
}

/// Occupancy statistics reported by the spatial grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    /// Entities currently tracked by the grid.
    pub total_entities: usize,
    /// Cells holding at least one entity.
    pub occupied_cells: usize,
    /// Total cell count of the configured grid.
    pub total_cells: usize,
    /// Fraction of cells holding at least one entity.
    pub cell_utilization: f32,
    /// Mean entity registrations per occupied cell.
    pub avg_entities_per_cell: f32,
}

/// Per-pass counters reported by the collision system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionStats {
    /// Active entities that entered the pass.
    pub objects_checked: usize,
    /// Candidate pairs produced by the broad phase.
    pub pairs_tested: usize,
    /// Candidate pairs confirmed by the exact overlap test.
    pub collisions_found: usize,
    /// Detonation events resolved, including chained ones.
    pub detonations_resolved: usize,
    /// Spatial grid occupancy after the pass.
    pub grid: GridStats,
}

/// Aggregated collision telemetry published for performance monitoring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReport {
    /// Samples contributing to the averages.
    pub samples: usize,
    /// Mean active entities per pass.
    pub avg_objects_checked: f32,
    /// Mean broad-phase candidate pairs per pass.
    pub avg_pairs_tested: f32,
    /// Mean confirmed collisions per pass.
    pub avg_collisions_found: f32,
    /// Largest confirmed-collision count observed in the window.
    pub peak_collisions_found: usize,
    /// Grid cell utilization of the most recent sample.
    pub last_cell_utilization: f32,
}
