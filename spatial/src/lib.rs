#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Uniform-grid spatial index answering "who is near me" queries.
//!
//! The arena is divided into square cells; every tracked entity registers in
//! each cell its bounding box covers. Neighbor queries then touch only the
//! covered cells instead of the whole population. The grid is rebuilt or
//! incrementally reconciled once per tick and holds no state beyond the
//! current entity snapshot.

use std::collections::{HashMap, HashSet};

use tank_arena_core::{CollisionConfig, EntityId, GridStats, WorldRect, FALLBACK_EXTENT};
use thiserror::Error;

/// Rejection reasons for invalid grid configurations.
///
/// These indicate a broken integration rather than bad game data, so they
/// surface as constructor errors instead of degraded behavior.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum GridConfigError {
    /// World dimensions must be positive, finite numbers.
    #[error("world dimensions must be positive and finite, got {width}x{height}")]
    InvalidWorldSize {
        /// Rejected world width.
        width: f32,
        /// Rejected world height.
        height: f32,
    },
    /// Cell size must be a positive, finite number.
    #[error("cell size must be positive and finite, got {cell_size}")]
    InvalidCellSize {
        /// Rejected cell edge length.
        cell_size: f32,
    },
}

/// Location of a single grid cell expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// Inclusive rectangular range of grid cells covered by one bounding box.
///
/// Covered cells always form a rectangle, so diffing two coverages reduces
/// to span containment checks instead of set arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellSpan {
    min: CellCoord,
    max: CellCoord,
}

impl CellSpan {
    fn contains(&self, cell: CellCoord) -> bool {
        cell.column >= self.min.column
            && cell.column <= self.max.column
            && cell.row >= self.min.row
            && cell.row <= self.max.row
    }

    fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.min.column..=self.max.column;
        columns.flat_map(move |column| {
            (self.min.row..=self.max.row).map(move |row| CellCoord::new(column, row))
        })
    }
}

#[derive(Clone, Debug)]
struct Footprint {
    bounds: WorldRect,
    span: CellSpan,
}

/// Uniform grid mapping cells to the entities whose bounds cover them.
#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    columns: u32,
    rows: u32,
    cells: HashMap<CellCoord, HashSet<EntityId>>,
    footprints: HashMap<EntityId, Footprint>,
}

impl SpatialGrid {
    /// Creates a grid covering the provided world with the given cell size.
    pub fn new(
        world_width: f32,
        world_height: f32,
        cell_size: f32,
    ) -> Result<Self, GridConfigError> {
        if !(world_width.is_finite() && world_height.is_finite())
            || world_width <= 0.0
            || world_height <= 0.0
        {
            return Err(GridConfigError::InvalidWorldSize {
                width: world_width,
                height: world_height,
            });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridConfigError::InvalidCellSize { cell_size });
        }

        let columns = ((world_width / cell_size).ceil() as u32).max(1);
        let rows = ((world_height / cell_size).ceil() as u32).max(1);

        Ok(Self {
            cell_size,
            columns,
            rows,
            cells: HashMap::new(),
            footprints: HashMap::new(),
        })
    }

    /// Creates a grid from the shared collision configuration.
    pub fn from_config(config: &CollisionConfig) -> Result<Self, GridConfigError> {
        Self::new(
            config.world_width(),
            config.world_height(),
            config.cell_size(),
        )
    }

    /// Registers an entity in every cell its bounding box covers.
    ///
    /// Zero or negative extents fall back to a fixed footprint instead of
    /// failing; the substituted bounds are what later exact checks see.
    /// Inserting an already tracked entity behaves like [`Self::update`].
    pub fn insert(&mut self, id: EntityId, bounds: WorldRect) {
        if self.footprints.contains_key(&id) {
            self.update(id, bounds);
            return;
        }

        let effective = effective_bounds(bounds);
        let span = self.span_for(&effective);
        for cell in span.cells() {
            let _ = self.cells.entry(cell).or_default().insert(id);
        }
        let _ = self.footprints.insert(
            id,
            Footprint {
                bounds: effective,
                span,
            },
        );
    }

    /// Removes an entity from every cell it was registered in.
    ///
    /// Removing an untracked entity is a no-op.
    pub fn remove(&mut self, id: EntityId) {
        let Some(footprint) = self.footprints.remove(&id) else {
            return;
        };
        for cell in footprint.span.cells() {
            self.discard_from_cell(cell, id);
        }
    }

    /// Recomputes an entity's covered cells after it moved.
    ///
    /// When the covered span is unchanged only the recorded bounds refresh;
    /// otherwise just the delta cells are touched. Updating an untracked
    /// entity inserts it.
    pub fn update(&mut self, id: EntityId, bounds: WorldRect) {
        let Some(footprint) = self.footprints.get(&id) else {
            self.insert(id, bounds);
            return;
        };

        let effective = effective_bounds(bounds);
        let new_span = self.span_for(&effective);
        let old_span = footprint.span;

        if new_span == old_span {
            if let Some(footprint) = self.footprints.get_mut(&id) {
                footprint.bounds = effective;
            }
            return;
        }

        for cell in old_span.cells() {
            if !new_span.contains(cell) {
                self.discard_from_cell(cell, id);
            }
        }
        for cell in new_span.cells() {
            if !old_span.contains(cell) {
                let _ = self.cells.entry(cell).or_default().insert(id);
            }
        }

        let _ = self.footprints.insert(
            id,
            Footprint {
                bounds: effective,
                span: new_span,
            },
        );
    }

    /// Returns all other entities sharing at least one cell with `id`.
    ///
    /// The result is sorted and deduplicated; an untracked id yields an
    /// empty vector.
    #[must_use]
    pub fn query_neighbors(&self, id: EntityId) -> Vec<EntityId> {
        let Some(footprint) = self.footprints.get(&id) else {
            return Vec::new();
        };

        let mut neighbors: Vec<EntityId> = Vec::new();
        for cell in footprint.span.cells() {
            if let Some(occupants) = self.cells.get(&cell) {
                neighbors.extend(occupants.iter().copied().filter(|other| *other != id));
            }
        }
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Returns the entities whose recorded bounds overlap the region.
    ///
    /// Cell-level candidates are narrowed by an exact overlap test, so the
    /// result contains no boundary false positives. Sorted by id.
    #[must_use]
    pub fn query_region(&self, region: WorldRect) -> Vec<EntityId> {
        if region.width() <= 0.0 || region.height() <= 0.0 {
            return Vec::new();
        }

        let span = self.span_for(&region);
        let mut candidates: Vec<EntityId> = Vec::new();
        for cell in span.cells() {
            if let Some(occupants) = self.cells.get(&cell) {
                candidates.extend(occupants.iter().copied());
            }
        }
        candidates.sort_unstable();
        candidates.dedup();
        candidates.retain(|id| {
            self.footprints
                .get(id)
                .is_some_and(|footprint| footprint.bounds.overlaps(&region))
        });
        candidates
    }

    /// Recorded bounds for a tracked entity, if any.
    #[must_use]
    pub fn bounds_of(&self, id: EntityId) -> Option<WorldRect> {
        self.footprints.get(&id).map(|footprint| footprint.bounds)
    }

    /// Reports whether the entity is currently tracked.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.footprints.contains_key(&id)
    }

    /// All tracked entity identifiers, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.footprints.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    /// Reports whether the grid tracks no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }

    /// Drops every tracked entity.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.footprints.clear();
    }

    /// Occupancy statistics for the performance-monitoring collaborator.
    #[must_use]
    pub fn stats(&self) -> GridStats {
        let occupied_cells = self.cells.len();
        let total_cells = self.columns as usize * self.rows as usize;
        let registrations: usize = self.cells.values().map(HashSet::len).sum();

        let cell_utilization = if total_cells > 0 {
            occupied_cells as f32 / total_cells as f32
        } else {
            0.0
        };
        let avg_entities_per_cell = if occupied_cells > 0 {
            registrations as f32 / occupied_cells as f32
        } else {
            0.0
        };

        GridStats {
            total_entities: self.footprints.len(),
            occupied_cells,
            total_cells,
            cell_utilization,
            avg_entities_per_cell,
        }
    }

    fn discard_from_cell(&mut self, cell: CellCoord, id: EntityId) {
        if let Some(occupants) = self.cells.get_mut(&cell) {
            let _ = occupants.remove(&id);
            if occupants.is_empty() {
                let _ = self.cells.remove(&cell);
            }
        }
    }

    fn span_for(&self, bounds: &WorldRect) -> CellSpan {
        let min = CellCoord::new(
            clamp_first(bounds.x() / self.cell_size, self.columns),
            clamp_first(bounds.y() / self.cell_size, self.rows),
        );
        // The far edge is exclusive: a box ending exactly on a cell boundary
        // does not reach into the next cell, but any partial coverage does.
        let far = CellCoord::new(
            clamp_last((bounds.x() + bounds.width()) / self.cell_size, self.columns),
            clamp_last((bounds.y() + bounds.height()) / self.cell_size, self.rows),
        );
        let max = CellCoord::new(far.column.max(min.column), far.row.max(min.row));
        CellSpan { min, max }
    }
}

/// Index of the first covered cell, clamped to the grid.
fn clamp_first(raw: f32, bound: u32) -> u32 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    let index = raw.floor() as u64;
    index.min(u64::from(bound.saturating_sub(1))) as u32
}

/// Index of the last covered cell for an exclusive far edge.
fn clamp_last(raw: f32, bound: u32) -> u32 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    let index = (raw.ceil() as u64).saturating_sub(1);
    index.min(u64::from(bound.saturating_sub(1))) as u32
}

/// Substitutes the fallback footprint for degenerate geometry.
fn effective_bounds(bounds: WorldRect) -> WorldRect {
    let width = if bounds.width() > 0.0 {
        bounds.width()
    } else {
        FALLBACK_EXTENT
    };
    let height = if bounds.height() > 0.0 {
        bounds.height()
    } else {
        FALLBACK_EXTENT
    };
    WorldRect::new(bounds.x(), bounds.y(), width, height)
}
