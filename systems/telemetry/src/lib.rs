#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rolling aggregation of collision-pass counters for performance monitoring.

use std::collections::VecDeque;

use tank_arena_core::{CollisionStats, TelemetryReport};

const DEFAULT_SAMPLE_CAPACITY: usize = 60;

/// Candidate pairs per object above which clustering looks degenerate.
const PAIR_PRESSURE_THRESHOLD: f32 = 8.0;

/// Pure system that keeps a sliding window of per-pass collision stats.
#[derive(Debug)]
pub struct Telemetry {
    capacity: usize,
    samples: VecDeque<CollisionStats>,
}

impl Telemetry {
    /// Creates a telemetry window holding the default number of samples.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SAMPLE_CAPACITY)
    }

    /// Creates a telemetry window holding at most `capacity` samples.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Records one pass worth of counters, evicting the oldest sample when
    /// the window is full.
    pub fn record(&mut self, stats: CollisionStats) {
        if self.samples.len() == self.capacity {
            let _ = self.samples.pop_front();
        }
        self.samples.push_back(stats);

        if stats.objects_checked > 0 {
            let pressure = stats.pairs_tested as f32 / stats.objects_checked as f32;
            if pressure > PAIR_PRESSURE_THRESHOLD {
                log::warn!(
                    "broad-phase pressure: {} candidate pairs for {} objects",
                    stats.pairs_tested,
                    stats.objects_checked
                );
            }
        }
    }

    /// Most recently recorded sample, if any.
    #[must_use]
    pub fn last(&self) -> Option<&CollisionStats> {
        self.samples.back()
    }

    /// Number of samples currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Reports whether no samples have been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Aggregates the window into a published report.
    #[must_use]
    pub fn report(&self) -> TelemetryReport {
        let samples = self.samples.len();
        if samples == 0 {
            return TelemetryReport::default();
        }

        let mut objects = 0usize;
        let mut pairs = 0usize;
        let mut collisions = 0usize;
        let mut peak = 0usize;
        for sample in &self.samples {
            objects += sample.objects_checked;
            pairs += sample.pairs_tested;
            collisions += sample.collisions_found;
            peak = peak.max(sample.collisions_found);
        }

        let count = samples as f32;
        TelemetryReport {
            samples,
            avg_objects_checked: objects as f32 / count,
            avg_pairs_tested: pairs as f32 / count,
            avg_collisions_found: collisions as f32 / count,
            peak_collisions_found: peak,
            last_cell_utilization: self
                .samples
                .back()
                .map_or(0.0, |sample| sample.grid.cell_utilization),
        }
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}
