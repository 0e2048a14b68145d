//! Engine-agnostic metrics collection for grid generation and pathfinding.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use voxel_nav::metrics::{NavMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // Read after ticking:
//! let metrics = navigator.metrics();
//! println!("{} free / {} blocked", metrics.classified_free, metrics.classified_blocked);
//! println!("avg search {:.1}us", metrics.avg_search_timing_us());
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::grid::Classification;
use crate::path::PathStatus;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Iterate over values (oldest to newest).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    /// Get the most recent value.
    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }
}

impl<T: Copy + Default + std::ops::Add<Output = T>> RollingWindow<T> {
    pub fn sum(&self) -> T {
        self.buffer.iter().copied().fold(T::default(), |acc, x| acc + x)
    }
}

impl RollingWindow<u64> {
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.sum() as f64 / self.buffer.len() as f64
        }
    }

    /// Get min and max values.
    pub fn min_max(&self) -> Option<(u64, u64)> {
        let min = self.buffer.iter().min()?;
        let max = self.buffer.iter().max()?;
        Some((*min, *max))
    }
}

impl Default for RollingWindow<u64> {
    fn default() -> Self {
        Self::new(128)
    }
}

/// Navigator-level counters, updated on the main thread each tick.
#[derive(Debug, Clone)]
pub struct NavMetrics {
    // Generation
    /// Probes handed to the spatial oracle.
    pub probes_dispatched: u64,
    /// Cells committed as Free.
    pub classified_free: u64,
    /// Cells committed as Blocked.
    pub classified_blocked: u64,
    /// Queued cells dropped because their center left the bounds.
    pub dropped_out_of_bounds: u64,

    // Pathfinding, one counter per outcome
    pub paths_found: u64,
    pub paths_invalid_start: u64,
    pub paths_unreachable: u64,
    pub paths_iteration_limit: u64,

    // Timing
    /// Rolling window of A* search times in microseconds.
    pub search_timings: RollingWindow<u64>,
    /// Rolling window of region expansion times in microseconds.
    pub expansion_timings: RollingWindow<u64>,
    /// Rolling window of `tick()` times in microseconds.
    pub tick_timings: RollingWindow<u64>,
}

impl Default for NavMetrics {
    fn default() -> Self {
        Self {
            probes_dispatched: 0,
            classified_free: 0,
            classified_blocked: 0,
            dropped_out_of_bounds: 0,
            paths_found: 0,
            paths_invalid_start: 0,
            paths_unreachable: 0,
            paths_iteration_limit: 0,
            search_timings: RollingWindow::new(128),
            expansion_timings: RollingWindow::new(128),
            tick_timings: RollingWindow::new(128),
        }
    }
}

impl NavMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear timing windows. Counters are cumulative and survive.
    pub fn reset_timings(&mut self) {
        self.search_timings.clear();
        self.expansion_timings.clear();
        self.tick_timings.clear();
    }

    pub fn record_dispatch(&mut self, dispatched: usize, out_of_bounds: usize) {
        if is_enabled() {
            self.probes_dispatched += dispatched as u64;
            self.dropped_out_of_bounds += out_of_bounds as u64;
        }
    }

    pub fn record_classification(&mut self, class: Classification) {
        if !is_enabled() {
            return;
        }
        match class {
            Classification::Free => self.classified_free += 1,
            Classification::Blocked => self.classified_blocked += 1,
        }
    }

    /// Record a finished search and its wall time.
    pub fn record_search(&mut self, status: PathStatus, timing_us: u64) {
        if !is_enabled() {
            return;
        }
        match status {
            PathStatus::Found => self.paths_found += 1,
            PathStatus::InvalidStart { .. } => self.paths_invalid_start += 1,
            PathStatus::Unreachable => self.paths_unreachable += 1,
            PathStatus::IterationLimit => self.paths_iteration_limit += 1,
        }
        self.search_timings.push(timing_us);
    }

    pub fn record_expansion_timing(&mut self, timing_us: u64) {
        if is_enabled() {
            self.expansion_timings.push(timing_us);
        }
    }

    pub fn record_tick_timing(&mut self, timing_us: u64) {
        if is_enabled() {
            self.tick_timings.push(timing_us);
        }
    }

    pub fn total_classified(&self) -> u64 {
        self.classified_free + self.classified_blocked
    }

    pub fn total_searches(&self) -> u64 {
        self.paths_found + self.paths_invalid_start + self.paths_unreachable + self.paths_iteration_limit
    }

    pub fn avg_search_timing_us(&self) -> f64 {
        self.search_timings.average()
    }

    pub fn avg_expansion_timing_us(&self) -> f64 {
        self.expansion_timings.average()
    }
}
