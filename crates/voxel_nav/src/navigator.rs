//! VoxelNavigator - main-thread owner of the occupancy grid and everything
//! that feeds it.
//!
//! The host drives it with discrete ticks. Background work (region
//! expansion, A* search) runs on rayon; results re-enter on the main thread
//! inside [`VoxelNavigator::tick`], the only place grid writes and event
//! publication happen besides [`VoxelNavigator::complete_probe`].
//!
//! # Tick order
//!
//! 1. merge finished region expansions into the generation queue
//! 2. commit probe completions waiting on the completion channel
//! 3. dispatch up to `max_region_requests_per_tick` queued cells as probes
//! 4. broadcast finished path searches
//!
//! A probe answered synchronously during step 3 is committed on the next
//! tick.

use crossbeam_channel::{self as channel, Receiver, Sender};
use glam::DVec3;
use web_time::Instant;

use crate::config::{ConfigError, NavConfig};
use crate::coords::GridCoord;
use crate::events::{NavEvent, NotificationBus};
use crate::generation::{
  dispatch_batch, region_center, resolve_completion, GenerationQueue, ProbeCompletion, ProbeCorrelationTable,
  ProbeHandle, RegionError, RegionExpander, RegionRequestId, SpatialProbe, MAX_GRID_RADIUS,
};
use crate::grid::{Classification, GridSnapshot, OccupancyGrid};
use crate::metrics::NavMetrics;
use crate::path::{PathQuery, PathRequestId, PathTicket, PathfindingEngine};

/// What one [`VoxelNavigator::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
  /// Finished region expansions merged into the queue.
  pub regions_merged: usize,
  /// Candidates that entered the queue (after dedupe).
  pub candidates_enqueued: usize,
  /// Probe completions committed to the grid.
  pub classified: usize,
  /// Coordinates popped from the queue.
  pub popped: usize,
  /// Probes issued.
  pub dispatched: usize,
  /// Popped coordinates dropped for lying outside the bounds.
  pub dropped_out_of_bounds: usize,
  /// Popped coordinates already classified or in flight.
  pub skipped: usize,
  /// Path results broadcast.
  pub paths_delivered: usize,
}

/// Incremental occupancy grid plus pathfinding over it, generic over the
/// spatial probe oracle.
pub struct VoxelNavigator<P: SpatialProbe> {
  config: NavConfig,
  grid: OccupancyGrid,
  queue: GenerationQueue,
  table: ProbeCorrelationTable,
  probe: P,
  regions: RegionExpander,
  paths: PathfindingEngine,
  bus: NotificationBus,
  completion_tx: Sender<ProbeCompletion>,
  completion_rx: Receiver<ProbeCompletion>,
  metrics: NavMetrics,
}

impl<P: SpatialProbe> VoxelNavigator<P> {
  /// Create a navigator around an oracle that reports completions through
  /// [`complete_probe`](Self::complete_probe) or
  /// [`completion_sender`](Self::completion_sender).
  pub fn new(config: NavConfig, probe: P) -> Result<Self, ConfigError> {
    Self::with_probe(config, |_| probe)
  }

  /// Create a navigator whose oracle is built around the completion channel.
  pub fn with_probe(
    config: NavConfig,
    make_probe: impl FnOnce(Sender<ProbeCompletion>) -> P,
  ) -> Result<Self, ConfigError> {
    config.validate()?;

    let (completion_tx, completion_rx) = channel::unbounded();
    let probe = make_probe(completion_tx.clone());

    Ok(Self {
      queue: GenerationQueue::new(config.drain_order),
      config,
      grid: OccupancyGrid::new(),
      table: ProbeCorrelationTable::new(),
      probe,
      regions: RegionExpander::new(),
      paths: PathfindingEngine::new(),
      bus: NotificationBus::new(),
      completion_tx,
      completion_rx,
      metrics: NavMetrics::new(),
    })
  }

  // ===========================================================================
  // Requests
  // ===========================================================================

  /// Ask for every cell within `radius` of `center` to be classified.
  ///
  /// Expansion runs in the background; candidates reach the queue on a
  /// later tick. Cells outside the bounds are dropped silently at dispatch.
  /// Non-finite input and centers beyond the grid coordinate range are
  /// rejected; radii beyond [`MAX_GRID_RADIUS`] cells are clamped.
  pub fn request_region(&mut self, center: DVec3, radius: f64) -> Result<RegionRequestId, RegionError> {
    region_center(center, radius, self.config.voxel_size)?;
    let id = self
      .regions
      .spawn(center, radius, self.config.voxel_size, self.config.region_shape);
    tracing::debug!(request = id.raw(), ?center, radius, "region requested");
    Ok(id)
  }

  /// Start a search from `start` to `end` against the grid as it is now.
  ///
  /// The result is broadcast as [`NavEvent::PathResult`] during a later
  /// tick and also delivered through the returned ticket.
  pub fn find_path(&mut self, start: DVec3, end: DVec3, request_id: PathRequestId) -> PathTicket {
    let query = PathQuery {
      request_id,
      start,
      goal: end,
      voxel_size: self.config.voxel_size,
      max_iterations: self.config.max_path_iterations,
    };
    self.paths.spawn(self.grid.snapshot(), query)
  }

  /// Fresh request id for callers that do not allocate their own.
  pub fn next_request_id(&self) -> PathRequestId {
    PathRequestId::next()
  }

  // ===========================================================================
  // Completions
  // ===========================================================================

  /// Commit the answer to probe `handle` and publish the classification.
  ///
  /// Unknown handles (never issued or already resolved) are ignored.
  pub fn complete_probe(&mut self, handle: ProbeHandle, any_overlap: bool) -> Option<(GridCoord, Classification)> {
    self.apply_completion(ProbeCompletion {
      handle,
      any_overlap,
    })
  }

  /// Sender for oracles that answer from another thread.
  ///
  /// Completions sent here are committed at the next tick.
  pub fn completion_sender(&self) -> Sender<ProbeCompletion> {
    self.completion_tx.clone()
  }

  fn apply_completion(&mut self, completion: ProbeCompletion) -> Option<(GridCoord, Classification)> {
    let (coord, class) = resolve_completion(&mut self.table, &mut self.grid, completion)?;
    self.metrics.record_classification(class);
    self.bus.publish(NavEvent::VoxelClassified {
      coord,
      state: class.into(),
    });
    Some((coord, class))
  }

  // ===========================================================================
  // Tick
  // ===========================================================================

  /// Advance the pipeline by one step. Call once per frame from the thread
  /// that owns the navigator.
  #[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "navigator::tick"))]
  pub fn tick(&mut self) -> TickStats {
    let tick_start = Instant::now();
    let mut stats = TickStats::default();

    for finished in self.regions.poll() {
      stats.regions_merged += 1;
      self.metrics.record_expansion_timing(finished.timing_us);
      for coord in finished.coords {
        // Queue dedupes itself; grid and in-flight checks keep one probe per cell.
        if self.grid.contains(coord) || self.table.contains_coord(coord) {
          continue;
        }
        if self.queue.push(coord) {
          stats.candidates_enqueued += 1;
        }
      }
    }

    let pending: Vec<_> = self.completion_rx.try_iter().collect();
    for completion in pending {
      if self.apply_completion(completion).is_some() {
        stats.classified += 1;
      }
    }

    let dispatch = dispatch_batch(
      &mut self.queue,
      &self.grid,
      &mut self.table,
      &mut self.probe,
      &self.config,
    );
    stats.popped = dispatch.popped;
    stats.dispatched = dispatch.dispatched;
    stats.dropped_out_of_bounds = dispatch.out_of_bounds;
    stats.skipped = dispatch.skipped;
    self
      .metrics
      .record_dispatch(dispatch.dispatched, dispatch.out_of_bounds);

    for done in self.paths.poll() {
      self.metrics.record_search(done.result.status, done.timing_us);
      self.bus.publish(NavEvent::PathResult(done.result));
      stats.paths_delivered += 1;
    }

    self
      .metrics
      .record_tick_timing(tick_start.elapsed().as_micros() as u64);
    stats
  }

  // ===========================================================================
  // Introspection
  // ===========================================================================

  /// Listen for classification and path events.
  pub fn subscribe(&mut self) -> Receiver<NavEvent> {
    self.bus.subscribe()
  }

  pub fn grid(&self) -> &OccupancyGrid {
    &self.grid
  }

  /// Immutable view of the grid as it is now.
  pub fn snapshot(&self) -> GridSnapshot {
    self.grid.snapshot()
  }

  pub fn config(&self) -> &NavConfig {
    &self.config
  }

  pub fn probe(&self) -> &P {
    &self.probe
  }

  pub fn probe_mut(&mut self) -> &mut P {
    &mut self.probe
  }

  pub fn metrics(&self) -> &NavMetrics {
    &self.metrics
  }

  /// Coordinates waiting for dispatch.
  pub fn queue_len(&self) -> usize {
    self.queue.len()
  }

  /// Probes issued but not yet answered.
  pub fn outstanding_probes(&self) -> usize {
    self.table.len()
  }

  /// No background work, queued cells, outstanding probes or unread
  /// completions remain.
  pub fn is_idle(&self) -> bool {
    self.queue.is_empty()
      && self.table.is_empty()
      && self.completion_rx.is_empty()
      && !self.regions.is_busy()
      && !self.paths.is_busy()
  }
}

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;
