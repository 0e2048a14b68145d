//! Dispatcher - drains a bounded batch of the generation queue per tick and
//! turns each coordinate into a spatial probe; resolves probe completions
//! into grid commits.
//!
//! Main thread only. The per-tick cap bounds how fast outstanding probes
//! can grow, independent of how many candidates region requests produce.

use crate::config::NavConfig;
use crate::coords::{grid_to_world, GridCoord};
use crate::grid::{Classification, OccupancyGrid};

use super::probe::{CorrelationError, ProbeCompletion, ProbeCorrelationTable, ProbeRequest, SpatialProbe};
use super::queue::GenerationQueue;

/// Counters from one dispatch pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
  /// Coordinates removed from the queue (never more than the cap).
  pub popped: usize,
  /// Probes issued.
  pub dispatched: usize,
  /// Popped coordinates that were already classified or in flight.
  pub skipped: usize,
  /// Popped coordinates outside the bounding volume, dropped for good.
  pub out_of_bounds: usize,
  /// Probes whose handle could not be correlated. A reused handle also
  /// releases the cell that held it, possibly from an earlier pass.
  pub rejected: usize,
}

/// Pop up to `max_region_requests_per_tick` coordinates and probe them.
pub fn dispatch_batch<P: SpatialProbe + ?Sized>(
  queue: &mut GenerationQueue,
  grid: &OccupancyGrid,
  table: &mut ProbeCorrelationTable,
  probe: &mut P,
  config: &NavConfig,
) -> DispatchStats {
  let mut stats = DispatchStats::default();
  let half_extents = config.probe_half_extents();

  while stats.popped < config.max_region_requests_per_tick {
    let Some(coord) = queue.pop() else {
      break;
    };
    stats.popped += 1;

    if grid.contains(coord) || table.contains_coord(coord) {
      stats.skipped += 1;
      continue;
    }

    let center = grid_to_world(coord, config.voxel_size);
    if !config.bounds.contains_point(center) {
      stats.out_of_bounds += 1;
      continue;
    }

    let handle = probe.probe(ProbeRequest {
      center,
      half_extents,
    });

    match table.insert(handle, coord) {
      Ok(()) => stats.dispatched += 1,
      Err(CorrelationError::DuplicateHandle(_)) => {
        // Both completions will carry this handle; neither can be trusted.
        let released = table.discard(handle);
        tracing::warn!(%coord, handle = handle.raw(), ?released, "probe handle reused, both probes discarded");
        stats.rejected += 1;
      }
      Err(err) => {
        tracing::warn!(%coord, %err, "probe not correlated, cell left unknown");
        stats.rejected += 1;
      }
    }
  }

  if stats.popped > 0 {
    tracing::debug!(
      popped = stats.popped,
      dispatched = stats.dispatched,
      out_of_bounds = stats.out_of_bounds,
      remaining = queue.len(),
      outstanding = table.len(),
      "dispatched probe batch"
    );
  }

  stats
}

/// Commit the outcome of a finished probe.
///
/// Returns the classified cell, or `None` when the handle is unknown
/// (already resolved or never issued).
pub fn resolve_completion(
  table: &mut ProbeCorrelationTable,
  grid: &mut OccupancyGrid,
  completion: ProbeCompletion,
) -> Option<(GridCoord, Classification)> {
  if table.is_discarded(completion.handle) {
    table.resolve(completion.handle);
    tracing::debug!(handle = completion.handle.raw(), "completion for discarded probe handle ignored");
    return None;
  }
  let Some(coord) = table.resolve(completion.handle) else {
    tracing::warn!(handle = completion.handle.raw(), "completion for unknown probe handle");
    return None;
  };

  let class = Classification::from_overlap(completion.any_overlap);
  match grid.commit(coord, class) {
    Ok(()) => Some((coord, class)),
    Err(err) => {
      tracing::warn!(%err, "probe completion ignored");
      None
    }
  }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;
