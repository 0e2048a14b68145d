//! A* over the 6-connected occupancy grid.
//!
//! Unit edge cost, Euclidean heuristic in grid units (admissible and
//! consistent for unit steps). The open set is a binary heap ordered by
//! total cost, then heuristic, then discovery order, so equal-cost ties
//! resolve the same way on every run.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use glam::DVec3;

use super::types::{PathRequestId, PathResult, PathStatus};
use crate::coords::{grid_to_world, try_world_to_grid, world_to_grid, GridCoord};
use crate::grid::{OccupancyQuery, VoxelState};

/// Progress is logged every this many expansions.
const PROGRESS_INTERVAL: usize = 500;

/// Inputs for one search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathQuery {
  pub request_id: PathRequestId,
  /// Exact world start; becomes the first waypoint.
  pub start: DVec3,
  pub goal: DVec3,
  pub voxel_size: f64,
  pub max_iterations: usize,
}

/// Best known route to a cell. Lives for one search only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathNode {
  pub coord: GridCoord,
  pub parent: GridCoord,
  pub g_cost: f64,
  pub h_cost: f64,
}

impl PathNode {
  #[inline]
  pub fn f_cost(&self) -> f64 {
    self.g_cost + self.h_cost
  }
}

/// Heap entry. Ordered so `BinaryHeap` (a max-heap) pops the lowest cost.
#[derive(Clone, Copy, Debug)]
struct OpenEntry {
  f: f64,
  h: f64,
  seq: u64,
  coord: GridCoord,
}

impl Ord for OpenEntry {
  fn cmp(&self, other: &Self) -> Ordering {
    other
      .f
      .total_cmp(&self.f)
      .then_with(|| other.h.total_cmp(&self.h))
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

impl PartialOrd for OpenEntry {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl PartialEq for OpenEntry {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for OpenEntry {}

/// Run A* from `query.start` to `query.goal` on `grid`.
///
/// Never mutates the grid. Always returns a result carrying the request id,
/// whatever the outcome.
#[cfg_attr(
  feature = "profiling",
  tracing::instrument(skip_all, name = "path::search", fields(request = query.request_id.raw()))
)]
pub fn search<G: OccupancyQuery + ?Sized>(grid: &G, query: &PathQuery) -> PathResult {
  let start = world_to_grid(query.start, query.voxel_size);
  let goal = world_to_grid(query.goal, query.voxel_size);

  let finish = |status: PathStatus, waypoints: Vec<DVec3>, expanded: usize| PathResult {
    request_id: query.request_id,
    status,
    waypoints,
    start,
    goal,
    expanded,
    max_iterations: query.max_iterations,
  };

  // A start past the coordinate range would alias a saturated edge cell.
  let start_state = match try_world_to_grid(query.start, query.voxel_size) {
    Some(cell) => grid.state(cell),
    None => VoxelState::Unknown,
  };
  if !start_state.is_walkable() {
    tracing::warn!(%start, state = ?start_state, "start cell not walkable, search aborted");
    return finish(PathStatus::InvalidStart { state: start_state }, Vec::new(), 0);
  }

  tracing::debug!(%start, %goal, "searching");

  let mut nodes: HashMap<GridCoord, PathNode> = HashMap::new();
  let mut closed: HashSet<GridCoord> = HashSet::new();
  let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
  let mut seq = 0u64;

  let h = start.distance(&goal);
  nodes.insert(
    start,
    PathNode {
      coord: start,
      parent: start,
      g_cost: 0.0,
      h_cost: h,
    },
  );
  open.push(OpenEntry {
    f: h,
    h,
    seq,
    coord: start,
  });

  let mut expanded = 0usize;

  while expanded < query.max_iterations {
    let Some(entry) = open.pop() else {
      tracing::warn!(%start, %goal, expanded, "open set exhausted, goal unreachable");
      return finish(PathStatus::Unreachable, Vec::new(), expanded);
    };

    // Superseded by a cheaper entry for the same cell.
    if closed.contains(&entry.coord) {
      continue;
    }

    expanded += 1;

    if entry.coord == goal {
      tracing::debug!(expanded, "goal reached");
      let waypoints = reconstruct(&nodes, start, goal, query);
      return finish(PathStatus::Found, waypoints, expanded);
    }

    closed.insert(entry.coord);

    if expanded % PROGRESS_INTERVAL == 0 {
      tracing::trace!(expanded, open = open.len(), current = %entry.coord, "search progress");
    }

    let Some(g) = nodes.get(&entry.coord).map(|n| n.g_cost) else {
      continue;
    };

    for next in entry.coord.face_neighbors() {
      if closed.contains(&next) || !grid.is_walkable(next) {
        continue;
      }

      let new_g = g + 1.0;
      let improves = nodes.get(&next).map_or(true, |n| new_g < n.g_cost);
      if !improves {
        continue;
      }

      let h = next.distance(&goal);
      nodes.insert(
        next,
        PathNode {
          coord: next,
          parent: entry.coord,
          g_cost: new_g,
          h_cost: h,
        },
      );
      seq += 1;
      open.push(OpenEntry {
        f: new_g + h,
        h,
        seq,
        coord: next,
      });
    }
  }

  tracing::warn!(%start, %goal, limit = query.max_iterations, "iteration limit reached");
  finish(PathStatus::IterationLimit, Vec::new(), expanded)
}

/// Walk parent links back from the goal and convert to world space.
fn reconstruct(
  nodes: &HashMap<GridCoord, PathNode>,
  start: GridCoord,
  goal: GridCoord,
  query: &PathQuery,
) -> Vec<DVec3> {
  let mut cells = vec![goal];
  let mut current = goal;
  while current != start {
    let Some(node) = nodes.get(&current) else {
      break;
    };
    current = node.parent;
    cells.push(current);
  }
  cells.reverse();

  let mut waypoints: Vec<DVec3> = cells
    .into_iter()
    .map(|c| grid_to_world(c, query.voxel_size))
    .collect();
  // The start is reported exactly as requested, not snapped to its cell.
  waypoints[0] = query.start;
  waypoints
}

#[cfg(test)]
#[path = "astar_test.rs"]
mod astar_test;
