//! Path request and result types.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::DVec3;
use thiserror::Error;

use crate::coords::GridCoord;
use crate::grid::VoxelState;

/// Caller-chosen token attached to a search and echoed in its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathRequestId(u64);

impl PathRequestId {
  pub const fn new(raw: u64) -> Self {
    Self(raw)
  }

  /// Fresh id from a process-wide counter.
  pub fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(1 << 32);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  pub fn raw(&self) -> u64 {
    self.0
  }
}

/// How a search ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathStatus {
  /// Goal reached; waypoints are populated.
  Found,
  /// Start cell is unknown or blocked; no search was attempted.
  InvalidStart { state: VoxelState },
  /// Every reachable cell was expanded without meeting the goal.
  Unreachable,
  /// Expansion count hit the configured ceiling.
  IterationLimit,
}

/// Failed searches, for callers that prefer `Result`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
  #[error("start cell {coord} is not walkable ({state:?})")]
  InvalidStart { coord: GridCoord, state: VoxelState },
  #[error("goal unreachable after expanding {expanded} cells")]
  Unreachable { expanded: usize },
  #[error("search stopped at the iteration limit of {limit}")]
  IterationLimit { limit: usize },
}

/// Outcome of one path search.
///
/// `waypoints` is empty unless `status` is `Found`. The first waypoint is the
/// exact requested start position; the rest are voxel centers.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
  pub request_id: PathRequestId,
  pub status: PathStatus,
  pub waypoints: Vec<DVec3>,
  pub start: GridCoord,
  pub goal: GridCoord,
  /// Nodes expanded by the search.
  pub expanded: usize,
  /// Expansion ceiling the search ran under.
  pub max_iterations: usize,
}

impl PathResult {
  pub fn is_found(&self) -> bool {
    self.status == PathStatus::Found
  }

  /// Waypoints on success, the failure kind otherwise.
  pub fn into_result(self) -> Result<Vec<DVec3>, PathError> {
    match self.status {
      PathStatus::Found => Ok(self.waypoints),
      PathStatus::InvalidStart { state } => Err(PathError::InvalidStart {
        coord: self.start,
        state,
      }),
      PathStatus::Unreachable => Err(PathError::Unreachable {
        expanded: self.expanded,
      }),
      PathStatus::IterationLimit => Err(PathError::IterationLimit {
        limit: self.max_iterations,
      }),
    }
  }
}
