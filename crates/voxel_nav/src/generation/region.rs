//! Region expansion - turn "classify everything within r of p" into a list
//! of candidate cells, off the main thread.
//!
//! # Flow
//!
//! ```text
//! Main Thread                       Async (rayon)
//! ┌────────────────┐
//! │ request_region │
//! └───────┬────────┘
//!         │ spawn()
//!         ▼
//!                                  ┌───────────────────┐
//!                                  │ expand_region()   │
//!                                  │ [-R, R]^3 scan +  │
//!                                  │ inclusion test    │
//!                                  └─────────┬─────────┘
//!                                            │ channel
//! ┌────────────────┐                         │
//! │ poll()         │◄────────────────────────┘
//! │ filter + queue │
//! └────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{self as channel, Receiver, Sender};
use glam::DVec3;
use thiserror::Error;
use web_time::Instant;

use crate::coords::{try_world_to_grid, GridCoord};

/// Largest grid radius a single request expands to. Larger radii are
/// clamped; the `[-R, R]^3` scan grows with the cube of R.
pub const MAX_GRID_RADIUS: i32 = 64;

/// Region requests that cannot be expanded.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum RegionError {
  #[error("region center {0} is not finite")]
  NonFiniteCenter(DVec3),
  #[error("region radius {0} is not finite")]
  NonFiniteRadius(f64),
  #[error("region center {0} maps outside the grid coordinate range")]
  CenterOutOfRange(DVec3),
}

/// Inclusion test applied to each offset of the `[-R, R]^3` cube.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegionShape {
  /// `x² + y² + z² <= R²`.
  #[default]
  Sphere,
  /// `x² + y²·z² <= R²`.
  ///
  /// Reproduces the selection of earlier versions of this system. The
  /// cross term makes the region anisotropic: the whole `y = 0` and `z = 0`
  /// planes pass as long as `|x| <= R`, while cells off both planes thin out
  /// quickly. Kept for hosts that depend on that footprint.
  LegacyCrossTerm,
}

impl RegionShape {
  /// Whether offset `(x, y, z)` belongs to a region of grid radius `r`.
  #[inline]
  pub fn includes(self, x: i32, y: i32, z: i32, r: i32) -> bool {
    let (x, y, z, r) = (x as i64, y as i64, z as i64, r as i64);
    let lhs = match self {
      RegionShape::Sphere => x * x + y * y + z * z,
      RegionShape::LegacyCrossTerm => x * x + y * y * z * z,
    };
    lhs <= r * r
  }
}

/// Grid radius covering a world radius: `ceil(radius / voxel_size)`.
#[inline]
pub fn grid_radius(radius: f64, voxel_size: f64) -> i32 {
  (radius / voxel_size).ceil() as i32
}

/// Check that a region can be expanded, returning its center cell.
pub fn region_center(center: DVec3, radius: f64, voxel_size: f64) -> Result<GridCoord, RegionError> {
  if !center.is_finite() {
    return Err(RegionError::NonFiniteCenter(center));
  }
  if !radius.is_finite() {
    return Err(RegionError::NonFiniteRadius(radius));
  }
  try_world_to_grid(center, voxel_size).ok_or(RegionError::CenterOutOfRange(center))
}

/// Enumerate every cell of a region around `center`.
///
/// Output order is x-major over the offset cube, which fixes the order in
/// which candidates reach the generation queue. Invalid requests expand to
/// nothing; cells past the i32 range are left out.
#[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "region::expand"))]
pub fn expand_region(center: DVec3, radius: f64, voxel_size: f64, shape: RegionShape) -> Vec<GridCoord> {
  let center_cell = match region_center(center, radius, voxel_size) {
    Ok(cell) => cell,
    Err(err) => {
      tracing::warn!(%err, "region not expanded");
      return Vec::new();
    }
  };

  let requested = grid_radius(radius, voxel_size);
  if requested < 0 {
    return Vec::new();
  }
  let r = requested.min(MAX_GRID_RADIUS);
  if r < requested {
    tracing::warn!(requested, clamped = r, "region radius clamped");
  }

  let side = (2 * r as usize) + 1;
  let mut coords = Vec::with_capacity(side.saturating_pow(3).min(1 << 20));

  for x in -r..=r {
    for y in -r..=r {
      for z in -r..=r {
        if !shape.includes(x, y, z, r) {
          continue;
        }
        if let Some(coord) = center_cell.checked_offset(x, y, z) {
          coords.push(coord);
        }
      }
    }
  }

  tracing::debug!(center = %center_cell, grid_radius = r, candidates = coords.len(), "expanded region");
  coords
}

/// Identifier of one region request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionRequestId(u64);

impl RegionRequestId {
  fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  pub fn raw(&self) -> u64 {
    self.0
  }
}

/// Candidate cells produced by one finished expansion.
#[derive(Debug)]
pub struct RegionCandidates {
  pub id: RegionRequestId,
  pub coords: Vec<GridCoord>,
  /// Wall time spent expanding, in microseconds.
  pub timing_us: u64,
}

/// Runs region expansions on rayon's pool and hands results back through
/// a channel the main thread drains each tick.
pub struct RegionExpander {
  sender: Sender<RegionCandidates>,
  receiver: Receiver<RegionCandidates>,
  in_flight: usize,
}

impl RegionExpander {
  pub fn new() -> Self {
    let (sender, receiver) = channel::unbounded();
    Self {
      sender,
      receiver,
      in_flight: 0,
    }
  }

  /// Start an expansion (non-blocking).
  pub fn spawn(&mut self, center: DVec3, radius: f64, voxel_size: f64, shape: RegionShape) -> RegionRequestId {
    let id = RegionRequestId::next();
    let sender = self.sender.clone();
    self.in_flight += 1;

    rayon::spawn(move || {
      let start = Instant::now();
      let coords = expand_region(center, radius, voxel_size, shape);
      let timing_us = start.elapsed().as_micros() as u64;
      // Receiver lives as long as the expander; a dropped expander discards.
      let _ = sender.send(RegionCandidates { id, coords, timing_us });
    });

    id
  }

  /// Collect every finished expansion (non-blocking).
  pub fn poll(&mut self) -> Vec<RegionCandidates> {
    let finished: Vec<_> = self.receiver.try_iter().collect();
    self.in_flight -= finished.len();
    finished
  }

  /// Expansions started but not yet collected.
  pub fn in_flight(&self) -> usize {
    self.in_flight
  }

  pub fn is_busy(&self) -> bool {
    self.in_flight > 0
  }
}

impl Default for RegionExpander {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
#[path = "region_test.rs"]
mod region_test;
