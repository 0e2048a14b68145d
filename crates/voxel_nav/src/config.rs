//! NavConfig - settings consumed by the generation pipeline and path search.
//!
//! The navigator only reads these values. Where they come from (project
//! settings, files, editor UI) is up to the host.

use glam::DVec3;
use thiserror::Error;

use crate::bounds::DAabb3;
use crate::generation::{DrainOrder, RegionShape};

/// Default probe box scale relative to the half voxel.
///
/// A box slightly smaller than the cell keeps obstacles that only touch a
/// shared face from marking both neighbors as blocked.
pub const DEFAULT_PROBE_SHRINK: f64 = 0.9;

/// Invalid configuration values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
  #[error("voxel size must be finite and positive, got {0}")]
  VoxelSize(f64),
  #[error("max_region_requests_per_tick must be at least 1")]
  ZeroRequestsPerTick,
  #[error("max_path_iterations must be at least 1")]
  ZeroPathIterations,
  #[error("bounds min {min} exceeds max {max}")]
  InvertedBounds { min: DVec3, max: DVec3 },
  #[error("probe shrink must be in (0, 1], got {0}")]
  ProbeShrink(f64),
}

/// Configuration for grid generation and pathfinding.
#[derive(Clone, Debug, PartialEq)]
pub struct NavConfig {
  /// Edge length of one voxel in world units.
  pub voxel_size: f64,

  /// Maximum coordinates popped from the generation queue per tick.
  pub max_region_requests_per_tick: usize,

  /// A* gives up after this many node expansions.
  pub max_path_iterations: usize,

  /// Cells whose center falls outside are never classified.
  pub bounds: DAabb3,

  /// Probe half extents = `voxel_size / 2 * probe_shrink`.
  pub probe_shrink: f64,

  /// Order in which queued coordinates are dispatched.
  pub drain_order: DrainOrder,

  /// Inclusion test used by region expansion.
  pub region_shape: RegionShape,
}

impl NavConfig {
  /// Defaults matching the stock project settings.
  pub const DEFAULT: Self = Self {
    voxel_size: 100.0,
    max_region_requests_per_tick: 5,
    max_path_iterations: 300_000,
    bounds: DAabb3 {
      min: DVec3::new(-5000.0, -5000.0, -1000.0),
      max: DVec3::new(5000.0, 5000.0, 1000.0),
    },
    probe_shrink: DEFAULT_PROBE_SHRINK,
    drain_order: DrainOrder::Lifo,
    region_shape: RegionShape::Sphere,
  };

  /// No bounds and a large per-tick cap. For tests and offline baking.
  pub const UNBOUNDED: Self = Self {
    max_region_requests_per_tick: 4096,
    bounds: DAabb3::EVERYTHING,
    ..Self::DEFAULT
  };

  /// Check every field, returning the first problem found.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !self.voxel_size.is_finite() || self.voxel_size <= 0.0 {
      return Err(ConfigError::VoxelSize(self.voxel_size));
    }
    if self.max_region_requests_per_tick == 0 {
      return Err(ConfigError::ZeroRequestsPerTick);
    }
    if self.max_path_iterations == 0 {
      return Err(ConfigError::ZeroPathIterations);
    }
    if !self.bounds.is_valid() {
      return Err(ConfigError::InvertedBounds {
        min: self.bounds.min,
        max: self.bounds.max,
      });
    }
    if !(self.probe_shrink > 0.0 && self.probe_shrink <= 1.0) {
      return Err(ConfigError::ProbeShrink(self.probe_shrink));
    }
    Ok(())
  }

  /// Half extents of the probe box for one cell.
  #[inline]
  pub fn probe_half_extents(&self) -> DVec3 {
    DVec3::splat(self.voxel_size * 0.5 * self.probe_shrink)
  }
}

impl Default for NavConfig {
  fn default() -> Self {
    Self::DEFAULT
  }
}
