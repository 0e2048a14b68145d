//! GridCoord - integer voxel address, and world <-> grid mapping.
//!
//! The grid is axis aligned and anchored at the world origin. Cell `(x, y, z)`
//! spans `[x * voxel_size, (x + 1) * voxel_size)` on each axis.
//!
//! ```text
//! world_to_grid(p) = floor(p / voxel_size)
//! grid_to_world(c) = c * voxel_size + voxel_size / 2   (cell center)
//! ```

use glam::{DVec3, IVec3};
use smallvec::SmallVec;

/// Offsets of the six face neighbors (6-connectivity).
pub const FACE_OFFSETS: [(i32, i32, i32); 6] = [
  (1, 0, 0),  // +X
  (-1, 0, 0), // -X
  (0, 1, 0),  // +Y
  (0, -1, 0), // -Y
  (0, 0, 1),  // +Z
  (0, 0, -1), // -Z
];

/// Integer grid coordinate - immutable value type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct GridCoord {
  pub x: i32,
  pub y: i32,
  pub z: i32,
}

impl GridCoord {
  pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

  pub const fn new(x: i32, y: i32, z: i32) -> Self {
    Self { x, y, z }
  }

  /// Coordinate displaced by `(dx, dy, dz)`, or `None` past the i32 range.
  #[inline]
  pub fn checked_offset(&self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
    Some(Self {
      x: self.x.checked_add(dx)?,
      y: self.y.checked_add(dy)?,
      z: self.z.checked_add(dz)?,
    })
  }

  /// Face neighbors in `FACE_OFFSETS` order. Cells at the edge of the i32
  /// range have fewer than six.
  #[inline]
  pub fn face_neighbors(&self) -> SmallVec<[Self; 6]> {
    FACE_OFFSETS
      .iter()
      .filter_map(|&(dx, dy, dz)| self.checked_offset(dx, dy, dz))
      .collect()
  }

  /// Euclidean distance in grid units.
  #[inline]
  pub fn distance(&self, other: &Self) -> f64 {
    self.as_dvec3().distance(other.as_dvec3())
  }

  /// Sum of absolute per-axis differences.
  #[inline]
  pub fn manhattan(&self, other: &Self) -> u32 {
    self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
  }

  #[inline]
  pub fn as_dvec3(&self) -> DVec3 {
    DVec3::new(self.x as f64, self.y as f64, self.z as f64)
  }
}

impl From<IVec3> for GridCoord {
  fn from(v: IVec3) -> Self {
    Self::new(v.x, v.y, v.z)
  }
}

impl From<GridCoord> for IVec3 {
  fn from(c: GridCoord) -> Self {
    IVec3::new(c.x, c.y, c.z)
  }
}

impl std::fmt::Display for GridCoord {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "({}, {}, {})", self.x, self.y, self.z)
  }
}

/// Grid cell containing a world position.
///
/// Saturates at the i32 limits, so distinct far-away positions can share a
/// cell. Use [`try_world_to_grid`] where that matters.
#[inline]
pub fn world_to_grid(position: DVec3, voxel_size: f64) -> GridCoord {
  let cell = (position / voxel_size).floor();
  GridCoord::new(cell.x as i32, cell.y as i32, cell.z as i32)
}

/// Grid cell containing a world position, or `None` when the position is
/// not finite or its cell lies outside the i32 range.
#[inline]
pub fn try_world_to_grid(position: DVec3, voxel_size: f64) -> Option<GridCoord> {
  let cell = (position / voxel_size).floor();
  let in_range = |v: f64| v >= i32::MIN as f64 && v <= i32::MAX as f64;
  if !(in_range(cell.x) && in_range(cell.y) && in_range(cell.z)) {
    return None;
  }
  Some(world_to_grid(position, voxel_size))
}

/// World-space center of a grid cell.
#[inline]
pub fn grid_to_world(coord: GridCoord, voxel_size: f64) -> DVec3 {
  coord.as_dvec3() * voxel_size + DVec3::splat(voxel_size * 0.5)
}

#[cfg(test)]
#[path = "coords_test.rs"]
mod coords_test;
