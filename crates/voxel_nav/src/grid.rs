//! OccupancyGrid - sparse classification map, plus read-only snapshots.
//!
//! Only the main thread writes. Searches running on worker threads read a
//! [`GridSnapshot`] taken when the search was requested; the grid is stored
//! behind an `Arc` and copied on the first write after a snapshot, so readers
//! never observe later commits.
//!
//! ```text
//! main thread:   commit ── commit ── snapshot ── commit (copy) ── commit
//!                                        │
//! worker thread:                         └─► search reads frozen map
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::coords::GridCoord;

/// Classification state of a cell.
///
/// `Unknown` is the implicit state of every coordinate absent from the grid
/// and is never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum VoxelState {
  #[default]
  Unknown,
  Free,
  Blocked,
}

impl VoxelState {
  /// Only `Free` cells can be traversed.
  #[inline]
  pub fn is_walkable(self) -> bool {
    self == VoxelState::Free
  }
}

/// A stored classification. Cannot express `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
  Free,
  Blocked,
}

impl Classification {
  /// Blocked if the probe reported any overlap, else Free.
  #[inline]
  pub fn from_overlap(any_overlap: bool) -> Self {
    if any_overlap {
      Classification::Blocked
    } else {
      Classification::Free
    }
  }
}

impl From<Classification> for VoxelState {
  fn from(c: Classification) -> Self {
    match c {
      Classification::Free => VoxelState::Free,
      Classification::Blocked => VoxelState::Blocked,
    }
  }
}

/// Rejected grid writes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
  #[error("cell {coord} is already classified as {existing:?}")]
  AlreadyClassified {
    coord: GridCoord,
    existing: Classification,
  },
}

/// Read access shared by the live grid and its snapshots.
pub trait OccupancyQuery {
  /// State of a cell; `Unknown` when absent.
  fn state(&self, coord: GridCoord) -> VoxelState;

  #[inline]
  fn is_walkable(&self, coord: GridCoord) -> bool {
    self.state(coord).is_walkable()
  }
}

fn lookup(cells: &HashMap<GridCoord, Classification>, coord: GridCoord) -> VoxelState {
  cells
    .get(&coord)
    .copied()
    .map(VoxelState::from)
    .unwrap_or(VoxelState::Unknown)
}

/// Sparse map from grid coordinate to classification.
///
/// Entries are written once and never change.
#[derive(Debug, Default)]
pub struct OccupancyGrid {
  cells: Arc<HashMap<GridCoord, Classification>>,
  version: u64,
  free: usize,
  blocked: usize,
}

impl OccupancyGrid {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store the classification of a previously unknown cell.
  pub fn commit(&mut self, coord: GridCoord, class: Classification) -> Result<(), GridError> {
    if let Some(&existing) = self.cells.get(&coord) {
      return Err(GridError::AlreadyClassified { coord, existing });
    }

    // Clones the map only if a snapshot still holds the previous version.
    Arc::make_mut(&mut self.cells).insert(coord, class);
    self.version += 1;
    match class {
      Classification::Free => self.free += 1,
      Classification::Blocked => self.blocked += 1,
    }
    Ok(())
  }

  /// True if the cell has been classified.
  #[inline]
  pub fn contains(&self, coord: GridCoord) -> bool {
    self.cells.contains_key(&coord)
  }

  /// Frozen view of the current contents.
  pub fn snapshot(&self) -> GridSnapshot {
    GridSnapshot {
      cells: Arc::clone(&self.cells),
      version: self.version,
    }
  }

  /// Incremented by every successful commit.
  pub fn version(&self) -> u64 {
    self.version
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn free_count(&self) -> usize {
    self.free
  }

  pub fn blocked_count(&self) -> usize {
    self.blocked
  }

  /// Iterate over classified cells (arbitrary order).
  pub fn iter(&self) -> impl Iterator<Item = (GridCoord, Classification)> + '_ {
    self.cells.iter().map(|(c, s)| (*c, *s))
  }
}

impl OccupancyQuery for OccupancyGrid {
  fn state(&self, coord: GridCoord) -> VoxelState {
    lookup(&self.cells, coord)
  }
}

/// Immutable, cheaply cloneable view of the grid at one version.
#[derive(Clone, Debug)]
pub struct GridSnapshot {
  cells: Arc<HashMap<GridCoord, Classification>>,
  version: u64,
}

impl GridSnapshot {
  /// Grid version this snapshot was taken at.
  pub fn version(&self) -> u64 {
    self.version
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }
}

impl OccupancyQuery for GridSnapshot {
  fn state(&self, coord: GridCoord) -> VoxelState {
    lookup(&self.cells, coord)
  }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;
