//! Spatial probe oracle contract and handle correlation.
//!
//! The navigator asks an external collaborator whether anything overlaps a
//! world-space box. The oracle answers later, on the main thread, with the
//! handle it returned and a single "any overlap" flag. Nothing here knows
//! how the collision world is represented.

use std::collections::HashMap;

use glam::DVec3;
use thiserror::Error;

use crate::coords::GridCoord;

/// Opaque handle identifying one outstanding probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProbeHandle(u64);

impl ProbeHandle {
  pub const fn new(raw: u64) -> Self {
    Self(raw)
  }

  pub fn raw(&self) -> u64 {
    self.0
  }
}

/// Box overlap query for one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeRequest {
  /// Cell center in world space.
  pub center: DVec3,
  /// Half extents, slightly smaller than half a voxel.
  pub half_extents: DVec3,
}

/// Result reported by the oracle for a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeCompletion {
  pub handle: ProbeHandle,
  pub any_overlap: bool,
}

/// External overlap oracle.
///
/// `probe` must not block; the answer is delivered afterwards through
/// `VoxelNavigator::complete_probe` or the navigator's completion sender.
/// Handles must be unique among outstanding probes. If one is reused, both
/// probes sharing it are discarded and their cells stay unknown.
pub trait SpatialProbe {
  fn probe(&mut self, request: ProbeRequest) -> ProbeHandle;
}

impl<P: SpatialProbe + ?Sized> SpatialProbe for Box<P> {
  fn probe(&mut self, request: ProbeRequest) -> ProbeHandle {
    (**self).probe(request)
  }
}

/// Rejected correlation inserts.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationError {
  #[error("probe handle {0:?} is already outstanding")]
  DuplicateHandle(ProbeHandle),
  #[error("cell {0} already has an outstanding probe")]
  CoordinateInFlight(GridCoord),
}

/// Bijective map between outstanding probe handles and the cells they
/// classify. An entry exists exactly while its probe is outstanding.
///
/// Handles the oracle issued more than once are ambiguous: their
/// completions cannot be told apart, so they are counted down and dropped.
#[derive(Debug, Default)]
pub struct ProbeCorrelationTable {
  by_handle: HashMap<ProbeHandle, GridCoord>,
  by_coord: HashMap<GridCoord, ProbeHandle>,
  discarded: HashMap<ProbeHandle, usize>,
}

impl ProbeCorrelationTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a freshly issued probe.
  pub fn insert(&mut self, handle: ProbeHandle, coord: GridCoord) -> Result<(), CorrelationError> {
    if self.by_handle.contains_key(&handle) {
      return Err(CorrelationError::DuplicateHandle(handle));
    }
    if self.by_coord.contains_key(&coord) {
      return Err(CorrelationError::CoordinateInFlight(coord));
    }
    self.by_handle.insert(handle, coord);
    self.by_coord.insert(coord, handle);
    Ok(())
  }

  /// Remove and return the cell for a handle. `None` if unknown, already
  /// resolved, or discarded.
  pub fn resolve(&mut self, handle: ProbeHandle) -> Option<GridCoord> {
    if let Some(pending) = self.discarded.get_mut(&handle) {
      *pending -= 1;
      if *pending == 0 {
        self.discarded.remove(&handle);
      }
      return None;
    }
    let coord = self.by_handle.remove(&handle)?;
    self.by_coord.remove(&coord);
    Some(coord)
  }

  /// Mark `handle` as issued once more while already outstanding.
  ///
  /// The cell previously bound to it is released (returned) and every
  /// completion still expected for the handle is ignored.
  pub fn discard(&mut self, handle: ProbeHandle) -> Option<GridCoord> {
    let released = self.by_handle.remove(&handle);
    if let Some(coord) = released {
      self.by_coord.remove(&coord);
    }
    let expected = 1 + usize::from(released.is_some());
    *self.discarded.entry(handle).or_insert(0) += expected;
    released
  }

  #[inline]
  pub fn is_discarded(&self, handle: ProbeHandle) -> bool {
    self.discarded.contains_key(&handle)
  }

  #[inline]
  pub fn contains_coord(&self, coord: GridCoord) -> bool {
    self.by_coord.contains_key(&coord)
  }

  #[inline]
  pub fn contains_handle(&self, handle: ProbeHandle) -> bool {
    self.by_handle.contains_key(&handle)
  }

  /// Number of outstanding probes, discarded ones included.
  pub fn len(&self) -> usize {
    self.by_handle.len() + self.discarded.values().sum::<usize>()
  }

  pub fn is_empty(&self) -> bool {
    self.by_handle.is_empty() && self.discarded.is_empty()
  }
}
