//! Test utilities: scripted probe oracles and grid fixtures.

use crossbeam_channel::Sender;
use glam::DVec3;

use crate::coords::GridCoord;
use crate::generation::{ProbeCompletion, ProbeHandle, ProbeRequest, SpatialProbe};
use crate::grid::{Classification, OccupancyGrid};

// =============================================================================
// Probe oracles
// =============================================================================

/// Issues sequential handles and records every request. Completions are
/// delivered by the test.
#[derive(Default)]
pub struct RecordingProbe {
  next: u64,
  pub issued: Vec<(ProbeHandle, ProbeRequest)>,
}

impl RecordingProbe {
  pub fn new() -> Self {
    Self::default()
  }

  /// Handles issued so far, oldest first.
  pub fn handles(&self) -> Vec<ProbeHandle> {
    self.issued.iter().map(|(h, _)| *h).collect()
  }
}

impl SpatialProbe for RecordingProbe {
  fn probe(&mut self, request: ProbeRequest) -> ProbeHandle {
    let handle = ProbeHandle::new(self.next);
    self.next += 1;
    self.issued.push((handle, request));
    handle
  }
}

/// Answers every probe immediately through a completion channel, using an
/// obstacle predicate over the probe center.
pub struct ScriptedProbe<F> {
  next: u64,
  sender: Sender<ProbeCompletion>,
  is_obstacle: F,
  pub probes_issued: usize,
}

impl<F: FnMut(DVec3) -> bool> ScriptedProbe<F> {
  pub fn new(sender: Sender<ProbeCompletion>, is_obstacle: F) -> Self {
    Self {
      next: 0,
      sender,
      is_obstacle,
      probes_issued: 0,
    }
  }
}

impl<F: FnMut(DVec3) -> bool> SpatialProbe for ScriptedProbe<F> {
  fn probe(&mut self, request: ProbeRequest) -> ProbeHandle {
    let handle = ProbeHandle::new(self.next);
    self.next += 1;
    self.probes_issued += 1;
    let any_overlap = (self.is_obstacle)(request.center);
    self
      .sender
      .send(ProbeCompletion {
        handle,
        any_overlap,
      })
      .expect("navigator dropped its completion receiver");
    handle
  }
}

// =============================================================================
// Grid fixtures
// =============================================================================

/// Grid with every cell of the inclusive box classified Free.
pub fn free_box(min: GridCoord, max: GridCoord) -> OccupancyGrid {
  let mut grid = OccupancyGrid::new();
  fill_box(&mut grid, min, max, Classification::Free);
  grid
}

/// Classify every still-unknown cell of the inclusive box.
pub fn fill_box(grid: &mut OccupancyGrid, min: GridCoord, max: GridCoord, class: Classification) {
  for x in min.x..=max.x {
    for y in min.y..=max.y {
      for z in min.z..=max.z {
        let _ = grid.commit(GridCoord::new(x, y, z), class);
      }
    }
  }
}

/// Free cell whose six face neighbors are all Blocked.
pub fn walled_cell(grid: &mut OccupancyGrid, center: GridCoord) {
  grid.commit(center, Classification::Free).ok();
  for n in center.face_neighbors() {
    grid.commit(n, Classification::Blocked).ok();
  }
}
