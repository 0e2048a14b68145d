//! GenerationQueue - coordinates waiting for a probe.
//!
//! Each coordinate is present at most once. Draining is LIFO by default
//! (most recently enqueued first); FIFO is available when callers want the
//! first-requested cells classified first under partial drains.

use std::collections::{HashSet, VecDeque};

use crate::coords::GridCoord;

/// Order in which queued coordinates leave the queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrainOrder {
  /// Most recently enqueued first.
  #[default]
  Lifo,
  /// Oldest first.
  Fifo,
}

/// Deduplicated pending-classification queue. Main thread only.
#[derive(Debug, Default)]
pub struct GenerationQueue {
  items: VecDeque<GridCoord>,
  members: HashSet<GridCoord>,
  order: DrainOrder,
}

impl GenerationQueue {
  pub fn new(order: DrainOrder) -> Self {
    Self {
      items: VecDeque::new(),
      members: HashSet::new(),
      order,
    }
  }

  /// Enqueue a coordinate. Returns `false` if it is already queued.
  pub fn push(&mut self, coord: GridCoord) -> bool {
    if !self.members.insert(coord) {
      return false;
    }
    self.items.push_back(coord);
    true
  }

  /// Remove the next coordinate according to the drain order.
  pub fn pop(&mut self) -> Option<GridCoord> {
    let coord = match self.order {
      DrainOrder::Lifo => self.items.pop_back(),
      DrainOrder::Fifo => self.items.pop_front(),
    }?;
    self.members.remove(&coord);
    Some(coord)
  }

  #[inline]
  pub fn contains(&self, coord: GridCoord) -> bool {
    self.members.contains(&coord)
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn order(&self) -> DrainOrder {
    self.order
  }

  /// Drop everything still waiting.
  pub fn clear(&mut self) {
    self.items.clear();
    self.members.clear();
  }
}
