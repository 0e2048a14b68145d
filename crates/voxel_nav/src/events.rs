//! NotificationBus - broadcast of classification and path events.
//!
//! Every subscriber receives every event. Path results are not routed to
//! the caller that asked for them; listeners filter `PathResult` events by
//! the request id they supplied (or hold the `PathTicket` instead).
//!
//! Publication happens on the main thread inside `tick()` and
//! `complete_probe()`. Subscribers drain their receiver whenever they like;
//! the channels are unbounded, so a subscriber that never drains grows its
//! backlog. Dropping the receiver unsubscribes.

use crossbeam_channel::{self as channel, Receiver, Sender};
use smallvec::SmallVec;

use crate::coords::GridCoord;
use crate::grid::VoxelState;
use crate::path::PathResult;

/// Event published by the navigator.
#[derive(Clone, Debug, PartialEq)]
pub enum NavEvent {
  /// A cell received its final classification.
  VoxelClassified { coord: GridCoord, state: VoxelState },
  /// A search finished, whatever the outcome.
  PathResult(PathResult),
}

/// Fan-out of [`NavEvent`]s to any number of listeners.
#[derive(Default)]
pub struct NotificationBus {
  subscribers: SmallVec<[Sender<NavEvent>; 4]>,
}

impl NotificationBus {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a listener. Events published before this call are not replayed.
  pub fn subscribe(&mut self) -> Receiver<NavEvent> {
    let (sender, receiver) = channel::unbounded();
    self.subscribers.push(sender);
    receiver
  }

  /// Deliver `event` to every live subscriber, pruning dropped ones.
  pub fn publish(&mut self, event: NavEvent) {
    self
      .subscribers
      .retain(|subscriber| subscriber.send(event.clone()).is_ok());
  }

  pub fn subscriber_count(&self) -> usize {
    self.subscribers.len()
  }
}
