//! PathfindingEngine - runs A* searches on rayon's pool.
//!
//! Each search gets an immutable [`GridSnapshot`] captured when it was
//! requested, so the main thread keeps committing classifications while
//! searches run. Results travel back two ways:
//!
//! - the per-call [`PathTicket`] (one-shot channel) returned to the caller
//! - a shared completion channel the main thread drains in `poll()` before
//!   broadcasting `PathResult` events
//!
//! There is no cancellation: a search runs until it finds the goal, empties
//! its open set, or reaches the iteration ceiling.

use std::time::Duration;

use crossbeam_channel::{self as channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use web_time::Instant;

use super::astar::{search, PathQuery};
use super::types::{PathRequestId, PathResult};
use crate::grid::GridSnapshot;

/// Completion handle for one search.
///
/// Dropping the ticket does not stop the search; its result is still
/// broadcast.
pub struct PathTicket {
  request_id: PathRequestId,
  receiver: Receiver<PathResult>,
}

impl PathTicket {
  pub fn request_id(&self) -> PathRequestId {
    self.request_id
  }

  /// Non-blocking check for the result.
  pub fn try_recv(&self) -> Option<PathResult> {
    match self.receiver.try_recv() {
      Ok(result) => Some(result),
      Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
    }
  }

  /// Block until the search finishes.
  pub fn wait(self) -> Option<PathResult> {
    self.receiver.recv().ok()
  }

  /// Block for at most `timeout`.
  pub fn wait_timeout(&self, timeout: Duration) -> Option<PathResult> {
    match self.receiver.recv_timeout(timeout) {
      Ok(result) => Some(result),
      Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
    }
  }
}

/// A finished search as seen by the main thread.
#[derive(Clone, Debug)]
pub struct SearchCompletion {
  pub result: PathResult,
  /// Wall time spent in the search, in microseconds.
  pub timing_us: u64,
}

/// Background A* executor.
pub struct PathfindingEngine {
  completed_tx: Sender<SearchCompletion>,
  completed_rx: Receiver<SearchCompletion>,
  in_flight: usize,
}

impl PathfindingEngine {
  pub fn new() -> Self {
    let (completed_tx, completed_rx) = channel::unbounded();
    Self {
      completed_tx,
      completed_rx,
      in_flight: 0,
    }
  }

  /// Start a search against `snapshot` (non-blocking).
  pub fn spawn(&mut self, snapshot: GridSnapshot, query: PathQuery) -> PathTicket {
    let (ticket_tx, ticket_rx) = channel::bounded(1);
    let completed_tx = self.completed_tx.clone();
    self.in_flight += 1;

    rayon::spawn(move || {
      let start = Instant::now();
      let result = search(&snapshot, &query);
      let timing_us = start.elapsed().as_micros() as u64;
      // Either receiver may be gone; the other still gets the result.
      let _ = ticket_tx.send(result.clone());
      let _ = completed_tx.send(SearchCompletion { result, timing_us });
    });

    PathTicket {
      request_id: query.request_id,
      receiver: ticket_rx,
    }
  }

  /// Drain finished searches (non-blocking). Call from the main thread.
  pub fn poll(&mut self) -> Vec<SearchCompletion> {
    let finished: Vec<_> = self.completed_rx.try_iter().collect();
    self.in_flight -= finished.len();
    finished
  }

  /// Searches started but not yet drained by `poll`.
  pub fn in_flight(&self) -> usize {
    self.in_flight
  }

  pub fn is_busy(&self) -> bool {
    self.in_flight > 0
  }
}

impl Default for PathfindingEngine {
  fn default() -> Self {
    Self::new()
  }
}
