//! Occupancy grid generation pipeline.
//!
//! ```text
//! ┌────────────────┐     ┌─────────────────┐     ┌────────────┐     ┌──────────────┐     ┌────────┐
//! │ RegionExpander ├────►│ GenerationQueue ├────►│ Dispatcher ├────►│ SpatialProbe ├────►│ commit │
//! └────────────────┘     └─────────────────┘     └────────────┘     └──────────────┘     └────────┘
//!    (worker)              (main, dedup)          (main, K/tick)       (external)        (main)
//!         │                       │                      │                   │                │
//!  Vec<GridCoord>        filtered candidates      ProbeHandle →        any overlap?   Free | Blocked
//!                                                 GridCoord table
//! ```
//!
//! # Stages
//!
//! 1. **Region expansion**: enumerate cells around a world point on a rayon
//!    worker ([`region`])
//! 2. **Queueing**: candidates not yet classified, queued, or in flight enter
//!    the [`queue`] once
//! 3. **Dispatch**: at most `max_region_requests_per_tick` coordinates leave
//!    the queue per tick; in-bounds ones become probes ([`dispatch`])
//! 4. **Completion**: the oracle's answer is correlated back to its cell
//!    ([`probe`]) and committed to the grid

pub mod dispatch;
pub mod probe;
pub mod queue;
pub mod region;

pub use dispatch::{dispatch_batch, resolve_completion, DispatchStats};
pub use probe::{
  CorrelationError, ProbeCompletion, ProbeCorrelationTable, ProbeHandle, ProbeRequest, SpatialProbe,
};
pub use queue::{DrainOrder, GenerationQueue};
pub use region::{
  expand_region, grid_radius, region_center, RegionCandidates, RegionError, RegionExpander, RegionRequestId, RegionShape,
  MAX_GRID_RADIUS,
};
