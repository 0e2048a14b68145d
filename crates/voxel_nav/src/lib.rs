//! voxel_nav - Incremental voxel occupancy grid and A* pathfinding
//!
//! This crate discretizes a continuous 3D world into a sparse grid of
//! cubic voxels on demand, classifying each cell Free or Blocked through an
//! external spatial probe, and answers shortest-path queries over the cells
//! classified so far. It is engine-agnostic: the host supplies the probe
//! oracle and drives the pipeline with ticks.
//!
//! # Features
//!
//! - **Region requests**: classify everything within a radius of a point;
//!   expansion runs on rayon, dispatch is capped per tick
//! - **Asynchronous probes**: any [`SpatialProbe`] that hands out handles
//!   and answers later, on the main thread or through a channel
//! - **Background A***: 6-connected search over a copy-on-write snapshot,
//!   bounded by an iteration ceiling
//! - **Broadcast events**: classification and path results fan out to all
//!   subscribers
//!
//! # Example
//!
//! ```ignore
//! use voxel_nav::{NavConfig, NavEvent, PathRequestId, VoxelNavigator};
//!
//! let mut nav = VoxelNavigator::new(NavConfig::default(), my_probe)?;
//! let events = nav.subscribe();
//!
//! nav.request_region(player_pos, 1500.0)?;
//! let ticket = nav.find_path(player_pos, target, PathRequestId::new(1));
//!
//! // Once per frame:
//! nav.tick();
//! for event in events.try_iter() {
//!     if let NavEvent::PathResult(result) = event {
//!         println!("{:?}: {} waypoints", result.request_id, result.waypoints.len());
//!     }
//! }
//!
//! // When the engine answers a probe:
//! nav.complete_probe(handle, any_overlap);
//! ```

pub mod bounds;
pub mod config;
pub mod coords;
pub mod grid;

pub use bounds::DAabb3;
pub use config::{ConfigError, NavConfig};
pub use coords::{grid_to_world, try_world_to_grid, world_to_grid, GridCoord, FACE_OFFSETS};
pub use grid::{Classification, GridError, GridSnapshot, OccupancyGrid, OccupancyQuery, VoxelState};

// Region expansion, queueing, dispatch, probe correlation
pub mod generation;
pub use generation::{
  DrainOrder, ProbeCompletion, ProbeHandle, ProbeRequest, RegionError, RegionRequestId, RegionShape, SpatialProbe,
};

// A* search and its background engine
pub mod path;
pub use path::{PathError, PathQuery, PathRequestId, PathResult, PathStatus, PathTicket};

// Broadcast events
pub mod events;
pub use events::{NavEvent, NotificationBus};

// Main-thread driver
pub mod navigator;
pub use navigator::{TickStats, VoxelNavigator};

// Feature-gated statistics
pub mod metrics;
pub use metrics::NavMetrics;

#[cfg(test)]
pub(crate) mod test_utils;
