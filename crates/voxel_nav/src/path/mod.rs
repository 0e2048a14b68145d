//! Grid-search pathfinding over the occupancy grid.
//!
//! - [`astar`]: the search itself, a pure function of a grid view and a query
//! - [`engine`]: background execution, snapshots, completion handles
//! - [`types`]: request ids, result kinds, errors

pub mod astar;
pub mod engine;
pub mod types;

pub use astar::{search, PathNode, PathQuery};
pub use engine::{PathTicket, PathfindingEngine, SearchCompletion};
pub use types::{PathError, PathRequestId, PathResult, PathStatus};
