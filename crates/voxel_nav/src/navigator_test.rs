use std::collections::HashSet;
use std::time::Duration;

use super::*;
use crate::bounds::DAabb3;
use crate::coords::{grid_to_world, world_to_grid};
use crate::generation::{expand_region, RegionShape};
use crate::grid::{OccupancyQuery, VoxelState};
use crate::path::{PathResult, PathStatus};
use crate::test_utils::{RecordingProbe, ScriptedProbe};

const VOXEL: f64 = 100.0;

fn config(cap: usize) -> NavConfig {
  NavConfig {
    max_region_requests_per_tick: cap,
    ..NavConfig::UNBOUNDED
  }
}

/// Tick until nothing is left in flight, checking the per-tick cap as we go.
fn run_until_idle<P: SpatialProbe>(nav: &mut VoxelNavigator<P>) -> TickStats {
  let cap = nav.config().max_region_requests_per_tick;
  let mut total = TickStats::default();

  for _ in 0..5000 {
    let before = nav.queue_len();
    let stats = nav.tick();
    let after = nav.queue_len();

    assert!(stats.popped <= cap, "popped {} with cap {}", stats.popped, cap);
    assert_eq!(after, before + stats.candidates_enqueued - stats.popped);

    total.regions_merged += stats.regions_merged;
    total.candidates_enqueued += stats.candidates_enqueued;
    total.classified += stats.classified;
    total.popped += stats.popped;
    total.dispatched += stats.dispatched;
    total.dropped_out_of_bounds += stats.dropped_out_of_bounds;
    total.skipped += stats.skipped;
    total.paths_delivered += stats.paths_delivered;

    if nav.is_idle() {
      return total;
    }
    std::thread::sleep(Duration::from_millis(1));
  }
  panic!("navigator never went idle");
}

/// Tick until `count` path results have been broadcast on `events`.
fn collect_paths<P: SpatialProbe>(
  nav: &mut VoxelNavigator<P>,
  events: &Receiver<NavEvent>,
  count: usize,
) -> Vec<PathResult> {
  let mut results = Vec::new();
  for _ in 0..5000 {
    nav.tick();
    for event in events.try_iter() {
      if let NavEvent::PathResult(result) = event {
        results.push(result);
      }
    }
    if results.len() >= count {
      return results;
    }
    std::thread::sleep(Duration::from_millis(1));
  }
  panic!("only {} of {} path results arrived", results.len(), count);
}

/// Free space everywhere: classify a sphere of grid radius 3 at the origin cell.
fn open_field() -> VoxelNavigator<ScriptedProbe<impl FnMut(DVec3) -> bool>> {
  let mut nav = VoxelNavigator::with_probe(config(50), |tx| ScriptedProbe::new(tx, |_: DVec3| false)).unwrap();
  nav.request_region(DVec3::splat(50.0), 300.0).unwrap();
  run_until_idle(&mut nav);
  nav
}

// =============================================================================
// Generation
// =============================================================================

/// After draining, a cell is classified iff it is in the region and its
/// center lies inside the bounds.
#[test]
fn test_region_drain_classifies_exactly_in_bounds_cells() {
  let bounds = DAabb3::new(DVec3::splat(-1000.0), DVec3::new(200.0, 1000.0, 1000.0));
  let cfg = NavConfig {
    bounds,
    ..config(5)
  };
  let mut nav = VoxelNavigator::with_probe(cfg, |tx| ScriptedProbe::new(tx, |c: DVec3| c.z > 100.0)).unwrap();
  let events = nav.subscribe();

  let center = DVec3::splat(50.0);
  nav.request_region(center, 200.0).unwrap();
  let total = run_until_idle(&mut nav);

  let expected: HashSet<GridCoord> = expand_region(center, 200.0, VOXEL, RegionShape::Sphere)
    .into_iter()
    .filter(|c| bounds.contains_point(grid_to_world(*c, VOXEL)))
    .collect();
  let classified: HashSet<GridCoord> = nav.grid().iter().map(|(c, _)| c).collect();

  assert_eq!(expected.len(), 32);
  assert_eq!(classified, expected);
  assert_eq!(total.dropped_out_of_bounds, 1);
  assert_eq!(total.dispatched, 32);
  assert_eq!(total.regions_merged, 1);

  for (coord, class) in nav.grid().iter() {
    let blocked = grid_to_world(coord, VOXEL).z > 100.0;
    assert_eq!(class == Classification::Blocked, blocked, "cell {}", coord);
  }

  let classified_events = events
    .try_iter()
    .filter(|e| matches!(e, NavEvent::VoxelClassified { .. }))
    .count();
  assert_eq!(classified_events, 32);
  assert_eq!(nav.outstanding_probes(), 0);
}

/// Overlapping regions never probe the same cell twice.
#[test]
fn test_overlapping_regions_probe_each_cell_once() {
  let mut nav = VoxelNavigator::with_probe(config(7), |tx| ScriptedProbe::new(tx, |_: DVec3| false)).unwrap();

  let a = DVec3::splat(50.0);
  let b = DVec3::new(250.0, 50.0, 50.0);
  nav.request_region(a, 200.0).unwrap();
  nav.request_region(b, 200.0).unwrap();
  run_until_idle(&mut nav);

  // A third request over already classified space adds nothing.
  nav.request_region(a, 100.0).unwrap();
  let total = run_until_idle(&mut nav);
  assert_eq!(total.candidates_enqueued, 0);

  let union: HashSet<GridCoord> = expand_region(a, 200.0, VOXEL, RegionShape::Sphere)
    .into_iter()
    .chain(expand_region(b, 200.0, VOXEL, RegionShape::Sphere))
    .collect();

  assert_eq!(nav.grid().len(), union.len());
  assert_eq!(nav.probe().probes_issued, union.len());
}

#[test]
fn test_legacy_cross_term_region() {
  let cfg = NavConfig {
    region_shape: RegionShape::LegacyCrossTerm,
    ..config(100)
  };
  let mut nav = VoxelNavigator::with_probe(cfg, |tx| ScriptedProbe::new(tx, |_: DVec3| false)).unwrap();
  nav.request_region(DVec3::splat(50.0), 200.0).unwrap();
  run_until_idle(&mut nav);

  assert_eq!(nav.grid().len(), 65);
  // On the y = 0 plane every |x| <= R passes regardless of z.
  assert!(nav.grid().contains(GridCoord::new(2, 0, 2)));
  assert!(!nav.grid().contains(GridCoord::new(0, 2, 2)));
}

#[test]
fn test_out_of_bounds_region_is_dropped() {
  let mut nav = VoxelNavigator::with_probe(NavConfig::DEFAULT, |tx| ScriptedProbe::new(tx, |_: DVec3| false)).unwrap();
  nav.request_region(DVec3::new(6000.0, 0.0, 0.0), 0.0).unwrap();
  let total = run_until_idle(&mut nav);

  assert_eq!(total.dropped_out_of_bounds, 1);
  assert!(nav.grid().is_empty());
  assert_eq!(nav.probe().probes_issued, 0);
}

#[test]
fn test_complete_probe_directly() {
  let mut nav = VoxelNavigator::new(config(5), RecordingProbe::new()).unwrap();
  let events = nav.subscribe();

  nav.request_region(DVec3::new(150.0, 50.0, 50.0), 0.0).unwrap();
  for _ in 0..2000 {
    nav.tick();
    if nav.outstanding_probes() == 1 {
      break;
    }
    std::thread::sleep(Duration::from_millis(1));
  }
  assert_eq!(nav.outstanding_probes(), 1);
  assert!(!nav.is_idle());

  let handle = nav.probe().handles()[0];
  let cell = GridCoord::new(1, 0, 0);
  assert_eq!(nav.complete_probe(handle, true), Some((cell, Classification::Blocked)));
  // Already resolved.
  assert_eq!(nav.complete_probe(handle, false), None);

  assert_eq!(nav.grid().state(cell), VoxelState::Blocked);
  assert!(nav.is_idle());
  assert_eq!(
    events.try_iter().collect::<Vec<_>>(),
    vec![NavEvent::VoxelClassified {
      coord: cell,
      state: VoxelState::Blocked,
    }]
  );
}

#[test]
fn test_completion_from_another_thread() {
  let mut nav = VoxelNavigator::new(config(5), RecordingProbe::new()).unwrap();
  nav.request_region(DVec3::splat(50.0), 0.0).unwrap();
  for _ in 0..2000 {
    nav.tick();
    if nav.outstanding_probes() == 1 {
      break;
    }
    std::thread::sleep(Duration::from_millis(1));
  }

  let handle = nav.probe().handles()[0];
  let sender = nav.completion_sender();
  std::thread::spawn(move || {
    sender
      .send(ProbeCompletion {
        handle,
        any_overlap: false,
      })
      .unwrap();
  })
  .join()
  .unwrap();

  let stats = nav.tick();
  assert_eq!(stats.classified, 1);
  assert_eq!(nav.grid().state(GridCoord::ZERO), VoxelState::Free);
  assert!(nav.is_idle());
}

#[test]
fn test_invalid_config_rejected() {
  let cfg = NavConfig {
    voxel_size: 0.0,
    ..NavConfig::DEFAULT
  };
  assert_eq!(
    VoxelNavigator::new(cfg, RecordingProbe::new()).err(),
    Some(ConfigError::VoxelSize(0.0))
  );
}

// =============================================================================
// Pathfinding
// =============================================================================

/// Results are broadcast to every subscriber and carry the caller's id.
#[test]
fn test_path_results_broadcast_with_request_ids() {
  let mut nav = open_field();
  let events = nav.subscribe();

  let found = PathRequestId::new(42);
  let invalid = PathRequestId::new(43);
  nav.find_path(DVec3::splat(50.0), DVec3::new(250.0, 50.0, 50.0), found);
  // Far outside the classified sphere: start cell is unknown.
  nav.find_path(DVec3::splat(5050.0), DVec3::splat(50.0), invalid);

  let results = collect_paths(&mut nav, &events, 2);
  assert_eq!(results.len(), 2);

  let by_id = |id: PathRequestId| results.iter().find(|r| r.request_id == id).unwrap();

  let ok = by_id(found);
  assert_eq!(ok.status, PathStatus::Found);
  assert_eq!(
    ok.waypoints,
    vec![
      DVec3::splat(50.0),
      DVec3::new(150.0, 50.0, 50.0),
      DVec3::new(250.0, 50.0, 50.0),
    ]
  );

  let bad = by_id(invalid);
  assert_eq!(
    bad.status,
    PathStatus::InvalidStart {
      state: VoxelState::Unknown
    }
  );
  assert!(bad.waypoints.is_empty());
  assert_eq!(nav.metrics().search_timings.len(), if crate::metrics::is_enabled() { 2 } else { 0 });
}

#[test]
fn test_ticket_and_broadcast_agree() {
  let mut nav = open_field();
  let events = nav.subscribe();

  let id = nav.next_request_id();
  let ticket = nav.find_path(DVec3::new(-250.0, 50.0, 50.0), DVec3::new(50.0, 250.0, 50.0), id);
  let broadcast = collect_paths(&mut nav, &events, 1);

  let direct = ticket.wait_timeout(Duration::from_secs(5)).unwrap();
  assert_eq!(broadcast, vec![direct.clone()]);
  assert!(direct.is_found());
  // 3 steps in x, 2 in y.
  assert_eq!(direct.waypoints.len(), 6);
}

/// A goal whose neighbors are all blocked ends the search without a path.
#[test]
fn test_enclosed_goal_terminates() {
  let goal = GridCoord::new(2, 0, 0);
  let walls: HashSet<GridCoord> = goal.face_neighbors().into_iter().collect();
  let is_wall = move |center: DVec3| walls.contains(&world_to_grid(center, VOXEL));

  let mut nav = VoxelNavigator::with_probe(config(50), |tx| ScriptedProbe::new(tx, is_wall)).unwrap();
  let events = nav.subscribe();
  nav.request_region(DVec3::splat(50.0), 300.0).unwrap();
  run_until_idle(&mut nav);
  assert_eq!(nav.grid().blocked_count(), 6);

  let id = PathRequestId::new(7);
  nav.find_path(DVec3::splat(50.0), grid_to_world(goal, VOXEL), id);
  let results = collect_paths(&mut nav, &events, 1);

  assert_eq!(results[0].request_id, id);
  assert_eq!(results[0].status, PathStatus::Unreachable);
  assert!(results[0].waypoints.is_empty());
}

#[test]
fn test_search_ignores_later_classification() {
  let mut nav = VoxelNavigator::new(config(5), RecordingProbe::new()).unwrap();

  // Nothing classified yet: the start is unknown at request time.
  let ticket = nav.find_path(DVec3::splat(50.0), DVec3::splat(50.0), PathRequestId::new(1));
  nav.request_region(DVec3::splat(50.0), 0.0).unwrap();
  for _ in 0..2000 {
    nav.tick();
    if nav.outstanding_probes() == 1 {
      break;
    }
    std::thread::sleep(Duration::from_millis(1));
  }
  let handle = nav.probe().handles()[0];
  nav.complete_probe(handle, false);

  let result = ticket.wait_timeout(Duration::from_secs(5)).unwrap();
  assert_eq!(
    result.status,
    PathStatus::InvalidStart {
      state: VoxelState::Unknown
    }
  );
  assert_eq!(nav.grid().state(GridCoord::ZERO), VoxelState::Free);
}

#[test]
fn test_unusable_region_requests_rejected() {
  let mut nav = VoxelNavigator::new(config(5), RecordingProbe::new()).unwrap();

  let far = DVec3::new(1.0e12, 0.0, 0.0);
  assert_eq!(nav.request_region(far, 100.0), Err(RegionError::CenterOutOfRange(far)));
  assert_eq!(
    nav.request_region(DVec3::ZERO, f64::INFINITY),
    Err(RegionError::NonFiniteRadius(f64::INFINITY))
  );
  assert!(matches!(
    nav.request_region(DVec3::new(0.0, f64::NAN, 0.0), 100.0),
    Err(RegionError::NonFiniteCenter(_))
  ));

  // Nothing was started, so the navigator stays idle.
  assert!(nav.is_idle());
  let stats = nav.tick();
  assert_eq!(stats.regions_merged, 0);
  assert!(nav.grid().is_empty());
}

/// A start beyond the coordinate range is reported as an invalid start.
#[test]
fn test_far_start_is_invalid() {
  let mut nav = open_field();
  let ticket = nav.find_path(DVec3::new(1.0e12, 50.0, 50.0), DVec3::splat(50.0), PathRequestId::new(11));

  let result = ticket.wait_timeout(Duration::from_secs(5)).unwrap();
  assert_eq!(
    result.status,
    PathStatus::InvalidStart {
      state: VoxelState::Unknown
    }
  );
  assert!(result.waypoints.is_empty());
}
