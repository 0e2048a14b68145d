use super::*;

#[test]
fn test_world_to_grid_floors() {
  assert_eq!(world_to_grid(DVec3::new(50.0, 50.0, 50.0), 100.0), GridCoord::ZERO);
  assert_eq!(world_to_grid(DVec3::new(99.9, 0.0, 100.0), 100.0), GridCoord::new(0, 0, 1));
}

/// Negative positions floor toward -inf, not toward zero.
#[test]
fn test_world_to_grid_negative() {
  assert_eq!(
    world_to_grid(DVec3::new(-0.5, -100.0, -100.1), 100.0),
    GridCoord::new(-1, -1, -2)
  );
}

#[test]
fn test_grid_to_world_is_cell_center() {
  assert_eq!(
    grid_to_world(GridCoord::new(2, 2, 0), 100.0),
    DVec3::new(250.0, 250.0, 50.0)
  );
  assert_eq!(
    grid_to_world(GridCoord::new(-1, 0, 3), 10.0),
    DVec3::new(-5.0, 5.0, 35.0)
  );
}

#[test]
fn test_roundtrip_identity() {
  for voxel_size in [0.25, 1.0, 7.5, 100.0] {
    for x in -20..=20 {
      for y in [-13, 0, 9] {
        for z in [-1000, -1, 0, 1, 1000] {
          let c = GridCoord::new(x, y, z);
          assert_eq!(
            world_to_grid(grid_to_world(c, voxel_size), voxel_size),
            c,
            "roundtrip failed for {c} at voxel size {voxel_size}"
          );
        }
      }
    }
  }
}

#[test]
fn test_face_neighbors() {
  let c = GridCoord::new(1, 2, 3);
  let n = c.face_neighbors();
  assert_eq!(n.len(), 6);
  for neighbor in &n {
    assert_eq!(c.manhattan(neighbor), 1);
  }
  assert!(n.contains(&GridCoord::new(0, 2, 3)));
  assert!(n.contains(&GridCoord::new(1, 2, 4)));
}

#[test]
fn test_distance_and_manhattan() {
  let a = GridCoord::ZERO;
  let b = GridCoord::new(3, 4, 0);
  assert_eq!(a.distance(&b), 5.0);
  assert_eq!(a.manhattan(&b), 7);
  assert_eq!(GridCoord::new(-2, 0, 0).manhattan(&GridCoord::new(2, 0, 0)), 4);
}

#[test]
fn test_ivec3_conversion() {
  let c: GridCoord = IVec3::new(4, -5, 6).into();
  assert_eq!(c, GridCoord::new(4, -5, 6));
  assert_eq!(IVec3::from(c), IVec3::new(4, -5, 6));
}

#[test]
fn test_try_world_to_grid() {
  assert_eq!(
    try_world_to_grid(DVec3::new(-0.5, 150.0, 0.0), 100.0),
    Some(GridCoord::new(-1, 1, 0))
  );
  // Would saturate to the same cell.
  assert_eq!(try_world_to_grid(DVec3::new(1.0e12, 0.0, 0.0), 100.0), None);
  assert_eq!(try_world_to_grid(DVec3::new(0.0, -5.0e12, 0.0), 100.0), None);
  assert_eq!(try_world_to_grid(DVec3::new(f64::NAN, 0.0, 0.0), 100.0), None);
  assert_eq!(try_world_to_grid(DVec3::new(0.0, 0.0, f64::INFINITY), 100.0), None);

  let edge = DVec3::new(i32::MAX as f64 + 0.5, i32::MIN as f64, 0.0);
  assert_eq!(try_world_to_grid(edge, 1.0), Some(GridCoord::new(i32::MAX, i32::MIN, 0)));
}

#[test]
fn test_checked_offset_at_limits() {
  let max = GridCoord::new(i32::MAX, 0, 0);
  assert_eq!(max.checked_offset(1, 0, 0), None);
  assert_eq!(max.checked_offset(-1, 0, 0), Some(GridCoord::new(i32::MAX - 1, 0, 0)));
  assert_eq!(GridCoord::new(0, 0, i32::MIN).checked_offset(0, 0, -1), None);
}

/// Neighbors past the i32 range are left out instead of wrapping.
#[test]
fn test_face_neighbors_at_limits() {
  let corner = GridCoord::new(i32::MAX, i32::MIN, 0);
  let n = corner.face_neighbors();
  assert_eq!(n.len(), 4);
  assert!(!n.contains(&GridCoord::new(i32::MIN, i32::MIN, 0)));
  assert!(n.contains(&GridCoord::new(i32::MAX - 1, i32::MIN, 0)));
  assert!(n.contains(&GridCoord::new(i32::MAX, i32::MIN + 1, 0)));
}
