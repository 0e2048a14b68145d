//! Axis-aligned bounding volume that limits where cells may be classified.

use glam::DVec3;

/// Double-precision axis-aligned bounding box.
///
/// Region candidates whose cell center falls outside the box are dropped by
/// the dispatcher before any probe is issued.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DAabb3 {
	/// Minimum corner (inclusive).
	pub min: DVec3,
	/// Maximum corner (inclusive).
	pub max: DVec3,
}

impl DAabb3 {
	/// Box large enough to accept every finite position.
	pub const EVERYTHING: Self = Self {
		min: DVec3::splat(f64::MIN),
		max: DVec3::splat(f64::MAX),
	};

	/// Create a new AABB from min and max corners.
	///
	/// # Panics
	/// Debug-asserts that min <= max on all axes.
	pub fn new(min: DVec3, max: DVec3) -> Self {
		debug_assert!(
			min.x <= max.x && min.y <= max.y && min.z <= max.z,
			"AABB min must be <= max on all axes"
		);
		Self { min, max }
	}

	/// True when min <= max on every axis and no component is NaN.
	#[inline]
	pub fn is_valid(&self) -> bool {
		self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
	}

	/// Check if this AABB contains a point (boundary inclusive).
	#[inline]
	pub fn contains_point(&self, point: DVec3) -> bool {
		point.x >= self.min.x
			&& point.x <= self.max.x
			&& point.y >= self.min.y
			&& point.y <= self.max.y
			&& point.z >= self.min.z
			&& point.z <= self.max.z
	}
}
