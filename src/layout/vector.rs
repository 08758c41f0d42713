use std::f64::consts::PI;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Golden angle in radians, `π(3 - √5)`.
pub const GOLDEN_ANGLE: f64 = PI * (3.0 - 2.236_067_977_499_79);

/// 2D vector used for positions, velocities and forces.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
	/// Horizontal component.
	pub x: f64,
	/// Vertical component.
	pub y: f64,
}

impl Vec2 {
	/// The zero vector.
	pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

	/// Creates a vector from its components.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Unit vector at `angle` radians.
	pub fn from_angle(angle: f64) -> Self {
		Self::new(angle.cos(), angle.sin())
	}

	/// Squared Euclidean length.
	pub fn length_squared(self) -> f64 {
		self.x * self.x + self.y * self.y
	}

	/// Euclidean length.
	pub fn length(self) -> f64 {
		self.length_squared().sqrt()
	}

	/// True when both components are finite.
	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}

	/// Scales the vector down so its length does not exceed `max`.
	pub fn clamp_length(self, max: f64) -> Self {
		let len = self.length();
		if len > max { self * (max / len) } else { self }
	}
}

/// Deterministic unit direction from node `i` towards node `j` when the two
/// coincide. Swapping the arguments negates the result.
pub fn fallback_direction(i: usize, j: usize) -> Vec2 {
	let (lo, hi, sign) = if i <= j { (i, j, 1.0) } else { (j, i, -1.0) };
	let seed = (lo as f64) * 31.0 + hi as f64 + 1.0;
	Vec2::from_angle(seed * GOLDEN_ANGLE) * sign
}

impl Add for Vec2 {
	type Output = Vec2;

	fn add(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl AddAssign for Vec2 {
	fn add_assign(&mut self, rhs: Vec2) {
		self.x += rhs.x;
		self.y += rhs.y;
	}
}

impl Sub for Vec2 {
	type Output = Vec2;

	fn sub(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl SubAssign for Vec2 {
	fn sub_assign(&mut self, rhs: Vec2) {
		self.x -= rhs.x;
		self.y -= rhs.y;
	}
}

impl Mul<f64> for Vec2 {
	type Output = Vec2;

	fn mul(self, rhs: f64) -> Vec2 {
		Vec2::new(self.x * rhs, self.y * rhs)
	}
}

impl Neg for Vec2 {
	type Output = Vec2;

	fn neg(self) -> Vec2 {
		Vec2::new(-self.x, -self.y)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clamp_length_caps_magnitude() {
		let v = Vec2::new(30.0, 40.0).clamp_length(10.0);
		assert!((v.length() - 10.0).abs() < 1e-12);
		assert!((v.x - 6.0).abs() < 1e-12);

		let short = Vec2::new(1.0, 1.0);
		assert_eq!(short.clamp_length(10.0), short);
	}

	#[test]
	fn fallback_direction_is_antisymmetric_unit() {
		for (i, j) in [(0, 1), (3, 7), (12, 5)] {
			let a = fallback_direction(i, j);
			let b = fallback_direction(j, i);
			assert!((a.length() - 1.0).abs() < 1e-12);
			assert_eq!(a, -b);
		}
		assert_ne!(fallback_direction(0, 1), fallback_direction(0, 2));
	}
}
