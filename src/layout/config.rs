//! Tunable simulation parameters.
//!
//! Defaults reproduce the dependency-map worker: 300 ticks, links of length
//! 120 at strength 0.12, a many-body charge of -240 and a collision radius of
//! 36. Every field can be overridden from a TOML file or per request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LayoutError, Result};

/// What to do when a tick produces a non-finite position or velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergencePolicy {
	/// Restore the node's last finite position, zero its velocity and continue.
	#[default]
	Recover,
	/// Stop the run with [`LayoutError::SimulationDiverged`].
	Abort,
}

/// Simulation parameters. Missing fields take their default value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
	/// Number of ticks the scheduler runs.
	pub ticks: usize,
	/// Rest length of a link.
	pub link_distance: f64,
	/// Spring stiffness of a link, scaled by alpha.
	pub link_strength: f64,
	/// Many-body strength; negative values repel.
	pub charge_strength: f64,
	/// Distances below this are softened in the many-body term.
	pub distance_min: f64,
	/// Barnes-Hut opening criterion.
	pub theta: f64,
	/// Node count above which repulsion and collision use spatial indexes.
	pub barnes_hut_threshold: usize,
	/// Pull of the free-node centroid toward the viewport centre.
	pub centering_strength: f64,
	/// Minimum separation between any two nodes.
	pub collision_radius: f64,
	/// Fraction of an overlap resolved per tick.
	pub collision_strength: f64,
	/// Velocity retained per tick, in `(0, 1]`.
	pub damping: f64,
	/// Upper bound on per-tick velocity and therefore displacement.
	pub max_velocity: f64,
	/// Temperature reached on the last tick; sets the cooling rate.
	pub alpha_min: f64,
	/// Temperature alpha cools toward.
	pub alpha_target: f64,
	/// Stop early once no node moves more than this in a tick.
	pub convergence_epsilon: Option<f64>,
	/// Spacing of the initial phyllotaxis spiral.
	pub initial_radius: f64,
	/// Handling of non-finite positions or velocities.
	pub on_divergence: DivergencePolicy,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			ticks: 300,
			link_distance: 120.0,
			link_strength: 0.12,
			charge_strength: -240.0,
			distance_min: 1.0,
			theta: 0.9,
			barnes_hut_threshold: 256,
			centering_strength: 0.1,
			collision_radius: 36.0,
			collision_strength: 1.0,
			damping: 0.6,
			max_velocity: 100.0,
			alpha_min: 0.001,
			alpha_target: 0.0,
			convergence_epsilon: None,
			initial_radius: 10.0,
			on_divergence: DivergencePolicy::Recover,
		}
	}
}

impl LayoutConfig {
	/// Per-tick cooling rate chosen so alpha reaches `alpha_min` on the last tick.
	pub fn alpha_decay(&self) -> f64 {
		if self.ticks == 0 {
			return 0.0;
		}
		1.0 - self.alpha_min.powf(1.0 / self.ticks as f64)
	}

	/// Returns a copy with the given fields replaced, validated.
	pub fn with_overrides(&self, overrides: &Map<String, Value>) -> Result<Self> {
		if overrides.is_empty() {
			return Ok(self.clone());
		}
		let Value::Object(mut merged) = serde_json::to_value(self)? else {
			return Err(LayoutError::invalid_input("layout configuration is not an object"));
		};
		merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
		let config: Self = serde_json::from_value(Value::Object(merged))
			.map_err(|e| LayoutError::invalid_input(format!("invalid layout options: {e}")))?;
		config.validate()?;
		Ok(config)
	}

	/// Rejects out-of-range values with [`LayoutError::InvalidInput`].
	pub fn validate(&self) -> Result<()> {
		fn check(ok: bool, field: &str, value: f64, rule: &str) -> Result<()> {
			if ok {
				Ok(())
			} else {
				Err(LayoutError::invalid_input(format!(
					"`{field}` must be {rule}, got {value}"
				)))
			}
		}
		let non_negative = |v: f64| v.is_finite() && v >= 0.0;
		let positive = |v: f64| v.is_finite() && v > 0.0;

		check(non_negative(self.link_distance), "link_distance", self.link_distance, "finite and >= 0")?;
		check(non_negative(self.link_strength), "link_strength", self.link_strength, "finite and >= 0")?;
		check(self.charge_strength.is_finite(), "charge_strength", self.charge_strength, "finite")?;
		check(positive(self.distance_min), "distance_min", self.distance_min, "finite and > 0")?;
		check(non_negative(self.theta), "theta", self.theta, "finite and >= 0")?;
		check(
			non_negative(self.centering_strength),
			"centering_strength",
			self.centering_strength,
			"finite and >= 0",
		)?;
		check(
			non_negative(self.collision_radius),
			"collision_radius",
			self.collision_radius,
			"finite and >= 0",
		)?;
		check(
			non_negative(self.collision_strength),
			"collision_strength",
			self.collision_strength,
			"finite and >= 0",
		)?;
		check(
			positive(self.damping) && self.damping <= 1.0,
			"damping",
			self.damping,
			"in (0, 1]",
		)?;
		check(positive(self.max_velocity), "max_velocity", self.max_velocity, "finite and > 0")?;
		check(
			positive(self.alpha_min) && self.alpha_min < 1.0,
			"alpha_min",
			self.alpha_min,
			"in (0, 1)",
		)?;
		check(
			non_negative(self.alpha_target) && self.alpha_target < 1.0,
			"alpha_target",
			self.alpha_target,
			"in [0, 1)",
		)?;
		if let Some(eps) = self.convergence_epsilon {
			check(positive(eps), "convergence_epsilon", eps, "finite and > 0")?;
		}
		check(
			non_negative(self.initial_radius),
			"initial_radius",
			self.initial_radius,
			"finite and >= 0",
		)?;
		Ok(())
	}
}
