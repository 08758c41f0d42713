use log::warn;

use crate::error::{LayoutError, Result};

use super::config::{DivergencePolicy, LayoutConfig};
use super::state::SimulationState;
use super::vector::Vec2;

/// Outcome of a single integration step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
	/// Largest distance any free body moved.
	pub max_displacement: f64,
	/// Bodies reset after producing a non-finite value.
	pub recovered: usize,
}

/// Advances every free body by one timestep:
/// `v = clamp((v + f) * damping)`, `p = p + v`.
pub fn integrate(state: &mut SimulationState, forces: &[Vec2], config: &LayoutConfig) -> Result<TickReport> {
	let mut report = TickReport::default();
	for (i, (body, &force)) in state.bodies.iter_mut().zip(forces).enumerate() {
		if body.fixed {
			body.velocity = Vec2::ZERO;
			continue;
		}
		let velocity = ((body.velocity + force) * config.damping).clamp_length(config.max_velocity);
		let position = body.position + velocity;
		if !(velocity.is_finite() && position.is_finite()) {
			match config.on_divergence {
				DivergencePolicy::Abort => {
					return Err(LayoutError::SimulationDiverged {
						node: state.ids[i].clone(),
						tick: state.tick,
					});
				}
				DivergencePolicy::Recover => {
					warn!(
						node = state.ids[i].as_str(),
						tick = state.tick;
						"Non-finite body state, restoring last finite position"
					);
					body.velocity = Vec2::ZERO;
					report.recovered += 1;
					continue;
				}
			}
		}
		report.max_displacement = report.max_displacement.max(velocity.length());
		body.velocity = velocity;
		body.position = position;
	}
	Ok(report)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layout::types::{LayoutNode, LayoutRequest};

	fn state(nodes: Vec<LayoutNode>) -> SimulationState {
		SimulationState::new(&LayoutRequest::new(nodes, vec![], 800.0, 600.0), 10.0).unwrap()
	}

	#[test]
	fn velocity_is_damped_sum_of_velocity_and_force() {
		let mut node = LayoutNode::new("a").at(10.0, 10.0);
		node.vx = Some(2.0);
		let mut s = state(vec![node]);
		let config = LayoutConfig::default();
		let report = integrate(&mut s, &[Vec2::new(3.0, -5.0)], &config).unwrap();

		let body = s.bodies()[0];
		assert!((body.velocity - Vec2::new(3.0, -3.0)).length() < 1e-12);
		assert!((body.position - Vec2::new(13.0, 7.0)).length() < 1e-12);
		assert!((report.max_displacement - body.velocity.length()).abs() < 1e-12);
	}

	#[test]
	fn fixed_bodies_never_move() {
		let mut s = state(vec![LayoutNode::new("a").at(5.0, 6.0).pinned()]);
		integrate(&mut s, &[Vec2::new(500.0, 500.0)], &LayoutConfig::default()).unwrap();
		assert_eq!(s.bodies()[0].position, Vec2::new(5.0, 6.0));
		assert_eq!(s.bodies()[0].velocity, Vec2::ZERO);
	}

	#[test]
	fn velocity_is_clamped() {
		let mut s = state(vec![LayoutNode::new("a").at(0.0, 0.0)]);
		let config = LayoutConfig {
			max_velocity: 10.0,
			..LayoutConfig::default()
		};
		let report = integrate(&mut s, &[Vec2::new(1e6, 0.0)], &config).unwrap();
		assert!((s.bodies()[0].position.x - 10.0).abs() < 1e-9);
		assert!((report.max_displacement - 10.0).abs() < 1e-9);
	}

	#[test]
	fn non_finite_force_is_recovered_by_default() {
		let mut s = state(vec![LayoutNode::new("a").at(1.0, 2.0), LayoutNode::new("b").at(3.0, 4.0)]);
		let forces = [Vec2::new(f64::NAN, 0.0), Vec2::new(1.0, 0.0)];
		let report = integrate(&mut s, &forces, &LayoutConfig::default()).unwrap();

		assert_eq!(report.recovered, 1);
		assert_eq!(s.bodies()[0].position, Vec2::new(1.0, 2.0));
		assert_eq!(s.bodies()[0].velocity, Vec2::ZERO);
		assert!(s.bodies()[1].position.x > 3.0);
	}

	#[test]
	fn non_finite_force_aborts_when_configured() {
		let mut s = state(vec![LayoutNode::new("a").at(1.0, 2.0)]);
		let config = LayoutConfig {
			on_divergence: DivergencePolicy::Abort,
			..LayoutConfig::default()
		};
		let err = integrate(&mut s, &[Vec2::new(f64::INFINITY, 0.0)], &config).unwrap_err();
		assert!(matches!(err, LayoutError::SimulationDiverged { node, tick: 0 } if node == "a"));
	}
}
