//! Force contributors.
//!
//! Each contributor reads the start-of-tick [`SimulationState`] and writes
//! only into its own buffer. The accumulator sums the buffers afterwards.

use rustc_hash::FxHashMap;

use super::config::LayoutConfig;
use super::quadtree::{Interaction, QuadTree};
use super::state::SimulationState;
use super::vector::{Vec2, fallback_direction};

/// Offset applied along the fallback direction when two nodes coincide.
const JIGGLE: f64 = 1e-6;

/// One independent term of the net force.
pub trait Force {
	/// Adds this term's contribution for every body into `out`.
	fn accumulate(&self, state: &SimulationState, out: &mut [Vec2]);
}

/// Spring along every resolved edge.
#[derive(Clone, Debug)]
pub struct LinkForce {
	/// Rest length.
	pub distance: f64,
	/// Stiffness, scaled by alpha.
	pub strength: f64,
}

impl Force for LinkForce {
	fn accumulate(&self, state: &SimulationState, out: &mut [Vec2]) {
		let bodies = state.bodies();
		for &(s, t) in state.links() {
			let delta = bodies[t].predicted() - bodies[s].predicted();
			let d = delta.length();
			let unit = if d > f64::EPSILON {
				delta * (1.0 / d)
			} else {
				fallback_direction(s, t)
			};
			let f = unit * ((d - self.distance) * self.strength * state.alpha() * 0.5);
			out[s] += f;
			out[t] -= f;
		}
	}
}

/// Pairwise repulsion, exact up to `threshold` bodies and Barnes-Hut above.
#[derive(Clone, Debug)]
pub struct ManyBodyForce {
	/// Negative values repel.
	pub strength: f64,
	/// Softening distance for near pairs.
	pub distance_min: f64,
	/// Barnes-Hut opening criterion.
	pub theta: f64,
	/// Largest body count summed exactly.
	pub threshold: usize,
}

impl ManyBodyForce {
	/// Force on a body from `count` sources at offset `delta`.
	fn pull(&self, delta: Vec2, count: usize, alpha: f64) -> Vec2 {
		let min2 = self.distance_min * self.distance_min;
		let mut l = delta.length_squared();
		if l < min2 {
			l = (min2 * l).sqrt();
		}
		delta * (self.strength * alpha * count as f64 / l)
	}

	fn exact(&self, state: &SimulationState, out: &mut [Vec2]) {
		let bodies = state.bodies();
		for i in 0..bodies.len() {
			for j in (i + 1)..bodies.len() {
				let delta = separation(bodies[j].position - bodies[i].position, i, j);
				let f = self.pull(delta, 1, state.alpha());
				out[i] += f;
				out[j] -= f;
			}
		}
	}

	fn barnes_hut(&self, state: &SimulationState, out: &mut [Vec2]) {
		let positions: Vec<Vec2> = state.bodies().iter().map(|b| b.position).collect();
		let tree = QuadTree::build(&positions);
		for (i, &p) in positions.iter().enumerate() {
			let mut total = Vec2::ZERO;
			tree.visit(p, self.theta, |interaction| match interaction {
				Interaction::Point(j) if j != i => {
					total += self.pull(separation(positions[j] - p, i, j), 1, state.alpha());
				}
				Interaction::Point(_) => {}
				Interaction::Cluster(centroid, count) => {
					let delta = centroid - p;
					if delta.length_squared() > 0.0 {
						total += self.pull(delta, count, state.alpha());
					}
				}
			});
			out[i] += total;
		}
	}
}

impl Force for ManyBodyForce {
	fn accumulate(&self, state: &SimulationState, out: &mut [Vec2]) {
		if state.len() > self.threshold {
			self.barnes_hut(state, out);
		} else {
			self.exact(state, out);
		}
	}
}

/// Uniform translation of the free bodies toward the viewport centre.
#[derive(Clone, Debug)]
pub struct CenterForce {
	/// Fraction of the centroid offset applied per tick.
	pub strength: f64,
}

impl Force for CenterForce {
	fn accumulate(&self, state: &SimulationState, out: &mut [Vec2]) {
		let (sum, free) = state
			.bodies()
			.iter()
			.filter(|b| !b.fixed)
			.fold((Vec2::ZERO, 0usize), |(sum, n), b| (sum + b.position, n + 1));
		if free == 0 {
			return;
		}
		let centroid = Vec2::new(sum.x / free as f64, sum.y / free as f64);
		let f = (state.viewport().center() - centroid) * self.strength;
		for (o, body) in out.iter_mut().zip(state.bodies()) {
			if !body.fixed {
				*o += f;
			}
		}
	}
}

/// Pushes apart any two bodies whose predicted positions are closer than
/// `radius`.
#[derive(Clone, Debug)]
pub struct CollideForce {
	/// Minimum separation.
	pub radius: f64,
	/// Fraction of the overlap resolved per tick.
	pub strength: f64,
	/// Largest body count checked pairwise; above it a grid is used.
	pub threshold: usize,
}

impl CollideForce {
	fn resolve(&self, predicted: &[Vec2], i: usize, j: usize, out: &mut [Vec2]) {
		let delta = predicted[j] - predicted[i];
		let l = delta.length_squared();
		if l >= self.radius * self.radius {
			return;
		}
		let d = l.sqrt();
		let unit = if d > f64::EPSILON {
			delta * (1.0 / d)
		} else {
			fallback_direction(i, j)
		};
		let push = unit * ((self.radius - d) * self.strength * 0.5);
		out[i] -= push;
		out[j] += push;
	}

	fn cell_of(&self, p: Vec2) -> (i64, i64) {
		((p.x / self.radius).floor() as i64, (p.y / self.radius).floor() as i64)
	}
}

impl Force for CollideForce {
	fn accumulate(&self, state: &SimulationState, out: &mut [Vec2]) {
		if self.radius <= 0.0 {
			return;
		}
		let predicted: Vec<Vec2> = state.bodies().iter().map(|b| b.predicted()).collect();
		if predicted.len() <= self.threshold {
			for i in 0..predicted.len() {
				for j in (i + 1)..predicted.len() {
					self.resolve(&predicted, i, j, out);
				}
			}
			return;
		}

		let mut grid: FxHashMap<(i64, i64), Vec<usize>> = FxHashMap::default();
		for (i, &p) in predicted.iter().enumerate() {
			grid.entry(self.cell_of(p)).or_default().push(i);
		}
		for i in 0..predicted.len() {
			let (cx, cy) = self.cell_of(predicted[i]);
			for dx in -1..=1 {
				for dy in -1..=1 {
					// Coordinates far outside the grid saturate to the edge cell.
					let (Some(nx), Some(ny)) = (cx.checked_add(dx), cy.checked_add(dy)) else {
						continue;
					};
					let Some(bucket) = grid.get(&(nx, ny)) else {
						continue;
					};
					for &j in bucket.iter().filter(|&&j| j > i) {
						self.resolve(&predicted, i, j, out);
					}
				}
			}
		}
	}
}

/// `delta`, or a tiny deterministic offset when the two bodies coincide.
fn separation(delta: Vec2, i: usize, j: usize) -> Vec2 {
	if delta.length_squared() > f64::EPSILON * f64::EPSILON {
		delta
	} else {
		fallback_direction(i, j) * JIGGLE
	}
}

/// Owns the four contributors and their scratch buffers.
#[derive(Clone, Debug)]
pub struct ForceAccumulator {
	link: LinkForce,
	many_body: ManyBodyForce,
	center: CenterForce,
	collide: CollideForce,
	buffers: [Vec<Vec2>; 4],
	net: Vec<Vec2>,
}

impl ForceAccumulator {
	/// Builds the contributors from `config`. Buffers grow on first use.
	pub fn new(config: &LayoutConfig) -> Self {
		Self {
			link: LinkForce {
				distance: config.link_distance,
				strength: config.link_strength,
			},
			many_body: ManyBodyForce {
				strength: config.charge_strength,
				distance_min: config.distance_min,
				theta: config.theta,
				threshold: config.barnes_hut_threshold,
			},
			center: CenterForce {
				strength: config.centering_strength,
			},
			collide: CollideForce {
				radius: config.collision_radius,
				strength: config.collision_strength,
				threshold: config.barnes_hut_threshold,
			},
			buffers: Default::default(),
			net: Vec::new(),
		}
	}

	/// Net force on every body for the current state.
	pub fn accumulate(&mut self, state: &SimulationState) -> &[Vec2] {
		let n = state.len();
		let forces: [&dyn Force; 4] = [&self.link, &self.many_body, &self.center, &self.collide];
		for (force, buffer) in forces.into_iter().zip(self.buffers.iter_mut()) {
			buffer.clear();
			buffer.resize(n, Vec2::ZERO);
			force.accumulate(state, buffer);
		}

		self.net.clear();
		self.net.resize(n, Vec2::ZERO);
		for buffer in &self.buffers {
			for (net, f) in self.net.iter_mut().zip(buffer) {
				*net += *f;
			}
		}
		&self.net
	}
}
