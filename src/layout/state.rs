use log::debug;
use rustc_hash::FxHashMap;

use crate::error::{LayoutError, Result};

use super::types::{LayoutRequest, PositionedNode, Viewport};
use super::vector::{GOLDEN_ANGLE, Vec2};

/// Per-node simulation data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
	/// Current position.
	pub position: Vec2,
	/// Displacement per tick.
	pub velocity: Vec2,
	/// Fixed bodies are never integrated.
	pub fixed: bool,
}

impl Body {
	/// Position after the current velocity is applied, used by the
	/// link and collision terms.
	pub fn predicted(&self) -> Vec2 {
		self.position + self.velocity
	}
}

/// Everything one layout run mutates. Owned by the scheduler; force
/// contributors and the integrator only borrow it for a single call.
#[derive(Clone, Debug)]
pub struct SimulationState {
	pub(crate) ids: Vec<String>,
	pub(crate) bodies: Vec<Body>,
	/// Resolved edges as `(source, target)` body indices.
	pub(crate) links: Vec<(usize, usize)>,
	pub(crate) viewport: Viewport,
	pub(crate) alpha: f64,
	pub(crate) tick: usize,
}

impl SimulationState {
	/// Builds the initial state for `request`.
	///
	/// Nodes without a prior position are placed on a phyllotaxis spiral
	/// around the viewport centre, indexed by their position in the request.
	/// Edges with an unknown endpoint, and self-loops, are dropped.
	pub fn new(request: &LayoutRequest, initial_radius: f64) -> Result<Self> {
		let viewport = request.viewport()?;
		let center = viewport.center();
		let mut id_to_idx = FxHashMap::default();
		let mut ids = Vec::with_capacity(request.nodes.len());
		let mut bodies = Vec::with_capacity(request.nodes.len());

		for (i, node) in request.nodes.iter().enumerate() {
			if id_to_idx.insert(node.id.as_str(), i).is_some() {
				return Err(LayoutError::invalid_input(format!(
					"duplicate node id `{}`",
					node.id
				)));
			}
			for (name, value) in [("x", node.x), ("y", node.y), ("vx", node.vx), ("vy", node.vy)] {
				if value.is_some_and(|v| !v.is_finite()) {
					return Err(LayoutError::invalid_input(format!(
						"node `{}` has a non-finite `{name}`",
						node.id
					)));
				}
			}

			let position = node
				.prior_position()
				.unwrap_or_else(|| center + phyllotaxis(i, initial_radius));
			let velocity = if node.fixed {
				Vec2::ZERO
			} else {
				node.prior_velocity()
			};
			ids.push(node.id.clone());
			bodies.push(Body {
				position,
				velocity,
				fixed: node.fixed,
			});
		}

		let mut links = Vec::with_capacity(request.edges.len());
		for edge in &request.edges {
			match (id_to_idx.get(edge.source.as_str()), id_to_idx.get(edge.target.as_str())) {
				(Some(&src), Some(&tgt)) if src != tgt => links.push((src, tgt)),
				(Some(_), Some(_)) => {
					debug!(node = edge.source.as_str(); "Ignoring self-loop edge");
				}
				_ => {
					debug!(
						from = edge.source.as_str(),
						to = edge.target.as_str();
						"Ignoring edge with unknown endpoint"
					);
				}
			}
		}

		Ok(Self {
			ids,
			bodies,
			links,
			viewport,
			alpha: 1.0,
			tick: 0,
		})
	}

	/// Number of bodies.
	pub fn len(&self) -> usize {
		self.bodies.len()
	}

	/// True when the request had no nodes.
	pub fn is_empty(&self) -> bool {
		self.bodies.is_empty()
	}

	/// Bodies in input order.
	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	/// Resolved edges as `(source, target)` body indices.
	pub fn links(&self) -> &[(usize, usize)] {
		&self.links
	}

	/// Viewport the layout is centred in.
	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	/// Current simulation temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Ticks completed so far.
	pub fn tick_count(&self) -> usize {
		self.tick
	}

	/// Position of the body with `id`, if any.
	pub fn position(&self, id: &str) -> Option<Vec2> {
		self.ids
			.iter()
			.position(|n| n == id)
			.map(|i| self.bodies[i].position)
	}

	/// Snapshot of every body as an output node.
	pub fn positioned_nodes(&self) -> Vec<PositionedNode> {
		self.ids
			.iter()
			.zip(&self.bodies)
			.map(|(id, body)| PositionedNode {
				id: id.clone(),
				x: body.position.x,
				y: body.position.y,
			})
			.collect()
	}
}

/// Offset of the `i`-th point on a sunflower spiral.
fn phyllotaxis(i: usize, initial_radius: f64) -> Vec2 {
	let radius = initial_radius * (0.5 + i as f64).sqrt();
	Vec2::from_angle(i as f64 * GOLDEN_ANGLE) * radius
}
