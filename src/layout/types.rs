use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LayoutError, Result};

use super::vector::Vec2;

/// A node as supplied by the caller.
///
/// `x`/`y` carry a prior position for warm starts; a node is only treated as
/// placed when both are present. `vx`/`vy` default to zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
	/// Opaque identifier, unique within a request.
	pub id: String,
	/// Prior x coordinate.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	/// Prior y coordinate.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
	/// Prior x velocity.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub vx: Option<f64>,
	/// Prior y velocity.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub vy: Option<f64>,
	/// Pinned nodes keep their initial position for the whole run.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub fixed: bool,
}

impl LayoutNode {
	/// An unplaced, free node.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}

	/// Seeds the node with a prior position.
	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.x = Some(x);
		self.y = Some(y);
		self
	}

	/// Marks the node as fixed.
	pub fn pinned(mut self) -> Self {
		self.fixed = true;
		self
	}

	pub(crate) fn prior_position(&self) -> Option<Vec2> {
		match (self.x, self.y) {
			(Some(x), Some(y)) => Some(Vec2::new(x, y)),
			_ => None,
		}
	}

	pub(crate) fn prior_velocity(&self) -> Vec2 {
		Vec2::new(self.vx.unwrap_or(0.0), self.vy.unwrap_or(0.0))
	}
}

/// A dependency from `source` to `target`. Edges naming an unknown node are
/// ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEdge {
	/// Id of the dependent node.
	pub source: String,
	/// Id of the dependency.
	pub target: String,
}

impl LayoutEdge {
	/// Edge from `source` to `target`.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}
}

/// Drawing area the layout is centred in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Width in layout units.
	pub width: f64,
	/// Height in layout units.
	pub height: f64,
}

impl Viewport {
	/// Validates the dimensions; both must be finite and positive.
	pub fn new(width: f64, height: f64) -> Result<Self> {
		if !(width.is_finite() && width > 0.0) {
			return Err(LayoutError::invalid_input(format!(
				"viewport width must be a positive finite number, got {width}"
			)));
		}
		if !(height.is_finite() && height > 0.0) {
			return Err(LayoutError::invalid_input(format!(
				"viewport height must be a positive finite number, got {height}"
			)));
		}
		Ok(Self { width, height })
	}

	/// Centre point the centering force pulls toward.
	pub fn center(&self) -> Vec2 {
		Vec2::new(self.width / 2.0, self.height / 2.0)
	}
}

/// Input message: the graph, the viewport and optional per-request
/// configuration overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
	/// Nodes in output order.
	pub nodes: Vec<LayoutNode>,
	/// Directed edges between nodes.
	pub edges: Vec<LayoutEdge>,
	/// Viewport width.
	pub width: f64,
	/// Viewport height.
	pub height: f64,
	/// Partial [`LayoutConfig`](super::LayoutConfig) applied on top of the
	/// engine's base configuration.
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub options: Map<String, Value>,
}

impl LayoutRequest {
	/// Request with no overrides.
	pub fn new(nodes: Vec<LayoutNode>, edges: Vec<LayoutEdge>, width: f64, height: f64) -> Self {
		Self {
			nodes,
			edges,
			width,
			height,
			options: Map::new(),
		}
	}

	/// Sets a single configuration override for this request.
	pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
		self.options.insert(key.to_owned(), value.into());
		self
	}

	/// Parses a request; malformed input is [`LayoutError::InvalidInput`].
	pub fn from_json(input: &str) -> Result<Self> {
		serde_json::from_str(input).map_err(LayoutError::from)
	}

	/// Validated viewport of this request.
	pub fn viewport(&self) -> Result<Viewport> {
		Viewport::new(self.width, self.height)
	}
}

/// Final position of one node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
	/// Id from the request.
	pub id: String,
	/// Final x coordinate.
	pub x: f64,
	/// Final y coordinate.
	pub y: f64,
}

/// Output message: one entry per input node, in input order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResponse {
	/// Positioned nodes.
	pub nodes: Vec<PositionedNode>,
}

impl LayoutResponse {
	/// Position of the node with `id`, if present.
	pub fn position(&self, id: &str) -> Option<Vec2> {
		self.nodes
			.iter()
			.find(|n| n.id == id)
			.map(|n| Vec2::new(n.x, n.y))
	}
}
