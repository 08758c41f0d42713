//! Force-directed layout: state, forces, integration and scheduling.

mod config;
mod forces;
mod integrator;
mod quadtree;
mod scheduler;
mod state;
mod types;
mod vector;

pub use config::{DivergencePolicy, LayoutConfig};
pub use forces::{CenterForce, CollideForce, Force, ForceAccumulator, LinkForce, ManyBodyForce};
pub use integrator::{TickReport, integrate};
pub use scheduler::{RunStats, Simulation, step};
pub use state::{Body, SimulationState};
pub use types::{LayoutEdge, LayoutNode, LayoutRequest, LayoutResponse, PositionedNode, Viewport};
pub use vector::{Vec2, fallback_direction};

use crate::error::Result;

/// Lays out `request` with the default configuration plus the request's
/// own overrides.
pub fn layout(request: &LayoutRequest) -> Result<LayoutResponse> {
	layout_with_config(request, &LayoutConfig::default())
}

/// Lays out `request` starting from `base`, with the request's overrides
/// applied on top.
pub fn layout_with_config(request: &LayoutRequest, base: &LayoutConfig) -> Result<LayoutResponse> {
	layout_with_stats(request, base).map(|(response, _)| response)
}

/// Like [`layout_with_config`], also returning how the run ended.
pub fn layout_with_stats(request: &LayoutRequest, base: &LayoutConfig) -> Result<(LayoutResponse, RunStats)> {
	let config = base.with_overrides(&request.options)?;
	let mut simulation = Simulation::new(request, config)?;
	let stats = simulation.run()?;
	Ok((simulation.into_response(), stats))
}

/// JSON-in, JSON-out form of [`layout_with_config`].
pub fn layout_json(input: &str, base: &LayoutConfig) -> Result<String> {
	let request = LayoutRequest::from_json(input)?;
	let response = layout_with_config(&request, base)?;
	Ok(serde_json::to_string(&response)?)
}
