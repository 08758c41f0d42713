use log::debug;

use crate::error::Result;

use super::config::LayoutConfig;
use super::forces::ForceAccumulator;
use super::integrator::{TickReport, integrate};
use super::state::SimulationState;
use super::types::{LayoutRequest, LayoutResponse};

/// Summary of a completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunStats {
	/// Ticks actually run.
	pub ticks: usize,
	/// True when the run stopped early on `convergence_epsilon`.
	pub converged: bool,
	/// Total bodies reset after a non-finite tick.
	pub recovered: usize,
	/// Temperature after the last tick.
	pub final_alpha: f64,
}

/// One layout run: the state plus everything needed to advance it.
#[derive(Clone, Debug)]
pub struct Simulation {
	state: SimulationState,
	forces: ForceAccumulator,
	config: LayoutConfig,
	alpha_decay: f64,
}

impl Simulation {
	/// Validates `config` and places every node of `request`.
	pub fn new(request: &LayoutRequest, config: LayoutConfig) -> Result<Self> {
		config.validate()?;
		let state = SimulationState::new(request, config.initial_radius)?;
		Ok(Self {
			state,
			forces: ForceAccumulator::new(&config),
			alpha_decay: config.alpha_decay(),
			config,
		})
	}

	/// Current state, for inspection between ticks.
	pub fn state(&self) -> &SimulationState {
		&self.state
	}

	/// Effective configuration, overrides included.
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	/// Advances the simulation by one tick.
	pub fn tick(&mut self) -> Result<TickReport> {
		step(&mut self.state, &mut self.forces, &self.config, self.alpha_decay)
	}

	/// Runs the configured number of ticks, stopping early once the largest
	/// per-body displacement drops below `convergence_epsilon` (if set).
	pub fn run(&mut self) -> Result<RunStats> {
		let mut stats = RunStats::default();
		if self.state.is_empty() {
			stats.final_alpha = self.state.alpha();
			return Ok(stats);
		}
		debug!(
			nodes = self.state.len(),
			links = self.state.links().len(),
			ticks = self.config.ticks;
			"Starting layout run"
		);

		for _ in 0..self.config.ticks {
			let report = self.tick()?;
			stats.ticks += 1;
			stats.recovered += report.recovered;
			if let Some(eps) = self.config.convergence_epsilon
				&& report.max_displacement < eps
			{
				stats.converged = true;
				break;
			}
		}
		stats.final_alpha = self.state.alpha();

		debug!(
			ticks = stats.ticks,
			converged = stats.converged,
			recovered = stats.recovered;
			"Layout run finished"
		);
		Ok(stats)
	}

	/// Final positions in input order.
	pub fn into_response(self) -> LayoutResponse {
		LayoutResponse {
			nodes: self.state.positioned_nodes(),
		}
	}
}

/// The state transition of one tick: cool, accumulate forces, integrate.
pub fn step(
	state: &mut SimulationState,
	forces: &mut ForceAccumulator,
	config: &LayoutConfig,
	alpha_decay: f64,
) -> Result<TickReport> {
	state.alpha += (config.alpha_target - state.alpha) * alpha_decay;
	let net = forces.accumulate(state);
	let report = integrate(state, net, config)?;
	state.tick += 1;
	Ok(report)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layout::types::{LayoutEdge, LayoutNode};

	fn chain(n: usize) -> LayoutRequest {
		let nodes = (0..n).map(|i| LayoutNode::new(format!("n{i}"))).collect();
		let edges = (1..n)
			.map(|i| LayoutEdge::new(format!("n{i}"), format!("n{}", i - 1)))
			.collect();
		LayoutRequest::new(nodes, edges, 800.0, 600.0)
	}

	#[test]
	fn runs_configured_tick_count_and_cools_to_alpha_min() {
		let mut sim = Simulation::new(&chain(4), LayoutConfig::default()).unwrap();
		let stats = sim.run().unwrap();
		assert_eq!(stats.ticks, 300);
		assert_eq!(sim.state().tick_count(), 300);
		assert!(!stats.converged);
		assert!((stats.final_alpha - 0.001).abs() < 1e-9);
	}

	#[test]
	fn convergence_epsilon_stops_early() {
		let config = LayoutConfig {
			ticks: 5000,
			convergence_epsilon: Some(0.05),
			..LayoutConfig::default()
		};
		let mut sim = Simulation::new(&chain(3), config).unwrap();
		let stats = sim.run().unwrap();
		assert!(stats.converged);
		assert!(stats.ticks < 5000);
	}

	#[test]
	fn empty_graph_runs_no_ticks() {
		let mut sim = Simulation::new(&LayoutRequest::new(vec![], vec![], 800.0, 600.0), LayoutConfig::default()).unwrap();
		assert_eq!(sim.run().unwrap().ticks, 0);
		assert!(sim.into_response().nodes.is_empty());
	}

	#[test]
	fn stepping_manually_matches_run() {
		let config = LayoutConfig {
			ticks: 40,
			..LayoutConfig::default()
		};
		let mut stepped = Simulation::new(&chain(5), config.clone()).unwrap();
		for _ in 0..40 {
			stepped.tick().unwrap();
		}
		let mut ran = Simulation::new(&chain(5), config).unwrap();
		ran.run().unwrap();
		assert_eq!(stepped.into_response(), ran.into_response());
	}

	#[test]
	fn invalid_config_is_rejected_before_any_tick() {
		let config = LayoutConfig {
			damping: 0.0,
			..LayoutConfig::default()
		};
		assert!(Simulation::new(&chain(2), config).is_err());
	}
}
