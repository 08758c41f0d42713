//! Force-directed layout engine for dependency graphs.
//!
//! Given nodes, directed edges and a viewport, [`layout`] computes a finite
//! 2D position per node by simulating link springs, many-body repulsion,
//! a centering pull and collision avoidance. Every call is self-contained;
//! seed node positions from a previous response to warm-start.
//!
//! The engine can run inline, on a background thread via [`LayoutWorker`],
//! as a separate process (the `depgraph-layout` binary), or inside a browser
//! Web Worker through the wasm32 bindings.
//!
//! ```
//! use depgraph_layout::{LayoutEdge, LayoutNode, LayoutRequest, layout};
//!
//! let request = LayoutRequest::new(
//! 	vec![LayoutNode::new("app"), LayoutNode::new("core")],
//! 	vec![LayoutEdge::new("app", "core")],
//! 	800.0,
//! 	600.0,
//! );
//! let response = layout(&request).unwrap();
//! assert_eq!(response.nodes.len(), 2);
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod error;
pub mod layout;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(not(target_arch = "wasm32"))]
mod worker;

pub use error::{LayoutError, Result};
pub use layout::{
	DivergencePolicy, LayoutConfig, LayoutEdge, LayoutNode, LayoutRequest, LayoutResponse,
	PositionedNode, RunStats, Simulation, Viewport, layout, layout_json, layout_with_config,
	layout_with_stats,
};
#[cfg(target_arch = "wasm32")]
pub use wasm::init_logging;
#[cfg(not(target_arch = "wasm32"))]
pub use worker::{LayoutWorker, PendingLayout};
