#![allow(dead_code)]

use depgraph_layout::{LayoutEdge, LayoutNode, LayoutRequest, LayoutResponse};

/// Random tree: node `i` depends on a pseudo-random earlier node.
pub fn sample_tree(n: usize, width: f64, height: f64) -> LayoutRequest {
	let nodes = (0..n).map(|i| LayoutNode::new(i.to_string())).collect();
	let edges = (1..n)
		.map(|i| {
			let target = (rand_simple(i) * (i as f64)) as usize;
			LayoutEdge::new(i.to_string(), target.to_string())
		})
		.collect();
	LayoutRequest::new(nodes, edges, width, height)
}

/// Simple pseudo-random number generator (deterministic for consistency).
pub fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

pub fn distance(response: &LayoutResponse, a: &str, b: &str) -> f64 {
	let (pa, pb) = (response.position(a).unwrap(), response.position(b).unwrap());
	(pa - pb).length()
}
