//! Property-based invariants of the layout engine.
//!
//! 1. Output ids equal input ids, in order, regardless of edges.
//! 2. Every output coordinate is finite.
//! 3. Pinned nodes never move.
//! 4. Runs are deterministic.

use depgraph_layout::{LayoutEdge, LayoutNode, LayoutRequest, layout};
use proptest::prelude::*;

fn request_strategy() -> impl Strategy<Value = LayoutRequest> {
	(0usize..24, 50.0f64..2000.0, 50.0f64..2000.0).prop_flat_map(|(n, width, height)| {
		let edge = (0..n + 3, 0..n + 3).prop_map(|(s, t)| LayoutEdge::new(s.to_string(), t.to_string()));
		let pins = proptest::collection::vec(any::<bool>(), n);
		let starts = proptest::collection::vec(prop::option::of((-500.0f64..500.0, -500.0f64..500.0)), n);
		(proptest::collection::vec(edge, 0..40), pins, starts).prop_map(move |(edges, pins, starts)| {
			let nodes = (0..n)
				.map(|i| {
					let mut node = LayoutNode::new(i.to_string());
					if let Some((x, y)) = starts[i] {
						node = node.at(x, y);
					}
					node.fixed = pins[i];
					node
				})
				.collect();
			LayoutRequest::new(nodes, edges, width, height).with_option("ticks", 80)
		})
	})
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(48))]

	#[test]
	fn ids_are_preserved_and_positions_finite(request in request_strategy()) {
		let response = layout(&request).unwrap();
		prop_assert_eq!(response.nodes.len(), request.nodes.len());
		for (input, output) in request.nodes.iter().zip(&response.nodes) {
			prop_assert_eq!(&input.id, &output.id);
			prop_assert!(output.x.is_finite() && output.y.is_finite(), "non-finite {:?}", output);
		}
	}

	#[test]
	fn pinned_nodes_with_positions_never_move(request in request_strategy()) {
		let response = layout(&request).unwrap();
		for (input, output) in request.nodes.iter().zip(&response.nodes) {
			if let (true, Some(x), Some(y)) = (input.fixed, input.x, input.y) {
				prop_assert_eq!(output.x, x);
				prop_assert_eq!(output.y, y);
			}
		}
	}

	#[test]
	fn layout_is_deterministic(request in request_strategy()) {
		prop_assert_eq!(layout(&request).unwrap(), layout(&request).unwrap());
	}
}
