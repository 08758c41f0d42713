//! Barnes-Hut quadtree over node positions.
//!
//! Cells store the centroid and point count of everything beneath them, so
//! a far-away cell can stand in for all of its points in the many-body sum.

use super::vector::Vec2;

const MAX_DEPTH: usize = 32;

#[derive(Clone, Copy, Debug)]
struct Bounds {
	min: Vec2,
	size: f64,
}

impl Bounds {
	fn contains(&self, p: Vec2) -> bool {
		p.x >= self.min.x
			&& p.x <= self.min.x + self.size
			&& p.y >= self.min.y
			&& p.y <= self.min.y + self.size
	}

	fn quadrant(&self, p: Vec2) -> usize {
		let half = self.size / 2.0;
		let right = p.x >= self.min.x + half;
		let bottom = p.y >= self.min.y + half;
		usize::from(right) | (usize::from(bottom) << 1)
	}

	fn child(&self, quadrant: usize) -> Bounds {
		let half = self.size / 2.0;
		let dx = if quadrant & 1 == 1 { half } else { 0.0 };
		let dy = if quadrant & 2 == 2 { half } else { 0.0 };
		Bounds {
			min: Vec2::new(self.min.x + dx, self.min.y + dy),
			size: half,
		}
	}
}

#[derive(Clone, Debug)]
struct Cell {
	bounds: Bounds,
	centroid: Vec2,
	count: usize,
	children: [Option<usize>; 4],
	/// Point indices, only populated on leaves.
	points: Vec<usize>,
}

/// Read-only spatial index built once per tick.
#[derive(Clone, Debug)]
pub(crate) struct QuadTree {
	cells: Vec<Cell>,
}

/// A source of repulsion as seen from one query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Interaction {
	/// An individual point with its index.
	Point(usize),
	/// An aggregated cell: centroid and number of points.
	Cluster(Vec2, usize),
}

impl QuadTree {
	pub(crate) fn build(points: &[Vec2]) -> Self {
		let mut tree = QuadTree { cells: Vec::new() };
		if points.is_empty() {
			return tree;
		}
		let (mut min, mut max) = (points[0], points[0]);
		for p in points {
			min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
			max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
		}
		let size = (max.x - min.x).max(max.y - min.y).max(1.0);
		let indices = (0..points.len()).collect();
		tree.build_cell(points, indices, Bounds { min, size }, 0);
		tree
	}

	fn build_cell(&mut self, points: &[Vec2], indices: Vec<usize>, bounds: Bounds, depth: usize) -> usize {
		let sum = indices
			.iter()
			.fold(Vec2::ZERO, |acc, &i| acc + points[i]);
		let count = indices.len();
		let id = self.cells.len();
		self.cells.push(Cell {
			bounds,
			centroid: Vec2::new(sum.x / count as f64, sum.y / count as f64),
			count,
			children: [None; 4],
			points: Vec::new(),
		});

		let first = points[indices[0]];
		let coincident = indices.iter().all(|&i| points[i] == first);
		if count == 1 || coincident || depth >= MAX_DEPTH {
			self.cells[id].points = indices;
			return id;
		}

		let mut buckets: [Vec<usize>; 4] = Default::default();
		for i in indices {
			buckets[bounds.quadrant(points[i])].push(i);
		}
		for (quadrant, bucket) in buckets.into_iter().enumerate() {
			if bucket.is_empty() {
				continue;
			}
			let child = self.build_cell(points, bucket, bounds.child(quadrant), depth + 1);
			self.cells[id].children[quadrant] = Some(child);
		}
		id
	}

	/// Visits every interaction acting on `position`, opening cells whose
	/// `size / distance` ratio is at least `theta` and any cell that contains
	/// the query point itself.
	pub(crate) fn visit(&self, position: Vec2, theta: f64, mut f: impl FnMut(Interaction)) {
		if self.cells.is_empty() {
			return;
		}
		let theta2 = theta * theta;
		let mut stack = vec![0];
		while let Some(id) = stack.pop() {
			let cell = &self.cells[id];
			let is_leaf = cell.children.iter().all(Option::is_none);
			if is_leaf {
				for &i in &cell.points {
					f(Interaction::Point(i));
				}
				continue;
			}
			let dist2 = (cell.centroid - position).length_squared();
			let far = cell.bounds.size * cell.bounds.size < theta2 * dist2;
			if far && !cell.bounds.contains(position) {
				f(Interaction::Cluster(cell.centroid, cell.count));
				continue;
			}
			stack.extend(cell.children.iter().flatten().copied());
		}
	}
}
