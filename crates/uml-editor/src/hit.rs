//! Hit testing: canvas point → node lookup.
//!
//! Walks the node list back to front (last painted = topmost) so the node
//! the user sees on top is the one that gets the pointer.

use smallvec::SmallVec;
use uml_core::{Bounds, Diagram, NodeId, NodeMetrics, Point};

/// Find the topmost node at canvas position `p`.
/// Returns `None` if the point is over the background.
pub fn hit_test(diagram: &Diagram, metrics: &NodeMetrics, p: Point) -> Option<NodeId> {
    diagram
        .nodes()
        .iter()
        .rev()
        .find(|n| metrics.bounds_of(n).contains(p))
        .map(|n| n.id)
}

/// All nodes whose box intersects `rect`, in paint order.
/// Used for marquee (box) selection.
pub fn hit_test_rect(diagram: &Diagram, metrics: &NodeMetrics, rect: &Bounds) -> SmallVec<[NodeId; 8]> {
    diagram
        .nodes()
        .iter()
        .filter(|n| metrics.bounds_of(n).intersects(rect))
        .map(|n| n.id)
        .collect()
}

/// Union of every node box, or `None` for an empty diagram.
pub fn content_bounds(diagram: &Diagram, metrics: &NodeMetrics) -> Option<Bounds> {
    diagram
        .nodes()
        .iter()
        .map(|n| metrics.bounds_of(n))
        .reduce(|a, b| a.union(&b))
}
