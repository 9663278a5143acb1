//! UML connection rules and edge handle placement.
//!
//! Legal relations by node kind (notes are handled separately):
//!
//! | Relation        | Sources                    | Targets                          |
//! |-----------------|----------------------------|----------------------------------|
//! | Inheritance     | class, abstract, interface | same family (interface ↔ interface, class-like ↔ class-like) |
//! | Implementation  | class, abstract, enum      | interface                        |
//! | everything else | any non-note               | any non-note                     |

use crate::config::NodeMetrics;
use crate::diagram::Diagram;
use crate::error::{DiagramError, Result};
use crate::geometry::{Bounds, Point};
use crate::id::NodeId;
use crate::model::{DiagramEdge, Handle, NodeKind, RelationKind};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Handles an edge may leave from.
pub const SOURCE_HANDLES: [Handle; 2] = [Handle::Right, Handle::Bottom];
/// Handles an edge may arrive at.
pub const TARGET_HANDLES: [Handle; 2] = [Handle::Top, Handle::Left];

/// Whether `relation` may go from a `source` kind to a `target` kind.
/// Anything touching a note is allowed.
pub fn can_connect(source: NodeKind, target: NodeKind, relation: RelationKind) -> bool {
    use NodeKind::*;

    if source.is_note() || target.is_note() {
        return true;
    }
    match relation {
        RelationKind::Inheritance => {
            let in_family = |k: NodeKind| matches!(k, UmlClass | Abstract | Interface);
            in_family(source)
                && in_family(target)
                && (source == Interface) == (target == Interface)
        }
        RelationKind::Implementation => {
            matches!(source, UmlClass | Abstract | Enum) && target == Interface
        }
        RelationKind::Association
        | RelationKind::Dependency
        | RelationKind::Aggregation
        | RelationKind::Composition => true,
    }
}

impl Handle {
    /// Attachment point of this handle on a node box.
    pub fn anchor(self, b: &Bounds) -> Point {
        match self {
            Handle::Top => Point::new(b.x + b.width / 2.0, b.y),
            Handle::Bottom => Point::new(b.x + b.width / 2.0, b.y + b.height),
            Handle::Left => Point::new(b.x, b.y + b.height / 2.0),
            Handle::Right => Point::new(b.x + b.width, b.y + b.height / 2.0),
        }
    }
}

/// Pick the source/target handle pair with the shortest straight distance.
/// Ties keep the earlier pair (Right before Bottom, Top before Left).
pub fn smart_handles(source: &Bounds, target: &Bounds) -> (Handle, Handle) {
    let mut best = (SOURCE_HANDLES[0], TARGET_HANDLES[1]);
    let mut min = f64::INFINITY;
    for src in SOURCE_HANDLES {
        for tgt in TARGET_HANDLES {
            let d = src.anchor(source).distance(tgt.anchor(target));
            if d < min {
                min = d;
                best = (src, tgt);
            }
        }
    }
    best
}

impl Diagram {
    /// Insert an edge after checking UML semantics on top of the structural
    /// checks of [`Diagram::with_edge`]:
    ///
    /// - both endpoints must exist, regardless of the edge policy
    /// - notes never receive edges
    /// - one edge per (source, target) pair
    /// - the relation must be legal for the endpoint kinds ([`can_connect`])
    /// - inheritance/implementation edges may not close a cycle
    pub fn connect(&self, edge: DiagramEdge) -> Result<Self> {
        edge.validate()?;
        let source = self
            .node(edge.source)
            .ok_or(DiagramError::NodeNotFound(edge.source))?;
        let target = self
            .node(edge.target)
            .ok_or(DiagramError::NodeNotFound(edge.target))?;

        let rejected = || DiagramError::InvalidConnection {
            relation: edge.relation,
            from: source.id,
            from_kind: source.kind,
            to: target.id,
            to_kind: target.kind,
        };

        if target.kind.is_note() {
            log::debug!("connect: note {} cannot be an edge target", target.id);
            return Err(rejected());
        }
        let duplicate = self
            .edges()
            .iter()
            .any(|e| e.id != edge.id && e.source == edge.source && e.target == edge.target);
        if duplicate {
            log::debug!("connect: {} -> {} already connected", source.id, target.id);
            return Err(rejected());
        }
        if !source.kind.is_note() && !can_connect(source.kind, target.kind, edge.relation) {
            return Err(rejected());
        }
        if edge.relation.is_generalization()
            && self.reaches_by_generalization(target.id, source.id, edge.id)
        {
            log::debug!("connect: {} -> {} would close a cycle", source.id, target.id);
            return Err(rejected());
        }

        self.with_edge(edge)
    }

    /// True if `to` is reachable from `from` through generalization edges,
    /// ignoring the edge `skip`. A node always reaches itself.
    fn reaches_by_generalization(&self, from: NodeId, to: NodeId, skip: NodeId) -> bool {
        if from == to {
            return true;
        }
        let mut graph: DiGraph<NodeId, ()> = DiGraph::new();
        let mut index: HashMap<NodeId, NodeIndex> = HashMap::new();
        let mut idx_of = |g: &mut DiGraph<NodeId, ()>, id: NodeId| {
            *index.entry(id).or_insert_with(|| g.add_node(id))
        };

        let from_idx = idx_of(&mut graph, from);
        let to_idx = idx_of(&mut graph, to);
        for e in self.edges() {
            if e.id == skip || !e.relation.is_generalization() {
                continue;
            }
            let s = idx_of(&mut graph, e.source);
            let t = idx_of(&mut graph, e.target);
            graph.add_edge(s, t, ());
        }
        has_path_connecting(&graph, from_idx, to_idx, None)
    }

    /// Re-pick handles for every edge touching `id` (call after a move).
    /// Edges with a missing endpoint keep their handles.
    pub fn recalculate_handles(&self, id: NodeId, metrics: &NodeMetrics) -> Result<Self> {
        if !self.contains_node(id) {
            return Err(DiagramError::NodeNotFound(id));
        }
        let edges = self
            .edges()
            .iter()
            .map(|e| {
                let mut e = e.clone();
                if e.touches(id)
                    && let (Some(s), Some(t)) = (self.node(e.source), self.node(e.target))
                {
                    let (sh, th) = smart_handles(&metrics.bounds_of(s), &metrics.bounds_of(t));
                    e.source_handle = Some(sh);
                    e.target_handle = Some(th);
                }
                e
            })
            .collect();
        self.with_edges(edges)
    }

    /// Pick handles for a single edge from its endpoints' current boxes
    /// (e.g. after [`Diagram::reversed_edge`]). A missing endpoint leaves
    /// the edge as it is.
    pub fn place_handles(&self, edge_id: NodeId, metrics: &NodeMetrics) -> Result<Self> {
        let edge = self.edge(edge_id).ok_or(DiagramError::EdgeNotFound(edge_id))?;
        let (Some(s), Some(t)) = (self.node(edge.source), self.node(edge.target)) else {
            return Ok(self.clone());
        };
        let (sh, th) = smart_handles(&metrics.bounds_of(s), &metrics.bounds_of(t));
        self.map_edge(edge_id, |e| {
            e.source_handle = Some(sh);
            e.target_handle = Some(th);
        })
    }
}
