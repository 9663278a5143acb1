//! The `Diagram` aggregate: a validated, immutable snapshot.
//!
//! Every edit returns a new `Diagram` and leaves `self` untouched. Node and
//! edge sequences live behind `Arc<[T]>`, so an edit that only touches nodes
//! shares the edge list with its predecessor (and vice versa) and cloning a
//! snapshot for a renderer is two reference-count bumps.
//!
//! Invariants checked on every construction:
//! - `name` is not blank and the viewport is finite with positive zoom
//! - every node and edge passes its own `validate`
//! - node ids are unique, edge ids are unique
//! - under [`EdgePolicy::Strict`], edge endpoints name existing nodes
//!
//! Node order is paint order: the last node is drawn on top.

use crate::config::{DiagramConfig, EdgePolicy};
use crate::error::{DiagramError, Result};
use crate::geometry::{Point, Position, ViewPort};
use crate::id::NodeId;
use crate::model::{DiagramEdge, DiagramNode, NodeData, RelationKind};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DiagramDocument", rename_all = "camelCase")]
pub struct Diagram {
    id: Uuid,
    name: String,
    nodes: Arc<[DiagramNode]>,
    edges: Arc<[DiagramEdge]>,
    #[serde(rename = "viewPort")]
    viewport: ViewPort,
    #[serde(skip)]
    config: DiagramConfig,
}

impl Diagram {
    /// Build a diagram with the default (strict) configuration.
    ///
    /// # Errors
    /// `InvalidDiagram` if any invariant listed in the module docs fails.
    /// Duplicate node ids are rejected, not merged.
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        nodes: impl IntoIterator<Item = DiagramNode>,
        edges: impl IntoIterator<Item = DiagramEdge>,
        viewport: ViewPort,
    ) -> Result<Self> {
        Self::assemble(
            id,
            name.into(),
            nodes.into_iter().collect(),
            edges.into_iter().collect(),
            viewport,
            DiagramConfig::default(),
        )
    }

    /// An empty diagram with a fresh id and the identity viewport.
    pub fn empty(name: impl Into<String>) -> Result<Self> {
        Self::new(Uuid::new_v4(), name, [], [], ViewPort::default())
    }

    pub fn builder() -> DiagramBuilder {
        DiagramBuilder::default()
    }

    fn assemble(
        id: Uuid,
        name: String,
        nodes: Arc<[DiagramNode]>,
        edges: Arc<[DiagramEdge]>,
        viewport: ViewPort,
        config: DiagramConfig,
    ) -> Result<Self> {
        let diagram = Self {
            id,
            name,
            nodes,
            edges,
            viewport,
            config,
        };
        diagram.validate()?;
        Ok(diagram)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DiagramError::invalid("diagram name is blank"));
        }
        self.viewport.validate()?;

        let mut node_ids = HashSet::with_capacity(self.nodes.len());
        for node in self.nodes.iter() {
            node.validate()?;
            if !node_ids.insert(node.id) {
                return Err(DiagramError::invalid(format!("duplicate node id {}", node.id)));
            }
        }

        let mut edge_ids = HashSet::with_capacity(self.edges.len());
        for edge in self.edges.iter() {
            edge.validate()?;
            if !edge_ids.insert(edge.id) {
                return Err(DiagramError::invalid(format!("duplicate edge id {}", edge.id)));
            }
            if self.config.edge_policy == EdgePolicy::Strict {
                for endpoint in [edge.source, edge.target] {
                    if !node_ids.contains(&endpoint) {
                        return Err(DiagramError::invalid(format!(
                            "edge {} references unknown node {endpoint}",
                            edge.id
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Derive a sibling snapshot with the same identity and viewport.
    fn replace(&self, nodes: Arc<[DiagramNode]>, edges: Arc<[DiagramEdge]>) -> Result<Self> {
        Self::assemble(
            self.id,
            self.name.clone(),
            nodes,
            edges,
            self.viewport,
            self.config,
        )
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[DiagramEdge] {
        &self.edges
    }

    pub fn viewport(&self) -> ViewPort {
        self.viewport
    }

    pub fn config(&self) -> DiagramConfig {
        self.config
    }

    pub fn node(&self, id: NodeId) -> Option<&DiagramNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: NodeId) -> Option<&DiagramEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Paint-order index of a node (higher is closer to the viewer).
    pub fn z_index(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Edges with `id` as either endpoint, in edge order.
    pub fn edges_of(&self, id: NodeId) -> SmallVec<[&DiagramEdge; 4]> {
        self.edges.iter().filter(|e| e.touches(id)).collect()
    }

    /// Edges whose source or target is not a node of this diagram.
    /// Always empty under [`EdgePolicy::Strict`].
    pub fn dangling_edges(&self) -> Vec<&DiagramEdge> {
        self.edges
            .iter()
            .filter(|e| !self.contains_node(e.source) || !self.contains_node(e.target))
            .collect()
    }

    // ─── Node edits ──────────────────────────────────────────────────────

    /// Insert `node`, replacing any node with the same id in place (its
    /// z-order slot is kept). New ids are appended on top.
    pub fn with_node(&self, node: DiagramNode) -> Result<Self> {
        node.validate()?;
        let mut nodes = self.nodes.to_vec();
        match nodes.iter().position(|n| n.id == node.id) {
            Some(i) => nodes[i] = node,
            None => nodes.push(node),
        }
        self.replace(nodes.into(), Arc::clone(&self.edges))
    }

    pub fn move_node(&self, id: NodeId, position: Position) -> Result<Self> {
        let i = self.z_index(id).ok_or(DiagramError::NodeNotFound(id))?;
        let mut nodes = self.nodes.to_vec();
        nodes[i].position = position;
        self.replace(nodes.into(), Arc::clone(&self.edges))
    }

    pub fn with_node_data(&self, id: NodeId, data: NodeData) -> Result<Self> {
        let i = self.z_index(id).ok_or(DiagramError::NodeNotFound(id))?;
        let mut nodes = self.nodes.to_vec();
        nodes[i].data = data;
        self.replace(nodes.into(), Arc::clone(&self.edges))
    }

    /// Remove a node together with every edge that touches it.
    pub fn without_node(&self, id: NodeId) -> Result<Self> {
        if !self.contains_node(id) {
            return Err(DiagramError::NodeNotFound(id));
        }
        let nodes: Arc<[DiagramNode]> = self.nodes.iter().filter(|n| n.id != id).cloned().collect();
        let edges: Arc<[DiagramEdge]> = self.edges.iter().filter(|e| !e.touches(id)).cloned().collect();
        self.replace(nodes, edges)
    }

    /// Copy a node under a fresh id, shifted by `offset`, on top of the stack.
    /// Returns the new snapshot and the copy's id.
    pub fn duplicate_node(&self, id: NodeId, offset: Point) -> Result<(Self, NodeId)> {
        let original = self.node(id).ok_or(DiagramError::NodeNotFound(id))?;
        let copy_id = loop {
            let candidate = NodeId::with_prefix(original.id.as_str());
            if !self.contains_node(candidate) {
                break candidate;
            }
        };
        let mut copy = original.clone();
        copy.id = copy_id;
        copy.position = Position::from(original.position.to_point() + offset);
        copy.data.label = format!("{} (Copy)", original.data.label);

        let mut nodes = self.nodes.to_vec();
        nodes.push(copy);
        Ok((self.replace(nodes.into(), Arc::clone(&self.edges))?, copy_id))
    }

    /// Move a node to the top of the paint order.
    pub fn bring_to_front(&self, id: NodeId) -> Result<Self> {
        let i = self.z_index(id).ok_or(DiagramError::NodeNotFound(id))?;
        if i + 1 == self.nodes.len() {
            return Ok(self.clone());
        }
        let mut nodes = self.nodes.to_vec();
        let node = nodes.remove(i);
        nodes.push(node);
        self.replace(nodes.into(), Arc::clone(&self.edges))
    }

    /// Move a node to the bottom of the paint order.
    pub fn send_to_back(&self, id: NodeId) -> Result<Self> {
        let i = self.z_index(id).ok_or(DiagramError::NodeNotFound(id))?;
        if i == 0 {
            return Ok(self.clone());
        }
        let mut nodes = self.nodes.to_vec();
        let node = nodes.remove(i);
        nodes.insert(0, node);
        self.replace(nodes.into(), Arc::clone(&self.edges))
    }

    // ─── Edge edits ──────────────────────────────────────────────────────

    /// Insert `edge`, replacing any edge with the same id in place.
    pub fn with_edge(&self, edge: DiagramEdge) -> Result<Self> {
        edge.validate()?;
        let mut edges = self.edges.to_vec();
        match edges.iter().position(|e| e.id == edge.id) {
            Some(i) => edges[i] = edge,
            None => edges.push(edge),
        }
        self.replace(Arc::clone(&self.nodes), edges.into())
    }

    pub fn without_edge(&self, id: NodeId) -> Result<Self> {
        if self.edge(id).is_none() {
            return Err(DiagramError::EdgeNotFound(id));
        }
        let edges: Arc<[DiagramEdge]> = self.edges.iter().filter(|e| e.id != id).cloned().collect();
        self.replace(Arc::clone(&self.nodes), edges)
    }

    pub fn reversed_edge(&self, id: NodeId) -> Result<Self> {
        self.map_edge(id, |e| *e = e.reversed())
    }

    /// Change an edge's relation kind. No connection rules are re-checked;
    /// use [`Diagram::connect`] for rule-checked insertion.
    pub fn with_relation(&self, id: NodeId, relation: RelationKind) -> Result<Self> {
        self.map_edge(id, |e| e.relation = relation)
    }

    pub(crate) fn map_edge(&self, id: NodeId, f: impl FnOnce(&mut DiagramEdge)) -> Result<Self> {
        let i = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or(DiagramError::EdgeNotFound(id))?;
        let mut edges = self.edges.to_vec();
        f(&mut edges[i]);
        self.replace(Arc::clone(&self.nodes), edges.into())
    }

    pub(crate) fn with_edges(&self, edges: Vec<DiagramEdge>) -> Result<Self> {
        self.replace(Arc::clone(&self.nodes), edges.into())
    }

    // ─── Diagram-level edits ─────────────────────────────────────────────

    pub fn renamed(&self, name: impl Into<String>) -> Result<Self> {
        Self::assemble(
            self.id,
            name.into(),
            Arc::clone(&self.nodes),
            Arc::clone(&self.edges),
            self.viewport,
            self.config,
        )
    }

    pub fn with_viewport(&self, viewport: ViewPort) -> Result<Self> {
        viewport.validate()?;
        Ok(Self {
            viewport,
            ..self.clone()
        })
    }

    /// Drop every node and edge, keeping identity, name and viewport.
    pub fn cleared(&self) -> Self {
        Self {
            nodes: Vec::new().into(),
            edges: Vec::new().into(),
            ..self.clone()
        }
    }
}

// ─── Builder ─────────────────────────────────────────────────────────────

/// Field-by-field construction where any field may be missing.
/// Missing id, name or viewport is reported as `InvalidDiagram` by `build`.
#[derive(Debug, Clone, Default)]
pub struct DiagramBuilder {
    id: Option<Uuid>,
    name: Option<String>,
    nodes: Vec<DiagramNode>,
    edges: Vec<DiagramEdge>,
    viewport: Option<ViewPort>,
    config: DiagramConfig,
}

impl DiagramBuilder {
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn node(mut self, node: DiagramNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(mut self, nodes: impl IntoIterator<Item = DiagramNode>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn edge(mut self, edge: DiagramEdge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn edges(mut self, edges: impl IntoIterator<Item = DiagramEdge>) -> Self {
        self.edges.extend(edges);
        self
    }

    pub fn viewport(mut self, viewport: ViewPort) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn config(mut self, config: DiagramConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Diagram> {
        let id = self
            .id
            .ok_or_else(|| DiagramError::invalid("diagram id is missing"))?;
        let name = self
            .name
            .ok_or_else(|| DiagramError::invalid("diagram name is missing"))?;
        let viewport = self
            .viewport
            .ok_or_else(|| DiagramError::invalid("diagram viewport is missing"))?;
        Diagram::assemble(
            id,
            name,
            self.nodes.into(),
            self.edges.into(),
            viewport,
            self.config,
        )
    }
}

/// Wire shape of a diagram, read without validation.
///
/// The edge policy is not part of the wire shape: deserializing straight
/// into [`Diagram`] always applies [`EdgePolicy::Strict`]. Read a
/// `DiagramDocument` and call [`into_diagram`](Self::into_diagram) to load
/// data that was saved under a different policy. Every field may be absent
/// so that missing data surfaces as `InvalidDiagram` instead of a serde
/// error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDocument {
    id: Option<Uuid>,
    name: Option<String>,
    #[serde(default)]
    nodes: Option<Vec<DiagramNode>>,
    #[serde(default)]
    edges: Option<Vec<DiagramEdge>>,
    view_port: Option<ViewPort>,
}

impl DiagramDocument {
    /// Validate under `config` and build the diagram.
    pub fn into_diagram(self, config: DiagramConfig) -> Result<Diagram> {
        let mut builder = Diagram::builder()
            .config(config)
            .nodes(self.nodes.unwrap_or_default())
            .edges(self.edges.unwrap_or_default());
        if let Some(id) = self.id {
            builder = builder.id(id);
        }
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if let Some(viewport) = self.view_port {
            builder = builder.viewport(viewport);
        }
        builder.build()
    }
}

impl TryFrom<DiagramDocument> for Diagram {
    type Error = DiagramError;

    fn try_from(doc: DiagramDocument) -> Result<Self> {
        doc.into_diagram(DiagramConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;
    use pretty_assertions::assert_eq;

    fn node(id: &str, x: f64, y: f64) -> DiagramNode {
        DiagramNode::new(
            id,
            NodeKind::UmlClass,
            Position { x, y },
            NodeData::new(id),
        )
        .unwrap()
    }

    fn edge(id: &str, from: &str, to: &str) -> DiagramEdge {
        DiagramEdge::new(id, from, to).unwrap()
    }

    fn sample() -> Diagram {
        Diagram::new(
            Uuid::nil(),
            "Zoo",
            [node("a", 0.0, 0.0), node("b", 100.0, 0.0), node("c", 200.0, 0.0)],
            [edge("ab", "a", "b"), edge("bc", "b", "c")],
            ViewPort::default(),
        )
        .unwrap()
    }

    fn ids(d: &Diagram) -> Vec<&str> {
        d.nodes().iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn rejects_blank_name() {
        let err = Diagram::new(Uuid::new_v4(), "   ", [], [], ViewPort::default()).unwrap_err();
        assert!(matches!(err, DiagramError::InvalidDiagram(_)));
    }

    #[test]
    fn rejects_duplicate_node_ids() {
        let res = Diagram::new(
            Uuid::new_v4(),
            "Dupes",
            [node("1", 0.0, 0.0), node("1", 5.0, 5.0)],
            [],
            ViewPort::default(),
        );
        assert!(matches!(res, Err(DiagramError::InvalidDiagram(_))));
    }

    #[test]
    fn rejects_duplicate_edge_ids() {
        let res = Diagram::new(
            Uuid::new_v4(),
            "Dupes",
            [node("a", 0.0, 0.0), node("b", 0.0, 0.0)],
            [edge("e", "a", "b"), edge("e", "b", "a")],
            ViewPort::default(),
        );
        assert!(matches!(res, Err(DiagramError::InvalidDiagram(_))));
    }

    #[test]
    fn with_node_replaces_in_place() {
        let d = sample();
        let moved = node("a", 42.0, 42.0);
        let d2 = d.with_node(moved.clone()).unwrap();
        assert_eq!(ids(&d2), vec!["a", "b", "c"]);
        assert_eq!(d2.node(NodeId::intern("a")), Some(&moved));
        // Original untouched.
        assert_eq!(d.node(NodeId::intern("a")).unwrap().position, Position::default());
    }

    #[test]
    fn with_node_appends_new_ids() {
        let d = sample().with_node(node("d", 1.0, 1.0)).unwrap();
        assert_eq!(ids(&d), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn with_node_rejects_invalid_node() {
        let mut bad = node("x", 0.0, 0.0);
        bad.position.x = f64::NAN;
        assert!(sample().with_node(bad).is_err());
    }

    #[test]
    fn with_edge_replaces_in_place() {
        let d = sample();
        let relabeled = edge("ab", "a", "c")
            .with_label("owns")
            .with_relation(RelationKind::Composition);
        let d2 = d.with_edge(relabeled.clone()).unwrap();

        assert_eq!(d2.edges().len(), 2);
        let order: Vec<&str> = d2.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["ab", "bc"]);
        assert_eq!(d2.edge(NodeId::intern("ab")), Some(&relabeled));
        assert_eq!(d.edge(NodeId::intern("ab")).unwrap().target, NodeId::intern("b"));
    }

    #[test]
    fn move_node_shares_edges() {
        let d = sample();
        let d2 = d
            .move_node(NodeId::intern("b"), Position { x: 7.0, y: 8.0 })
            .unwrap();
        assert_eq!(
            d2.node(NodeId::intern("b")).unwrap().position,
            Position { x: 7.0, y: 8.0 }
        );
        assert!(Arc::ptr_eq(&d.edges, &d2.edges));
    }

    #[test]
    fn move_missing_node_fails() {
        let d = sample();
        let err = d
            .move_node(NodeId::intern("missing-id"), Position::default())
            .unwrap_err();
        assert_eq!(err, DiagramError::NodeNotFound(NodeId::intern("missing-id")));
        assert_eq!(d, sample());
    }

    #[test]
    fn without_node_cascades_edges() {
        let d = sample().without_node(NodeId::intern("b")).unwrap();
        assert_eq!(ids(&d), vec!["a", "c"]);
        assert!(d.edges().is_empty());
    }

    #[test]
    fn without_edge_requires_existing_edge() {
        let d = sample();
        assert_eq!(
            d.without_edge(NodeId::intern("zz")).unwrap_err(),
            DiagramError::EdgeNotFound(NodeId::intern("zz"))
        );
        let d2 = d.without_edge(NodeId::intern("ab")).unwrap();
        assert_eq!(d2.edges().len(), 1);
    }

    #[test]
    fn z_order_moves() {
        let d = sample();
        let front = d.bring_to_front(NodeId::intern("a")).unwrap();
        assert_eq!(ids(&front), vec!["b", "c", "a"]);
        let back = front.send_to_back(NodeId::intern("c")).unwrap();
        assert_eq!(ids(&back), vec!["c", "b", "a"]);
        // Already on top: same contents.
        assert_eq!(front.bring_to_front(NodeId::intern("a")).unwrap(), front);
    }

    #[test]
    fn duplicate_node_offsets_and_relabels() {
        let (d, copy) = sample()
            .duplicate_node(NodeId::intern("a"), Point::new(50.0, 50.0))
            .unwrap();
        let n = d.node(copy).unwrap();
        assert_eq!(n.position, Position { x: 50.0, y: 50.0 });
        assert_eq!(n.data.label, "a (Copy)");
        assert_eq!(d.z_index(copy), Some(3));
        assert!(d.edges_of(copy).is_empty());
    }

    #[test]
    fn renamed_validates() {
        let d = sample();
        assert!(d.renamed("").is_err());
        assert_eq!(d.renamed("Farm").unwrap().name(), "Farm");
    }

    #[test]
    fn cleared_keeps_identity() {
        let d = sample().cleared();
        assert!(d.nodes().is_empty());
        assert!(d.edges().is_empty());
        assert_eq!(d.name(), "Zoo");
        assert_eq!(d.id(), Uuid::nil());
    }

    #[test]
    fn builder_reports_missing_fields() {
        let no_id = Diagram::builder()
            .name("x")
            .viewport(ViewPort::default())
            .build();
        assert!(matches!(no_id, Err(DiagramError::InvalidDiagram(_))));

        let no_viewport = Diagram::builder().id(Uuid::new_v4()).name("x").build();
        assert!(matches!(no_viewport, Err(DiagramError::InvalidDiagram(_))));

        let no_name = Diagram::builder()
            .id(Uuid::new_v4())
            .viewport(ViewPort::default())
            .build();
        assert!(matches!(no_name, Err(DiagramError::InvalidDiagram(_))));
    }
}
