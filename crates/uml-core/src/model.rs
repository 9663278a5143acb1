//! Diagram elements: class-box nodes and the edges between them.
//!
//! Each element checks its own invariants in `new` / `validate`. Fields stay
//! public for ergonomic reads and struct updates; the owning [`Diagram`]
//! re-validates every element it is built from, so an invalid element can
//! never end up inside a snapshot.
//!
//! [`Diagram`]: crate::diagram::Diagram

use crate::error::{DiagramError, Result};
use crate::geometry::Position;
use crate::id::NodeId;
use serde::{Deserialize, Serialize};

// ─── Node kinds ──────────────────────────────────────────────────────────

/// The closed set of node kinds a diagram can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    #[default]
    UmlClass,
    Interface,
    Abstract,
    Enum,
    /// Free-text annotation box.
    Note,
}

impl NodeKind {
    pub fn is_note(self) -> bool {
        matches!(self, NodeKind::Note)
    }

    /// Default label for a freshly created node of this kind.
    pub fn default_label(self) -> &'static str {
        match self {
            NodeKind::UmlClass => "New class",
            NodeKind::Interface => "New interface",
            NodeKind::Abstract => "New abstract",
            NodeKind::Enum => "New enum",
            NodeKind::Note => "Note",
        }
    }
}

// ─── Node data ───────────────────────────────────────────────────────────

/// Text content of a class box, rendered top to bottom:
/// label, attributes, then methods.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stereotype: Option<String>,
}

impl NodeData {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stereotype(mut self, stereotype: impl Into<String>) -> Self {
        self.stereotype = Some(stereotype.into());
        self
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A positioned box on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    pub data: NodeData,
}

impl DiagramNode {
    pub fn new(
        id: impl Into<NodeId>,
        kind: NodeKind,
        position: Position,
        data: NodeData,
    ) -> Result<Self> {
        let node = Self {
            id: id.into(),
            kind,
            position,
            data,
        };
        node.validate()?;
        Ok(node)
    }

    /// Check the node's own invariants: non-empty id, finite position.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(DiagramError::invalid("node id is empty"));
        }
        self.position.validate()
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// UML relationship drawn by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    #[default]
    Association,
    Inheritance,
    Implementation,
    Dependency,
    Aggregation,
    Composition,
}

impl RelationKind {
    /// Relations that form the generalization hierarchy (must stay acyclic).
    pub fn is_generalization(self) -> bool {
        matches!(self, RelationKind::Inheritance | RelationKind::Implementation)
    }
}

/// Side of a node box an edge attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Handle {
    Top,
    Right,
    Bottom,
    Left,
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramEdge {
    pub id: NodeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub animated: bool,
    #[serde(default)]
    pub relation: RelationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_multiplicity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_multiplicity: Option<String>,
}

impl DiagramEdge {
    pub fn new(
        id: impl Into<NodeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Result<Self> {
        let edge = Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
            animated: false,
            relation: RelationKind::default(),
            source_handle: None,
            target_handle: None,
            source_multiplicity: None,
            target_multiplicity: None,
        };
        edge.validate()?;
        Ok(edge)
    }

    /// Check the edge's own invariants: id, source and target non-blank.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_blank() {
            return Err(DiagramError::invalid("edge id is blank"));
        }
        if self.source.is_blank() {
            return Err(DiagramError::invalid(format!("edge {} has a blank source", self.id)));
        }
        if self.target.is_blank() {
            return Err(DiagramError::invalid(format!("edge {} has a blank target", self.id)));
        }
        Ok(())
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_relation(mut self, relation: RelationKind) -> Self {
        self.relation = relation;
        self
    }

    pub fn with_animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    pub fn with_multiplicity(
        mut self,
        source: Option<impl Into<String>>,
        target: Option<impl Into<String>>,
    ) -> Self {
        self.source_multiplicity = source.map(Into::into);
        self.target_multiplicity = target.map(Into::into);
        self
    }

    /// True if either endpoint is `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }

    /// Same edge pointing the other way. Handles are dropped since the
    /// source/target handle sets differ; multiplicities swap ends.
    pub fn reversed(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
            source_handle: None,
            target_handle: None,
            source_multiplicity: self.target_multiplicity.clone(),
            target_multiplicity: self.source_multiplicity.clone(),
            ..self.clone()
        }
    }
}
