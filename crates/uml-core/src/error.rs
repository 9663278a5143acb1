//! Domain errors for diagram construction and editing.
//!
//! Construction is all-or-nothing: any of these errors means the attempted
//! snapshot was never built and the caller's previous `Diagram` is untouched.

use crate::id::NodeId;
use crate::model::{NodeKind, RelationKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    /// A required field is missing, blank, non-finite, or a structural
    /// invariant (unique ids, edge endpoints) does not hold.
    #[error("invalid diagram: {0}")]
    InvalidDiagram(String),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("edge not found: {0}")]
    EdgeNotFound(NodeId),

    /// A new node's default box would overlap an existing node.
    #[error("position ({x}, {y}) is occupied by {by}")]
    Occupied { x: f64, y: f64, by: NodeId },

    /// The relation is not legal between the two node kinds, or would
    /// close an inheritance cycle.
    #[error("cannot connect {from_kind:?} {from} to {to_kind:?} {to} via {relation:?}")]
    InvalidConnection {
        relation: RelationKind,
        from: NodeId,
        from_kind: NodeKind,
        to: NodeId,
        to_kind: NodeKind,
    },
}

impl DiagramError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidDiagram(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DiagramError>;
