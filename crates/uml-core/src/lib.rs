pub mod config;
pub mod connection;
pub mod diagram;
pub mod error;
pub mod geometry;
pub mod id;
pub mod model;

pub use config::{CanvasConfig, DiagramConfig, EdgePolicy, NodeMetrics};
pub use connection::{can_connect, smart_handles};
pub use diagram::{Diagram, DiagramBuilder, DiagramDocument};
pub use error::{DiagramError, Result};
pub use geometry::{Bounds, Point, Position, ViewPort};
pub use id::NodeId;
pub use model::*;

// Re-export uuid so downstream crates don't need a direct dependency
pub use uuid::Uuid;
