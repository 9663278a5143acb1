//! Named configuration for the model and the canvas engine.
//!
//! Nothing here is a process-wide global: every engine receives its config
//! at construction and keeps its own copy.

use crate::geometry::{Bounds, Position};
use crate::id::NodeId;
use crate::model::DiagramNode;
use std::collections::HashMap;

/// Lowest zoom the canvas engine will settle on.
pub const MIN_ZOOM: f64 = 0.1;
/// Highest zoom the canvas engine will settle on.
pub const MAX_ZOOM: f64 = 5.0;
/// Multiplicative zoom step per scroll notch.
pub const ZOOM_FACTOR: f64 = 1.05;
/// Background grid spacing in canvas units.
pub const GRID_SIZE: f64 = 20.0;
/// Practical canvas extent a renderer may allocate. Not enforced.
pub const CANVAS_EXTENT: f64 = 50_000.0;

// ─── Canvas ──────────────────────────────────────────────────────────────

/// Configuration for the viewport engine and drag controller.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Applied as `zoom * zoom_factor` (zoom in) or `zoom / zoom_factor` (zoom out).
    pub zoom_factor: f64,
    pub grid_size: f64,
    /// Round dragged node positions to `grid_size`. Default: **false**, so a
    /// dragged node lands exactly at pointer minus grab offset; editors that
    /// start with snapping on set it explicitly.
    pub snap_to_grid: bool,
    pub extent: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_factor: ZOOM_FACTOR,
            grid_size: GRID_SIZE,
            snap_to_grid: false,
            extent: CANVAS_EXTENT,
        }
    }
}

impl CanvasConfig {
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

// ─── Diagram ─────────────────────────────────────────────────────────────

/// Whether edges may reference node ids that are not in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Every edge endpoint must name an existing node.
    #[default]
    Strict,
    /// Dangling endpoints are kept as-is (e.g. while importing partial data).
    AllowDangling,
}

/// Structural validation options carried by a `Diagram`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiagramConfig {
    pub edge_policy: EdgePolicy,
}

impl DiagramConfig {
    pub fn allow_dangling() -> Self {
        Self {
            edge_policy: EdgePolicy::AllowDangling,
        }
    }
}

// ─── Node metrics ────────────────────────────────────────────────────────

/// Box sizes used for hit testing and edge handle placement.
///
/// The model stores only positions; a renderer that measures its nodes can
/// report real sizes through [`NodeMetrics::set_size`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMetrics {
    pub default_width: f64,
    pub default_height: f64,
    sizes: HashMap<NodeId, (f64, f64)>,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            default_width: 250.0,
            default_height: 200.0,
            sizes: HashMap::new(),
        }
    }
}

impl NodeMetrics {
    pub fn set_size(&mut self, id: NodeId, width: f64, height: f64) {
        self.sizes.insert(id, (width, height));
    }

    pub fn forget(&mut self, id: NodeId) {
        self.sizes.remove(&id);
    }

    pub fn size_of(&self, id: NodeId) -> (f64, f64) {
        self.sizes
            .get(&id)
            .copied()
            .unwrap_or((self.default_width, self.default_height))
    }

    /// Canvas-space box of a node.
    pub fn bounds_of(&self, node: &DiagramNode) -> Bounds {
        let (w, h) = self.size_of(node.id);
        let Position { x, y } = node.position;
        Bounds::new(x, y, w, h)
    }
}
