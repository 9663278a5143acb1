//! Node drag controller.
//!
//! On press the controller remembers where inside the node box the pointer
//! grabbed it; every move then places the node so that grab point stays
//! under the pointer. Pointer positions are converted to canvas space
//! through the current viewport, so a node follows the pointer at the same
//! on-screen speed at any zoom level.
//!
//! Raising the grabbed node to the top of the paint order is the caller's
//! job (`Diagram::bring_to_front`); the controller only tracks which node
//! is held.

use uml_core::{CanvasConfig, DiagramNode, NodeId, Point, Position, ViewPort};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Grab {
    id: NodeId,
    /// Pointer minus node top-left, in canvas units.
    offset: Point,
}

#[derive(Debug, Clone, Default)]
pub struct NodeDragController {
    config: CanvasConfig,
    grab: Option<Grab>,
}

impl NodeDragController {
    pub fn new(config: CanvasConfig) -> Self {
        Self { config, grab: None }
    }

    /// Start dragging `node`; `pointer` is in canvas space.
    pub fn begin_drag(&mut self, node: &DiagramNode, pointer: Point) {
        let offset = pointer - node.position.to_point();
        log::trace!("drag start {} grab offset ({}, {})", node.id, offset.x, offset.y);
        self.grab = Some(Grab {
            id: node.id,
            offset,
        });
    }

    /// New node position for a pointer in the node's parent (canvas) space.
    /// `None` when no drag is in progress.
    pub fn continue_drag(&self, pointer: Point) -> Option<Position> {
        let grab = self.grab?;
        let position = Position::from(pointer - grab.offset);
        Some(if self.config.snap_to_grid {
            position.snapped(self.config.grid_size)
        } else {
            position
        })
    }

    /// Same as [`continue_drag`](Self::continue_drag) for a scene-space
    /// pointer, mapped through `viewport`.
    pub fn continue_drag_scene(&self, pointer: Point, viewport: &ViewPort) -> Option<Position> {
        self.continue_drag(viewport.to_canvas(pointer))
    }

    /// Finish the drag and return the node that was held.
    pub fn end_drag(&mut self) -> Option<NodeId> {
        let id = self.grab.take().map(|g| g.id);
        if let Some(id) = id {
            log::trace!("drag end {id}");
        }
        id
    }

    pub fn dragging(&self) -> Option<NodeId> {
        self.grab.map(|g| g.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uml_core::{NodeData, NodeKind};

    fn node_at(x: f64, y: f64) -> DiagramNode {
        DiagramNode::new(
            "1",
            NodeKind::UmlClass,
            Position { x, y },
            NodeData::new("A"),
        )
        .unwrap()
    }

    #[test]
    fn keeps_grab_point_under_pointer() {
        let mut drag = NodeDragController::default();
        drag.begin_drag(&node_at(10.0, 20.0), Point::new(15.0, 30.0));
        let pos = drag.continue_drag(Point::new(115.0, 130.0)).unwrap();
        assert_eq!(pos, Position { x: 110.0, y: 120.0 });
        assert_eq!(drag.end_drag(), Some(NodeId::intern("1")));
    }

    #[test]
    fn move_without_press_is_ignored() {
        let drag = NodeDragController::default();
        assert_eq!(drag.continue_drag(Point::new(1.0, 1.0)), None);
    }

    #[test]
    fn end_clears_state() {
        let mut drag = NodeDragController::default();
        drag.begin_drag(&node_at(0.0, 0.0), Point::ORIGIN);
        drag.end_drag();
        assert_eq!(drag.dragging(), None);
        assert_eq!(drag.continue_drag(Point::new(1.0, 1.0)), None);
        assert_eq!(drag.end_drag(), None);
    }

    #[test]
    fn scene_drag_is_zoom_independent() {
        let viewport = ViewPort {
            x: 40.0,
            y: -10.0,
            zoom: 2.0,
        };
        let mut drag = NodeDragController::default();
        let node = node_at(0.0, 0.0);
        let press = Point::new(60.0, 10.0);
        drag.begin_drag(&node, viewport.to_canvas(press));

        // 100 screen pixels to the right → 50 canvas units at zoom 2,
        // which is 100 pixels again once rendered.
        let pos = drag
            .continue_drag_scene(press + Point::new(100.0, 0.0), &viewport)
            .unwrap();
        assert_eq!(pos, Position { x: 50.0, y: 0.0 });
        let on_screen = viewport.to_scene(pos.to_point()) - viewport.to_scene(node.position.to_point());
        assert_eq!(on_screen, Point::new(100.0, 0.0));
    }

    #[test]
    fn default_config_does_not_snap() {
        assert!(!CanvasConfig::default().snap_to_grid);
        let mut drag = NodeDragController::default();
        drag.begin_drag(&node_at(0.0, 0.0), Point::ORIGIN);
        let pos = drag.continue_drag(Point::new(29.0, 51.0)).unwrap();
        assert_eq!(pos, Position { x: 29.0, y: 51.0 });
    }

    #[test]
    fn snaps_when_enabled() {
        let config = CanvasConfig {
            snap_to_grid: true,
            ..CanvasConfig::default()
        };
        let mut drag = NodeDragController::new(config);
        drag.begin_drag(&node_at(0.0, 0.0), Point::ORIGIN);
        let pos = drag.continue_drag(Point::new(29.0, 51.0)).unwrap();
        assert_eq!(pos, Position { x: 20.0, y: 60.0 });
    }
}
