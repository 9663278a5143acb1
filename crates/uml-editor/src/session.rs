//! Editor session: the single owner of the current diagram snapshot.
//!
//! The session is the interaction dispatcher. Each pointer event is
//! hit-tested against the current snapshot and routed to the
//! [`ViewportEngine`] (background) or the [`NodeDragController`] (a node).
//! Gesture results and explicit edits are committed by swapping in a new
//! `Diagram`; observers are notified after every commit.
//!
//! An edit that fails validation is logged and returned as an error, and the
//! previous snapshot stays current.

use crate::drag::NodeDragController;
use crate::hit::{content_bounds, hit_test, hit_test_rect};
use crate::input::InputEvent;
use crate::observer::{DiagramObserver, Observers, SubscriptionId};
use crate::viewport::{InteractionMode, ViewportEngine};
use uml_core::{
    Bounds, CanvasConfig, Diagram, DiagramEdge, DiagramError, DiagramNode, NodeData, NodeId,
    NodeKind, NodeMetrics, Point, Position, RelationKind, Result,
};

/// Offset applied to duplicated nodes, in canvas units.
pub const DUPLICATE_OFFSET: Point = Point::new(50.0, 50.0);

/// The pointer gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Panning,
    Dragging(NodeId),
}

#[derive(Debug)]
pub struct EditorSession {
    diagram: Diagram,
    viewport: ViewportEngine,
    drag: NodeDragController,
    metrics: NodeMetrics,
    gesture: Gesture,
    observers: Observers,
}

impl EditorSession {
    pub fn new(diagram: Diagram, config: CanvasConfig) -> Self {
        let mut viewport = ViewportEngine::new(config.clone());
        viewport.set_viewport(diagram.viewport());
        Self {
            diagram,
            viewport,
            drag: NodeDragController::new(config),
            metrics: NodeMetrics::default(),
            gesture: Gesture::Idle,
            observers: Observers::default(),
        }
    }

    // ─── Read side ───────────────────────────────────────────────────────

    /// The current snapshot. Clone it to keep a copy; clones are cheap.
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.viewport.mode()
    }

    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    /// Renderers report measured node sizes here.
    pub fn metrics_mut(&mut self) -> &mut NodeMetrics {
        &mut self.metrics
    }

    pub fn subscribe(&mut self, observer: impl DiagramObserver + 'static) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Node under a scene-space point.
    pub fn node_at(&self, scene: Point) -> Option<NodeId> {
        let canvas = self.diagram.viewport().to_canvas(scene);
        hit_test(&self.diagram, &self.metrics, canvas)
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    /// Route one input event. Returns true if a new snapshot was committed.
    ///
    /// # Errors
    /// Only if a gesture's edit is rejected by the model (e.g. the dragged
    /// node was removed mid-gesture); the gesture is then abandoned.
    pub fn handle(&mut self, event: &InputEvent) -> Result<bool> {
        let pointer = event.position();
        match *event {
            InputEvent::PointerDown { .. } => self.press(pointer),
            InputEvent::PointerMove { .. } => self.drag_to(pointer),
            InputEvent::PointerUp { .. } => self.release(),
            InputEvent::Scroll { delta, .. } => {
                self.viewport.set_viewport(self.diagram.viewport());
                let vp = self.viewport.zoom_at(pointer, delta);
                self.commit_viewport(vp)
            }
        }
    }

    fn press(&mut self, pointer: Point) -> Result<bool> {
        // A new press interrupts whatever was going on.
        let mut changed = if self.gesture != Gesture::Idle {
            log::debug!("press interrupts {:?}", self.gesture);
            self.release()?
        } else {
            false
        };

        match self.node_at(pointer) {
            Some(id) => {
                let raised = self.diagram.bring_to_front(id)?;
                changed |= self.commit_if_changed(raised);
                let canvas = self.diagram.viewport().to_canvas(pointer);
                let node = self.diagram.node(id).ok_or(DiagramError::NodeNotFound(id))?;
                self.drag.begin_drag(node, canvas);
                self.gesture = Gesture::Dragging(id);
            }
            None => {
                self.viewport.set_viewport(self.diagram.viewport());
                self.viewport.begin_pan(pointer);
                self.gesture = Gesture::Panning;
            }
        }
        Ok(changed)
    }

    fn drag_to(&mut self, pointer: Point) -> Result<bool> {
        match self.gesture {
            Gesture::Idle => Ok(false),
            Gesture::Panning => {
                let vp = self.viewport.continue_pan(pointer);
                self.commit_viewport(vp)
            }
            Gesture::Dragging(id) => {
                let viewport = self.diagram.viewport();
                let Some(position) = self.drag.continue_drag_scene(pointer, &viewport) else {
                    return Ok(false);
                };
                match self.diagram.move_node(id, position) {
                    Ok(next) => Ok(self.commit_if_changed(next)),
                    Err(err) => {
                        log::warn!("drag of {id} abandoned: {err}");
                        self.drag.end_drag();
                        self.gesture = Gesture::Idle;
                        Err(err)
                    }
                }
            }
        }
    }

    fn release(&mut self) -> Result<bool> {
        let gesture = std::mem::take(&mut self.gesture);
        match gesture {
            Gesture::Idle => Ok(false),
            Gesture::Panning => {
                self.viewport.end_pan();
                Ok(false)
            }
            Gesture::Dragging(_) => match self.drag.end_drag() {
                Some(id) if self.diagram.contains_node(id) => {
                    let next = self.diagram.recalculate_handles(id, &self.metrics)?;
                    Ok(self.commit_if_changed(next))
                }
                _ => Ok(false),
            },
        }
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Create a node of `kind` at `position` with a fresh id and default label.
    ///
    /// # Errors
    /// `Occupied` if the new node's default box would overlap another node.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> Result<NodeId> {
        let footprint = Bounds::new(
            position.x,
            position.y,
            self.metrics.default_width,
            self.metrics.default_height,
        );
        if let Some(&by) = hit_test_rect(&self.diagram, &self.metrics, &footprint).first() {
            log::warn!("add_node rejected: ({}, {}) overlaps {by}", position.x, position.y);
            return Err(DiagramError::Occupied {
                x: position.x,
                y: position.y,
                by,
            });
        }
        let id = loop {
            let candidate = NodeId::with_prefix("node");
            if !self.diagram.contains_node(candidate) {
                break candidate;
            }
        };
        let node = DiagramNode::new(id, kind, position, NodeData::new(kind.default_label()))?;
        self.apply(|d| d.with_node(node))?;
        Ok(id)
    }

    /// Insert or replace a node by id.
    pub fn put_node(&mut self, node: DiagramNode) -> Result<()> {
        self.apply(|d| d.with_node(node))
    }

    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<()> {
        self.apply(|d| d.move_node(id, position))
    }

    pub fn update_node_data(&mut self, id: NodeId, data: NodeData) -> Result<()> {
        self.apply(|d| d.with_node_data(id, data))
    }

    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        self.apply(|d| d.without_node(id))?;
        self.metrics.forget(id);
        Ok(())
    }

    pub fn duplicate_node(&mut self, id: NodeId) -> Result<NodeId> {
        let (next, copy) = self.diagram.duplicate_node(id, DUPLICATE_OFFSET).inspect_err(|e| {
            log::warn!("duplicate rejected: {e}");
        })?;
        self.commit(next);
        Ok(copy)
    }

    pub fn bring_to_front(&mut self, id: NodeId) -> Result<()> {
        self.apply(|d| d.bring_to_front(id))
    }

    pub fn send_to_back(&mut self, id: NodeId) -> Result<()> {
        self.apply(|d| d.send_to_back(id))
    }

    /// Insert or replace an edge with structural checks only.
    pub fn add_edge(&mut self, edge: DiagramEdge) -> Result<()> {
        self.apply(|d| d.with_edge(edge))
    }

    /// Insert an edge under UML connection rules, then place its handles.
    pub fn connect(&mut self, edge: DiagramEdge) -> Result<()> {
        let source = edge.source;
        let metrics = &self.metrics;
        let next = self
            .diagram
            .connect(edge)
            .and_then(|d| d.recalculate_handles(source, metrics))
            .inspect_err(|e| log::warn!("connection rejected: {e}"))?;
        self.commit(next);
        Ok(())
    }

    pub fn remove_edge(&mut self, id: NodeId) -> Result<()> {
        self.apply(|d| d.without_edge(id))
    }

    /// Swap an edge's endpoints and pick handles for the new direction.
    pub fn reverse_edge(&mut self, id: NodeId) -> Result<()> {
        let metrics = &self.metrics;
        let next = self
            .diagram
            .reversed_edge(id)
            .and_then(|d| d.place_handles(id, metrics))
            .inspect_err(|e| log::warn!("reverse rejected: {e}"))?;
        self.commit(next);
        Ok(())
    }

    pub fn set_relation(&mut self, id: NodeId, relation: RelationKind) -> Result<()> {
        self.apply(|d| d.with_relation(id, relation))
    }

    pub fn rename(&mut self, name: &str) -> Result<()> {
        self.apply(|d| d.renamed(name))
    }

    /// Remove every node and edge.
    pub fn clear(&mut self) {
        self.abandon_gesture();
        let next = self.diagram.cleared();
        self.commit(next);
    }

    /// Swap in a different diagram (e.g. after loading), dropping any gesture.
    pub fn replace_diagram(&mut self, diagram: Diagram) {
        self.abandon_gesture();
        self.viewport.set_viewport(diagram.viewport());
        self.commit(diagram);
    }

    // ─── View edits ──────────────────────────────────────────────────────

    pub fn zoom_in(&mut self, center: Point) -> Result<bool> {
        self.viewport.set_viewport(self.diagram.viewport());
        let vp = self.viewport.zoom_in(center);
        self.commit_viewport(vp)
    }

    pub fn zoom_out(&mut self, center: Point) -> Result<bool> {
        self.viewport.set_viewport(self.diagram.viewport());
        let vp = self.viewport.zoom_out(center);
        self.commit_viewport(vp)
    }

    pub fn reset_view(&mut self) -> Result<bool> {
        let vp = self.viewport.reset();
        self.commit_viewport(vp)
    }

    /// Fit all nodes into a `width × height` screen.
    pub fn zoom_to_fit(&mut self, width: f64, height: f64, padding: f64) -> Result<bool> {
        let vp = match content_bounds(&self.diagram, &self.metrics) {
            Some(content) => self.viewport.fit_bounds(content, width, height, padding),
            None => self.viewport.reset(),
        };
        self.commit_viewport(vp)
    }

    // ─── Commit ──────────────────────────────────────────────────────────

    fn apply(&mut self, edit: impl FnOnce(&Diagram) -> Result<Diagram>) -> Result<()> {
        match edit(&self.diagram) {
            Ok(next) => {
                self.commit(next);
                Ok(())
            }
            Err(err) => {
                log::warn!("edit rejected: {err}");
                Err(err)
            }
        }
    }

    fn commit_viewport(&mut self, vp: uml_core::ViewPort) -> Result<bool> {
        if vp == self.diagram.viewport() {
            return Ok(false);
        }
        let next = self.diagram.with_viewport(vp)?;
        self.commit(next);
        Ok(true)
    }

    fn commit_if_changed(&mut self, next: Diagram) -> bool {
        if next == self.diagram {
            return false;
        }
        self.commit(next);
        true
    }

    fn commit(&mut self, next: Diagram) {
        log::trace!(
            "commit '{}': {} nodes, {} edges",
            next.name(),
            next.nodes().len(),
            next.edges().len()
        );
        self.diagram = next;
        self.observers.notify(&self.diagram);
    }

    fn abandon_gesture(&mut self) {
        self.viewport.end_pan();
        self.drag.end_drag();
        self.gesture = Gesture::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uml_core::{Uuid, ViewPort};

    fn session() -> EditorSession {
        let node = DiagramNode::new(
            "1",
            NodeKind::UmlClass,
            Position { x: 0.0, y: 0.0 },
            NodeData::new("Animal"),
        )
        .unwrap();
        let diagram =
            Diagram::new(Uuid::new_v4(), "Session", [node], [], ViewPort::default()).unwrap();
        EditorSession::new(diagram, CanvasConfig::default())
    }

    #[test]
    fn background_press_pans() {
        let mut s = session();
        s.handle(&InputEvent::pointer_down(400.0, 400.0)).unwrap();
        assert_eq!(s.gesture(), Gesture::Panning);
        assert_eq!(s.interaction_mode(), InteractionMode::Panning);
        assert!(s.handle(&InputEvent::pointer_move(450.0, 420.0)).unwrap());
        assert_eq!(s.diagram().viewport(), ViewPort { x: 50.0, y: 20.0, zoom: 1.0 });
        s.handle(&InputEvent::pointer_up(450.0, 420.0)).unwrap();
        assert_eq!(s.gesture(), Gesture::Idle);
        assert_eq!(s.interaction_mode(), InteractionMode::Idle);
    }

    #[test]
    fn node_press_drags() {
        let mut s = session();
        s.handle(&InputEvent::pointer_down(10.0, 10.0)).unwrap();
        assert_eq!(s.gesture(), Gesture::Dragging(NodeId::intern("1")));
        s.handle(&InputEvent::pointer_move(60.0, 30.0)).unwrap();
        let pos = s.diagram().node(NodeId::intern("1")).unwrap().position;
        assert_eq!(pos, Position { x: 50.0, y: 20.0 });
        // The viewport did not move.
        assert_eq!(s.diagram().viewport(), ViewPort::default());
    }

    #[test]
    fn move_without_press_changes_nothing() {
        let mut s = session();
        let before = s.diagram().clone();
        assert!(!s.handle(&InputEvent::pointer_move(60.0, 30.0)).unwrap());
        assert!(!s.handle(&InputEvent::pointer_up(60.0, 30.0)).unwrap());
        assert_eq!(s.diagram(), &before);
    }

    #[test]
    fn rejected_edit_keeps_snapshot() {
        let mut s = session();
        let before = s.diagram().clone();
        let err = s
            .move_node(NodeId::intern("missing-id"), Position::default())
            .unwrap_err();
        assert_eq!(err, DiagramError::NodeNotFound(NodeId::intern("missing-id")));
        assert_eq!(s.diagram(), &before);
    }
}
