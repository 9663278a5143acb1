//! Viewport transform engine: pan by drag, zoom about the pointer.
//!
//! The engine owns the current [`ViewPort`] and, while a pan gesture is in
//! progress, the anchor that ties the pointer to the canvas. Every operation
//! is a pure recomputation from the incoming pointer position; nothing is
//! accumulated across events, so rounding error does not drift.
//!
//! Zoom keeps the canvas point under the pointer fixed on screen:
//!
//! ```text
//! local  = (pointer - offset) / zoom
//! offset = pointer - local * zoom'
//! ```

use uml_core::{Bounds, CanvasConfig, Point, ViewPort};

/// What the canvas is currently doing with the pointer.
/// Hosts map this to a cursor (default vs. closed hand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Panning,
}

#[derive(Debug, Clone)]
pub struct ViewportEngine {
    config: CanvasConfig,
    viewport: ViewPort,
    /// `pointer - offset` captured by `begin_pan`.
    pan_anchor: Option<Point>,
    mode: InteractionMode,
}

impl Default for ViewportEngine {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl ViewportEngine {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            viewport: ViewPort::default(),
            pan_anchor: None,
            mode: InteractionMode::Idle,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn viewport(&self) -> ViewPort {
        self.viewport
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Replace the current viewport as-is. Only zoom levels the engine
    /// computes itself are clamped, so a pan never alters a stored zoom.
    pub fn set_viewport(&mut self, viewport: ViewPort) {
        self.viewport = viewport;
    }

    /// Back to the identity transform; cancels any pan in progress.
    pub fn reset(&mut self) -> ViewPort {
        self.end_pan();
        self.viewport = ViewPort::default();
        self.viewport
    }

    // ─── Pan ─────────────────────────────────────────────────────────────

    pub fn begin_pan(&mut self, pointer: Point) {
        self.pan_anchor = Some(pointer - self.viewport.offset());
        self.mode = InteractionMode::Panning;
        log::trace!("pan start at ({}, {})", pointer.x, pointer.y);
    }

    /// Move the canvas so the anchor stays under `pointer`. Zoom is unchanged.
    /// Without a preceding `begin_pan` the event is ignored.
    pub fn continue_pan(&mut self, pointer: Point) -> ViewPort {
        if let Some(anchor) = self.pan_anchor {
            let offset = pointer - anchor;
            self.viewport.x = offset.x;
            self.viewport.y = offset.y;
        }
        self.viewport
    }

    pub fn end_pan(&mut self) {
        if self.pan_anchor.take().is_some() {
            log::trace!("pan end at ({}, {})", self.viewport.x, self.viewport.y);
        }
        self.mode = InteractionMode::Idle;
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    // ─── Zoom ────────────────────────────────────────────────────────────

    /// One zoom step about `pointer`. Positive `delta` zooms in, anything
    /// else zooms out. At the range limits the step is a no-op.
    pub fn zoom_at(&mut self, pointer: Point, delta: f64) -> ViewPort {
        let current = self.viewport.zoom;
        let factor = if delta > 0.0 {
            self.config.zoom_factor
        } else {
            1.0 / self.config.zoom_factor
        };
        let zoom = self.config.clamp_zoom(current * factor);
        if zoom == current {
            return self.viewport;
        }
        self.zoom_to(pointer, zoom)
    }

    /// Set an absolute zoom level (clamped) keeping `pointer` fixed.
    pub fn zoom_to(&mut self, pointer: Point, zoom: f64) -> ViewPort {
        let zoom = self.config.clamp_zoom(zoom);
        let local = self.viewport.to_canvas(pointer);
        let offset = pointer - local * zoom;
        self.viewport = ViewPort {
            x: offset.x,
            y: offset.y,
            zoom,
        };
        self.viewport
    }

    pub fn zoom_in(&mut self, center: Point) -> ViewPort {
        self.zoom_at(center, 1.0)
    }

    pub fn zoom_out(&mut self, center: Point) -> ViewPort {
        self.zoom_at(center, -1.0)
    }

    /// Fit `content` (canvas space) into a `width × height` screen with
    /// `padding` on every side, centred. Empty content resets the view.
    pub fn fit_bounds(&mut self, content: Bounds, width: f64, height: f64, padding: f64) -> ViewPort {
        if content.width <= 0.0 || content.height <= 0.0 {
            return self.reset();
        }
        let avail_w = (width - 2.0 * padding).max(1.0);
        let avail_h = (height - 2.0 * padding).max(1.0);
        let zoom = self
            .config
            .clamp_zoom((avail_w / content.width).min(avail_h / content.height));
        let screen_center = Point::new(width / 2.0, height / 2.0);
        let offset = screen_center - content.center() * zoom;
        self.viewport = ViewPort {
            x: offset.x,
            y: offset.y,
            zoom,
        };
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn pan_tracks_pointer() {
        let mut engine = ViewportEngine::default();
        engine.begin_pan(Point::new(100.0, 100.0));
        assert_eq!(engine.mode(), InteractionMode::Panning);
        let vp = engine.continue_pan(Point::new(150.0, 120.0));
        assert_eq!(vp, ViewPort { x: 50.0, y: 20.0, zoom: 1.0 });
        engine.end_pan();
        assert_eq!(engine.mode(), InteractionMode::Idle);
    }

    #[test]
    fn pan_without_press_is_ignored() {
        let mut engine = ViewportEngine::default();
        let vp = engine.continue_pan(Point::new(150.0, 120.0));
        assert_eq!(vp, ViewPort::default());
    }

    #[test]
    fn second_pan_starts_from_current_offset() {
        let mut engine = ViewportEngine::default();
        engine.begin_pan(Point::new(0.0, 0.0));
        engine.continue_pan(Point::new(10.0, 10.0));
        engine.end_pan();
        engine.begin_pan(Point::new(100.0, 100.0));
        let vp = engine.continue_pan(Point::new(105.0, 90.0));
        assert_eq!((vp.x, vp.y), (15.0, 0.0));
    }

    #[test]
    fn zoom_in_keeps_pointer_fixed() {
        let mut engine = ViewportEngine::default();
        let p = Point::new(200.0, 200.0);
        let vp = engine.zoom_at(p, 1.0);
        assert_approx_eq!(f64, vp.zoom, 1.05, ulps = 2);
        assert_approx_eq!(f64, (200.0 - vp.x) / vp.zoom, 200.0, epsilon = 1e-9);
        assert_approx_eq!(f64, (200.0 - vp.y) / vp.zoom, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn zoom_is_clamped_at_limits() {
        let mut engine = ViewportEngine::default();
        engine.set_viewport(ViewPort { x: 3.0, y: 4.0, zoom: 5.0 });
        let vp = engine.zoom_at(Point::new(10.0, 10.0), 1.0);
        assert_eq!(vp, ViewPort { x: 3.0, y: 4.0, zoom: 5.0 });

        engine.set_viewport(ViewPort { x: 3.0, y: 4.0, zoom: 0.1 });
        let vp = engine.zoom_at(Point::new(10.0, 10.0), -1.0);
        assert_eq!(vp.zoom, 0.1);
        assert_approx_eq!(f64, vp.x, 3.0, epsilon = 1e-12);
        assert_approx_eq!(f64, vp.y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_delta_zooms_out() {
        let mut engine = ViewportEngine::default();
        let vp = engine.zoom_at(Point::ORIGIN, 0.0);
        assert!(vp.zoom < 1.0);
    }

    #[test]
    fn out_of_range_zoom_survives_pan() {
        let mut engine = ViewportEngine::default();
        engine.set_viewport(ViewPort { x: 0.0, y: 0.0, zoom: 12.0 });
        engine.begin_pan(Point::new(100.0, 100.0));
        let vp = engine.continue_pan(Point::new(150.0, 120.0));
        assert_eq!(vp, ViewPort { x: 50.0, y: 20.0, zoom: 12.0 });

        // The next computed zoom lands back inside the range.
        let vp = engine.zoom_at(Point::ORIGIN, -1.0);
        assert_eq!(vp.zoom, 5.0);
    }

    #[test]
    fn fit_bounds_centres_content() {
        let mut engine = ViewportEngine::default();
        let content = Bounds::new(0.0, 0.0, 400.0, 200.0);
        let vp = engine.fit_bounds(content, 800.0, 600.0, 0.0);
        assert_eq!(vp.zoom, 2.0);
        let center = vp.to_scene(content.center());
        assert_eq!(center, Point::new(400.0, 300.0));
    }

    #[test]
    fn fit_empty_content_resets() {
        let mut engine = ViewportEngine::default();
        engine.zoom_in(Point::new(5.0, 5.0));
        let vp = engine.fit_bounds(Bounds::default(), 800.0, 600.0, 20.0);
        assert_eq!(vp, ViewPort::default());
    }
}
