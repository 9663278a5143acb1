//! Geometry primitives shared by the model and the interaction engine.
//!
//! Two coordinate spaces are in play:
//!
//! - **scene space**: pointer coordinates as reported by the host, before any
//!   pan/zoom is applied.
//! - **canvas space**: the unbounded logical plane where node positions live.
//!
//! A [`ViewPort`] maps one to the other:
//! `scene = canvas * zoom + (x, y)` and `canvas = (scene - (x, y)) / zoom`.

use crate::error::{DiagramError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ─── Point ───────────────────────────────────────────────────────────────

/// A raw 2D point or vector. Used for pointer coordinates and deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

// ─── Position ────────────────────────────────────────────────────────────

/// Logical canvas position of a node's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Build a position, rejecting NaN and infinities.
    pub fn new(x: f64, y: f64) -> Result<Self> {
        let pos = Self { x, y };
        pos.validate()?;
        Ok(pos)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.x.is_finite() {
            return Err(DiagramError::invalid("node position x is not a finite number"));
        }
        if !self.y.is_finite() {
            return Err(DiagramError::invalid("node position y is not a finite number"));
        }
        Ok(())
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Snap to the nearest multiple of `grid` on both axes.
    pub fn snapped(self, grid: f64) -> Position {
        if grid <= 0.0 {
            return self;
        }
        Position {
            x: (self.x / grid).round() * grid,
            y: (self.y / grid).round() * grid,
        }
    }
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Position { x: p.x, y: p.y }
    }
}

// ─── ViewPort ────────────────────────────────────────────────────────────

/// Pan offset and zoom scale applied to the canvas layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewPort {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for ViewPort {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl ViewPort {
    /// Build a viewport, rejecting non-finite values and non-positive zoom.
    pub fn new(x: f64, y: f64, zoom: f64) -> Result<Self> {
        let vp = Self { x, y, zoom };
        vp.validate()?;
        Ok(vp)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.x.is_finite() {
            return Err(DiagramError::invalid("viewport x is not a finite number"));
        }
        if !self.y.is_finite() {
            return Err(DiagramError::invalid("viewport y is not a finite number"));
        }
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(DiagramError::invalid(format!(
                "viewport zoom must be finite and positive, got {}",
                self.zoom
            )));
        }
        Ok(())
    }

    /// The pan offset as a point.
    pub fn offset(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Map a scene-space point to canvas space.
    pub fn to_canvas(&self, scene: Point) -> Point {
        (scene - self.offset()) / self.zoom
    }

    /// Map a canvas-space point to scene space.
    pub fn to_scene(&self, canvas: Point) -> Point {
        canvas * self.zoom + self.offset()
    }
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Axis-aligned box in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// AABB overlap test.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Bounds::new(x, y, right - x, bottom - y)
    }

    /// Normalize a drag rectangle from two corner points.
    pub fn from_corners(a: Point, b: Point) -> Bounds {
        Bounds::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (b.x - a.x).abs(),
            (b.y - a.y).abs(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_rejects_nan() {
        assert!(Position::new(f64::NAN, 0.0).is_err());
        assert!(Position::new(0.0, f64::INFINITY).is_err());
        assert!(Position::new(12.4, 15.5).is_ok());
    }

    #[test]
    fn viewport_rejects_bad_zoom() {
        assert!(ViewPort::new(0.0, 0.0, 0.0).is_err());
        assert!(ViewPort::new(0.0, 0.0, -1.0).is_err());
        assert!(ViewPort::new(0.0, 0.0, f64::NAN).is_err());
        assert!(ViewPort::new(12.2, 20.02, 2.0).is_ok());
    }

    #[test]
    fn viewport_mapping_is_inverse() {
        let vp = ViewPort::new(50.0, -20.0, 2.0).unwrap();
        let scene = Point::new(150.0, 80.0);
        let canvas = vp.to_canvas(scene);
        assert_eq!(canvas, Point::new(50.0, 50.0));
        assert_eq!(vp.to_scene(canvas), scene);
    }

    #[test]
    fn snapping_rounds_to_grid() {
        let p = Position { x: 29.0, y: 31.0 }.snapped(20.0);
        assert_eq!(p, Position { x: 20.0, y: 40.0 });
        let unchanged = Position { x: 29.0, y: 31.0 }.snapped(0.0);
        assert_eq!(unchanged, Position { x: 29.0, y: 31.0 });
    }

    #[test]
    fn bounds_hit_and_overlap() {
        let b = Bounds::new(10.0, 10.0, 100.0, 50.0);
        assert!(b.contains(Point::new(10.0, 10.0)));
        assert!(b.contains(Point::new(110.0, 60.0)));
        assert!(!b.contains(Point::new(111.0, 60.0)));
        assert!(b.intersects(&Bounds::new(100.0, 50.0, 20.0, 20.0)));
        assert!(!b.intersects(&Bounds::new(200.0, 50.0, 20.0, 20.0)));
        assert_eq!(
            b.union(&Bounds::new(0.0, 0.0, 5.0, 5.0)),
            Bounds::new(0.0, 0.0, 110.0, 60.0)
        );
    }
}
