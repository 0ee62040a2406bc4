//! Planar geometry shared by the simulation and the renderer.
//!
//! The edge curvature lives here on purpose: [`edge_control_point`] is the
//! only place the time/phase bend of an edge is computed, and both the edge
//! stroke and the pulse travelling along it go through it.

/// Edge bend as a fraction of edge length at the peak of the oscillation.
pub const CURVATURE: f64 = 0.12;

/// Angular frequency of the edge bend oscillation (radians per simulated second).
pub const CURVE_FREQUENCY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn midpoint(self, other: Point) -> Point {
        self.lerp(other, 0.5)
    }

    /// Point at `distance` from `self` along `angle` (radians).
    pub fn offset_polar(self, angle: f64, distance: f64) -> Point {
        Point::new(
            self.x + angle.cos() * distance,
            self.y + angle.sin() * distance,
        )
    }
}

/// Axis-aligned drawing region in CSS pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Whether `p` lies inside the bounds grown by `margin` on every side.
    pub fn contains_with_margin(&self, p: Point, margin: f64) -> bool {
        p.x >= -margin
            && p.y >= -margin
            && p.x <= self.width + margin
            && p.y <= self.height + margin
    }
}

/// Evaluate a quadratic Bézier curve at `t` in [0, 1].
pub fn quadratic_bezier(from: Point, control: Point, to: Point, t: f64) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
        u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
    )
}

/// Control point of the curved edge between `a` and `b` at simulated `time`.
///
/// The midpoint is pushed along the edge's unit normal by an amount that
/// oscillates with `time` and the mean of the two endpoint phases, so every
/// edge breathes on its own schedule. A zero-length edge has no normal and
/// returns the midpoint unchanged.
pub fn edge_control_point(a: Point, phase_a: f64, b: Point, phase_b: f64, time: f64) -> Point {
    let mid = a.midpoint(b);
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = dx.hypot(dy);
    if len <= f64::EPSILON {
        return mid;
    }
    let bend = len * CURVATURE * (time * CURVE_FREQUENCY + (phase_a + phase_b) * 0.5).sin();
    Point::new(mid.x - dy / len * bend, mid.y + dx / len * bend)
}
