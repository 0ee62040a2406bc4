//! Pointer smoothing.
//!
//! Raw events snap `raw` directly; `update` is called once per frame and eases
//! the smoothed cursor toward the raw position while the pointer is present,
//! or toward an off-screen sentinel once it leaves, so glow and activation
//! fade out instead of vanishing.

use crate::geometry::{Bounds, Point};

/// Resting place of the smoothed cursor when no pointer is present.
pub const OFFSCREEN_SENTINEL: Point = Point::new(-1000.0, -1000.0);

/// Per-frame lerp factor toward the raw pointer while active.
const FOLLOW_RATE: f64 = 0.12;

/// Per-frame lerp factor toward the sentinel while inactive.
const DECAY_RATE: f64 = 0.03;

#[derive(Clone, Debug)]
pub struct InputTracker {
    raw: Point,
    active: bool,
    smoothed: Point,
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InputTracker {
    pub fn new() -> Self {
        Self {
            raw: OFFSCREEN_SENTINEL,
            active: false,
            smoothed: OFFSCREEN_SENTINEL,
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.raw = Point::new(x, y);
        self.active = true;
    }

    pub fn pointer_leave(&mut self) {
        self.active = false;
    }

    pub fn touch_move(&mut self, x: f64, y: f64) {
        self.pointer_move(x, y);
    }

    pub fn touch_end(&mut self) {
        self.pointer_leave();
    }

    /// Advance the smoothed cursor by one frame.
    pub fn update(&mut self) {
        self.smoothed = if self.active {
            self.smoothed.lerp(self.raw, FOLLOW_RATE)
        } else {
            self.smoothed.lerp(OFFSCREEN_SENTINEL, DECAY_RATE)
        };
    }

    pub fn raw(&self) -> Point {
        self.raw
    }

    pub fn smoothed(&self) -> Point {
        self.smoothed
    }

    /// Whether a pointer or touch is currently over the surface.
    pub fn is_live(&self) -> bool {
        self.active
    }

    /// Whether a glow of `radius` around the smoothed cursor can touch `bounds`.
    pub fn glow_visible(&self, bounds: Bounds, radius: f64) -> bool {
        bounds.contains_with_margin(self.smoothed, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_raw_pointer_gradually() {
        let mut input = InputTracker::new();
        input.pointer_move(300.0, 200.0);
        assert_eq!(input.raw(), Point::new(300.0, 200.0));
        input.update();
        let first = input.smoothed();
        assert!(first.x > OFFSCREEN_SENTINEL.x && first.x < 300.0);
        for _ in 0..200 {
            input.update();
        }
        assert!(input.smoothed().distance(Point::new(300.0, 200.0)) < 0.01);
    }

    #[test]
    fn decays_monotonically_toward_sentinel() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut input = InputTracker::new();
        input.pointer_move(400.0, 300.0);
        for _ in 0..200 {
            input.update();
        }
        assert!(input.glow_visible(bounds, 220.0));

        input.pointer_leave();
        assert!(!input.is_live());
        let mut previous = input.smoothed().distance(OFFSCREEN_SENTINEL);
        for _ in 0..60 {
            input.update();
            let d = input.smoothed().distance(OFFSCREEN_SENTINEL);
            assert!(d < previous);
            previous = d;
        }
        for _ in 0..200 {
            input.update();
        }
        assert!(!input.glow_visible(bounds, 220.0));
    }

    #[test]
    fn touch_maps_to_pointer() {
        let mut input = InputTracker::new();
        input.touch_move(10.0, 20.0);
        assert!(input.is_live());
        input.touch_end();
        assert!(!input.is_live());
        assert_eq!(input.raw(), Point::new(10.0, 20.0));
    }
}
