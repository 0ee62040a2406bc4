//! Drawing-surface abstraction.
//!
//! The renderer only speaks this small capability set (filled circle and
//! polygon, stroked quadratic curve and circle, solid/radial/linear paints),
//! so any 2D backend can host the engine. [`RecordingSurface`] is the
//! in-memory backend used by tests and the headless runner.

use crate::color::Rgba;
use crate::geometry::{Bounds, Point};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient in [0, 1]
    pub offset: f64,
    pub color: Rgba,
}

impl ColorStop {
    pub fn new(offset: f64, color: Rgba) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Radial {
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        stops: Vec<ColorStop>,
    },
    Linear {
        from: Point,
        to: Point,
        stops: Vec<ColorStop>,
    },
}

impl Paint {
    /// Largest alpha this paint can produce.
    pub fn max_alpha(&self) -> f64 {
        match self {
            Paint::Solid(c) => c.alpha,
            Paint::Radial { stops, .. } | Paint::Linear { stops, .. } => {
                stops.iter().map(|s| s.color.alpha).fold(0.0, f64::max)
            }
        }
    }
}

/// Render layers, in draw order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    PointerGlow,
    Dendrites,
    Edges,
    Pulses,
    Nodes,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::PointerGlow,
        Layer::Dendrites,
        Layer::Edges,
        Layer::Pulses,
        Layer::Nodes,
    ];
}

pub trait DrawingSurface {
    /// Wipe the whole region to transparent.
    fn clear(&mut self, bounds: Bounds);

    fn fill_circle(&mut self, center: Point, radius: f64, paint: &Paint);

    fn fill_polygon(&mut self, points: &[Point], paint: &Paint);

    fn stroke_quadratic(&mut self, from: Point, control: Point, to: Point, width: f64, paint: &Paint);

    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, paint: &Paint);

    /// Marks the start of a render layer. Backends may ignore it.
    fn begin_layer(&mut self, _layer: Layer) {}
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Bounds),
    FillCircle {
        center: Point,
        radius: f64,
        paint: Paint,
    },
    FillPolygon {
        points: Vec<Point>,
        paint: Paint,
    },
    StrokeQuadratic {
        from: Point,
        control: Point,
        to: Point,
        width: f64,
        paint: Paint,
    },
    StrokeCircle {
        center: Point,
        radius: f64,
        width: f64,
        paint: Paint,
    },
}

/// Records every draw call together with the layer it was issued in.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<(Option<Layer>, DrawCommand)>,
    layer: Option<Layer>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands_in(&self, layer: Layer) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(move |(l, _)| *l == Some(layer))
            .map(|(_, c)| c)
    }

    pub fn count_in(&self, layer: Layer) -> usize {
        self.commands_in(layer).count()
    }

    /// Order in which layers first received a command.
    pub fn layer_order(&self) -> Vec<Layer> {
        let mut order = Vec::new();
        for (layer, _) in &self.commands {
            if let Some(l) = layer {
                if order.last() != Some(l) {
                    order.push(*l);
                }
            }
        }
        order
    }

    /// Forget recorded commands, e.g. between frames.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.layer = None;
    }

    fn record(&mut self, command: DrawCommand) {
        self.commands.push((self.layer, command));
    }
}

impl DrawingSurface for RecordingSurface {
    fn clear(&mut self, bounds: Bounds) {
        self.layer = None;
        self.record(DrawCommand::Clear(bounds));
    }

    fn fill_circle(&mut self, center: Point, radius: f64, paint: &Paint) {
        self.record(DrawCommand::FillCircle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn fill_polygon(&mut self, points: &[Point], paint: &Paint) {
        self.record(DrawCommand::FillPolygon {
            points: points.to_vec(),
            paint: paint.clone(),
        });
    }

    fn stroke_quadratic(&mut self, from: Point, control: Point, to: Point, width: f64, paint: &Paint) {
        self.record(DrawCommand::StrokeQuadratic {
            from,
            control,
            to,
            width,
            paint: paint.clone(),
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, paint: &Paint) {
        self.record(DrawCommand::StrokeCircle {
            center,
            radius,
            width,
            paint: paint.clone(),
        });
    }

    fn begin_layer(&mut self, layer: Layer) {
        self.layer = Some(layer);
    }
}
