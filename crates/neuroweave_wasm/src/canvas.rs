//! `DrawingSurface` over a 2D canvas context.

use std::f64::consts::TAU;

use neuroweave_core::{Bounds, ColorStop, DrawingSurface, Paint, Point};
use wasm_bindgen::JsValue;
use web_sys::{CanvasGradient, CanvasRenderingContext2d};

pub struct Canvas2dSurface {
    ctx: CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    /// Maps CSS pixels onto the backing store.
    pub fn set_scale(&self, device_pixel_ratio: f64) -> Result<(), JsValue> {
        self.ctx
            .set_transform(device_pixel_ratio, 0.0, 0.0, device_pixel_ratio, 0.0, 0.0)
    }

    fn gradient(&self, paint: &Paint) -> Result<Option<CanvasGradient>, JsValue> {
        let (gradient, stops) = match paint {
            Paint::Solid(_) => return Ok(None),
            Paint::Radial {
                center,
                inner_radius,
                outer_radius,
                stops,
            } => (
                self.ctx.create_radial_gradient(
                    center.x,
                    center.y,
                    *inner_radius,
                    center.x,
                    center.y,
                    *outer_radius,
                )?,
                stops,
            ),
            Paint::Linear { from, to, stops } => {
                (self.ctx.create_linear_gradient(from.x, from.y, to.x, to.y), stops)
            }
        };
        add_stops(&gradient, stops)?;
        Ok(Some(gradient))
    }

    fn set_fill(&self, paint: &Paint) {
        match paint {
            Paint::Solid(color) => self.ctx.set_fill_style_str(&color.to_css()),
            _ => match self.gradient(paint) {
                Ok(Some(gradient)) => self.ctx.set_fill_style_canvas_gradient(&gradient),
                Ok(None) => {}
                Err(e) => log::warn!("gradient rejected: {:?}", e),
            },
        }
    }

    fn set_stroke(&self, paint: &Paint, width: f64) {
        self.ctx.set_line_width(width);
        match paint {
            Paint::Solid(color) => self.ctx.set_stroke_style_str(&color.to_css()),
            _ => match self.gradient(paint) {
                Ok(Some(gradient)) => self.ctx.set_stroke_style_canvas_gradient(&gradient),
                Ok(None) => {}
                Err(e) => log::warn!("gradient rejected: {:?}", e),
            },
        }
    }
}

fn add_stops(gradient: &CanvasGradient, stops: &[ColorStop]) -> Result<(), JsValue> {
    for stop in stops {
        gradient.add_color_stop(stop.offset as f32, &stop.color.to_css())?;
    }
    Ok(())
}

impl DrawingSurface for Canvas2dSurface {
    fn clear(&mut self, bounds: Bounds) {
        self.ctx.clear_rect(0.0, 0.0, bounds.width, bounds.height);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        self.set_fill(paint);
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius, 0.0, TAU).ok();
        self.ctx.fill();
    }

    fn fill_polygon(&mut self, points: &[Point], paint: &Paint) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.len() < 2 {
            return;
        }
        self.set_fill(paint);
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.close_path();
        self.ctx.fill();
    }

    fn stroke_quadratic(&mut self, from: Point, control: Point, to: Point, width: f64, paint: &Paint) {
        self.set_stroke(paint, width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.quadratic_curve_to(control.x, control.y, to.x, to.y);
        self.ctx.stroke();
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        self.set_stroke(paint, width);
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius, 0.0, TAU).ok();
        self.ctx.stroke();
    }
}
