//! SignalSystem: pulses travelling along connectivity edges.
//!
//! Each frame every live pulse advances by its fixed speed and is retired once
//! it reaches the far node. New pulses are rolled per edge with a probability
//! that grows with edge proximity and endpoint activation. The pool is capped
//! at [`MAX_PULSES`]; overflow silently drops the oldest pulses.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::color::{Rgb, IDEA_WHITE};
use crate::config::default_wave_colors;
use crate::field::Node;
use crate::geometry::{edge_control_point, quadratic_bezier, Point};
use crate::graph::ConnectivityGraph;

/// Hard ceiling on live pulses.
pub const MAX_PULSES: usize = 150;

/// Draw/spawn cutoff as a multiple of the proximity threshold. Looser than
/// the threshold so stretched spanning-tree edges keep rendering.
pub const DRAW_DISTANCE_FACTOR: f64 = 1.8;

/// Recent positions kept for the comet trail of idea pulses.
pub const TRAIL_LEN: usize = 12;

/// Per-frame fade applied to existing trail weights.
const TRAIL_FADE: f64 = 0.82;

const BASE_SPAWN_RATE: f64 = 0.004;

/// Activation floor so pulses still flow when nothing is excited.
const IDLE_ACTIVITY: f64 = 0.15;

/// Spawn multiplier while a pointer is over the surface.
const LIVE_POINTER_BOOST: f64 = 1.5;

const IDEA_BASE_CHANCE: f64 = 0.04;
const IDEA_ACTIVATION_GAIN: f64 = 0.25;

/// Idea pulses top out below the slowest ordinary pulse.
const IDEA_MIN_SPEED: f64 = 0.003;
const IDEA_SPEED_SPREAD: f64 = 0.004;
const PULSE_MIN_SPEED: f64 = 0.008;
const PULSE_SPEED_SPREAD: f64 = 0.012;

/// Progress within this distance of 1.0 counts as arrived.
const ARRIVAL_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    pub point: Point,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pulse {
    pub from: usize,
    pub to: usize,
    pub progress: f64,
    pub speed: f64,
    pub is_idea: bool,
    pub color: Rgb,
    pub size: f64,
    pub trail: VecDeque<TrailPoint>,
}

impl Pulse {
    pub fn new(from: usize, to: usize, speed: f64, is_idea: bool, color: Rgb, size: f64) -> Self {
        Self {
            from,
            to,
            progress: 0.0,
            speed,
            is_idea,
            color,
            size,
            trail: VecDeque::with_capacity(if is_idea { TRAIL_LEN } else { 0 }),
        }
    }

    /// Current point on the curved edge, or `None` if an endpoint is gone.
    pub fn position(&self, nodes: &[Node], time: f64) -> Option<Point> {
        let a = nodes.get(self.from)?;
        let b = nodes.get(self.to)?;
        let control = edge_control_point(a.position, a.phase, b.position, b.phase, time);
        Some(quadratic_bezier(a.position, control, b.position, self.progress))
    }

    fn record_trail(&mut self, point: Point) {
        for t in &mut self.trail {
            t.weight *= TRAIL_FADE;
        }
        if self.trail.len() == TRAIL_LEN {
            self.trail.pop_front();
        }
        self.trail.push_back(TrailPoint { point, weight: 1.0 });
    }
}

/// Proximity factor in (0, 1] for an edge shorter than `draw_distance`,
/// `None` when the edge is too long to draw or carry pulses.
pub fn edge_proximity(a: Point, b: Point, draw_distance: f64) -> Option<f64> {
    let d = a.distance(b);
    (d < draw_distance).then(|| 1.0 - d / draw_distance)
}

#[derive(Clone, Debug)]
pub struct SignalSystem {
    pulses: VecDeque<Pulse>,
    draw_distance: f64,
    palette: Vec<Rgb>,
}

impl SignalSystem {
    pub fn new(connection_distance: f64, wave_colors: &[Rgb]) -> Self {
        let palette = if wave_colors.is_empty() {
            default_wave_colors()
        } else {
            wave_colors.to_vec()
        };
        Self {
            pulses: VecDeque::with_capacity(MAX_PULSES + 1),
            draw_distance: connection_distance * DRAW_DISTANCE_FACTOR,
            palette,
        }
    }

    pub fn draw_distance(&self) -> f64 {
        self.draw_distance
    }

    pub fn pulses(&self) -> impl ExactSizeIterator<Item = &Pulse> {
        self.pulses.iter()
    }

    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    pub fn idea_count(&self) -> usize {
        self.pulses.iter().filter(|p| p.is_idea).count()
    }

    pub fn clear(&mut self) {
        self.pulses.clear();
    }

    /// Inject a pulse directly, subject to the pool cap.
    pub fn push(&mut self, pulse: Pulse) {
        self.pulses.push_back(pulse);
        self.enforce_cap();
    }

    /// One frame: advance and retire, then spawn, then cap.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        graph: &ConnectivityGraph,
        nodes: &[Node],
        time: f64,
        pointer_live: bool,
        rng: &mut R,
    ) {
        self.advance(nodes, time);
        self.spawn(graph, nodes, pointer_live, rng);
        self.enforce_cap();
    }

    fn advance(&mut self, nodes: &[Node], time: f64) {
        let count = nodes.len();
        self.pulses.retain_mut(|pulse| {
            if pulse.from >= count || pulse.to >= count {
                return false;
            }
            pulse.progress += pulse.speed;
            if pulse.progress >= 1.0 - ARRIVAL_EPSILON {
                return false;
            }
            if pulse.is_idea {
                if let Some(p) = pulse.position(nodes, time) {
                    pulse.record_trail(p);
                }
            }
            true
        });
    }

    fn spawn<R: Rng + ?Sized>(
        &mut self,
        graph: &ConnectivityGraph,
        nodes: &[Node],
        pointer_live: bool,
        rng: &mut R,
    ) {
        let liveness = if pointer_live { LIVE_POINTER_BOOST } else { 1.0 };
        for edge in graph.edges() {
            let (Some(a), Some(b)) = (nodes.get(edge.a), nodes.get(edge.b)) else {
                continue;
            };
            let Some(proximity) = edge_proximity(a.position, b.position, self.draw_distance)
            else {
                continue;
            };
            let activation = (a.activation + b.activation) * 0.5;
            let chance = BASE_SPAWN_RATE * proximity * (IDLE_ACTIVITY + activation) * liveness;
            if rng.gen::<f64>() >= chance {
                continue;
            }

            let (from, to) = if rng.gen_bool(0.5) {
                (edge.a, edge.b)
            } else {
                (edge.b, edge.a)
            };
            let pulse = self.roll_pulse(from, to, activation, rng);
            self.pulses.push_back(pulse);
        }
    }

    /// Tier, speed, color and size for a new pulse on an edge with the given
    /// mean endpoint activation.
    fn roll_pulse<R: Rng + ?Sized>(
        &self,
        from: usize,
        to: usize,
        activation: f64,
        rng: &mut R,
    ) -> Pulse {
        let gain = IDEA_ACTIVATION_GAIN * activation;
        let idea_chance = (IDEA_BASE_CHANCE + gain).clamp(0.0, 1.0);
        if rng.gen_bool(idea_chance) {
            Pulse::new(
                from,
                to,
                IDEA_MIN_SPEED + rng.gen_range(0.0..IDEA_SPEED_SPREAD),
                true,
                IDEA_WHITE,
                3.0 + rng.gen_range(0.0..1.5),
            )
        } else {
            let color = *self.palette.choose(rng).unwrap_or(&IDEA_WHITE);
            Pulse::new(
                from,
                to,
                PULSE_MIN_SPEED + rng.gen_range(0.0..PULSE_SPEED_SPREAD),
                false,
                color,
                1.5 + rng.gen_range(0.0..1.0),
            )
        }
    }

    fn enforce_cap(&mut self) {
        while self.pulses.len() > MAX_PULSES {
            self.pulses.pop_front();
        }
    }
}
