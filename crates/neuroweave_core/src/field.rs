//! NodeField: the animated neuron population.
//!
//! Nodes are generated once per viewport (init or resize) and then mutated
//! every frame. No node is ever removed on its own; the whole field is
//! replaced on resize.
//!
//! # Per-frame update order
//!
//! | Step | Effect |
//! |------|--------|
//! | a | ease `activation` toward proximity to the smoothed pointer |
//! | b | Brownian jitter on velocity |
//! | c | velocity damping |
//! | d | clamp speed to a depth-scaled maximum |
//! | e | integrate position plus slow sinusoidal drift |
//! | f | pointer attraction (squared falloff) |
//! | g | wrap across padded bounds |

use core::f64::consts::TAU;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::color::Rgb;
use crate::config::{default_node_colors, NeuralConfig};
use crate::geometry::{Bounds, Point};
use crate::input::InputTracker;

// =============================================================================
// Generation constants
// =============================================================================

/// Canvas area (px²) that one node accounts for when sizing the field.
pub const AREA_PER_NODE: f64 = 14_000.0;

/// Cumulative tier split: 69% plain, 24% ringed, 7% nucleated.
const TIER_PLAIN_CUTOFF: f64 = 0.69;
const TIER_RINGED_CUTOFF: f64 = 0.93;

pub const MIN_DEPTH: f64 = 0.3;
pub const MAX_DEPTH: f64 = 1.0;

// =============================================================================
// Physics constants
// =============================================================================

/// Radius (px) within which the pointer excites and attracts nodes.
pub const ACTIVATION_RADIUS: f64 = 200.0;

/// Fixed per-frame easing factor for activation.
const ACTIVATION_EASING: f64 = 0.08;

/// Exponent of the activation falloff `(1 - d/R)^k`.
const ACTIVATION_FALLOFF: f64 = 1.5;

const JITTER: f64 = 0.02;
const DAMPING: f64 = 0.99;
pub const MAX_SPEED: f64 = 0.35;
const DRIFT: f64 = 0.05;
const ATTRACTION: f64 = 0.02;

/// Margin (px) beyond the bounds before a node wraps to the other side.
pub const WRAP_PADDING: f64 = 20.0;

/// Visual complexity tier of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeTier {
    /// Soma and dendrites only
    Plain = 0,
    /// Adds a pulsing ring and an offset nucleus
    Ringed = 1,
    /// Second ring, more and longer dendrites; rarest
    Elaborate = 2,
}

impl NodeTier {
    fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let r: f64 = rng.gen();
        if r < TIER_PLAIN_CUTOFF {
            NodeTier::Plain
        } else if r < TIER_RINGED_CUTOFF {
            NodeTier::Ringed
        } else {
            NodeTier::Elaborate
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    /// Ring and nucleus are drawn from tier 1 up.
    pub fn is_ornamented(self) -> bool {
        self >= NodeTier::Ringed
    }
}

/// One dendritic branch, fixed at node creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dendrite {
    /// Direction from the soma (radians)
    pub angle: f64,
    /// Branch length (px), already depth scaled
    pub length: f64,
    /// Signed bend in [-0.5, 0.5]
    pub curvature: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub position: Point,
    pub velocity: Point,
    pub base_radius: f64,
    pub depth: f64,
    pub tier: NodeTier,
    pub color: Rgb,
    pub secondary_color: Rgb,
    pub phase: f64,
    pub dendrites: Vec<Dendrite>,
    pub activation: f64,
}

impl Node {
    /// Create a node at `position` with random appearance.
    pub fn spawn<R: Rng + ?Sized>(position: Point, palette: &[Rgb], rng: &mut R) -> Self {
        let fallback;
        let palette = if palette.is_empty() {
            fallback = default_node_colors();
            &fallback[..]
        } else {
            palette
        };
        let tier = NodeTier::roll(rng);
        let depth = rng.gen_range(MIN_DEPTH..=MAX_DEPTH);
        let tier_f = tier.level() as f64;
        let base_radius = 2.0 + rng.gen_range(0.0..2.5) + 1.2 * tier_f;
        let max_speed = MAX_SPEED * depth;
        let velocity = Point::new(
            rng.gen_range(-max_speed..=max_speed) * 0.5,
            rng.gen_range(-max_speed..=max_speed) * 0.5,
        );
        // palette is non-empty here
        let color = *palette.choose(rng).unwrap_or(&palette[0]);
        let secondary_color = *palette.choose(rng).unwrap_or(&palette[0]);
        let phase = rng.gen_range(0.0..TAU);
        let dendrites = Self::grow_dendrites(tier, depth, rng);

        Node {
            position,
            velocity,
            base_radius,
            depth,
            tier,
            color,
            secondary_color,
            phase,
            dendrites,
            activation: 0.0,
        }
    }

    fn grow_dendrites<R: Rng + ?Sized>(tier: NodeTier, depth: f64, rng: &mut R) -> Vec<Dendrite> {
        let tier_f = tier.level() as f64;
        let count = 2 + 2 * tier.level() as usize + rng.gen_range(0..=1);
        let base_angle = rng.gen_range(0.0..TAU);
        (0..count)
            .map(|i| Dendrite {
                angle: base_angle + i as f64 * TAU / count as f64 + rng.gen_range(-0.3..0.3),
                length: (18.0 + rng.gen_range(0.0..22.0)) * (1.0 + 0.35 * tier_f) * depth,
                curvature: rng.gen_range(-0.5..=0.5),
            })
            .collect()
    }

    /// Drawn soma radius, including the breathing oscillation.
    pub fn radius_at(&self, time: f64) -> f64 {
        let breathing = 1.0 + 0.12 * (time * 1.6 + self.phase).sin();
        self.base_radius * self.depth * breathing
    }
}

/// Wrap one coordinate across `[-pad, extent + pad]`.
pub fn wrap_coordinate(value: f64, extent: f64, pad: f64) -> f64 {
    let span = extent + 2.0 * pad;
    if value < -pad {
        value + span
    } else if value > extent + pad {
        value - span
    } else {
        value
    }
}

/// Number of nodes for a viewport: area based, clamped to `[min_nodes, node_count]`.
pub fn node_count_for(bounds: Bounds, config: &NeuralConfig) -> usize {
    let by_area = (bounds.area() / AREA_PER_NODE).round() as usize;
    let upper = config.node_count;
    let lower = config.min_nodes.min(upper);
    by_area.clamp(lower, upper)
}

#[derive(Clone, Debug, Default)]
pub struct NodeField {
    nodes: Vec<Node>,
    bounds: Option<Bounds>,
}

impl NodeField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh field sized from `bounds`, replacing any existing nodes.
    pub fn generate<R: Rng + ?Sized>(bounds: Bounds, config: &NeuralConfig, rng: &mut R) -> Self {
        let count = node_count_for(bounds, config);
        let nodes = (0..count)
            .map(|_| {
                let position = Point::new(
                    rng.gen::<f64>() * bounds.width,
                    rng.gen::<f64>() * bounds.height,
                );
                Node::spawn(position, &config.node_colors, rng)
            })
            .collect();
        Self {
            nodes,
            bounds: Some(bounds),
        }
    }

    /// Wrap an existing node set, e.g. hand-placed nodes in tests.
    pub fn from_nodes(nodes: Vec<Node>, bounds: Bounds) -> Self {
        Self {
            nodes,
            bounds: Some(bounds),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    pub fn average_activation(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.nodes.iter().map(|n| n.activation).sum::<f64>() / self.nodes.len() as f64
    }

    /// Advance every node by one frame.
    ///
    /// `time` is accumulated simulated time, `speed` the global multiplier.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        time: f64,
        pointer: &InputTracker,
        speed: f64,
        rng: &mut R,
    ) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let cursor = pointer.smoothed();
        let live = pointer.is_live();

        for node in &mut self.nodes {
            let dx = cursor.x - node.position.x;
            let dy = cursor.y - node.position.y;
            let dist = dx.hypot(dy);

            // (a) activation
            let target = if dist < ACTIVATION_RADIUS {
                (1.0 - dist / ACTIVATION_RADIUS).powf(ACTIVATION_FALLOFF)
            } else {
                0.0
            };
            node.activation += (target - node.activation) * ACTIVATION_EASING;
            node.activation = node.activation.clamp(0.0, 1.0);

            // (b) jitter
            let kick = JITTER * speed * node.depth;
            node.velocity.x += (rng.gen::<f64>() - 0.5) * kick;
            node.velocity.y += (rng.gen::<f64>() - 0.5) * kick;

            // (c) damping
            node.velocity.x *= DAMPING;
            node.velocity.y *= DAMPING;

            // (d) clamp
            let limit = MAX_SPEED * node.depth * speed;
            let v = node.velocity.x.hypot(node.velocity.y);
            if v > limit && v > 0.0 {
                let scale = limit / v;
                node.velocity.x *= scale;
                node.velocity.y *= scale;
            }

            // (e) integrate with drift
            let drift = DRIFT * node.depth;
            node.position.x += node.velocity.x + (time * 0.5 + node.phase).sin() * drift;
            node.position.y += node.velocity.y + (time * 0.4 + node.phase).cos() * drift;

            // (f) attraction
            if live && dist < ACTIVATION_RADIUS && dist > 1.0 {
                let pull = (1.0 - dist / ACTIVATION_RADIUS).powi(2) * ATTRACTION;
                node.velocity.x += dx / dist * pull;
                node.velocity.y += dy / dist * pull;
            }

            // (g) wrap
            node.position.x = wrap_coordinate(node.position.x, bounds.width, WRAP_PADDING);
            node.position.y = wrap_coordinate(node.position.y, bounds.height, WRAP_PADDING);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn count_follows_area_within_limits() {
        let cfg = NeuralConfig::default();
        assert_eq!(node_count_for(Bounds::new(100.0, 100.0), &cfg), 24);
        assert_eq!(node_count_for(Bounds::new(1400.0, 600.0), &cfg), 60);
        assert_eq!(node_count_for(Bounds::new(4000.0, 3000.0), &cfg), 90);

        let inverted = NeuralConfig {
            min_nodes: 50,
            node_count: 10,
            ..NeuralConfig::default()
        };
        assert_eq!(node_count_for(Bounds::new(100.0, 100.0), &inverted), 10);
    }

    #[test]
    fn tier_split_roughly_matches() {
        let mut rng = rng();
        let mut counts = [0usize; 3];
        for _ in 0..20_000 {
            counts[NodeTier::roll(&mut rng).level() as usize] += 1;
        }
        let share = |c: usize| c as f64 / 20_000.0;
        assert!((share(counts[0]) - 0.69).abs() < 0.02);
        assert!((share(counts[1]) - 0.24).abs() < 0.02);
        assert!((share(counts[2]) - 0.07).abs() < 0.02);
    }

    #[test]
    fn spawned_nodes_respect_ranges() {
        let mut rng = rng();
        let palette = default_node_colors();
        for _ in 0..500 {
            let node = Node::spawn(Point::new(0.0, 0.0), &palette, &mut rng);
            assert!((MIN_DEPTH..=MAX_DEPTH).contains(&node.depth));
            assert!(palette.contains(&node.color));
            assert!(palette.contains(&node.secondary_color));
            let expected_min = 2 + 2 * node.tier.level() as usize;
            let branches = node.dendrites.len();
            assert!(branches == expected_min || branches == expected_min + 1);
            assert_eq!(node.activation, 0.0);
        }
    }

    #[test]
    fn empty_palette_falls_back() {
        let node = Node::spawn(Point::new(1.0, 1.0), &[], &mut rng());
        assert!(default_node_colors().contains(&node.color));
    }

    #[test]
    fn dendrites_are_not_regenerated() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut rng = rng();
        let mut field = NodeField::generate(bounds, &NeuralConfig::default(), &mut rng);
        let before: Vec<_> = field.nodes().iter().map(|n| n.dendrites.clone()).collect();
        let input = InputTracker::new();
        for frame in 0..50 {
            field.update(frame as f64 * 0.016, &input, 1.0, &mut rng);
        }
        let after: Vec<_> = field.nodes().iter().map(|n| n.dendrites.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn wrap_moves_to_opposite_padded_edge() {
        assert_eq!(wrap_coordinate(821.0, 800.0, 20.0), 821.0 - 840.0);
        assert_eq!(wrap_coordinate(-21.0, 800.0, 20.0), -21.0 + 840.0);
        assert_eq!(wrap_coordinate(400.0, 800.0, 20.0), 400.0);
        assert_eq!(wrap_coordinate(820.0, 800.0, 20.0), 820.0);
    }

    #[test]
    fn node_past_right_edge_reappears_left() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut rng = rng();
        let mut node = Node::spawn(Point::new(830.0, 300.0), &default_node_colors(), &mut rng);
        node.velocity = Point::new(0.0, 0.0);
        let mut field = NodeField::from_nodes(vec![node], bounds);
        field.update(0.0, &InputTracker::new(), 1.0, &mut rng);
        let p = field.nodes()[0].position;
        assert!(p.x < 0.0 && p.x >= -WRAP_PADDING, "x = {}", p.x);
    }

    #[test]
    fn activation_rises_near_pointer_and_stays_bounded() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut rng = rng();
        let mut node = Node::spawn(Point::new(400.0, 300.0), &default_node_colors(), &mut rng);
        node.velocity = Point::new(0.0, 0.0);
        let mut field = NodeField::from_nodes(vec![node], bounds);
        let mut input = InputTracker::new();
        input.pointer_move(400.0, 300.0);
        let mut last = 0.0;
        for frame in 0..400 {
            input.update();
            field.update(frame as f64 * 0.016, &input, 1.0, &mut rng);
            let a = field.nodes()[0].activation;
            assert!((0.0..=1.0).contains(&a));
            // smoothed cursor enters the radius around frame 18
            if frame > 20 && frame < 40 {
                assert!(a > last, "activation should ease upward");
            }
            last = a;
        }
        assert!(last > 0.5);

        input.pointer_leave();
        for frame in 0..200 {
            input.update();
            field.update(frame as f64 * 0.016, &input, 1.0, &mut rng);
        }
        assert!(field.nodes()[0].activation < 0.01);
    }

    #[test]
    fn speed_stays_under_depth_scaled_limit() {
        let bounds = Bounds::new(1200.0, 900.0);
        let mut rng = rng();
        let mut field = NodeField::generate(bounds, &NeuralConfig::default(), &mut rng);
        let input = InputTracker::new();
        for frame in 0..300 {
            field.update(frame as f64 * 0.016, &input, 1.0, &mut rng);
            for n in field.nodes() {
                let v = n.velocity.x.hypot(n.velocity.y);
                assert!(v <= MAX_SPEED * n.depth + 1e-9);
                assert!(bounds.contains_with_margin(n.position, WRAP_PADDING + 1.0));
            }
        }
    }

    #[test]
    fn empty_field_update_is_noop() {
        let mut field = NodeField::new();
        field.update(1.0, &InputTracker::new(), 1.0, &mut rng());
        assert!(field.is_empty());
        assert_eq!(field.average_activation(), 0.0);
    }

    fn settled_pointer(x: f64, y: f64) -> InputTracker {
        let mut input = InputTracker::new();
        input.pointer_move(x, y);
        for _ in 0..300 {
            input.update();
        }
        input
    }

    /// Velocity gained from the pointer alone: same seed, pointer on vs off.
    fn attraction_at(distance: f64) -> Point {
        let bounds = Bounds::new(800.0, 600.0);
        let mut node = Node::spawn(Point::new(300.0, 300.0), &default_node_colors(), &mut rng());
        node.velocity = Point::new(0.0, 0.0);

        let mut pulled = NodeField::from_nodes(vec![node.clone()], bounds);
        let mut free = NodeField::from_nodes(vec![node], bounds);
        let input = settled_pointer(300.0 + distance, 300.0);
        let idle = InputTracker::new();
        pulled.update(0.0, &input, 1.0, &mut ChaCha8Rng::seed_from_u64(9));
        free.update(0.0, &idle, 1.0, &mut ChaCha8Rng::seed_from_u64(9));

        let a = pulled.nodes()[0].velocity;
        let b = free.nodes()[0].velocity;
        Point::new(a.x - b.x, a.y - b.y)
    }

    #[test]
    fn pointer_pulls_nodes_with_squared_falloff() {
        let near = attraction_at(50.0);
        let mid = attraction_at(100.0);
        let far = attraction_at(150.0);

        // pull points at the pointer (+x)
        for pull in [near, mid, far] {
            assert!(pull.x > 0.0, "pull {pull:?}");
            assert!(pull.y.abs() < 1e-9);
        }
        assert!((mid.x - 0.25 * ATTRACTION).abs() < 1e-9);
        assert!((near.x / far.x - 9.0).abs() < 1e-6);
        let outside = attraction_at(ACTIVATION_RADIUS + 10.0);
        assert_eq!(outside, Point::new(0.0, 0.0));
    }

    #[test]
    fn still_node_turns_toward_live_pointer() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut rng = rng();
        let mut node = Node::spawn(Point::new(300.0, 300.0), &default_node_colors(), &mut rng);
        node.velocity = Point::new(0.0, 0.0);
        let mut field = NodeField::from_nodes(vec![node], bounds);
        let input = settled_pointer(400.0, 300.0);
        // zero speed disables jitter and the velocity cap, leaving the pull
        field.update(0.0, &input, 0.0, &mut rng);
        let v = field.nodes()[0].velocity;
        assert!(v.x > 0.0 && v.y.abs() < 1e-12, "velocity {v:?}");
    }

    #[test]
    fn activation_fades_with_smoothed_pointer_after_leave() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut rng = rng();
        let mut node = Node::spawn(Point::new(400.0, 300.0), &default_node_colors(), &mut rng);
        node.velocity = Point::new(0.0, 0.0);
        let mut field = NodeField::from_nodes(vec![node], bounds);
        let mut input = settled_pointer(400.0, 300.0);
        for frame in 0..300 {
            input.update();
            field.update(frame as f64 * 0.016, &input, 1.0, &mut rng);
        }
        let before = field.nodes()[0].activation;

        input.pointer_leave();
        input.update();
        field.update(4.8, &input, 1.0, &mut rng);
        let after = field.nodes()[0].activation;

        // still inside the radius, so the target is well above zero
        let dropped_to_zero = before * (1.0 - ACTIVATION_EASING);
        println!("activation {before:.4} -> {after:.4}");
        assert!(after < before);
        assert!(after - dropped_to_zero > 0.03);
    }
}
