//! Layered renderer.
//!
//! Draw order is fixed: pointer glow, dendrites, edges, pulses, nodes. The
//! renderer only reads simulation state (everything arrives by shared
//! reference through [`Scene`]) and multiplies every alpha by the global
//! opacity.

use core::f64::consts::{FRAC_PI_2, TAU};

use crate::color::{Rgb, Rgba, WHITE};
use crate::config::NeuralConfig;
use crate::field::Node;
use crate::geometry::{edge_control_point, Bounds, Point};
use crate::graph::ConnectivityGraph;
use crate::input::InputTracker;
use crate::signal::{edge_proximity, Pulse, SignalSystem};
use crate::surface::{ColorStop, DrawingSurface, Layer, Paint};

/// Radius (px) of the pointer glow.
pub const GLOW_RADIUS: f64 = 220.0;

/// Vertices of the irregular soma outline.
const SOMA_VERTICES: usize = 14;

/// Segments per dendrite stroke.
const DENDRITE_SEGMENTS: usize = 3;

/// Fork length relative to its branch, and spread angle (radians).
const FORK_LENGTH: f64 = 0.35;
const FORK_SPREAD: f64 = 0.5;

/// Below this alpha a stroke is not worth issuing.
const ALPHA_FLOOR: f64 = 0.002;

/// Read-only view of everything one frame draws.
pub struct Scene<'a> {
    pub bounds: Bounds,
    pub time: f64,
    pub nodes: &'a [Node],
    pub graph: &'a ConnectivityGraph,
    /// `None` when pulses are disabled
    pub signals: Option<&'a SignalSystem>,
    pub input: &'a InputTracker,
    pub draw_distance: f64,
}

#[derive(Clone, Debug)]
pub struct Renderer {
    opacity: f64,
    show_dendrites: bool,
    glow_color: Rgb,
}

impl Renderer {
    pub fn new(config: &NeuralConfig) -> Self {
        Self {
            opacity: config.opacity.clamp(0.0, 1.0),
            show_dendrites: config.show_dendrites,
            glow_color: config.node_colors.first().copied().unwrap_or(WHITE),
        }
    }

    fn tint(&self, color: Rgb, alpha: f64) -> Rgba {
        color.with_alpha(alpha * self.opacity)
    }

    pub fn draw<S: DrawingSurface + ?Sized>(&self, surface: &mut S, scene: &Scene<'_>) {
        surface.clear(scene.bounds);
        self.draw_pointer_glow(surface, scene);
        if self.show_dendrites {
            self.draw_dendrites(surface, scene);
        }
        self.draw_edges(surface, scene);
        if let Some(signals) = scene.signals {
            self.draw_pulses(surface, scene, signals);
        }
        self.draw_nodes(surface, scene);
    }

    fn draw_pointer_glow<S: DrawingSurface + ?Sized>(&self, surface: &mut S, scene: &Scene<'_>) {
        if !scene.input.glow_visible(scene.bounds, GLOW_RADIUS) {
            return;
        }
        surface.begin_layer(Layer::PointerGlow);
        let center = scene.input.smoothed();
        let paint = Paint::Radial {
            center,
            inner_radius: 0.0,
            outer_radius: GLOW_RADIUS,
            stops: vec![
                ColorStop::new(0.0, self.tint(self.glow_color, 0.14)),
                ColorStop::new(0.5, self.tint(self.glow_color, 0.05)),
                ColorStop::new(1.0, self.tint(self.glow_color, 0.0)),
            ],
        };
        surface.fill_circle(center, GLOW_RADIUS, &paint);
    }

    fn draw_dendrites<S: DrawingSurface + ?Sized>(&self, surface: &mut S, scene: &Scene<'_>) {
        surface.begin_layer(Layer::Dendrites);
        for node in scene.nodes {
            let alpha = (0.10 + 0.35 * node.activation) * node.depth;
            let width = (0.6 + 0.8 * node.activation) * node.depth;
            let paint = Paint::Solid(self.tint(node.color, alpha));
            let fork_paint = Paint::Solid(self.tint(node.color, alpha * 0.7));
            let radius = node.radius_at(scene.time);
            let sway = (scene.time * 0.8 + node.phase).sin() * 0.05;

            for dendrite in &node.dendrites {
                let seg_len = dendrite.length / DENDRITE_SEGMENTS as f64;
                let mut angle = dendrite.angle + sway;
                let mut start = node.position.offset_polar(angle, radius);

                for k in 0..DENDRITE_SEGMENTS {
                    angle += dendrite.curvature * 0.6;
                    let end = start.offset_polar(angle, seg_len);
                    let control = start
                        .midpoint(end)
                        .offset_polar(angle + FRAC_PI_2, dendrite.curvature * seg_len * 0.5);
                    let taper = 1.0 - k as f64 * 0.25;
                    surface.stroke_quadratic(start, control, end, width * taper, &paint);

                    // forks sprout from the last joint
                    if k == DENDRITE_SEGMENTS - 2 {
                        for side in [-1.0, 1.0] {
                            let fork_angle = angle + side * FORK_SPREAD;
                            let fork_end =
                                end.offset_polar(fork_angle, dendrite.length * FORK_LENGTH);
                            let fork_control = end.midpoint(fork_end).offset_polar(
                                fork_angle + FRAC_PI_2,
                                dendrite.curvature * seg_len * 0.3,
                            );
                            surface.stroke_quadratic(
                                end,
                                fork_control,
                                fork_end,
                                width * 0.45,
                                &fork_paint,
                            );
                        }
                    }
                    start = end;
                }
            }
        }
    }

    fn draw_edges<S: DrawingSurface + ?Sized>(&self, surface: &mut S, scene: &Scene<'_>) {
        surface.begin_layer(Layer::Edges);
        for edge in scene.graph.edges() {
            let (Some(a), Some(b)) = (scene.nodes.get(edge.a), scene.nodes.get(edge.b)) else {
                continue;
            };
            let Some(proximity) = edge_proximity(a.position, b.position, scene.draw_distance)
            else {
                continue;
            };
            let depth = (a.depth + b.depth) * 0.5;
            let activation = (a.activation + b.activation) * 0.5;
            let alpha = (proximity * 0.35 * depth * (0.5 + activation)).min(1.0);
            if alpha * self.opacity < ALPHA_FLOOR {
                continue;
            }
            let control = edge_control_point(a.position, a.phase, b.position, b.phase, scene.time);
            let paint = Paint::Linear {
                from: a.position,
                to: b.position,
                stops: vec![
                    ColorStop::new(0.0, self.tint(a.color, alpha)),
                    ColorStop::new(1.0, self.tint(b.color, alpha)),
                ],
            };
            surface.stroke_quadratic(a.position, control, b.position, 0.6 + 0.8 * activation, &paint);
        }
    }

    fn draw_pulses<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        scene: &Scene<'_>,
        signals: &SignalSystem,
    ) {
        surface.begin_layer(Layer::Pulses);
        for pulse in signals.pulses() {
            let Some(pos) = pulse.position(scene.nodes, scene.time) else {
                continue;
            };
            if pulse.is_idea {
                self.draw_idea_pulse(surface, scene, pulse, pos);
            } else {
                let glow = Paint::Radial {
                    center: pos,
                    inner_radius: 0.0,
                    outer_radius: pulse.size * 4.0,
                    stops: vec![
                        ColorStop::new(0.0, self.tint(pulse.color, 0.6)),
                        ColorStop::new(1.0, self.tint(pulse.color, 0.0)),
                    ],
                };
                surface.fill_circle(pos, pulse.size * 4.0, &glow);
                surface.fill_circle(pos, pulse.size, &Paint::Solid(self.tint(pulse.color, 0.95)));
            }
        }
    }

    fn draw_idea_pulse<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        scene: &Scene<'_>,
        pulse: &Pulse,
        pos: Point,
    ) {
        for t in &pulse.trail {
            let paint = Paint::Solid(self.tint(pulse.color, 0.35 * t.weight));
            surface.fill_circle(t.point, pulse.size * (0.3 + 0.5 * t.weight), &paint);
        }
        let accent = scene
            .nodes
            .get(pulse.to)
            .map(|n| n.color)
            .unwrap_or(pulse.color);
        let glow = Paint::Radial {
            center: pos,
            inner_radius: 0.0,
            outer_radius: pulse.size * 7.0,
            stops: vec![
                ColorStop::new(0.0, self.tint(pulse.color, 0.9)),
                ColorStop::new(0.35, self.tint(accent, 0.4)),
                ColorStop::new(1.0, self.tint(accent, 0.0)),
            ],
        };
        surface.fill_circle(pos, pulse.size * 7.0, &glow);
        surface.fill_circle(pos, pulse.size * 0.8, &Paint::Solid(self.tint(WHITE, 1.0)));
    }

    fn draw_nodes<S: DrawingSurface + ?Sized>(&self, surface: &mut S, scene: &Scene<'_>) {
        surface.begin_layer(Layer::Nodes);
        let t = scene.time;
        for node in scene.nodes {
            let r = node.radius_at(t);
            let act = node.activation;

            let glow_radius = r * 6.0 * (1.0 + act);
            let glow = Paint::Radial {
                center: node.position,
                inner_radius: 0.0,
                outer_radius: glow_radius,
                stops: vec![
                    ColorStop::new(0.0, self.tint(node.color, (0.18 + 0.4 * act) * node.depth)),
                    ColorStop::new(1.0, self.tint(node.color, 0.0)),
                ],
            };
            surface.fill_circle(node.position, glow_radius, &glow);

            if node.tier.is_ornamented() {
                let rings = node.tier.level() as usize;
                for ring in 0..rings {
                    let cycle = (t * 0.4 + node.phase / TAU + ring as f64 * 0.5).fract();
                    let alpha = (1.0 - cycle) * 0.35 * node.depth * (0.6 + act);
                    let paint = Paint::Solid(self.tint(node.secondary_color, alpha));
                    surface.stroke_circle(node.position, r * (1.5 + 2.5 * cycle), node.depth, &paint);
                }
            }

            let soma: Vec<Point> = (0..SOMA_VERTICES)
                .map(|i| {
                    let theta = i as f64 * TAU / SOMA_VERTICES as f64;
                    let wobble = 1.0
                        + 0.12 * (3.0 * theta + node.phase + t).sin()
                        + 0.06 * (5.0 * theta - t * 1.3).sin();
                    node.position.offset_polar(theta, r * wobble)
                })
                .collect();
            let body = Paint::Radial {
                center: Point::new(node.position.x - r * 0.3, node.position.y - r * 0.3),
                inner_radius: 0.0,
                outer_radius: r * 1.3,
                stops: vec![
                    ColorStop::new(0.0, self.tint(node.color, 0.85 + 0.15 * act)),
                    ColorStop::new(1.0, self.tint(node.secondary_color, 0.75 * node.depth)),
                ],
            };
            surface.fill_polygon(&soma, &body);

            if node.tier.is_ornamented() {
                let center = Point::new(node.position.x - r * 0.25, node.position.y - r * 0.25);
                let paint = Paint::Solid(self.tint(WHITE.mix(node.color, 0.3), 0.5 + 0.4 * act));
                surface.fill_circle(center, r * 0.35, &paint);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_node_colors;
    use crate::field::NodeTier;
    use crate::surface::{DrawCommand, RecordingSurface};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn node_at(x: f64, y: f64, tier: NodeTier) -> Node {
        let mut rng = ChaCha8Rng::seed_from_u64(x as u64);
        let mut node = Node::spawn(Point::new(x, y), &default_node_colors(), &mut rng);
        node.tier = tier;
        node
    }

    fn scene<'a>(
        nodes: &'a [Node],
        graph: &'a ConnectivityGraph,
        signals: Option<&'a SignalSystem>,
        input: &'a InputTracker,
    ) -> Scene<'a> {
        Scene {
            bounds: Bounds::new(800.0, 600.0),
            time: 1.0,
            nodes,
            graph,
            signals,
            input,
            draw_distance: 324.0,
        }
    }

    #[test]
    fn layers_follow_fixed_order() {
        let nodes = vec![
            node_at(100.0, 100.0, NodeTier::Ringed),
            node_at(160.0, 120.0, NodeTier::Plain),
        ];
        let graph = ConnectivityGraph::build(&nodes, 180.0);
        let mut signals = SignalSystem::new(180.0, &[]);
        signals.push(Pulse::new(0, 1, 0.01, false, WHITE, 2.0));
        let mut input = InputTracker::new();
        input.pointer_move(120.0, 110.0);
        for _ in 0..100 {
            input.update();
        }

        let mut surface = RecordingSurface::new();
        Renderer::new(&NeuralConfig::default())
            .draw(&mut surface, &scene(&nodes, &graph, Some(&signals), &input));

        assert_eq!(surface.layer_order(), Layer::ALL.to_vec());
        assert!(matches!(surface.commands().next(), Some(DrawCommand::Clear(_))));
        assert_eq!(surface.count_in(Layer::PointerGlow), 1);
        assert_eq!(surface.count_in(Layer::Edges), 1);
        assert_eq!(surface.count_in(Layer::Pulses), 2);
    }

    #[test]
    fn toggles_skip_whole_layers() {
        let nodes = vec![node_at(100.0, 100.0, NodeTier::Plain)];
        let graph = ConnectivityGraph::new();
        let input = InputTracker::new();
        let config = NeuralConfig {
            show_dendrites: false,
            ..NeuralConfig::default()
        };
        let mut surface = RecordingSurface::new();
        Renderer::new(&config).draw(&mut surface, &scene(&nodes, &graph, None, &input));
        assert_eq!(surface.count_in(Layer::Dendrites), 0);
        assert_eq!(surface.count_in(Layer::Pulses), 0);
        assert_eq!(surface.count_in(Layer::PointerGlow), 0);
        assert!(surface.count_in(Layer::Nodes) > 0);
    }

    #[test]
    fn tiers_add_ring_and_nucleus() {
        let input = InputTracker::new();
        let graph = ConnectivityGraph::new();
        let renderer = Renderer::new(&NeuralConfig::default());
        let count_nodes = |tier| {
            let nodes = vec![node_at(50.0, 50.0, tier)];
            let mut surface = RecordingSurface::new();
            renderer.draw(&mut surface, &scene(&nodes, &graph, None, &input));
            let rings = surface
                .commands_in(Layer::Nodes)
                .filter(|c| matches!(c, DrawCommand::StrokeCircle { .. }))
                .count();
            let polygons = surface
                .commands_in(Layer::Nodes)
                .filter(|c| matches!(c, DrawCommand::FillPolygon { points, .. } if points.len() == SOMA_VERTICES))
                .count();
            (rings, polygons, surface.count_in(Layer::Nodes))
        };
        assert_eq!(count_nodes(NodeTier::Plain), (0, 1, 2));
        assert_eq!(count_nodes(NodeTier::Ringed), (1, 1, 4));
        assert_eq!(count_nodes(NodeTier::Elaborate), (2, 1, 5));
    }

    #[test]
    fn dendrites_draw_segments_and_forks() {
        let nodes = vec![node_at(300.0, 300.0, NodeTier::Plain)];
        let branches = nodes[0].dendrites.len();
        let graph = ConnectivityGraph::new();
        let input = InputTracker::new();
        let mut surface = RecordingSurface::new();
        Renderer::new(&NeuralConfig::default())
            .draw(&mut surface, &scene(&nodes, &graph, None, &input));
        assert_eq!(surface.count_in(Layer::Dendrites), branches * (DENDRITE_SEGMENTS + 2));
    }

    #[test]
    fn opacity_scales_every_alpha() {
        let nodes = vec![
            node_at(100.0, 100.0, NodeTier::Elaborate),
            node_at(150.0, 100.0, NodeTier::Plain),
        ];
        let graph = ConnectivityGraph::build(&nodes, 180.0);
        let input = InputTracker::new();
        let config = NeuralConfig {
            opacity: 0.25,
            ..NeuralConfig::default()
        };
        let mut surface = RecordingSurface::new();
        Renderer::new(&config).draw(&mut surface, &scene(&nodes, &graph, None, &input));
        for cmd in surface.commands() {
            let paint = match cmd {
                DrawCommand::Clear(_) => continue,
                DrawCommand::FillCircle { paint, .. }
                | DrawCommand::FillPolygon { paint, .. }
                | DrawCommand::StrokeQuadratic { paint, .. }
                | DrawCommand::StrokeCircle { paint, .. } => paint,
            };
            assert!(paint.max_alpha() <= 0.25 + 1e-12);
        }
    }

    #[test]
    fn edge_beyond_draw_distance_is_skipped() {
        let nodes = vec![
            node_at(0.0, 0.0, NodeTier::Plain),
            node_at(700.0, 0.0, NodeTier::Plain),
        ];
        let graph = ConnectivityGraph::build(&nodes, 180.0);
        assert_eq!(graph.len(), 1);
        let input = InputTracker::new();
        let mut surface = RecordingSurface::new();
        Renderer::new(&NeuralConfig::default())
            .draw(&mut surface, &scene(&nodes, &graph, None, &input));
        assert_eq!(surface.count_in(Layer::Edges), 0);
    }
}
