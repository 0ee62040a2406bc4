//! NeuralEngine: the animation loop driver.
//!
//! One engine owns every piece of simulation state (nodes, edges, pulses,
//! smoothed pointer) plus the random source. Hosts call [`NeuralEngine::frame`]
//! once per display refresh; the engine advances simulated time by a fixed
//! nominal step scaled by the configured speed (not by wall-clock delta), runs
//! the update pipeline and then renders.
//!
//! Stopping is immediate: a stopped engine neither mutates state nor issues
//! draw calls until started again.

use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::NeuralConfig;
use crate::field::NodeField;
use crate::geometry::Bounds;
use crate::graph::ConnectivityGraph;
use crate::input::InputTracker;
use crate::render::{Renderer, Scene};
use crate::signal::SignalSystem;
use crate::surface::DrawingSurface;

/// Simulated seconds per frame at speed 1.0.
pub const NOMINAL_STEP: f64 = 0.016;

/// Device pixel ratio ceiling, bounds backing-store cost on dense displays.
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

/// Drawing region in CSS pixels plus the device pixel ratio of the backing store.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let dpr = if device_pixel_ratio.is_finite() {
            device_pixel_ratio.clamp(1.0, MAX_DEVICE_PIXEL_RATIO)
        } else {
            1.0
        };
        let finite = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            width: finite(width),
            height: finite(height),
            device_pixel_ratio: dpr,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Backing-store width in device pixels.
    pub fn pixel_width(&self) -> u32 {
        (self.width * self.device_pixel_ratio).ceil() as u32
    }

    /// Backing-store height in device pixels.
    pub fn pixel_height(&self) -> u32 {
        (self.height * self.device_pixel_ratio).ceil() as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Frame ran; the host should schedule another
    Continue,
    /// Engine is stopped; nothing was updated or drawn
    Stopped,
}

/// Snapshot of engine counters after a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub frame: u64,
    pub time: f64,
    pub nodes: usize,
    pub edges: usize,
    pub mst_edges: usize,
    pub pulses: usize,
    pub idea_pulses: usize,
    pub avg_activation: f64,
    pub rebuilt: bool,
}

pub struct NeuralEngine<R: Rng = ChaCha8Rng> {
    config: NeuralConfig,
    rng: R,
    viewport: Viewport,
    field: NodeField,
    graph: ConnectivityGraph,
    signals: SignalSystem,
    input: InputTracker,
    renderer: Renderer,
    time: f64,
    frame: u64,
    frames_since_rebuild: u32,
    rebuilt_this_frame: bool,
    running: bool,
}

impl NeuralEngine<ChaCha8Rng> {
    /// Engine seeded from `config.seed`, or from OS entropy when unset.
    pub fn new(config: NeuralConfig, viewport: Viewport) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, viewport, rng)
    }
}

impl<R: Rng> NeuralEngine<R> {
    pub fn with_rng(config: NeuralConfig, viewport: Viewport, rng: R) -> Self {
        let config = config.sanitized();
        let mut engine = Self {
            renderer: Renderer::new(&config),
            signals: SignalSystem::new(config.connection_distance, &config.wave_colors),
            config,
            rng,
            viewport,
            field: NodeField::new(),
            graph: ConnectivityGraph::new(),
            input: InputTracker::new(),
            time: 0.0,
            frame: 0,
            frames_since_rebuild: 0,
            rebuilt_this_frame: false,
            running: false,
        };
        engine.populate();
        engine
    }

    fn populate(&mut self) {
        self.field = NodeField::generate(self.viewport.bounds(), &self.config, &mut self.rng);
        self.signals.clear();
        self.rebuild_graph();
    }

    /// Scheduled compaction: replace the edge list wholesale.
    fn rebuild_graph(&mut self) {
        self.graph = ConnectivityGraph::build(self.field.nodes(), self.config.connection_distance);
        self.frames_since_rebuild = 0;
        self.rebuilt_this_frame = true;
        debug!(
            "graph rebuilt at frame {}: {} nodes, {} edges ({} spanning)",
            self.frame,
            self.field.len(),
            self.graph.len(),
            self.graph.mst_edge_count()
        );
    }

    pub fn start(&mut self) {
        if !self.running {
            debug!("engine started at frame {}", self.frame);
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            debug!("engine stopped at frame {}", self.frame);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Regenerate the whole field for a new viewport.
    pub fn resize(&mut self, viewport: Viewport) {
        debug!(
            "resize {}x{} -> {}x{} (dpr {})",
            self.viewport.width,
            self.viewport.height,
            viewport.width,
            viewport.height,
            viewport.device_pixel_ratio
        );
        self.viewport = viewport;
        self.populate();
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.input.pointer_move(x, y);
    }

    pub fn pointer_leave(&mut self) {
        self.input.pointer_leave();
    }

    pub fn touch_move(&mut self, x: f64, y: f64) {
        self.input.touch_move(x, y);
    }

    pub fn touch_end(&mut self) {
        self.input.touch_end();
    }

    /// Run the update half of one frame regardless of the running flag.
    pub fn step(&mut self) -> FrameStats {
        self.rebuilt_this_frame = false;
        self.time += NOMINAL_STEP * self.config.speed;
        self.frame += 1;

        self.input.update();
        self.field
            .update(self.time, &self.input, self.config.speed, &mut self.rng);

        self.frames_since_rebuild += 1;
        if self.frames_since_rebuild >= self.config.rebuild_interval {
            self.rebuild_graph();
        }

        if self.config.show_pulses {
            self.signals.update(
                &self.graph,
                self.field.nodes(),
                self.time,
                self.input.is_live(),
                &mut self.rng,
            );
        }

        let stats = self.stats();
        trace!("{:?}", stats);
        stats
    }

    /// Draw the current state. Reads only.
    pub fn render<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        let scene = Scene {
            bounds: self.viewport.bounds(),
            time: self.time,
            nodes: self.field.nodes(),
            graph: &self.graph,
            signals: self.config.show_pulses.then_some(&self.signals),
            input: &self.input,
            draw_distance: self.signals.draw_distance(),
        };
        self.renderer.draw(surface, &scene);
    }

    /// Update then render, if running.
    pub fn frame<S: DrawingSurface + ?Sized>(&mut self, surface: &mut S) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Stopped;
        }
        self.step();
        self.render(surface);
        FrameOutcome::Continue
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            frame: self.frame,
            time: self.time,
            nodes: self.field.len(),
            edges: self.graph.len(),
            mst_edges: self.graph.mst_edge_count(),
            pulses: self.signals.len(),
            idea_pulses: self.signals.idea_count(),
            avg_activation: self.field.average_activation(),
            rebuilt: self.rebuilt_this_frame,
        }
    }

    pub fn config(&self) -> &NeuralConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn field(&self) -> &NodeField {
        &self.field
    }

    pub fn graph(&self) -> &ConnectivityGraph {
        &self.graph
    }

    pub fn signals(&self) -> &SignalSystem {
        &self.signals
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }
}
