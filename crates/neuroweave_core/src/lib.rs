//! Neuroweave: an ambient, pointer-reactive neuron field.
//!
//! The engine animates a set of drifting nodes, keeps them connected through
//! a periodically rebuilt spanning graph, sends signal pulses along the edges
//! and renders everything in a fixed layer order onto any backend that
//! implements [`surface::DrawingSurface`].
//!
//! # Frame pipeline
//!
//! ```text
//! InputTracker ──► NodeField.update ──► (every N frames) ConnectivityGraph.rebuild
//!                                                │
//!                      Renderer.draw ◄── SignalSystem.update
//! ```
//!
//! Hosts (browser binding, headless runner) own scheduling and only call
//! [`engine::NeuralEngine::frame`] once per display refresh.

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod geometry;
pub mod graph;
pub mod input;
pub mod render;
pub mod signal;
pub mod surface;

pub use color::{Rgb, Rgba};
pub use config::NeuralConfig;
pub use engine::{FrameOutcome, FrameStats, NeuralEngine, Viewport};
pub use error::NeuralError;
pub use field::{Dendrite, Node, NodeField, NodeTier};
pub use geometry::{edge_control_point, quadratic_bezier, Bounds, Point};
pub use graph::{ConnectivityGraph, Edge};
pub use input::InputTracker;
pub use render::{Renderer, Scene};
pub use signal::{Pulse, SignalSystem};
pub use surface::{ColorStop, DrawCommand, DrawingSurface, Layer, Paint, RecordingSurface};
