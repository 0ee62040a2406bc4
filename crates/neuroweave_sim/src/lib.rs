//! Headless driver for the Neuroweave engine.
//!
//! Replays a scripted pointer against a [`RecordingSurface`], checks the
//! connectivity guarantee after every graph rebuild and reports per-frame
//! statistics. The `neuroweave-sim` binary wraps [`runner::run`] with a CLI
//! and a CSV sink.
//!
//! [`RecordingSurface`]: neuroweave_core::RecordingSurface

pub mod runner;
pub mod script;

pub use runner::{run, FrameRow, RunSummary};
pub use script::PointerScript;
