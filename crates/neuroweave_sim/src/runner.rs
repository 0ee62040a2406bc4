//! Frame loop with connectivity verification.

use anyhow::{bail, Result};
use neuroweave_core::{FrameOutcome, FrameStats, NeuralEngine, RecordingSurface};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::script::PointerScript;

/// One CSV row: engine statistics plus what the renderer emitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameRow {
    pub frame: u64,
    pub time: f64,
    pub nodes: usize,
    pub edges: usize,
    pub mst_edges: usize,
    pub pulses: usize,
    pub idea_pulses: usize,
    pub avg_activation: f64,
    pub rebuilt: bool,
    pub draw_commands: usize,
}

impl FrameRow {
    fn new(stats: FrameStats, draw_commands: usize) -> Self {
        Self {
            frame: stats.frame,
            time: stats.time,
            nodes: stats.nodes,
            edges: stats.edges,
            mst_edges: stats.mst_edges,
            pulses: stats.pulses,
            idea_pulses: stats.idea_pulses,
            avg_activation: stats.avg_activation,
            rebuilt: stats.rebuilt,
            draw_commands,
        }
    }
}

/// Aggregates over a whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub rebuilds: u64,
    pub peak_pulses: usize,
    pub peak_idea_pulses: usize,
    pub mean_activation: f64,
    pub peak_draw_commands: usize,
    pub last: FrameStats,
}

/// Runs `frames` frames, handing each row to `sink`.
///
/// Fails as soon as a rebuilt graph leaves the field disconnected, or when
/// the engine refuses to advance.
pub fn run<R, F>(
    engine: &mut NeuralEngine<R>,
    frames: u64,
    script: PointerScript,
    mut sink: F,
) -> Result<RunSummary>
where
    R: Rng,
    F: FnMut(&FrameRow) -> Result<()>,
{
    if !engine.is_running() {
        engine.start();
    }
    verify_connected(engine)?;

    let mut surface = RecordingSurface::new();
    let mut summary = RunSummary::default();
    let mut activation_sum = 0.0;

    for frame in 0..frames {
        script.apply(engine, frame);
        surface.reset();
        if engine.frame(&mut surface) == FrameOutcome::Stopped {
            bail!("engine stopped at frame {frame}");
        }

        let stats = engine.stats();
        if stats.rebuilt {
            summary.rebuilds += 1;
            verify_connected(engine)?;
            debug!(frame = stats.frame, edges = stats.edges, "graph rebuilt");
        }

        let row = FrameRow::new(stats, surface.len());
        sink(&row)?;

        summary.frames += 1;
        summary.peak_pulses = summary.peak_pulses.max(stats.pulses);
        summary.peak_idea_pulses = summary.peak_idea_pulses.max(stats.idea_pulses);
        summary.peak_draw_commands = summary.peak_draw_commands.max(row.draw_commands);
        activation_sum += stats.avg_activation;
        summary.last = stats;
    }

    if summary.frames > 0 {
        summary.mean_activation = activation_sum / summary.frames as f64;
    } else {
        warn!("run finished without rendering a frame");
    }
    Ok(summary)
}

fn verify_connected<R: Rng>(engine: &NeuralEngine<R>) -> Result<()> {
    let nodes = engine.field().len();
    if !engine.graph().is_connected(nodes) {
        bail!(
            "graph disconnected at frame {}: {} nodes, {} edges",
            engine.frame_count(),
            nodes,
            engine.graph().len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuroweave_core::{NeuralConfig, Viewport};

    fn engine(seed: u64) -> NeuralEngine {
        let config = NeuralConfig {
            seed: Some(seed),
            ..NeuralConfig::default()
        };
        NeuralEngine::new(config, Viewport::new(1024.0, 768.0, 1.0))
    }

    #[test]
    fn sink_sees_every_frame() {
        let mut engine = engine(3);
        let mut seen = Vec::new();
        let summary = run(&mut engine, 250, PointerScript::Orbit, |row| {
            seen.push(row.frame);
            Ok(())
        })
        .unwrap();
        assert_eq!(summary.frames, 250);
        assert_eq!(seen, (1..=250).collect::<Vec<_>>());
        assert_eq!(summary.rebuilds, 2);
        assert!(summary.peak_draw_commands > 0);
    }

    #[test]
    fn sink_errors_abort_the_run() {
        let mut engine = engine(4);
        let result = run(&mut engine, 100, PointerScript::None, |row| {
            if row.frame == 10 {
                bail!("disk full");
            }
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(engine.frame_count(), 10);
    }

    #[test]
    fn zero_frames_is_an_empty_summary() {
        let mut engine = engine(5);
        let summary = run(&mut engine, 0, PointerScript::None, |_| Ok(())).unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.mean_activation, 0.0);
    }
}
