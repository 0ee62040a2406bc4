//! Scripted pointer input.

use clap::ValueEnum;
use neuroweave_core::{NeuralEngine, Viewport};
use rand::Rng;

/// Frames per sweep cycle, including the touch-free gap.
const SWEEP_PERIOD: u64 = 600;
/// Frames at the end of each sweep cycle with no contact.
const SWEEP_GAP: u64 = 120;
/// Orbit angular rate in radians per frame.
const ORBIT_RATE: f64 = 0.02;
/// Orbit radius as a fraction of the shorter viewport side.
const ORBIT_RADIUS: f64 = 0.3;

/// Synthetic input fed to the engine before each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PointerScript {
    /// No pointer at all; the field runs on idle activity.
    None,
    /// Mouse circling the viewport centre.
    #[default]
    Orbit,
    /// Touch dragging left to right, lifted for a gap every cycle.
    Sweep,
}

impl PointerScript {
    /// Feeds the input for `frame` (0-based) into the engine.
    pub fn apply<R: Rng>(self, engine: &mut NeuralEngine<R>, frame: u64) {
        let viewport = engine.viewport();
        match self {
            PointerScript::None => {}
            PointerScript::Orbit => {
                let (x, y) = orbit_position(viewport, frame);
                engine.pointer_move(x, y);
            }
            PointerScript::Sweep => {
                let phase = frame % SWEEP_PERIOD;
                let active = SWEEP_PERIOD - SWEEP_GAP;
                if phase < active {
                    let x = viewport.width * phase as f64 / active as f64;
                    engine.touch_move(x, viewport.height * 0.5);
                } else if phase == active {
                    engine.touch_end();
                }
            }
        }
    }
}

fn orbit_position(viewport: Viewport, frame: u64) -> (f64, f64) {
    let radius = viewport.width.min(viewport.height) * ORBIT_RADIUS;
    let angle = frame as f64 * ORBIT_RATE;
    (
        viewport.width * 0.5 + radius * angle.cos(),
        viewport.height * 0.5 + radius * angle.sin(),
    )
}
