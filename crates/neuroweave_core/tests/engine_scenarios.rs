//! End-to-end frame scenarios against the recording surface.

use neuroweave_core::input::OFFSCREEN_SENTINEL;
use neuroweave_core::signal::MAX_PULSES;
use neuroweave_core::{FrameOutcome, Layer, NeuralConfig, NeuralEngine, RecordingSurface, Viewport};

fn seeded(seed: u64, width: f64, height: f64) -> NeuralEngine {
    let config = NeuralConfig {
        seed: Some(seed),
        ..NeuralConfig::default()
    };
    let mut engine = NeuralEngine::new(config, Viewport::new(width, height, 1.0));
    engine.start();
    engine
}

#[test]
fn pointer_glow_fades_out_after_leave() {
    let mut engine = seeded(11, 1280.0, 720.0);
    let mut surface = RecordingSurface::new();

    engine.pointer_move(640.0, 360.0);
    for _ in 0..120 {
        surface.reset();
        engine.frame(&mut surface);
    }
    assert_eq!(surface.count_in(Layer::PointerGlow), 1);

    engine.pointer_leave();
    let mut previous = engine.input().smoothed().distance(OFFSCREEN_SENTINEL);
    let mut glow_frames = 0;
    for _ in 0..400 {
        surface.reset();
        engine.frame(&mut surface);
        let d = engine.input().smoothed().distance(OFFSCREEN_SENTINEL);
        assert!(d < previous, "smoothed pointer must approach the sentinel");
        previous = d;
        glow_frames += surface.count_in(Layer::PointerGlow);
    }
    println!("glow visible for {glow_frames} frames after leave");
    assert!(glow_frames > 0, "glow should fade, not vanish");
    assert_eq!(surface.count_in(Layer::PointerGlow), 0);
}

#[test]
fn invariants_hold_over_long_run() {
    let mut engine = seeded(12, 1440.0, 900.0);
    let mut surface = RecordingSurface::new();
    for frame in 0..1500u32 {
        // pointer sweeps in and out
        if frame % 300 < 200 {
            let t = frame as f64 * 0.02;
            engine.pointer_move(720.0 + 400.0 * t.cos(), 450.0 + 250.0 * t.sin());
        } else {
            engine.pointer_leave();
        }
        surface.reset();
        assert_eq!(engine.frame(&mut surface), FrameOutcome::Continue);

        for node in engine.field().nodes() {
            assert!((0.0..=1.0).contains(&node.activation));
        }
        assert!(engine.signals().len() <= MAX_PULSES);
        for pulse in engine.signals().pulses() {
            assert!((0.0..1.0).contains(&pulse.progress));
        }
        assert!(engine.graph().len() + 1 >= engine.field().len());
        assert!(engine.graph().is_connected(engine.field().len()));
    }
    let stats = engine.stats();
    println!("{stats:?}");
    assert_eq!(stats.frame, 1500);
}

#[test]
fn saturated_field_hits_pool_cap() {
    let config = NeuralConfig {
        seed: Some(13),
        node_count: 200,
        min_nodes: 200,
        connection_distance: 260.0,
        ..NeuralConfig::default()
    };
    let mut engine = NeuralEngine::new(config, Viewport::new(900.0, 700.0, 1.0));
    engine.start();
    engine.pointer_move(450.0, 350.0);
    let mut peak = 0;
    for _ in 0..900 {
        engine.step();
        peak = peak.max(engine.signals().len());
        assert!(engine.signals().len() <= MAX_PULSES);
    }
    println!("peak pulses: {peak}");
    assert_eq!(peak, MAX_PULSES);
}

#[test]
fn zero_area_viewport_is_harmless() {
    let config = NeuralConfig {
        seed: Some(14),
        node_count: 0,
        min_nodes: 0,
        ..NeuralConfig::default()
    };
    let mut engine = NeuralEngine::new(config, Viewport::new(0.0, 0.0, 1.0));
    engine.start();
    let mut surface = RecordingSurface::new();
    for _ in 0..10 {
        engine.frame(&mut surface);
    }
    assert!(engine.field().is_empty());
    assert!(engine.graph().is_empty());
    assert!(engine.signals().is_empty());
}
