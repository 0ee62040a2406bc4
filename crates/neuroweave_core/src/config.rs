use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use clap::{ArgAction, Args};

use crate::color::Rgb;
use crate::error::{NeuralError, Result};

/// Upper bound for the global speed multiplier.
const MAX_SPEED_MULTIPLIER: f64 = 10.0;

/// Static engine configuration. Every field is optional in serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Args))]
#[serde(default)]
pub struct NeuralConfig {
    /// Node palette (comma separated #RRGGBB)
    #[cfg_attr(feature = "cli", arg(long, value_delimiter = ',', default_values_t = default_node_colors()))]
    pub node_colors: Vec<Rgb>,

    /// Ordinary pulse palette (comma separated #RRGGBB)
    #[cfg_attr(feature = "cli", arg(long, value_delimiter = ',', default_values_t = default_wave_colors()))]
    pub wave_colors: Vec<Rgb>,

    /// Upper bound on node count; actual count follows viewport area
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 90))]
    pub node_count: usize,

    /// Lower bound on node count
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 24))]
    pub min_nodes: usize,

    /// Proximity threshold (px) for density edges
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 180.0))]
    pub connection_distance: f64,

    /// Global multiplier on simulated time and node velocity
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 1.0))]
    pub speed: f64,

    /// Global alpha multiplier for every layer
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 1.0))]
    pub opacity: f64,

    /// Spawn, advance and draw signal pulses
    #[cfg_attr(feature = "cli", arg(long, default_value_t = true, action = ArgAction::Set))]
    pub show_pulses: bool,

    /// Draw dendritic branches
    #[cfg_attr(feature = "cli", arg(long, default_value_t = true, action = ArgAction::Set))]
    pub show_dendrites: bool,

    /// Frames between full connectivity rebuilds
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 120))]
    pub rebuild_interval: u32,

    /// Fixed RNG seed (entropy when absent)
    #[cfg_attr(feature = "cli", arg(long))]
    pub seed: Option<u64>,
}

pub fn default_node_colors() -> Vec<Rgb> {
    vec![
        Rgb::new(0x7D, 0xD3, 0xFC),
        Rgb::new(0xA7, 0x8B, 0xFA),
        Rgb::new(0xF4, 0x72, 0xB6),
        Rgb::new(0x34, 0xD3, 0x99),
    ]
}

pub fn default_wave_colors() -> Vec<Rgb> {
    vec![
        Rgb::new(0x38, 0xBD, 0xF8),
        Rgb::new(0xC0, 0x84, 0xFC),
        Rgb::new(0xFB, 0x71, 0x85),
    ]
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            node_colors: default_node_colors(),
            wave_colors: default_wave_colors(),
            node_count: 90,
            min_nodes: 24,
            connection_distance: 180.0,
            speed: 1.0,
            opacity: 1.0,
            show_pulses: true,
            show_dendrites: true,
            rebuild_interval: 120,
            seed: None,
        }
    }
}

impl NeuralConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a `.json` or `.toml` file, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content = fs::read_to_string(path)?;
        match ext.as_str() {
            "json" => Self::from_json_str(&content),
            "toml" => Self::from_toml_str(&content),
            other => Err(NeuralError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Copy with every out-of-range field pulled back into its valid range.
    ///
    /// Non-finite numbers fall back to the default value.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut cfg = self.clone();

        if cfg.node_colors.is_empty() {
            warn!("node_colors is empty, using default palette");
            cfg.node_colors = defaults.node_colors.clone();
        }
        if cfg.wave_colors.is_empty() {
            warn!("wave_colors is empty, using default palette");
            cfg.wave_colors = defaults.wave_colors.clone();
        }
        if !cfg.opacity.is_finite() || !(0.0..=1.0).contains(&cfg.opacity) {
            let fixed = if cfg.opacity.is_finite() {
                cfg.opacity.clamp(0.0, 1.0)
            } else {
                defaults.opacity
            };
            warn!("opacity {} out of range, using {}", cfg.opacity, fixed);
            cfg.opacity = fixed;
        }
        if !cfg.speed.is_finite() || !(0.0..=MAX_SPEED_MULTIPLIER).contains(&cfg.speed) {
            let fixed = if cfg.speed.is_finite() {
                cfg.speed.clamp(0.0, MAX_SPEED_MULTIPLIER)
            } else {
                defaults.speed
            };
            warn!("speed {} out of range, using {}", cfg.speed, fixed);
            cfg.speed = fixed;
        }
        if !cfg.connection_distance.is_finite() || cfg.connection_distance < 1.0 {
            warn!(
                "connection_distance {} too small, using {}",
                cfg.connection_distance, defaults.connection_distance
            );
            cfg.connection_distance = defaults.connection_distance;
        }
        if cfg.rebuild_interval == 0 {
            warn!("rebuild_interval must be at least 1 frame");
            cfg.rebuild_interval = 1;
        }
        cfg
    }
}
