//! Boundary errors.
//!
//! The frame loop itself is infallible; these only surface while turning
//! external input (color strings, config files) into engine types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NeuralError {
    #[error("Invalid color '{0}': expected #RRGGBB")]
    InvalidColor(String),

    #[error("Config parse error (json): {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error (toml): {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported config format '{0}': expected .json or .toml")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, NeuralError>;
