//! Run configuration for the chirplab pipelines.
//!
//! A single TOML document, [`LabConfig`], holds the chirp, spectrogram,
//! downsampling, anti-aliasing, denoising, synthesis and export settings.
//! Every field has a default, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use chirplab_config::LabConfig;
//!
//! // Load and validate a configuration file
//! let mut config = LabConfig::load("chirplab.toml").unwrap();
//!
//! // Adjust and write it back
//! config.downsample.factor = 4;
//! config.save("chirplab.toml").unwrap();
//! ```

mod error;
mod lab;

/// Range checks for configuration values.
pub mod validation;

pub use error::{ConfigError, FileOp};
pub use lab::{
    AntialiasConfig, ChirpConfig, DEFAULT_ASSUMED_RATE, DenoiseConfig, DownsampleConfig,
    ExportConfig, LabConfig, SpectrogramConfig, StrategyName, SynthConfig,
};
pub use validation::{ValidationError, ValidationResult, validate_config};
