//! Range checks for a [`LabConfig`].
//!
//! All problems are collected rather than stopping at the first one.
//!
//! ```rust
//! use chirplab_config::{LabConfig, validate_config};
//!
//! let mut config = LabConfig::default();
//! assert!(validate_config(&config).is_ok());
//!
//! config.downsample.factor = 0;
//! assert!(validate_config(&config).is_err());
//! ```

use thiserror::Error;

use crate::LabConfig;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Value outside its allowed range.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted field path, e.g. `antialias.cutoff`.
        field: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Value that is wrong for a reason other than range.
    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        /// Dotted field path.
        field: String,
        /// Description of the problem.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Default)]
struct Collector(Vec<ValidationError>);

impl Collector {
    fn positive(&mut self, field: &str, value: f64) {
        if !(value.is_finite() && value > 0.0) {
            self.0.push(ValidationError::Invalid {
                field: field.to_string(),
                reason: format!("must be a positive number, got {value}"),
            });
        }
    }

    fn range(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if !(value >= min && value <= max) {
            self.0.push(ValidationError::OutOfRange {
                field: field.to_string(),
                value,
                min,
                max,
            });
        }
    }

    fn at_least(&mut self, field: &str, value: usize, min: usize) {
        if value < min {
            self.0.push(ValidationError::Invalid {
                field: field.to_string(),
                reason: format!("must be at least {min}, got {value}"),
            });
        }
    }

    fn finish(mut self) -> ValidationResult<()> {
        match self.0.len() {
            0 => Ok(()),
            1 => Err(self.0.remove(0)),
            _ => Err(ValidationError::Multiple(self.0)),
        }
    }
}

/// Check every section of `config`.
pub fn validate_config(config: &LabConfig) -> ValidationResult<()> {
    let mut c = Collector::default();

    c.positive("chirp.duration", f64::from(config.chirp.duration));
    c.positive("chirp.sample_rate", f64::from(config.chirp.sample_rate));
    c.positive("chirp.k", f64::from(config.chirp.k));

    c.at_least("spectrogram.window_len", config.spectrogram.window_len, 1);

    c.at_least("downsample.factor", config.downsample.factor, 1);
    if config.downsample.factor > 0 {
        let scaled = config.spectrogram.window_len as f64 / config.downsample.factor as f64;
        if scaled.round() < 1.0 {
            c.0.push(ValidationError::Invalid {
                field: "spectrogram.window_len".to_string(),
                reason: format!(
                    "window of {} samples vanishes after downsampling by {}",
                    config.spectrogram.window_len, config.downsample.factor
                ),
            });
        }
    }

    c.at_least("antialias.order", config.antialias.order, 1);
    // The design needs 0 < cutoff < 1
    if !(config.antialias.cutoff > 0.0 && config.antialias.cutoff < 1.0) {
        c.0.push(ValidationError::OutOfRange {
            field: "antialias.cutoff".to_string(),
            value: f64::from(config.antialias.cutoff),
            min: 0.0,
            max: 1.0,
        });
    }

    if let Some(rate) = config.denoise.sample_rate {
        c.positive("denoise.sample_rate", f64::from(rate));
    }
    c.at_least("denoise.peaks", config.denoise.peaks, 1);

    c.positive("synth.sample_rate", f64::from(config.synth.sample_rate));
    c.at_least("synth.num_samples", config.synth.num_samples, 1);
    c.range("synth.noise_std", f64::from(config.synth.noise_std), 0.0, f64::MAX);
    if config.synth.frequencies.is_empty() {
        c.0.push(ValidationError::Invalid {
            field: "synth.frequencies".to_string(),
            reason: "needs at least one tone".to_string(),
        });
    }

    c.range("export.db_range", f64::from(config.export.db_range), 1.0, 300.0);

    c.finish()
}
