//! The `LabConfig` TOML document.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, FileOp};
use crate::validation::validate_config;

/// Settings for every chirplab pipeline.
///
/// Every section and field is optional in the file; missing values take
/// their defaults.
///
/// # TOML Format
///
/// ```toml
/// [chirp]
/// duration = 2.0
/// sample_rate = 8000.0
/// k = 1000.0
///
/// [spectrogram]
/// window_len = 64
///
/// [downsample]
/// factor = 2
///
/// [antialias]
/// order = 100
/// cutoff = 0.5
///
/// [denoise]
/// input = "sum_of_sines.npy"
/// sample_rate = 1000.0  # optional, assumed when absent
/// peaks = 2
/// strategy = "order-statistic"
///
/// [export]
/// output_dir = "output"
/// db_range = 80.0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabConfig {
    /// Chirp synthesis.
    pub chirp: ChirpConfig,
    /// Spectrogram window at the chirp's own rate.
    pub spectrogram: SpectrogramConfig,
    /// Decimation.
    pub downsample: DownsampleConfig,
    /// Anti-aliasing filter.
    pub antialias: AntialiasConfig,
    /// Noisy-sinusoid recovery.
    pub denoise: DenoiseConfig,
    /// Synthetic input for the denoise pipeline.
    pub synth: SynthConfig,
    /// Output files.
    pub export: ExportConfig,
}

/// `[chirp]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChirpConfig {
    /// Duration in seconds.
    pub duration: f32,
    /// Sampling rate in Hz.
    pub sample_rate: f32,
    /// Rate constant in Hz/s²; the instantaneous frequency is `k·t²`.
    pub k: f32,
}

impl Default for ChirpConfig {
    fn default() -> Self {
        Self {
            duration: 2.0,
            sample_rate: 8000.0,
            k: 1000.0,
        }
    }
}

/// `[spectrogram]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpectrogramConfig {
    /// Window length in samples at the chirp rate. Downsampled signals use
    /// a window of the same duration.
    pub window_len: usize,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self { window_len: 64 }
    }
}

/// `[downsample]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DownsampleConfig {
    /// Keep every `factor`-th sample.
    pub factor: usize,
}

impl Default for DownsampleConfig {
    fn default() -> Self {
        Self { factor: 2 }
    }
}

/// `[antialias]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AntialiasConfig {
    /// FIR order; the filter has `order + 1` taps.
    pub order: usize,
    /// Normalized cutoff, 1.0 = Nyquist of the input rate.
    pub cutoff: f32,
}

impl Default for AntialiasConfig {
    fn default() -> Self {
        Self {
            order: 100,
            cutoff: 0.5,
        }
    }
}

/// Threshold search strategy names accepted in `[denoise]`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyName {
    /// Scan the 0.001 grid from zero.
    Linear,
    /// Jump to the answer via sorted magnitudes.
    #[default]
    OrderStatistic,
}

/// Sampling rate assumed for `.npy` input when none is configured.
pub const DEFAULT_ASSUMED_RATE: f32 = 1000.0;

/// `[denoise]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DenoiseConfig {
    /// `.npy` file holding the noisy signal.
    pub input: PathBuf,
    /// Sampling rate of the input in Hz. `.npy` files do not record it;
    /// when unset, [`DEFAULT_ASSUMED_RATE`] is assumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f32>,
    /// Number of sinusoids to isolate.
    pub peaks: usize,
    /// Threshold search strategy.
    pub strategy: StrategyName,
}

impl DenoiseConfig {
    /// Configured sampling rate, or [`DEFAULT_ASSUMED_RATE`].
    pub fn assumed_sample_rate(&self) -> f32 {
        self.sample_rate.unwrap_or(DEFAULT_ASSUMED_RATE)
    }
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("sum_of_sines.npy"),
            sample_rate: None,
            peaks: 2,
            strategy: StrategyName::default(),
        }
    }
}

/// `[synth]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthConfig {
    /// Tone frequencies in Hz, unit amplitude each.
    pub frequencies: Vec<f32>,
    /// Standard deviation of the added white Gaussian noise.
    pub noise_std: f32,
    /// Sampling rate in Hz.
    pub sample_rate: f32,
    /// Number of samples.
    pub num_samples: usize,
    /// Noise generator seed.
    pub seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            frequencies: vec![30.0, 120.0],
            noise_std: 1.0,
            sample_rate: 1000.0,
            num_samples: 1000,
            seed: 42,
        }
    }
}

/// `[export]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory receiving CSV, PGM and WAV files.
    pub output_dir: PathBuf,
    /// Dynamic range of spectrogram heatmaps in dB.
    pub db_range: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            db_range: 80.0,
        }
    }
}

impl LabConfig {
    /// Load a configuration from a TOML file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::io(FileOp::Read, path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: LabConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::io(FileOp::CreateDir, parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::io(FileOp::Write, path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(validate_config(self)?)
    }
}
