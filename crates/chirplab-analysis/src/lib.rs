//! Chirplab Analysis - sampling, aliasing and spectral thresholding
//!
//! This crate provides the numerical core of the chirplab pipelines:
//!
//! - [`fft`] - FFT wrapper with windowing functions
//! - [`signal`] - Sampled signals and seeded noisy test tones
//! - [`chirp`] - Quadratic-phase chirp synthesis and alias prediction
//! - [`resample`] - Naive decimation and the windowed-sinc anti-aliasing filter
//! - [`spectrogram`] - PSD spectrograms with rate-aware window scaling
//! - [`spectrum`] - Full-length spectra and dominant-frequency extraction
//! - [`threshold`] - Adaptive threshold search isolating K spectral peaks
//! - [`pipeline`] - The chirp, alias, antialias and denoise pipelines
//! - [`export`] - CSV and PGM output for plotting
//!
//! ## Aliasing
//!
//! ```rust,ignore
//! use chirplab_analysis::chirp::Chirp;
//! use chirplab_analysis::pipeline;
//!
//! // 2 s chirp at 8 kHz sweeping 0 → 4 kHz
//! let source = pipeline::chirp(Chirp::new(2.0, 8000.0, 1000.0), 64)?;
//!
//! // Halve the rate with no filter: everything above 2 kHz folds back
//! let aliased = pipeline::alias(&source, 2)?;
//! println!("fold-back starts at {:.2} s", aliased.fold_back_onset(&source.chirp));
//! ```
//!
//! ## Denoising
//!
//! ```rust,ignore
//! use chirplab_analysis::pipeline::{denoise, DenoiseSettings};
//!
//! let run = denoise(&samples, DenoiseSettings::default())?;
//! println!("threshold {:.3}, peaks at {:?}", run.threshold.threshold, run.dominant.normalized());
//! ```

pub mod chirp;
pub mod export;
pub mod fft;
pub mod pipeline;
pub mod resample;
pub mod signal;
pub mod spectrogram;
pub mod spectrum;
pub mod threshold;

// Re-export main types
pub use chirp::{Chirp, aliased_frequency, to_pcm16};
pub use fft::{Fft, Window};
pub use resample::{AntiAliasFilter, design_lowpass, downsample, fir_filter};
pub use signal::{Signal, Tone, noisy_tones};
pub use spectrogram::{Spectrogram, SpectrogramParams, StftAnalyzer};
pub use spectrum::{DominantFrequencies, DominantPeak, Spectrum, dominant_frequencies};
pub use threshold::{SearchStrategy, Threshold, ThresholdSearch, apply_threshold};

/// Error types for analysis operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Sample rate is zero, negative or not finite.
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    /// Downsampling factor must be at least 1.
    #[error("Invalid downsampling factor: {0}")]
    InvalidFactor(usize),

    /// Filter cutoff outside (0, 1] as a fraction of Nyquist.
    #[error("Invalid cutoff: {0} (expected 0 < cutoff <= 1)")]
    InvalidCutoff(f32),

    /// A signal was analyzed with parameters built for another rate.
    #[error("Sample rate mismatch: expected {expected} Hz, got {actual} Hz")]
    SampleRateMismatch {
        /// Rate the parameters were built for.
        expected: f32,
        /// Rate of the signal.
        actual: f32,
    },

    /// Operation needs at least one sample.
    #[error("Signal is empty")]
    EmptySignal,

    /// No grid threshold leaves exactly the requested number of peaks.
    #[error("No threshold isolates exactly {target} peaks")]
    ThresholdNotFound {
        /// Requested number of peaks.
        target: usize,
    },

    /// Any other out-of-range parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Convenience result type for analysis operations.
pub type Result<T> = std::result::Result<T, Error>;
