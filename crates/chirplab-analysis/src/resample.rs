//! Downsampling with and without an anti-aliasing FIR stage.
//!
//! [`downsample`] keeps every D-th sample and nothing else, so any content
//! above the new Nyquist limit folds back into the baseband. [`AntiAliasFilter`]
//! runs a linear-phase windowed-sinc lowpass first.
//!
//! The lowpass uses the windowed-sinc design:
//!   `h[n] = cutoff · sinc(cutoff · (n - M/2)) · w[n]`
//! where `w[n]` is a symmetric window, M = num_taps - 1, and the result is
//! normalized to unity DC gain.
//!
//! Reference: A. V. Oppenheim and R. W. Schafer, *Discrete-Time Signal Processing*,
//! 3rd ed., Prentice Hall, 2009, Section 7.5.
//!
//! # Example
//!
//! ```rust
//! use chirplab_analysis::resample::{AntiAliasFilter, downsample};
//! use chirplab_analysis::Signal;
//!
//! let signal = Signal::new(vec![0.0; 801], 8000.0);
//!
//! let aliased = downsample(&signal, 2).unwrap();
//! assert_eq!(aliased.len(), 401);
//! assert_eq!(aliased.sample_rate(), 4000.0);
//!
//! let filter = AntiAliasFilter::new(100, 0.5).unwrap();
//! let clean = filter.decimate(&signal, 2).unwrap();
//! assert_eq!(clean.len(), 401);
//! ```

use std::f32::consts::PI;

use crate::fft::Window;
use crate::{Error, Result, Signal};

/// Keep every `factor`-th sample, starting with the first.
///
/// No filtering is applied. The output holds `⌈len / factor⌉` samples at
/// `sample_rate / factor` Hz.
pub fn downsample(signal: &Signal, factor: usize) -> Result<Signal> {
    if factor == 0 {
        return Err(Error::InvalidFactor(factor));
    }

    let samples: Vec<f32> = signal.samples().iter().copied().step_by(factor).collect();
    Ok(Signal::new(samples, signal.sample_rate() / factor as f32))
}

/// Compute windowed-sinc lowpass FIR coefficients.
///
/// Designs a linear-phase FIR lowpass filter. The filter is normalized to
/// have unity gain at DC (sum of coefficients = 1.0).
///
/// # Arguments
///
/// * `num_taps` - Number of filter taps (filter order + 1). Odd tap counts
///   produce a symmetric Type I filter.
/// * `cutoff` - Normalized cutoff frequency in the open range (0.0, 1.0),
///   where 1.0 corresponds to the Nyquist frequency (fs/2).
/// * `window` - Taper applied to the ideal sinc response, in its symmetric form.
pub fn design_lowpass(num_taps: usize, cutoff: f32, window: Window) -> Result<Vec<f32>> {
    if num_taps == 0 {
        return Err(Error::InvalidParameter("FIR needs at least one tap".into()));
    }
    if !(cutoff > 0.0 && cutoff < 1.0) {
        return Err(Error::InvalidCutoff(cutoff));
    }

    let m = num_taps - 1;
    let taper = window.symmetric_coefficients(num_taps);

    let mut coeffs: Vec<f32> = taper
        .iter()
        .enumerate()
        .map(|(n, &w)| {
            let x = n as f32 - m as f32 / 2.0;
            let sinc = if x.abs() < 1e-7 {
                cutoff
            } else {
                (PI * cutoff * x).sin() / (PI * x)
            };
            sinc * w
        })
        .collect();

    let sum: f32 = coeffs.iter().sum();
    if sum.abs() > 1e-10 {
        for c in coeffs.iter_mut() {
            *c /= sum;
        }
    }

    Ok(coeffs)
}

/// Apply a FIR filter by causal direct-form convolution.
///
/// `y[n] = Σ_k coeffs[k] · x[n - k]`, with `x` taken as zero before the
/// first sample. The output has the same length as the input and carries
/// the filter's full group delay.
pub fn fir_filter(signal: &[f32], coeffs: &[f32]) -> Vec<f32> {
    (0..signal.len())
        .map(|n| {
            coeffs
                .iter()
                .take(n + 1)
                .enumerate()
                .map(|(k, &c)| c * signal[n - k])
                .sum::<f32>()
        })
        .collect()
}

/// Magnitude response of FIR `coeffs` at normalized frequency `freq`
/// (1.0 = Nyquist).
pub fn magnitude_response(coeffs: &[f32], freq: f32) -> f32 {
    let omega = PI * freq;
    let (re, im) = coeffs
        .iter()
        .enumerate()
        .fold((0.0f32, 0.0f32), |(re, im), (k, &c)| {
            let phase = omega * k as f32;
            (re + c * phase.cos(), im - c * phase.sin())
        });
    (re * re + im * im).sqrt()
}

/// Linear-phase lowpass applied before decimation.
#[derive(Debug, Clone)]
pub struct AntiAliasFilter {
    coeffs: Vec<f32>,
    cutoff: f32,
}

impl AntiAliasFilter {
    /// Hamming-windowed lowpass of the given `order` (taps = order + 1)
    /// with normalized `cutoff` (1.0 = Nyquist of the input rate).
    pub fn new(order: usize, cutoff: f32) -> Result<Self> {
        let coeffs = design_lowpass(order + 1, cutoff, Window::Hamming)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(taps = coeffs.len(), cutoff, "anti-aliasing filter designed");

        Ok(Self { coeffs, cutoff })
    }

    /// Filter cutoff suited to decimation by `factor`: the new Nyquist
    /// expressed against the old one.
    pub fn cutoff_for_factor(factor: usize) -> f32 {
        1.0 / factor.max(1) as f32
    }

    /// Impulse response.
    pub fn coefficients(&self) -> &[f32] {
        &self.coeffs
    }

    /// Normalized cutoff.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Filter order (taps - 1).
    pub fn order(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Group delay in samples at the input rate.
    pub fn group_delay(&self) -> f32 {
        self.order() as f32 / 2.0
    }

    /// Filter a signal; the rate and length are unchanged.
    pub fn filter(&self, signal: &Signal) -> Signal {
        Signal::new(
            fir_filter(signal.samples(), &self.coeffs),
            signal.sample_rate(),
        )
    }

    /// Filter, then keep every `factor`-th sample.
    pub fn decimate(&self, signal: &Signal, factor: usize) -> Result<Signal> {
        downsample(&self.filter(signal), factor)
    }
}
