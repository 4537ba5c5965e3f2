//! Full-length spectra and dominant-frequency extraction.
//!
//! A [`Spectrum`] keeps all N DFT bins of a real signal, not only the
//! positive half, so that it stays invertible after bins are zeroed.
//! The positive-frequency half is bins `0 .. N/2`; the remaining bins mirror
//! it by conjugate symmetry.
//!
//! Spectra are computed in `f64`. Thresholds are searched on a 0.001 grid
//! against these magnitudes, and single precision is too coarse to place
//! large magnitudes on that grid reliably.

use rustfft::num_complex::Complex;

use crate::fft::Fft;
use crate::{Error, Result, Signal};

/// Complex spectrum of a real signal, all N bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    bins: Vec<Complex<f64>>,
}

impl Spectrum {
    /// Full DFT of `signal`.
    pub fn of(signal: &Signal) -> Self {
        let samples: Vec<f64> = signal.samples().iter().map(|&s| f64::from(s)).collect();
        Self::of_samples(&samples)
    }

    /// Full DFT of double-precision samples.
    pub fn of_samples(samples: &[f64]) -> Self {
        let fft = Fft::new(samples.len());
        Self {
            bins: fft.forward_full(samples),
        }
    }

    /// Wrap existing bins.
    pub fn from_bins(bins: Vec<Complex<f64>>) -> Self {
        Self { bins }
    }

    /// All bins.
    pub fn bins(&self) -> &[Complex<f64>] {
        &self.bins
    }

    /// Number of bins (equals the transformed signal length).
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// True for the spectrum of an empty signal.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Number of bins in the positive-frequency half, `N / 2`.
    pub fn positive_len(&self) -> usize {
        self.bins.len() / 2
    }

    /// Magnitudes of bins `0 .. N/2`.
    pub fn positive_magnitudes(&self) -> Vec<f64> {
        self.bins[..self.positive_len()]
            .iter()
            .map(|c| c.norm())
            .collect()
    }

    /// Normalized frequency (cycles/sample) of `bin`.
    pub fn normalized_frequency(&self, bin: usize) -> f64 {
        bin as f64 / self.bins.len() as f64
    }

    /// Normalized frequency axis for the positive half.
    pub fn positive_frequencies(&self) -> Vec<f64> {
        (0..self.positive_len())
            .map(|bin| self.normalized_frequency(bin))
            .collect()
    }

    /// Number of bins with a nonzero value in the positive half.
    pub fn nonzero_positive_bins(&self) -> usize {
        self.bins[..self.positive_len()]
            .iter()
            .filter(|c| c.norm_sqr() > 0.0)
            .count()
    }

    /// Inverse DFT back to double-precision samples.
    pub fn inverse(&self) -> Vec<f64> {
        Fft::new(self.bins.len()).inverse_full(&self.bins)
    }

    /// Inverse DFT back to a real signal at `sample_rate` Hz.
    pub fn reconstruct(&self, sample_rate: f32) -> Signal {
        let samples = self.inverse().into_iter().map(|s| s as f32).collect();
        Signal::new(samples, sample_rate)
    }
}

/// One spectral peak located by [`dominant_frequencies`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominantPeak {
    /// DFT bin index.
    pub bin: usize,
    /// Normalized digital frequency in cycles/sample (`bin / N`).
    pub normalized: f64,
    /// Physical frequency in Hz under the assumed sampling rate.
    pub frequency_hz: f64,
    /// Magnitude of the bin.
    pub magnitude: f64,
}

/// The strongest positive-frequency components of a signal.
#[derive(Debug, Clone)]
pub struct DominantFrequencies {
    /// Peaks, strongest first.
    pub peaks: Vec<DominantPeak>,
    /// Sampling rate the physical frequencies assume.
    pub assumed_sample_rate: f32,
    /// Number of samples analyzed.
    pub num_samples: usize,
}

impl DominantFrequencies {
    /// Peaks ordered by ascending frequency.
    pub fn by_frequency(&self) -> Vec<DominantPeak> {
        let mut peaks = self.peaks.clone();
        peaks.sort_by_key(|p| p.bin);
        peaks
    }

    /// Normalized frequencies, ascending.
    pub fn normalized(&self) -> Vec<f64> {
        self.by_frequency().iter().map(|p| p.normalized).collect()
    }

    /// Physical frequencies in Hz, ascending.
    pub fn physical(&self) -> Vec<f64> {
        self.by_frequency().iter().map(|p| p.frequency_hz).collect()
    }
}

/// Find the `count` largest-magnitude bins in the positive half of
/// `spectrum` and convert them to frequencies.
///
/// `assumed_sample_rate` only scales the physical frequencies; it cannot be
/// checked against the data. Ties go to the lower bin.
pub fn dominant_frequencies(
    spectrum: &Spectrum,
    count: usize,
    assumed_sample_rate: f32,
) -> Result<DominantFrequencies> {
    if spectrum.is_empty() {
        return Err(Error::EmptySignal);
    }
    if assumed_sample_rate <= 0.0 {
        return Err(Error::InvalidSampleRate(assumed_sample_rate));
    }
    let magnitudes = spectrum.positive_magnitudes();
    if count > magnitudes.len() {
        return Err(Error::InvalidParameter(format!(
            "asked for {count} peaks but the positive half has {} bins",
            magnitudes.len()
        )));
    }

    let mut order: Vec<usize> = (0..magnitudes.len()).collect();
    // Stable sort keeps lower bins first among equal magnitudes
    order.sort_by(|&a, &b| magnitudes[b].total_cmp(&magnitudes[a]));

    let peaks = order
        .into_iter()
        .take(count)
        .map(|bin| {
            let normalized = spectrum.normalized_frequency(bin);
            DominantPeak {
                bin,
                normalized,
                frequency_hz: normalized * f64::from(assumed_sample_rate),
                magnitude: magnitudes[bin],
            }
        })
        .collect();

    Ok(DominantFrequencies {
        peaks,
        assumed_sample_rate,
        num_samples: spectrum.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn two_tones(n: usize) -> Signal {
        let samples = (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                (2.0 * PI * 30.0 * t).sin() + 0.5 * (2.0 * PI * 120.0 * t).sin()
            })
            .collect();
        Signal::new(samples, 1000.0)
    }

    #[test]
    fn test_positive_half_is_floor_half() {
        let spectrum = Spectrum::of(&Signal::new(vec![1.0; 9], 9.0));
        assert_eq!(spectrum.len(), 9);
        assert_eq!(spectrum.positive_len(), 4);
        assert_eq!(spectrum.positive_magnitudes().len(), 4);
        assert_eq!(spectrum.positive_frequencies()[1], 1.0 / 9.0);
    }

    #[test]
    fn test_dominant_frequencies_two_tones() {
        let spectrum = Spectrum::of(&two_tones(1000));
        let found = dominant_frequencies(&spectrum, 2, 1000.0).unwrap();

        // Strongest first
        assert_eq!(found.peaks[0].bin, 30);
        assert_eq!(found.peaks[1].bin, 120);
        assert!((found.peaks[0].magnitude - 500.0).abs() < 1.0);
        assert!((found.peaks[1].magnitude - 250.0).abs() < 1.0);

        assert_eq!(found.normalized(), vec![0.03, 0.12]);
        let hz = found.physical();
        assert!((hz[0] - 30.0).abs() < 1e-3);
        assert!((hz[1] - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_assumed_rate_only_scales() {
        let spectrum = Spectrum::of(&two_tones(1000));
        let at_2k = dominant_frequencies(&spectrum, 2, 2000.0).unwrap();
        assert_eq!(at_2k.normalized(), vec![0.03, 0.12]);
        assert!((at_2k.physical()[1] - 240.0).abs() < 1e-3);
    }

    #[test]
    fn test_ties_prefer_lower_bin() {
        let bins = vec![
            Complex::new(0.0, 0.0),
            Complex::new(2.0, 0.0),
            Complex::new(2.0, 0.0),
            Complex::new(1.0, 0.0),
            Complex::new(0.0, 0.0),
            Complex::new(1.0, 0.0),
            Complex::new(2.0, 0.0),
            Complex::new(2.0, 0.0),
        ];
        let found = dominant_frequencies(&Spectrum::from_bins(bins), 1, 8.0).unwrap();
        assert_eq!(found.peaks[0].magnitude, 2.0);
        assert_eq!(found.peaks[0].bin, 1);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        let empty = Spectrum::from_bins(vec![]);
        assert!(matches!(
            dominant_frequencies(&empty, 2, 1000.0),
            Err(Error::EmptySignal)
        ));

        let tiny = Spectrum::of(&Signal::new(vec![1.0, 0.0, 1.0], 3.0));
        assert!(dominant_frequencies(&tiny, 2, 3.0).is_err());
        assert!(dominant_frequencies(&tiny, 1, 0.0).is_err());
    }

    #[test]
    fn test_magnitudes_keep_double_precision() {
        // 1 + 2^-30 is not representable in f32
        let fine = 1.0 + 2f64.powi(-30);
        let spectrum = Spectrum::of_samples(&[fine, 0.0, 0.0, 0.0]);
        for m in spectrum.positive_magnitudes() {
            assert!((m - fine).abs() < 1e-15, "{m}");
        }
    }

    #[test]
    fn test_reconstruct_roundtrip() {
        let signal = two_tones(256);
        let back = Spectrum::of(&signal).reconstruct(signal.sample_rate());
        for (a, b) in signal.samples().iter().zip(back.samples()) {
            assert!((a - b).abs() < 1e-3);
        }
    }
}
