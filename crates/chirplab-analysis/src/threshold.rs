//! Adaptive noise-floor threshold search.
//!
//! Given a noisy spectrum that is known to contain K dominant components,
//! find the smallest magnitude threshold θ on a 0.001 grid for which exactly
//! K positive-frequency bins have magnitude strictly above θ, then zero every
//! bin (positive and negative frequencies) at or below it.
//!
//! Two strategies produce the same θ:
//!
//! - [`SearchStrategy::Linear`] scans θ = 0, 0.001, 0.002, … up to (not
//!   including) the largest positive-half magnitude and stops at the first
//!   candidate that isolates K bins.
//! - [`SearchStrategy::OrderStatistic`] sorts the magnitudes once. With
//!   `m_K` the K-th largest and `m_{K+1}` the next one, the count of bins
//!   above θ equals K exactly when `m_{K+1} ≤ θ < m_K`, so the scan's answer
//!   is the smallest grid point at or above `m_{K+1}`, provided it is still
//!   below `m_K` and below the scan bound.
//!
//! When two magnitudes around the K-th position are equal no θ can isolate
//! exactly K bins and the search reports [`Error::ThresholdNotFound`].
//!
//! ```rust
//! use chirplab_analysis::threshold::ThresholdSearch;
//! use chirplab_analysis::spectrum::Spectrum;
//! use rustfft::num_complex::Complex;
//!
//! let mags = [0.25, 5.0, 0.375, 3.0, 0.125, 3.0, 0.375, 5.0];
//! let spectrum = Spectrum::from_bins(mags.iter().map(|&m| Complex::new(m, 0.0)).collect());
//!
//! let found = ThresholdSearch::new(2).find(&spectrum).unwrap();
//! assert_eq!(found.threshold, 0.375);
//!
//! let denoised = found.apply(&spectrum);
//! assert_eq!(denoised.nonzero_positive_bins(), 2);
//! ```

use rustfft::num_complex::Complex;

use crate::spectrum::Spectrum;
use crate::{Error, Result};

/// Spacing of candidate thresholds, in magnitude units.
pub const THRESHOLD_STEP: f64 = 0.001;

/// Grid points per magnitude unit.
const GRID_SCALE: f64 = 1000.0;

/// How the threshold grid is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Scan every grid point from zero upward.
    Linear,
    /// Jump straight to the answer using the sorted magnitudes.
    #[default]
    OrderStatistic,
}

/// Threshold search for a fixed number of surviving peaks.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdSearch {
    target_peaks: usize,
    strategy: SearchStrategy,
}

/// Threshold found by [`ThresholdSearch::find`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    /// Cutoff on the 0.001 grid; bins at or below it are noise.
    pub threshold: f64,
    /// Positive-half bins strictly above the cutoff.
    pub surviving_peaks: usize,
    /// Largest positive-half magnitude (the scan bound).
    pub max_magnitude: f64,
}

/// Value of grid point `i`, rounded to three decimals.
fn grid(i: u64) -> f64 {
    i as f64 / GRID_SCALE
}

impl ThresholdSearch {
    /// Search for the threshold isolating `target_peaks` bins, using the
    /// default strategy.
    pub fn new(target_peaks: usize) -> Self {
        Self {
            target_peaks,
            strategy: SearchStrategy::default(),
        }
    }

    /// Use a specific strategy.
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Number of peaks the threshold must isolate.
    pub fn target_peaks(&self) -> usize {
        self.target_peaks
    }

    /// Strategy in use.
    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// Find the smallest grid threshold leaving exactly the target number of
    /// positive-half bins above it.
    pub fn find(&self, spectrum: &Spectrum) -> Result<Threshold> {
        let magnitudes = spectrum.positive_magnitudes();
        let max_magnitude = magnitudes.iter().copied().fold(0.0f64, f64::max);

        let threshold = match self.strategy {
            SearchStrategy::Linear => self.scan(&magnitudes, max_magnitude),
            SearchStrategy::OrderStatistic => self.order_statistic(&magnitudes, max_magnitude),
        }
        .ok_or(Error::ThresholdNotFound {
            target: self.target_peaks,
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            threshold,
            max_magnitude,
            target = self.target_peaks,
            strategy = ?self.strategy,
            "threshold search converged"
        );

        Ok(Threshold {
            threshold,
            surviving_peaks: self.target_peaks,
            max_magnitude,
        })
    }

    fn scan(&self, magnitudes: &[f64], max_magnitude: f64) -> Option<f64> {
        (0u64..)
            .map(grid)
            .take_while(|&theta| theta < max_magnitude)
            .find(|&theta| count_above(magnitudes, theta) == self.target_peaks)
    }

    fn order_statistic(&self, magnitudes: &[f64], max_magnitude: f64) -> Option<f64> {
        let k = self.target_peaks;
        if k > magnitudes.len() {
            return None;
        }

        let mut sorted = magnitudes.to_vec();
        sorted.sort_by(|a, b| b.total_cmp(a));

        // Exactly k bins exceed θ iff floor ≤ θ < ceiling
        let ceiling = if k == 0 { f64::INFINITY } else { sorted[k - 1] };
        let floor = sorted.get(k).copied();

        // Smallest grid index whose value is >= floor, matched to `grid`
        let mut i = match floor {
            Some(f) => (f * GRID_SCALE).ceil().max(0.0) as u64,
            None => 0,
        };
        if let Some(f) = floor {
            while grid(i) < f {
                i += 1;
            }
            while i > 0 && grid(i - 1) >= f {
                i -= 1;
            }
        }

        let theta = grid(i);
        (theta < ceiling && theta < max_magnitude).then_some(theta)
    }
}

impl Threshold {
    /// Zero every bin of the full spectrum whose magnitude is at or below
    /// the threshold. Mirror bins share magnitudes, so conjugate symmetry
    /// is preserved.
    pub fn apply(&self, spectrum: &Spectrum) -> Spectrum {
        apply_threshold(spectrum, self.threshold)
    }

    /// Threshold as a fraction of the largest positive-half magnitude.
    pub fn relative(&self) -> f64 {
        if self.max_magnitude > 0.0 {
            self.threshold / self.max_magnitude
        } else {
            0.0
        }
    }
}

/// Count positive-half magnitudes strictly above `theta`.
fn count_above(magnitudes: &[f64], theta: f64) -> usize {
    magnitudes.iter().filter(|&&m| m > theta).count()
}

/// Zero every bin whose magnitude is at or below `threshold`.
///
/// Applying the same threshold twice gives the same spectrum as applying it
/// once.
pub fn apply_threshold(spectrum: &Spectrum, threshold: f64) -> Spectrum {
    let bins = spectrum
        .bins()
        .iter()
        .map(|&c| {
            if c.norm() > threshold {
                c
            } else {
                Complex::new(0.0, 0.0)
            }
        })
        .collect();
    Spectrum::from_bins(bins)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Real-valued symmetric spectrum built from its positive half.
    fn symmetric(positive: &[f64]) -> Spectrum {
        let n = positive.len() * 2;
        let mut bins = vec![Complex::new(0.0, 0.0); n];
        for (k, &m) in positive.iter().enumerate() {
            bins[k] = Complex::new(m, 0.0);
            if k > 0 {
                bins[n - k] = Complex::new(m, 0.0);
            }
        }
        Spectrum::from_bins(bins)
    }

    fn both() -> [ThresholdSearch; 2] {
        [
            ThresholdSearch::new(2).with_strategy(SearchStrategy::Linear),
            ThresholdSearch::new(2).with_strategy(SearchStrategy::OrderStatistic),
        ]
    }

    #[test]
    fn test_threshold_between_noise_and_peaks() {
        let spectrum = symmetric(&[0.3, 0.7505, 9.0, 0.2, 0.6, 4.5, 0.1, 0.05]);
        for search in both() {
            let found = search.find(&spectrum).unwrap();
            assert_eq!(found.threshold, 0.751, "{:?}", search.strategy());
            assert!(found.threshold > 0.7505 && found.threshold < 4.5);
            assert_eq!(found.max_magnitude, 9.0);
        }
    }

    #[test]
    fn test_noise_on_grid_is_inclusive() {
        // 0.5 is exactly a grid point: count(> 0.5) already equals 2
        let spectrum = symmetric(&[0.5, 2.0, 0.25, 3.0]);
        for search in both() {
            assert_eq!(search.find(&spectrum).unwrap().threshold, 0.5);
        }
    }

    #[test]
    fn test_exactly_k_bins_gives_zero() {
        let spectrum = symmetric(&[0.0, 2.0, 0.0, 3.0]);
        for search in both() {
            assert_eq!(search.find(&spectrum).unwrap().threshold, 0.0);
        }
    }

    #[test]
    fn test_tied_magnitudes_fail() {
        // Two peaks share the second-largest magnitude: the count jumps 1 → 3
        let spectrum = symmetric(&[0.1, 5.0, 2.0, 2.0, 0.2]);
        for search in both() {
            assert!(matches!(
                search.find(&spectrum),
                Err(Error::ThresholdNotFound { target: 2 })
            ));
        }
    }

    #[test]
    fn test_gap_narrower_than_step_fails() {
        // No grid point falls in [1.0001, 1.0004)
        let spectrum = symmetric(&[1.0001, 5.0, 1.0004, 0.0]);
        for search in both() {
            assert!(search.find(&spectrum).is_err());
        }
    }

    #[test]
    fn test_more_peaks_than_bins_fails() {
        let spectrum = symmetric(&[1.0, 2.0]);
        let search = ThresholdSearch::new(3);
        assert!(search.find(&spectrum).is_err());
        assert!(
            search
                .with_strategy(SearchStrategy::Linear)
                .find(&spectrum)
                .is_err()
        );
    }

    #[test]
    fn test_silent_spectrum_fails() {
        let spectrum = symmetric(&[0.0; 8]);
        for search in both() {
            assert!(search.find(&spectrum).is_err());
        }
    }

    #[test]
    fn test_apply_keeps_mirrors() {
        let spectrum = symmetric(&[0.3, 0.7, 9.0, 0.2, 0.6, 4.5, 0.1, 0.05]);
        let found = ThresholdSearch::new(2).find(&spectrum).unwrap();
        let denoised = found.apply(&spectrum);

        assert_eq!(denoised.nonzero_positive_bins(), 2);
        let nonzero: Vec<usize> = denoised
            .bins()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.norm() > 0.0)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(nonzero, vec![2, 5, 11, 14]);
        assert!((found.relative() - 0.7 / 9.0).abs() < 1e-3);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let spectrum = symmetric(&[0.3, 0.7, 9.0, 0.2, 0.6, 4.5, 0.1, 0.05]);
        let once = apply_threshold(&spectrum, 0.7);
        let twice = apply_threshold(&once, 0.7);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_apply_zeroes_at_threshold() {
        let spectrum = symmetric(&[1.0, 2.0]);
        let out = apply_threshold(&spectrum, 1.0);
        assert_eq!(out.bins()[0], Complex::new(0.0, 0.0));
        assert_eq!(out.bins()[1], Complex::new(2.0, 0.0));
    }
}
