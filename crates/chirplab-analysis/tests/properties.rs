//! Property-based tests for chirplab-analysis.
//!
//! Checks that both threshold strategies pick the same grid point, that
//! thresholding is idempotent, and the sizing rules for decimation and
//! window rescaling.

use chirplab_analysis::resample::downsample;
use chirplab_analysis::spectrum::Spectrum;
use chirplab_analysis::threshold::{SearchStrategy, ThresholdSearch, apply_threshold};
use chirplab_analysis::{Signal, SpectrogramParams};
use proptest::prelude::*;
use rustfft::num_complex::Complex;

/// Real symmetric spectrum whose positive half has the given magnitudes.
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

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The sorted-magnitude shortcut reproduces the linear grid scan,
    /// including when neither finds a threshold.
    #[test]
    fn strategies_agree(
        magnitudes in prop::collection::vec(0.0f64..10.0, 4..48),
        k in 0usize..5,
    ) {
        let spectrum = symmetric(&magnitudes);
        let linear = ThresholdSearch::new(k)
            .with_strategy(SearchStrategy::Linear)
            .find(&spectrum);
        let fast = ThresholdSearch::new(k)
            .with_strategy(SearchStrategy::OrderStatistic)
            .find(&spectrum);

        match (linear, fast) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            (a, b) => prop_assert!(false, "linear {:?} vs order statistic {:?}", a, b),
        }
    }

    /// A found threshold leaves exactly K positive bins and nothing else.
    #[test]
    fn found_threshold_isolates_k(
        magnitudes in prop::collection::vec(0.0f64..10.0, 4..48),
        k in 1usize..4,
    ) {
        let spectrum = symmetric(&magnitudes);
        if let Ok(found) = ThresholdSearch::new(k).find(&spectrum) {
            let denoised = found.apply(&spectrum);
            prop_assert_eq!(denoised.nonzero_positive_bins(), k);
            prop_assert!(found.threshold < found.max_magnitude);
        }
    }

    /// Thresholding twice changes nothing.
    #[test]
    fn thresholding_is_idempotent(
        magnitudes in prop::collection::vec(0.0f64..10.0, 1..48),
        threshold in 0.0f64..10.0,
    ) {
        let spectrum = symmetric(&magnitudes);
        let once = apply_threshold(&spectrum, threshold);
        prop_assert_eq!(apply_threshold(&once, threshold), once);
    }

    /// Decimation keeps ⌈len / D⌉ samples and divides the rate by D.
    #[test]
    fn downsample_length(len in 0usize..2000, factor in 1usize..9) {
        let signal = Signal::new(vec![0.5; len], 8000.0);
        let out = downsample(&signal, factor).unwrap();
        prop_assert_eq!(out.len(), len.div_ceil(factor));
        prop_assert_eq!(out.sample_rate(), 8000.0 / factor as f32);
    }

    /// Rescaled windows follow round(N / D) and keep the derived overlap
    /// and FFT length rules.
    #[test]
    fn window_rescaling(
        window_len in 8usize..512,
        factor in prop_oneof![Just(1usize), Just(2), Just(4), Just(8)],
    ) {
        let base = SpectrogramParams::new(window_len, 8000.0).unwrap();
        let scaled = base.rescaled(8000.0 / factor as f32).unwrap();
        let expected = (window_len as f64 / factor as f64).round() as usize;

        prop_assert_eq!(scaled.window_len, expected);
        prop_assert_eq!(scaled.overlap, 3 * expected / 4);
        prop_assert_eq!(scaled.nfft, 4 * expected);
    }
}
