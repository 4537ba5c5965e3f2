//! Sampled real-valued signals and synthetic test signals.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

use crate::{Error, Result};

/// A sequence of real samples together with the rate they were taken at.
///
/// Transforms never mutate a signal in place; each produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f32>,
    sample_rate: f32,
}

impl Signal {
    /// Wrap samples taken at `sample_rate` Hz.
    pub fn new(samples: Vec<f32>, sample_rate: f32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Sample values.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the signal and return its samples.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Sampling rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the signal holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate
    }

    /// Nyquist limit (half the sampling rate) in Hz.
    pub fn nyquist(&self) -> f32 {
        self.sample_rate / 2.0
    }

    /// Time in seconds of sample `n`.
    pub fn time_of(&self, n: usize) -> f32 {
        n as f32 / self.sample_rate
    }
}

/// One sinusoidal component of a synthetic test signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Frequency in Hz.
    pub frequency: f32,
    /// Peak amplitude.
    pub amplitude: f32,
}

impl Tone {
    /// Unit-amplitude tone at `frequency` Hz.
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            amplitude: 1.0,
        }
    }
}

/// Sum of sinusoids plus zero-mean white Gaussian noise.
///
/// The noise is drawn from a `StdRng` seeded with `seed`, so the same
/// arguments always produce the same samples.
pub fn noisy_tones(
    tones: &[Tone],
    noise_std: f32,
    sample_rate: f32,
    num_samples: usize,
    seed: u64,
) -> Result<Signal> {
    if sample_rate <= 0.0 {
        return Err(Error::InvalidSampleRate(sample_rate));
    }
    let noise = Normal::new(0.0f64, f64::from(noise_std))
        .map_err(|e| Error::InvalidParameter(format!("noise_std {noise_std}: {e}")))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let samples = (0..num_samples)
        .map(|n| {
            let t = n as f64 / f64::from(sample_rate);
            let clean: f64 = tones
                .iter()
                .map(|tone| {
                    f64::from(tone.amplitude) * (2.0 * PI * f64::from(tone.frequency) * t).sin()
                })
                .sum();
            (clean + noise.sample(&mut rng)) as f32
        })
        .collect();

    Ok(Signal::new(samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_accessors() {
        let signal = Signal::new(vec![0.0, 0.5, -1.0, 0.25], 8.0);
        assert_eq!(signal.len(), 4);
        assert!(!signal.is_empty());
        assert!((signal.duration() - 0.5).abs() < 1e-6);
        assert!((signal.nyquist() - 4.0).abs() < 1e-6);
        assert!((signal.time_of(2) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_noisy_tones_is_deterministic() {
        let tones = [Tone::new(30.0), Tone::new(120.0)];
        let a = noisy_tones(&tones, 0.5, 1000.0, 256, 7).unwrap();
        let b = noisy_tones(&tones, 0.5, 1000.0, 256, 7).unwrap();
        let c = noisy_tones(&tones, 0.5, 1000.0, 256, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_noiseless_tone() {
        let signal = noisy_tones(&[Tone::new(250.0)], 0.0, 1000.0, 8, 0).unwrap();
        // 250 Hz at 1 kHz: sin(n·π/2) = 0, 1, 0, -1, ...
        let expected = [0.0, 1.0, 0.0, -1.0];
        for (a, b) in signal.samples().iter().zip(expected.iter().cycle()) {
            assert!((a - b).abs() < 1e-5, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_noisy_tones_rejects_bad_parameters() {
        assert!(noisy_tones(&[], 1.0, 0.0, 10, 0).is_err());
        assert!(noisy_tones(&[], -1.0, 1000.0, 10, 0).is_err());
    }
}
