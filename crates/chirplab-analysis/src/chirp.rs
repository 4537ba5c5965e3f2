//! Quadratic-phase chirp generation.
//!
//! The chirp `x(t) = cos(2π·(k/3)·t³)` has phase derivative `2π·k·t²`, so
//! its instantaneous frequency rises quadratically: `f(t) = k·t²`.
//!
//! ```rust
//! use chirplab_analysis::chirp::Chirp;
//!
//! let chirp = Chirp::new(2.0, 8000.0, 1000.0);
//! assert_eq!(chirp.max_frequency(), 4000.0);
//!
//! let signal = chirp.generate();
//! assert_eq!(signal.len(), 16000);
//! ```

use std::f64::consts::PI;

use crate::Signal;

/// Largest positive 16-bit sample value; the PCM export scale factor.
pub const PCM16_SCALE: f32 = 32767.0;

/// Parameters of a quadratic-phase chirp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chirp {
    /// Duration in seconds.
    pub duration: f32,
    /// Sampling rate in Hz.
    pub sample_rate: f32,
    /// Rate constant `k` in Hz/s².
    pub k: f32,
}

impl Chirp {
    /// Describe a chirp of `duration` seconds sampled at `sample_rate` Hz.
    pub fn new(duration: f32, sample_rate: f32, k: f32) -> Self {
        Self {
            duration,
            sample_rate,
            k,
        }
    }

    /// Number of samples produced: `⌈duration · sample_rate⌉`.
    pub fn num_samples(&self) -> usize {
        let exact = f64::from(self.duration) * f64::from(self.sample_rate);
        // f32 inputs such as 0.1 s land a hair above the integer count
        let rounded = exact.round();
        if (exact - rounded).abs() < 1e-6 * rounded.abs().max(1.0) {
            rounded.max(0.0) as usize
        } else {
            exact.ceil().max(0.0) as usize
        }
    }

    /// Instantaneous frequency in Hz at time `t` seconds.
    pub fn instantaneous_frequency(&self, t: f32) -> f32 {
        self.k * t * t
    }

    /// Highest instantaneous frequency reached, at `t = duration`.
    pub fn max_frequency(&self) -> f32 {
        self.instantaneous_frequency(self.duration)
    }

    /// Time at which the instantaneous frequency reaches `frequency` Hz.
    pub fn time_at_frequency(&self, frequency: f32) -> f32 {
        (frequency / self.k).max(0.0).sqrt()
    }

    /// True if the chirp stays at or below the Nyquist limit of its own rate.
    pub fn is_alias_free(&self) -> bool {
        self.max_frequency() <= self.sample_rate / 2.0
    }

    /// Generate the sampled chirp.
    ///
    /// Phase is evaluated in double precision; the stored samples are `f32`.
    pub fn generate(&self) -> Signal {
        let fs = f64::from(self.sample_rate);
        let k = f64::from(self.k);
        let samples = (0..self.num_samples())
            .map(|n| {
                let t = n as f64 / fs;
                (2.0 * PI * (k / 3.0) * t * t * t).cos() as f32
            })
            .collect();
        Signal::new(samples, self.sample_rate)
    }
}

/// Apparent frequency of a tone at `frequency` Hz after sampling at
/// `sample_rate` Hz, folded into `[0, sample_rate / 2]`.
pub fn aliased_frequency(frequency: f32, sample_rate: f32) -> f32 {
    let wrapped = frequency.abs() % sample_rate;
    if wrapped > sample_rate / 2.0 {
        sample_rate - wrapped
    } else {
        wrapped
    }
}

/// Convert a sample in `[-1, 1]` to 16-bit PCM.
///
/// Multiplies by 32767 and truncates toward zero. This is lossy: the result
/// is quantized to 65535 levels and anything outside `[-1, 1]` saturates.
pub fn to_pcm16(sample: f32) -> i16 {
    (sample * PCM16_SCALE) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_count() {
        assert_eq!(Chirp::new(2.0, 8000.0, 1000.0).num_samples(), 16000);
        assert_eq!(Chirp::new(0.1, 1000.0, 1.0).num_samples(), 100);
        assert_eq!(Chirp::new(0.0015, 1000.0, 1.0).num_samples(), 2);
        assert_eq!(Chirp::new(0.0, 1000.0, 1.0).num_samples(), 0);
    }

    #[test]
    fn test_starts_at_one() {
        let signal = Chirp::new(0.01, 8000.0, 1000.0).generate();
        assert!((signal.samples()[0] - 1.0).abs() < 1e-7);
        assert_eq!(signal.sample_rate(), 8000.0);
    }

    #[test]
    fn test_max_frequency_at_nyquist() {
        let chirp = Chirp::new(2.0, 8000.0, 1000.0);
        assert_eq!(chirp.max_frequency(), 4000.0);
        assert!(chirp.is_alias_free());
        assert!(!Chirp::new(2.0, 4000.0, 1000.0).is_alias_free());
        assert!((chirp.time_at_frequency(2000.0) - 2.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_aliased_frequency() {
        assert_eq!(aliased_frequency(1500.0, 4000.0), 1500.0);
        assert_eq!(aliased_frequency(2000.0, 4000.0), 2000.0);
        assert_eq!(aliased_frequency(2500.0, 4000.0), 1500.0);
        assert_eq!(aliased_frequency(4000.0, 4000.0), 0.0);
        assert_eq!(aliased_frequency(5000.0, 4000.0), 1000.0);
    }

    #[test]
    fn test_pcm16_truncates_toward_zero() {
        assert_eq!(to_pcm16(1.0), 32767);
        assert_eq!(to_pcm16(-1.0), -32767);
        assert_eq!(to_pcm16(0.5), 16383);
        assert_eq!(to_pcm16(-0.5), -16383);
        assert_eq!(to_pcm16(0.0), 0);
        assert_eq!(to_pcm16(2.0), i16::MAX);
    }
}
