//! FFT wrapper with windowing functions
//!
//! [`Fft`] is generic over the sample type: spectrograms run in `f32`,
//! full-length spectra for thresholding run in `f64`.

use rustfft::num_complex::Complex;
use rustfft::num_traits::{FromPrimitive, Zero};
use rustfft::{FftNum, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Additive floor applied before every power-to-decibel conversion.
pub const POWER_EPSILON: f32 = 1e-10;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Hann window (raised cosine)
    Hann,
    /// Hamming window
    Hamming,
}

impl Window {
    /// Get symmetric window coefficients.
    ///
    /// The first and last coefficient are equal, which is what linear-phase
    /// FIR design and scipy-style spectrograms use. A window of length 1 is
    /// `[1.0]`.
    pub fn symmetric_coefficients(&self, size: usize) -> Vec<f32> {
        if size == 1 {
            return vec![1.0];
        }
        let period = (size - 1) as f32;
        (0..size)
            .map(|i| {
                let x = 2.0 * PI * i as f32 / period;
                match self {
                    Window::Hann => 0.5 * (1.0 - x.cos()),
                    Window::Hamming => 0.54 - 0.46 * x.cos(),
                }
            })
            .collect()
    }
}

/// FFT processor with cached forward and inverse plans
pub struct Fft<T: FftNum> {
    fft: Arc<dyn rustfft::Fft<T>>,
    ifft: Arc<dyn rustfft::Fft<T>>,
    size: usize,
}

impl<T: FftNum> Fft<T> {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Self { fft, ifft, size }
    }

    /// Perform forward FFT on real input, returning all `size` bins.
    ///
    /// Input shorter than the FFT size is zero-padded, longer input is
    /// truncated.
    pub fn forward_full(&self, input: &[T]) -> Vec<Complex<T>> {
        let mut buffer: Vec<Complex<T>> = input
            .iter()
            .take(self.size)
            .map(|&x| Complex::new(x, T::zero()))
            .collect();
        buffer.resize(self.size, Complex::zero());

        self.fft.process(&mut buffer);
        buffer
    }

    /// Perform forward FFT on real input
    ///
    /// Returns complex spectrum (size/2 + 1 bins for positive frequencies)
    pub fn forward(&self, input: &[T]) -> Vec<Complex<T>> {
        let mut buffer = self.forward_full(input);

        // Return only positive frequencies (DC to Nyquist)
        buffer.truncate(self.size / 2 + 1);
        buffer
    }

    /// Perform inverse FFT of a full spectrum and keep the real part.
    ///
    /// The spectrum must hold `size` bins. For a Hermitian-symmetric
    /// spectrum the discarded imaginary part is rounding noise.
    pub fn inverse_full(&self, spectrum: &[Complex<T>]) -> Vec<T> {
        let mut buffer = spectrum.to_vec();
        buffer.resize(self.size, Complex::zero());
        self.ifft.process(&mut buffer);

        // rustfft leaves the inverse unnormalized
        let Some(n) = <T as FromPrimitive>::from_usize(self.size) else {
            return buffer.iter().map(|c| c.re).collect();
        };
        buffer.iter().map(|c| c.re / n).collect()
    }
}

/// Convert a power value to decibels: `10·log10(power + ε)`.
pub fn power_to_db(power: f32) -> f32 {
    10.0 * (power + POWER_EPSILON).log10()
}
