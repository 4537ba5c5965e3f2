//! STFT-based spectrogram generation
//!
//! Provides time-frequency analysis through Short-Time Fourier Transform.
//! Frames are mean-removed, Hann-windowed, zero-padded to the FFT length and
//! scaled to a one-sided power spectral density, so spectrograms taken at
//! different sampling rates share the same units.
//!
//! [`SpectrogramParams::rescaled`] keeps the *window duration in seconds*
//! fixed when the sampling rate changes, which keeps time and frequency
//! resolution comparable between a signal and its downsampled versions.

use crate::fft::{Fft, Window};
use crate::{Error, Result, Signal};

/// Window, overlap and FFT length for an STFT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrogramParams {
    /// Window length in samples.
    pub window_len: usize,
    /// Samples shared by consecutive frames.
    pub overlap: usize,
    /// FFT length (window is zero-padded up to this).
    pub nfft: usize,
    /// Sampling rate the window length refers to.
    pub sample_rate: f32,
}

impl SpectrogramParams {
    /// Parameters for a window of `window_len` samples at `sample_rate` Hz,
    /// with 75% overlap and an FFT four times the window length.
    pub fn new(window_len: usize, sample_rate: f32) -> Result<Self> {
        if window_len == 0 {
            return Err(Error::InvalidParameter("window length must be > 0".into()));
        }
        if sample_rate <= 0.0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            window_len,
            overlap: 3 * window_len / 4,
            nfft: 4 * window_len,
            sample_rate,
        })
    }

    /// Window length at `new_rate` covering the same duration:
    /// `round(window_len · new_rate / sample_rate)`.
    pub fn scaled_window_len(&self, new_rate: f32) -> usize {
        (self.window_len as f64 * f64::from(new_rate) / f64::from(self.sample_rate)).round()
            as usize
    }

    /// Parameters for `new_rate` with the same window duration in seconds.
    pub fn rescaled(&self, new_rate: f32) -> Result<Self> {
        Self::new(self.scaled_window_len(new_rate), new_rate)
    }

    /// Step between frame starts.
    pub fn hop(&self) -> usize {
        self.window_len - self.overlap
    }

    /// Window duration in seconds.
    pub fn window_duration(&self) -> f32 {
        self.window_len as f32 / self.sample_rate
    }

    /// Number of frames produced for a signal of `len` samples.
    pub fn num_frames(&self, len: usize) -> usize {
        if len >= self.window_len {
            (len - self.window_len) / self.hop() + 1
        } else {
            0
        }
    }

    /// Number of one-sided frequency bins (nfft / 2 + 1).
    pub fn num_bins(&self) -> usize {
        self.nfft / 2 + 1
    }
}

/// Spectrogram data structure
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// 2D power spectral density `[time_frame][frequency_bin]`
    pub data: Vec<Vec<f32>>,
    /// Parameters the frames were computed with
    pub params: SpectrogramParams,
    /// Number of time frames
    pub num_frames: usize,
    /// Number of frequency bins (nfft / 2 + 1)
    pub num_bins: usize,
}

impl Spectrogram {
    /// Get frequency in Hz for a given bin index
    pub fn bin_to_freq(&self, bin: usize) -> f32 {
        bin as f32 * self.params.sample_rate / self.params.nfft as f32
    }

    /// Get the centre time in seconds of a given frame
    pub fn frame_to_time(&self, frame: usize) -> f32 {
        let start = frame * self.params.hop();
        (start as f32 + self.params.window_len as f32 / 2.0) / self.params.sample_rate
    }

    /// Frame whose centre is closest to `time` seconds.
    pub fn time_to_frame(&self, time: f32) -> Option<usize> {
        if self.num_frames == 0 {
            return None;
        }
        let start = time * self.params.sample_rate - self.params.window_len as f32 / 2.0;
        let frame = (start / self.params.hop() as f32).round().max(0.0) as usize;
        Some(frame.min(self.num_frames - 1))
    }

    /// Get power at specific time and frequency
    ///
    /// Returns None if out of bounds
    pub fn get(&self, frame: usize, bin: usize) -> Option<f32> {
        self.data.get(frame).and_then(|f| f.get(bin)).copied()
    }

    /// Get the spectrum for a specific time frame
    pub fn get_frame(&self, frame: usize) -> Option<&[f32]> {
        self.data.get(frame).map(|v| v.as_slice())
    }

    /// Find peak frequency at a given time frame
    pub fn peak_frequency(&self, frame: usize) -> Option<f32> {
        let spectrum = self.get_frame(frame)?;
        let (peak_bin, _) = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))?;
        Some(self.bin_to_freq(peak_bin))
    }

    /// Total power of a frame.
    pub fn frame_power(&self, frame: usize) -> Option<f32> {
        self.get_frame(frame).map(|s| s.iter().sum())
    }

    /// Largest power value across all frames and bins.
    pub fn max_power(&self) -> f32 {
        self.data
            .iter()
            .flat_map(|frame| frame.iter().copied())
            .fold(0.0f32, f32::max)
    }
}

/// STFT (Short-Time Fourier Transform) analyzer
pub struct StftAnalyzer {
    params: SpectrogramParams,
    fft: Fft<f32>,
    window_coeffs: Vec<f32>,
    density_scale: f32,
}

impl StftAnalyzer {
    /// Create a new STFT analyzer with a symmetric Hann window
    pub fn new(params: SpectrogramParams) -> Self {
        let fft = Fft::new(params.nfft);
        let window_coeffs = Window::Hann.symmetric_coefficients(params.window_len);
        let energy: f32 = window_coeffs.iter().map(|w| w * w).sum();
        let density_scale = 1.0 / (params.sample_rate * energy.max(f32::MIN_POSITIVE));

        Self {
            params,
            fft,
            window_coeffs,
            density_scale,
        }
    }

    /// Get frequency resolution (Hz per bin)
    pub fn frequency_resolution(&self) -> f32 {
        self.params.sample_rate / self.params.nfft as f32
    }

    /// Compute spectrogram from a signal.
    ///
    /// The signal's sampling rate must match the analyzer's.
    pub fn analyze(&self, signal: &Signal) -> Result<Spectrogram> {
        if (signal.sample_rate() - self.params.sample_rate).abs() > f32::EPSILON {
            return Err(Error::SampleRateMismatch {
                expected: self.params.sample_rate,
                actual: signal.sample_rate(),
            });
        }

        let samples = signal.samples();
        let num_frames = self.params.num_frames(samples.len());
        let num_bins = self.params.num_bins();
        let nyquist_bin = (self.params.nfft % 2 == 0).then_some(self.params.nfft / 2);
        let mut data = Vec::with_capacity(num_frames);

        for frame_idx in 0..num_frames {
            let start = frame_idx * self.params.hop();
            let segment = &samples[start..start + self.params.window_len];

            // Remove the segment mean, then window
            let mean = segment.iter().sum::<f32>() / segment.len() as f32;
            let frame: Vec<f32> = segment
                .iter()
                .zip(self.window_coeffs.iter())
                .map(|(&s, &w)| (s - mean) * w)
                .collect();

            let spectrum = self.fft.forward(&frame);

            let power: Vec<f32> = spectrum
                .iter()
                .enumerate()
                .map(|(bin, c)| {
                    let p = c.norm_sqr() * self.density_scale;
                    if bin == 0 || Some(bin) == nyquist_bin {
                        p
                    } else {
                        2.0 * p
                    }
                })
                .collect();
            data.push(power);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            window_len = self.params.window_len,
            nfft = self.params.nfft,
            num_frames,
            "spectrogram computed"
        );

        Ok(Spectrogram {
            data,
            params: self.params,
            num_frames,
            num_bins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft::power_to_db;
    use std::f32::consts::PI;

    fn generate_sine(sample_rate: f32, freq: f32, duration_secs: f32) -> Signal {
        let num_samples = (duration_secs * sample_rate) as usize;
        let samples = (0..num_samples)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect();
        Signal::new(samples, sample_rate)
    }

    #[test]
    fn test_params_derivation() {
        let params = SpectrogramParams::new(64, 8000.0).unwrap();
        assert_eq!(params.overlap, 48);
        assert_eq!(params.nfft, 256);
        assert_eq!(params.hop(), 16);
        assert_eq!(params.num_bins(), 129);

        let odd = SpectrogramParams::new(30, 8000.0).unwrap();
        assert_eq!(odd.overlap, 22);
        assert_eq!(odd.nfft, 120);
    }

    #[test]
    fn test_window_scaling_rule() {
        let base = SpectrogramParams::new(64, 8000.0).unwrap();
        let cases = [(4000.0, 32), (2000.0, 16), (6000.0, 48), (3000.0, 24), (5000.0, 40)];
        for (rate, expected) in cases {
            assert_eq!(base.scaled_window_len(rate), expected, "rate {}", rate);
        }

        // Non-integer products round to nearest
        let base = SpectrogramParams::new(50, 8000.0).unwrap();
        assert_eq!(base.scaled_window_len(3000.0), 19); // 18.75
        assert_eq!(base.scaled_window_len(4410.0), 28); // 27.5625
        assert_eq!(base.scaled_window_len(1100.0), 7); // 6.875

        let rescaled = SpectrogramParams::new(64, 8000.0)
            .unwrap()
            .rescaled(4000.0)
            .unwrap();
        assert_eq!(rescaled.window_len, 32);
        assert_eq!(rescaled.overlap, 24);
        assert_eq!(rescaled.nfft, 128);
        assert!((rescaled.window_duration() - 0.008).abs() < 1e-7);
    }

    #[test]
    fn test_params_reject_degenerate() {
        assert!(SpectrogramParams::new(0, 8000.0).is_err());
        assert!(SpectrogramParams::new(64, 0.0).is_err());
        let base = SpectrogramParams::new(4, 8000.0).unwrap();
        assert!(base.rescaled(100.0).is_err());
    }

    #[test]
    fn test_spectrogram_dimensions() {
        let sample_rate = 8000.0;
        let signal = generate_sine(sample_rate, 440.0, 1.0);

        let params = SpectrogramParams::new(64, sample_rate).unwrap();
        let spectrogram = StftAnalyzer::new(params).analyze(&signal).unwrap();

        assert_eq!(spectrogram.num_bins, 129);
        assert_eq!(spectrogram.num_frames, (8000 - 64) / 16 + 1);
        assert_eq!(spectrogram.data.len(), spectrogram.num_frames);
        assert_eq!(spectrogram.data[0].len(), spectrogram.num_bins);
    }

    #[test]
    fn test_short_signal_has_no_frames() {
        let params = SpectrogramParams::new(64, 8000.0).unwrap();
        let signal = Signal::new(vec![0.0; 63], 8000.0);
        let spectrogram = StftAnalyzer::new(params).analyze(&signal).unwrap();
        assert_eq!(spectrogram.num_frames, 0);
        assert_eq!(spectrogram.peak_frequency(0), None);
        assert_eq!(spectrogram.time_to_frame(0.5), None);
    }

    #[test]
    fn test_rate_mismatch_is_rejected() {
        let params = SpectrogramParams::new(64, 8000.0).unwrap();
        let signal = Signal::new(vec![0.0; 1000], 4000.0);
        assert!(matches!(
            StftAnalyzer::new(params).analyze(&signal),
            Err(Error::SampleRateMismatch { .. })
        ));
    }

    #[test]
    fn test_spectrogram_peak_detection() {
        let sample_rate = 8000.0;
        let freq = 1000.0;
        let signal = generate_sine(sample_rate, freq, 0.5);

        let params = SpectrogramParams::new(64, sample_rate).unwrap();
        let spectrogram = StftAnalyzer::new(params).analyze(&signal).unwrap();

        for frame in 0..spectrogram.num_frames {
            let peak_freq = spectrogram.peak_frequency(frame).unwrap();
            assert!(
                (peak_freq - freq).abs() <= 31.25,
                "Peak {} Hz should be near {} Hz",
                peak_freq,
                freq
            );
        }
    }

    #[test]
    fn test_density_scaling_preserves_power() {
        // Integrated one-sided PSD of a unit sine approximates its mean power (0.5)
        let sample_rate = 8000.0;
        let signal = generate_sine(sample_rate, 1000.0, 0.25);
        let params = SpectrogramParams::new(256, sample_rate).unwrap();
        let analyzer = StftAnalyzer::new(params);
        let spectrogram = analyzer.analyze(&signal).unwrap();

        let bin_width = analyzer.frequency_resolution();
        let power = spectrogram.frame_power(2).unwrap() * bin_width;
        assert!((power - 0.5).abs() < 0.05, "integrated power {}", power);
    }

    #[test]
    fn test_time_frequency_conversion() {
        let params = SpectrogramParams::new(64, 8000.0).unwrap();
        let spectrogram = Spectrogram {
            data: vec![],
            params,
            num_frames: 100,
            num_bins: params.num_bins(),
        };

        assert!((spectrogram.bin_to_freq(0) - 0.0).abs() < 0.01);
        assert!((spectrogram.bin_to_freq(128) - 4000.0).abs() < 0.01);
        assert!((spectrogram.frame_to_time(0) - 0.004).abs() < 1e-6);
        assert!((spectrogram.frame_to_time(1) - 0.006).abs() < 1e-6);
        assert_eq!(spectrogram.time_to_frame(0.006), Some(1));
        assert_eq!(spectrogram.time_to_frame(100.0), Some(99));
    }

    #[test]
    fn test_db_floor_on_silence() {
        let params = SpectrogramParams::new(16, 1000.0).unwrap();
        let signal = Signal::new(vec![0.25; 64], 1000.0);
        let spectrogram = StftAnalyzer::new(params).analyze(&signal).unwrap();
        // A constant signal is fully removed by the detrend
        for row in &spectrogram.data {
            for &power in row {
                assert!((power_to_db(power) + 100.0).abs() < 0.01);
            }
        }
    }
}
