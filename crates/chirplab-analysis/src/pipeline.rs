//! The four analysis pipelines as plain functions.
//!
//! Later pipelines take earlier results as arguments instead of sharing
//! state: [`alias`] and [`antialias`] both consume the [`ChirpRun`] returned
//! by [`chirp`]. None of them touch the filesystem.
//!
//! ```rust,no_run
//! use chirplab_analysis::chirp::Chirp;
//! use chirplab_analysis::pipeline;
//! use chirplab_analysis::resample::AntiAliasFilter;
//!
//! let source = pipeline::chirp(Chirp::new(2.0, 8000.0, 1000.0), 64)?;
//! let aliased = pipeline::alias(&source, 2)?;
//! let filter = AntiAliasFilter::new(100, 0.5)?;
//! let clean = pipeline::antialias(&source, 2, &filter)?;
//!
//! assert!(aliased.fold_back_ratio(&source.chirp) > clean.fold_back_ratio(&source.chirp));
//! # Ok::<(), chirplab_analysis::Error>(())
//! ```

use crate::chirp::{Chirp, aliased_frequency};
use crate::resample::{AntiAliasFilter, downsample};
use crate::spectrogram::{Spectrogram, SpectrogramParams, StftAnalyzer};
use crate::spectrum::{DominantFrequencies, Spectrum, dominant_frequencies};
use crate::threshold::{SearchStrategy, Threshold, ThresholdSearch};
use crate::{Error, Result, Signal};

/// Output of the chirp synthesis pipeline.
#[derive(Debug, Clone)]
pub struct ChirpRun {
    /// Chirp parameters.
    pub chirp: Chirp,
    /// Sampled chirp.
    pub signal: Signal,
    /// Spectrogram parameters at the chirp's own rate.
    pub params: SpectrogramParams,
    /// Spectrogram of the chirp.
    pub spectrogram: Spectrogram,
}

/// Synthesize a chirp and take its spectrogram with a `window_len`-sample
/// Hann window.
pub fn chirp(chirp: Chirp, window_len: usize) -> Result<ChirpRun> {
    if chirp.sample_rate <= 0.0 {
        return Err(Error::InvalidSampleRate(chirp.sample_rate));
    }
    let signal = chirp.generate();
    let params = SpectrogramParams::new(window_len, chirp.sample_rate)?;
    let spectrogram = StftAnalyzer::new(params).analyze(&signal)?;

    Ok(ChirpRun {
        chirp,
        signal,
        params,
        spectrogram,
    })
}

/// Output of a downsampling pipeline, filtered or not.
#[derive(Debug, Clone)]
pub struct DownsampleRun {
    /// Downsampled signal.
    pub signal: Signal,
    /// Decimation factor.
    pub factor: usize,
    /// Spectrogram parameters rescaled to keep the window duration.
    pub params: SpectrogramParams,
    /// Spectrogram of the downsampled signal.
    pub spectrogram: Spectrogram,
    /// Delay introduced before downsampling, in seconds.
    pub delay_secs: f32,
    /// Whether an anti-aliasing filter ran first.
    pub filtered: bool,
}

/// Where the chirp should appear in one spectrogram frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTrack {
    /// Frame centre in seconds.
    pub time: f32,
    /// Instantaneous frequency of the chirp at that moment.
    pub true_frequency: f32,
    /// Where that frequency lands after sampling at the new rate.
    pub apparent_frequency: f32,
    /// Strongest bin frequency in the frame.
    pub peak_frequency: f32,
    /// Total power in the frame.
    pub power: f32,
}

impl DownsampleRun {
    /// Nyquist limit of the downsampled signal.
    pub fn nyquist(&self) -> f32 {
        self.signal.nyquist()
    }

    /// Time at which the chirp crosses the new Nyquist limit and
    /// fold-back begins.
    pub fn fold_back_onset(&self, chirp: &Chirp) -> f32 {
        chirp.time_at_frequency(self.nyquist())
    }

    /// Expected and measured chirp position for every frame.
    pub fn track(&self, chirp: &Chirp) -> Vec<FrameTrack> {
        let fs = self.signal.sample_rate();
        (0..self.spectrogram.num_frames)
            .map(|frame| {
                let time = self.spectrogram.frame_to_time(frame);
                let true_frequency =
                    chirp.instantaneous_frequency((time - self.delay_secs).max(0.0));
                FrameTrack {
                    time,
                    true_frequency,
                    apparent_frequency: aliased_frequency(true_frequency, fs),
                    peak_frequency: self.spectrogram.peak_frequency(frame).unwrap_or(0.0),
                    power: self.spectrogram.frame_power(frame).unwrap_or(0.0),
                }
            })
            .collect()
    }

    /// Mean frame power while the chirp sits well above the new Nyquist
    /// limit, relative to the mean while it sits well below it.
    ///
    /// Close to 1 when content folds back unattenuated, close to 0 when an
    /// anti-aliasing filter removed it. "Well" means outside ±15% of the
    /// limit, clear of the filter's transition band.
    pub fn fold_back_ratio(&self, chirp: &Chirp) -> f32 {
        let nyquist = self.nyquist();
        let (mut above, mut n_above, mut below, mut n_below) = (0.0f32, 0usize, 0.0f32, 0usize);

        for track in self.track(chirp) {
            if track.true_frequency > nyquist * 1.15 {
                above += track.power;
                n_above += 1;
            } else if track.true_frequency < nyquist * 0.85
                && track.true_frequency > nyquist * 0.1
            {
                below += track.power;
                n_below += 1;
            }
        }

        if n_above == 0 || n_below == 0 || below <= 0.0 {
            return 0.0;
        }
        (above / n_above as f32) / (below / n_below as f32)
    }
}

fn rescaled_spectrogram(
    source: &ChirpRun,
    signal: &Signal,
) -> Result<(SpectrogramParams, Spectrogram)> {
    let params = source.params.rescaled(signal.sample_rate())?;
    let spectrogram = StftAnalyzer::new(params).analyze(signal)?;
    Ok((params, spectrogram))
}

/// Downsample the chirp by `factor` with no filtering, letting content
/// above the new Nyquist limit fold back.
pub fn alias(source: &ChirpRun, factor: usize) -> Result<DownsampleRun> {
    let signal = downsample(&source.signal, factor)?;
    let (params, spectrogram) = rescaled_spectrogram(source, &signal)?;

    Ok(DownsampleRun {
        signal,
        factor,
        params,
        spectrogram,
        delay_secs: 0.0,
        filtered: false,
    })
}

/// Low-pass filter the chirp, then downsample it by `factor`.
pub fn antialias(
    source: &ChirpRun,
    factor: usize,
    filter: &AntiAliasFilter,
) -> Result<DownsampleRun> {
    let signal = filter.decimate(&source.signal, factor)?;
    let (params, spectrogram) = rescaled_spectrogram(source, &signal)?;

    Ok(DownsampleRun {
        signal,
        factor,
        params,
        spectrogram,
        delay_secs: filter.group_delay() / source.signal.sample_rate(),
        filtered: true,
    })
}

/// Settings for the noisy-sinusoid recovery pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenoiseSettings {
    /// Sampling rate assumed for the input; it cannot be recovered from the
    /// samples themselves.
    pub assumed_sample_rate: f32,
    /// Number of sinusoids to isolate.
    pub peaks: usize,
    /// Threshold search strategy.
    pub strategy: SearchStrategy,
}

impl Default for DenoiseSettings {
    fn default() -> Self {
        Self {
            assumed_sample_rate: 1000.0,
            peaks: 2,
            strategy: SearchStrategy::default(),
        }
    }
}

/// Output of the noisy-sinusoid recovery pipeline.
#[derive(Debug, Clone)]
pub struct DenoiseRun {
    /// Input signal at the assumed rate, narrowed to `f32` for export.
    pub signal: Signal,
    /// Full spectrum of the input.
    pub spectrum: Spectrum,
    /// Strongest components of the input.
    pub dominant: DominantFrequencies,
    /// Threshold isolating exactly the requested number of components.
    pub threshold: Threshold,
    /// Spectrum with everything at or below the threshold zeroed.
    pub denoised: Spectrum,
    /// Time-domain signal rebuilt from the denoised spectrum.
    pub reconstructed: Signal,
}

/// Recover the dominant sinusoids of a noisy signal.
///
/// The spectrum, peaks and threshold are computed from the samples in
/// double precision. Fails with [`Error::ThresholdNotFound`] rather than
/// returning a threshold that does not isolate exactly `settings.peaks`
/// components.
pub fn denoise(samples: &[f64], settings: DenoiseSettings) -> Result<DenoiseRun> {
    if samples.is_empty() {
        return Err(Error::EmptySignal);
    }
    let signal = Signal::new(
        samples.iter().map(|&s| s as f32).collect(),
        settings.assumed_sample_rate,
    );
    let spectrum = Spectrum::of_samples(samples);
    let dominant = dominant_frequencies(&spectrum, settings.peaks, settings.assumed_sample_rate)?;

    let threshold = ThresholdSearch::new(settings.peaks)
        .with_strategy(settings.strategy)
        .find(&spectrum)?;
    let denoised = threshold.apply(&spectrum);
    let reconstructed = denoised.reconstruct(settings.assumed_sample_rate);

    Ok(DenoiseRun {
        signal,
        spectrum,
        dominant,
        threshold,
        denoised,
        reconstructed,
    })
}
