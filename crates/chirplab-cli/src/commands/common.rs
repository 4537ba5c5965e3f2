//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use chirplab_analysis::export::{export_series_csv, export_spectrogram_csv, export_spectrogram_pgm};
use chirplab_analysis::pipeline::{self, ChirpRun, DownsampleRun};
use chirplab_analysis::{Chirp, Signal, Spectrogram};
use chirplab_config::LabConfig;
use clap::Args;
use std::path::{Path, PathBuf};

/// Load the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LabConfig> {
    match path {
        Some(path) => {
            let config = LabConfig::load(path)
                .with_context(|| format!("loading configuration {}", path.display()))?;
            tracing::info!(path = %path.display(), "loaded configuration");
            Ok(config)
        }
        None => Ok(LabConfig::default()),
    }
}

/// Chirp and spectrogram flags shared by the chirp-based commands.
#[derive(Args, Debug, Default)]
pub struct ChirpOptions {
    /// Chirp duration in seconds
    #[arg(long)]
    pub duration: Option<f32>,

    /// Chirp sampling rate in Hz
    #[arg(long)]
    pub sample_rate: Option<f32>,

    /// Chirp rate constant k (instantaneous frequency k·t²)
    #[arg(long)]
    pub k: Option<f32>,

    /// Spectrogram window length in samples at the chirp rate
    #[arg(long)]
    pub window_len: Option<usize>,

    /// Skip WAV export
    #[arg(long)]
    pub no_wav: bool,
}

impl ChirpOptions {
    /// Fold the flags into `config`.
    pub fn apply(&self, config: &mut LabConfig) {
        if let Some(duration) = self.duration {
            config.chirp.duration = duration;
        }
        if let Some(sample_rate) = self.sample_rate {
            config.chirp.sample_rate = sample_rate;
        }
        if let Some(k) = self.k {
            config.chirp.k = k;
        }
        if let Some(window_len) = self.window_len {
            config.spectrogram.window_len = window_len;
        }
    }
}

/// Run the chirp pipeline with the configured parameters.
pub fn run_chirp(config: &LabConfig) -> anyhow::Result<ChirpRun> {
    let chirp = Chirp::new(config.chirp.duration, config.chirp.sample_rate, config.chirp.k);
    let run = pipeline::chirp(chirp, config.spectrogram.window_len)?;

    tracing::info!(
        samples = run.signal.len(),
        sample_rate = run.signal.sample_rate(),
        max_frequency = run.chirp.max_frequency(),
        "synthesized chirp"
    );
    if !run.chirp.is_alias_free() {
        tracing::warn!(
            max_frequency = run.chirp.max_frequency(),
            nyquist = run.signal.nyquist(),
            "chirp already exceeds its own Nyquist limit"
        );
    }
    Ok(run)
}

/// Create the output directory and return it.
pub fn output_dir(config: &LabConfig) -> anyhow::Result<PathBuf> {
    let dir = config.export.output_dir.clone();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    Ok(dir)
}

/// Write `<stem>_series.csv`, `<stem>_spectrogram.csv` and
/// `<stem>_spectrogram.pgm`.
pub fn export_plots(
    dir: &Path,
    stem: &str,
    signal: &Signal,
    spectrogram: &Spectrogram,
    db_range: f32,
) -> anyhow::Result<()> {
    let series = dir.join(format!("{stem}_series.csv"));
    export_series_csv(signal, &series)
        .with_context(|| format!("writing {}", series.display()))?;

    let csv = dir.join(format!("{stem}_spectrogram.csv"));
    export_spectrogram_csv(spectrogram, &csv)
        .with_context(|| format!("writing {}", csv.display()))?;

    let pgm = dir.join(format!("{stem}_spectrogram.pgm"));
    export_spectrogram_pgm(spectrogram, &pgm, db_range)
        .with_context(|| format!("writing {}", pgm.display()))?;

    tracing::info!(
        stem,
        frames = spectrogram.num_frames,
        bins = spectrogram.num_bins,
        "exported plots"
    );
    Ok(())
}

/// Write `signal` as 16-bit PCM to `dir/name`.
pub fn export_wav(dir: &Path, name: &str, signal: &Signal) -> anyhow::Result<()> {
    let path = dir.join(name);
    chirplab_io::write_signal(&path, signal)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), rate = signal.sample_rate(), "exported WAV");
    Ok(())
}

/// Print the spectrogram settings of a run.
pub fn print_spectrogram_summary(label: &str, spectrogram: &Spectrogram) {
    let params = &spectrogram.params;
    println!(
        "  {label}: window {} samples ({:.1} ms), overlap {}, nfft {}, {} frames x {} bins",
        params.window_len,
        params.window_duration() * 1000.0,
        params.overlap,
        params.nfft,
        spectrogram.num_frames,
        spectrogram.num_bins
    );
}

/// Print where the chirp should appear and where it was found, every
/// `every` frames.
pub fn print_track(run: &DownsampleRun, chirp: &Chirp, every: usize) {
    println!(
        "  {:>7}  {:>9}  {:>11}  {:>9}",
        "t (s)", "true Hz", "apparent Hz", "peak Hz"
    );
    for track in run.track(chirp).iter().step_by(every.max(1)) {
        println!(
            "  {:>7.3}  {:>9.1}  {:>11.1}  {:>9.1}",
            track.time, track.true_frequency, track.apparent_frequency, track.peak_frequency
        );
    }
}
