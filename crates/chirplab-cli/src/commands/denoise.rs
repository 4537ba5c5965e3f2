//! Dominant-frequency extraction and spectral thresholding.

use anyhow::Context;
use chirplab_analysis::SearchStrategy;
use chirplab_analysis::export::{export_series_csv, export_spectrum_comparison_csv};
use chirplab_analysis::pipeline::{DenoiseRun, DenoiseSettings, denoise};
use chirplab_config::{LabConfig, StrategyName};
use chirplab_io::read_npy;
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Threshold search strategies for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliStrategy {
    Linear,
    OrderStatistic,
}

impl From<CliStrategy> for StrategyName {
    fn from(s: CliStrategy) -> Self {
        match s {
            CliStrategy::Linear => StrategyName::Linear,
            CliStrategy::OrderStatistic => StrategyName::OrderStatistic,
        }
    }
}

fn search_strategy(name: StrategyName) -> SearchStrategy {
    match name {
        StrategyName::Linear => SearchStrategy::Linear,
        StrategyName::OrderStatistic => SearchStrategy::OrderStatistic,
    }
}

#[derive(Args)]
pub struct DenoiseArgs {
    /// Input .npy file (defaults to [denoise] input)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Sampling rate to assume for the input in Hz
    #[arg(long)]
    sample_rate: Option<f32>,

    /// Number of sinusoids to isolate
    #[arg(long)]
    peaks: Option<usize>,

    /// Threshold search strategy
    #[arg(long, value_enum)]
    strategy: Option<CliStrategy>,

    /// Print a JSON report to stdout instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PeakReport {
    bin: usize,
    normalized: f64,
    frequency_hz: f64,
    magnitude: f64,
}

#[derive(Serialize)]
struct DenoiseReport {
    input: PathBuf,
    shape: Vec<usize>,
    num_samples: usize,
    assumed_sample_rate: f32,
    peaks: Vec<PeakReport>,
    threshold: f64,
    relative_threshold: f64,
    max_magnitude: f64,
    surviving_peaks: usize,
}

impl DenoiseReport {
    fn new(input: &Path, shape: Vec<usize>, run: &DenoiseRun) -> Self {
        Self {
            input: input.to_path_buf(),
            shape,
            num_samples: run.signal.len(),
            assumed_sample_rate: run.dominant.assumed_sample_rate,
            peaks: run
                .dominant
                .by_frequency()
                .iter()
                .map(|p| PeakReport {
                    bin: p.bin,
                    normalized: p.normalized,
                    frequency_hz: p.frequency_hz,
                    magnitude: p.magnitude,
                })
                .collect(),
            threshold: run.threshold.threshold,
            relative_threshold: run.threshold.relative(),
            max_magnitude: run.threshold.max_magnitude,
            surviving_peaks: run.denoised.nonzero_positive_bins(),
        }
    }
}

pub fn run(args: DenoiseArgs, mut config: LabConfig) -> anyhow::Result<()> {
    if let Some(input) = args.input {
        config.denoise.input = input;
    }
    if let Some(sample_rate) = args.sample_rate {
        config.denoise.sample_rate = Some(sample_rate);
    }
    if let Some(peaks) = args.peaks {
        config.denoise.peaks = peaks;
    }
    if let Some(strategy) = args.strategy {
        config.denoise.strategy = strategy.into();
    }
    config.validate()?;

    let input = config.denoise.input.clone();
    let array = read_npy(&input).with_context(|| format!("reading {}", input.display()))?;
    if array.shape.len() > 1 {
        tracing::warn!(shape = ?array.shape, "flattening multi-dimensional array in C order");
    }
    if config.denoise.sample_rate.is_none() {
        tracing::warn!(
            sample_rate = config.denoise.assumed_sample_rate(),
            "no sampling rate given for the input; physical frequencies assume it"
        );
    }

    let settings = DenoiseSettings {
        assumed_sample_rate: config.denoise.assumed_sample_rate(),
        peaks: config.denoise.peaks,
        strategy: search_strategy(config.denoise.strategy),
    };
    let run = denoise(&array.data, settings)
        .with_context(|| format!("denoising {}", input.display()))?;

    let dir = super::common::output_dir(&config)?;
    export_outputs(&dir, &run)?;

    let report = DenoiseReport::new(&input, array.shape.clone(), &run);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
        println!("Output written to {}", dir.display());
    }
    Ok(())
}

fn export_outputs(dir: &Path, run: &DenoiseRun) -> anyhow::Result<()> {
    let spectra = dir.join("denoise_spectrum.csv");
    export_spectrum_comparison_csv(&run.spectrum, &run.denoised, &spectra)
        .with_context(|| format!("writing {}", spectra.display()))?;

    let noisy = dir.join("noisy_series.csv");
    export_series_csv(&run.signal, &noisy)
        .with_context(|| format!("writing {}", noisy.display()))?;

    let clean = dir.join("denoised_series.csv");
    export_series_csv(&run.reconstructed, &clean)
        .with_context(|| format!("writing {}", clean.display()))?;

    tracing::info!(dir = %dir.display(), "exported denoise outputs");
    Ok(())
}

fn print_report(report: &DenoiseReport) {
    println!(
        "Loaded {} samples from {} (shape {:?})",
        report.num_samples,
        report.input.display(),
        report.shape
    );
    println!("Dominant components (assuming {:.0} Hz):", report.assumed_sample_rate);
    for peak in &report.peaks {
        println!(
            "  bin {:>5}  {:.4} cycles/sample  {:>9.2} Hz  |X| = {:.2}",
            peak.bin, peak.normalized, peak.frequency_hz, peak.magnitude
        );
    }
    println!(
        "Threshold {:.3} ({:.1}% of max |X| {:.2}) leaves {} peaks",
        report.threshold,
        report.relative_threshold * 100.0,
        report.max_magnitude,
        report.surviving_peaks
    );
}
