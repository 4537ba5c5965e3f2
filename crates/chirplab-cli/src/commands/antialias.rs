//! Filtered downsampling command.

use super::alias::print_fold_back;
use super::common::{self, ChirpOptions};
use chirplab_analysis::AntiAliasFilter;
use chirplab_analysis::pipeline::{self, ChirpRun, DownsampleRun};
use chirplab_config::LabConfig;
use clap::Args;
use std::path::Path;

#[derive(Args)]
pub struct AntialiasArgs {
    #[command(flatten)]
    chirp: ChirpOptions,

    /// Downsampling factor
    #[arg(long)]
    factor: Option<usize>,

    /// FIR order (taps = order + 1)
    #[arg(long)]
    order: Option<usize>,

    /// Normalized cutoff, 1.0 = Nyquist of the input rate
    #[arg(long)]
    cutoff: Option<f32>,
}

pub fn run(args: AntialiasArgs, mut config: LabConfig) -> anyhow::Result<()> {
    args.chirp.apply(&mut config);
    if let Some(factor) = args.factor {
        config.downsample.factor = factor;
    }
    if let Some(order) = args.order {
        config.antialias.order = order;
    }
    if let Some(cutoff) = args.cutoff {
        config.antialias.cutoff = cutoff;
    }
    config.validate()?;

    let source = common::run_chirp(&config)?;
    let dir = common::output_dir(&config)?;
    let run = antialias(&source, &config, &dir, !args.chirp.no_wav)?;
    print_fold_back(&run, &source);

    println!("Output written to {}", dir.display());
    Ok(())
}

/// Run the antialias pipeline on an existing chirp and export its outputs.
pub fn antialias(
    source: &ChirpRun,
    config: &LabConfig,
    dir: &Path,
    wav: bool,
) -> anyhow::Result<DownsampleRun> {
    let filter = AntiAliasFilter::new(config.antialias.order, config.antialias.cutoff)?;
    let factor = config.downsample.factor;

    let suggested = AntiAliasFilter::cutoff_for_factor(factor);
    if filter.cutoff() > suggested {
        tracing::warn!(
            cutoff = filter.cutoff(),
            suggested,
            factor,
            "cutoff is above the new Nyquist limit; some content will still alias"
        );
    }

    let run = pipeline::antialias(source, factor, &filter)?;

    println!(
        "Anti-aliased: {}-tap Hamming lowpass at {:.2}·Nyquist ({:.0} Hz), delay {:.2} ms, then every {}th sample",
        filter.order() + 1,
        filter.cutoff(),
        filter.cutoff() * source.signal.nyquist(),
        run.delay_secs * 1000.0,
        factor
    );
    common::print_spectrogram_summary("spectrogram", &run.spectrogram);

    common::export_plots(dir, "filtered", &run.signal, &run.spectrogram, config.export.db_range)?;
    if wav {
        common::export_wav(dir, "filtered_downsampled_chirp.wav", &run.signal)?;
    }
    Ok(run)
}
