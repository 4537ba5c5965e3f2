//! Naive downsampling command.

use super::common::{self, ChirpOptions};
use chirplab_analysis::pipeline::{self, ChirpRun, DownsampleRun};
use chirplab_config::LabConfig;
use clap::Args;
use std::path::Path;

#[derive(Args)]
pub struct AliasArgs {
    #[command(flatten)]
    chirp: ChirpOptions,

    /// Downsampling factor
    #[arg(long)]
    factor: Option<usize>,
}

pub fn run(args: AliasArgs, mut config: LabConfig) -> anyhow::Result<()> {
    args.chirp.apply(&mut config);
    if let Some(factor) = args.factor {
        config.downsample.factor = factor;
    }
    config.validate()?;

    let source = common::run_chirp(&config)?;
    let dir = common::output_dir(&config)?;
    let run = alias(&source, &config, &dir, !args.chirp.no_wav)?;
    print_fold_back(&run, &source);

    println!("Output written to {}", dir.display());
    Ok(())
}

/// Run the alias pipeline on an existing chirp and export its outputs.
pub fn alias(
    source: &ChirpRun,
    config: &LabConfig,
    dir: &Path,
    wav: bool,
) -> anyhow::Result<DownsampleRun> {
    let run = pipeline::alias(source, config.downsample.factor)?;

    println!(
        "Aliased: every {}th sample kept, {:.0} Hz → {:.0} Hz, new Nyquist {:.0} Hz",
        run.factor,
        source.signal.sample_rate(),
        run.signal.sample_rate(),
        run.nyquist()
    );
    common::print_spectrogram_summary("spectrogram", &run.spectrogram);

    common::export_plots(dir, "aliased", &run.signal, &run.spectrogram, config.export.db_range)?;
    if wav {
        common::export_wav(dir, "aliased_chirp_signal.wav", &run.signal)?;
    }
    Ok(run)
}

/// Report when fold-back starts and how much of it survived.
pub fn print_fold_back(run: &DownsampleRun, source: &ChirpRun) {
    let chirp = &source.chirp;
    if chirp.max_frequency() > run.nyquist() {
        println!(
            "  chirp crosses {:.0} Hz at t = {:.3} s; later content folds back to fs' - f",
            run.nyquist(),
            run.fold_back_onset(chirp)
        );
    } else {
        println!("  chirp stays below the new Nyquist limit; nothing folds back");
    }
    println!(
        "  fold-back power ratio {:.3e} (≈1 unfiltered, ≪1 filtered)",
        run.fold_back_ratio(chirp)
    );
    let every = (run.spectrogram.num_frames / 10).max(1);
    common::print_track(run, chirp, every);
}
