//! Run every chirp pipeline on one shared chirp.

use super::alias::{alias, print_fold_back};
use super::antialias::antialias;
use super::common::{self, ChirpOptions};
use chirplab_config::LabConfig;
use clap::Args;

#[derive(Args)]
pub struct AllArgs {
    #[command(flatten)]
    chirp: ChirpOptions,

    /// Downsampling factor
    #[arg(long)]
    factor: Option<usize>,
}

pub fn run(args: AllArgs, mut config: LabConfig) -> anyhow::Result<()> {
    args.chirp.apply(&mut config);
    if let Some(factor) = args.factor {
        config.downsample.factor = factor;
    }
    config.validate()?;

    let wav = !args.chirp.no_wav;
    let source = common::run_chirp(&config)?;
    let dir = common::output_dir(&config)?;

    println!(
        "Chirp: {:.2} s at {:.0} Hz, 0 → {:.0} Hz",
        source.chirp.duration,
        source.chirp.sample_rate,
        source.chirp.max_frequency()
    );
    common::print_spectrogram_summary("spectrogram", &source.spectrogram);
    common::export_plots(
        &dir,
        "chirp",
        &source.signal,
        &source.spectrogram,
        config.export.db_range,
    )?;
    if wav {
        common::export_wav(&dir, "chirp_signal.wav", &source.signal)?;
    }

    println!();
    let aliased = alias(&source, &config, &dir, wav)?;
    print_fold_back(&aliased, &source);

    println!();
    let filtered = antialias(&source, &config, &dir, wav)?;
    print_fold_back(&filtered, &source);

    let raw = aliased.fold_back_ratio(&source.chirp);
    let clean = filtered.fold_back_ratio(&source.chirp);
    println!();
    if clean > 0.0 {
        println!(
            "Filtering reduced fold-back power by {:.1} dB",
            10.0 * (raw / clean).log10()
        );
    }

    println!("Output written to {}", dir.display());
    Ok(())
}
