//! Chirp synthesis command.

use super::common::{self, ChirpOptions};
use chirplab_config::LabConfig;
use clap::Args;

#[derive(Args)]
pub struct ChirpArgs {
    #[command(flatten)]
    chirp: ChirpOptions,
}

pub fn run(args: ChirpArgs, mut config: LabConfig) -> anyhow::Result<()> {
    args.chirp.apply(&mut config);
    config.validate()?;

    let run = common::run_chirp(&config)?;
    let dir = common::output_dir(&config)?;

    println!(
        "Chirp: {:.2} s at {:.0} Hz, f(t) = {:.0}·t², 0 → {:.0} Hz",
        run.chirp.duration,
        run.chirp.sample_rate,
        run.chirp.k,
        run.chirp.max_frequency()
    );
    println!("  {} samples, Nyquist {:.0} Hz", run.signal.len(), run.signal.nyquist());
    common::print_spectrogram_summary("spectrogram", &run.spectrogram);

    common::export_plots(&dir, "chirp", &run.signal, &run.spectrogram, config.export.db_range)?;
    if !args.chirp.no_wav {
        common::export_wav(&dir, "chirp_signal.wav", &run.signal)?;
    }

    println!("Output written to {}", dir.display());
    Ok(())
}
