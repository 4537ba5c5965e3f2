//! Synthetic noisy-signal generation.

use anyhow::Context;
use chirplab_analysis::{Tone, noisy_tones};
use chirplab_config::LabConfig;
use chirplab_io::write_npy;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct SynthArgs {
    /// Output .npy file (defaults to [denoise] input)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Tone frequency in Hz; repeat for several tones
    #[arg(long = "freq", value_name = "HZ")]
    frequencies: Vec<f32>,

    /// Standard deviation of the added Gaussian noise
    #[arg(long)]
    noise_std: Option<f32>,

    /// Sampling rate in Hz
    #[arg(long)]
    sample_rate: Option<f32>,

    /// Number of samples
    #[arg(long)]
    num_samples: Option<usize>,

    /// Noise seed
    #[arg(long)]
    seed: Option<u64>,
}

pub fn run(args: SynthArgs, mut config: LabConfig) -> anyhow::Result<()> {
    if !args.frequencies.is_empty() {
        config.synth.frequencies = args.frequencies;
    }
    if let Some(noise_std) = args.noise_std {
        config.synth.noise_std = noise_std;
    }
    if let Some(sample_rate) = args.sample_rate {
        config.synth.sample_rate = sample_rate;
    }
    if let Some(num_samples) = args.num_samples {
        config.synth.num_samples = num_samples;
    }
    if let Some(seed) = args.seed {
        config.synth.seed = seed;
    }
    config.validate()?;

    let synth = &config.synth;
    let tones: Vec<Tone> = synth.frequencies.iter().map(|&f| Tone::new(f)).collect();
    let signal = noisy_tones(
        &tones,
        synth.noise_std,
        synth.sample_rate,
        synth.num_samples,
        synth.seed,
    )?;

    let output = args.output.unwrap_or_else(|| config.denoise.input.clone());
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    let data: Vec<f64> = signal.samples().iter().map(|&s| f64::from(s)).collect();
    write_npy(&output, &data).with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(
        path = %output.display(),
        samples = data.len(),
        seed = synth.seed,
        "wrote synthetic signal"
    );
    println!(
        "Wrote {} samples of {:?} Hz + N(0, {}²) noise at {:.0} Hz to {}",
        data.len(),
        synth.frequencies,
        synth.noise_std,
        synth.sample_rate,
        output.display()
    );
    Ok(())
}
