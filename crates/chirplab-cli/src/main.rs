//! chirplab CLI - sampling, aliasing and spectral thresholding experiments.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chirplab")]
#[command(author, version, about = "Chirp aliasing and spectral denoising lab", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long = "config", global = true, value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Directory for CSV, PGM and WAV output (overrides [export] output_dir)
    #[arg(short, long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize the chirp and its spectrogram
    Chirp(commands::chirp::ChirpArgs),

    /// Downsample the chirp without filtering
    Alias(commands::alias::AliasArgs),

    /// Low-pass filter the chirp, then downsample it
    Antialias(commands::antialias::AntialiasArgs),

    /// Run chirp, alias and antialias on one shared chirp
    All(commands::all::AllArgs),

    /// Write a noisy sum of sinusoids as a .npy file
    Synth(commands::synth::SynthArgs),

    /// Recover the dominant sinusoids of a noisy .npy signal
    Denoise(commands::denoise::DenoiseArgs),

    /// Show or create configuration files
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = commands::common::load_config(cli.config_file.as_deref())?;
    if let Some(dir) = cli.output_dir {
        config.export.output_dir = dir;
    }

    match cli.command {
        Commands::Chirp(args) => commands::chirp::run(args, config),
        Commands::Alias(args) => commands::alias::run(args, config),
        Commands::Antialias(args) => commands::antialias::run(args, config),
        Commands::All(args) => commands::all::run(args, config),
        Commands::Synth(args) => commands::synth::run(args, config),
        Commands::Denoise(args) => commands::denoise::run(args, config),
        Commands::Config(args) => commands::config::run(args, config),
    }
}
