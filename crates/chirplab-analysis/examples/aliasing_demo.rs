//! Aliasing demo: where a chirp lands after downsampling, with and without
//! an anti-aliasing filter.
//!
//! Run with: cargo run -p chirplab-analysis --example aliasing_demo

use chirplab_analysis::chirp::Chirp;
use chirplab_analysis::pipeline;
use chirplab_analysis::resample::AntiAliasFilter;

fn main() -> chirplab_analysis::Result<()> {
    let source = pipeline::chirp(Chirp::new(2.0, 8000.0, 1000.0), 64)?;
    let aliased = pipeline::alias(&source, 2)?;
    let filter = AntiAliasFilter::new(100, 0.5)?;
    let clean = pipeline::antialias(&source, 2, &filter)?;

    println!(
        "=== Chirp 0 → {:.0} Hz at 8 kHz, downsampled 2x ===\n",
        source.chirp.max_frequency()
    );
    println!(
        "New Nyquist {:.0} Hz, reached at t = {:.3} s\n",
        aliased.nyquist(),
        aliased.fold_back_onset(&source.chirp)
    );

    println!(
        "{:>6}  {:>9}  {:>9}  {:>11}  {:>11}",
        "t (s)", "true Hz", "alias Hz", "peak (raw)", "peak (filt)"
    );
    let raw = aliased.track(&source.chirp);
    let filtered = clean.track(&source.chirp);
    for (r, f) in raw.iter().zip(filtered.iter()).step_by(50) {
        println!(
            "{:>6.3}  {:>9.1}  {:>9.1}  {:>11.1}  {:>11.1}",
            r.time, r.true_frequency, r.apparent_frequency, r.peak_frequency, f.peak_frequency
        );
    }

    println!(
        "\nFold-back power ratio: unfiltered {:.3}, filtered {:.2e}",
        aliased.fold_back_ratio(&source.chirp),
        clean.fold_back_ratio(&source.chirp)
    );
    Ok(())
}
