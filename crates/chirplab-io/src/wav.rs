//! WAV export.
//!
//! Output is always mono 16-bit PCM, scaled by 32767 and truncated toward
//! zero like a NumPy `int16` cast.

use crate::{Error, Result};
use chirplab_analysis::Signal;
use chirplab_analysis::chirp::to_pcm16;
use hound::{SampleFormat, WavWriter};
use std::path::Path;

const BITS_PER_SAMPLE: u16 = 16;

fn pcm16_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Write mono samples as 16-bit PCM at `sample_rate` Hz.
///
/// Samples are multiplied by 32767 and truncated toward zero, so the export
/// is lossy. Values outside [-1, 1] saturate.
///
/// # Example
/// ```ignore
/// let samples = vec![0.0f32; 8000]; // 1 second of silence
/// write_wav("output.wav", &samples, 8000)?;
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    if sample_rate == 0 {
        return Err(Error::UnsupportedFormat("sample rate 0 Hz".into()));
    }
    let mut writer = WavWriter::create(path.as_ref(), pcm16_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(to_pcm16(sample))?;
    }
    writer.finalize()?;

    tracing::debug!(
        path = %path.as_ref().display(),
        samples = samples.len(),
        sample_rate,
        "wrote WAV"
    );
    Ok(())
}

/// Write a signal as 16-bit PCM at its own sample rate.
///
/// The rate is rounded to the nearest integer Hz.
pub fn write_signal<P: AsRef<Path>>(path: P, signal: &Signal) -> Result<()> {
    let rate = signal.sample_rate().round();
    if !(rate >= 1.0 && rate <= u32::MAX as f32) {
        return Err(Error::UnsupportedFormat(format!(
            "sample rate {} Hz",
            signal.sample_rate()
        )));
    }
    write_wav(path, signal.samples(), rate as u32)
}
