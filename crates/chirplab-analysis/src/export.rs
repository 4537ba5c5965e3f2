//! Export formats for analysis results.
//!
//! Plot-ready text files for any charting tool:
//! - CSV time series (sample index, time, amplitude)
//! - CSV magnitude spectra, original and thresholded side by side
//! - CSV spectrograms in dB (time rows, frequency columns)
//! - PGM grayscale images for spectrogram heatmaps

use std::io::{BufWriter, Write};
use std::path::Path;

use crate::fft::power_to_db;
use crate::spectrum::Spectrum;
use crate::{Signal, Spectrogram};

/// Export a signal as CSV with columns `index,time_s,amplitude`.
pub fn export_series_csv(signal: &Signal, path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut file = BufWriter::new(std::fs::File::create(path)?);

    writeln!(file, "index,time_s,amplitude")?;
    for (n, &sample) in signal.samples().iter().enumerate() {
        writeln!(file, "{},{:.6},{:.6}", n, signal.time_of(n), sample)?;
    }

    file.flush()
}

/// Export positive-half magnitude spectra for overlay plots.
///
/// Columns: `normalized_freq,original,filtered`. Both spectra must come from
/// signals of the same length.
pub fn export_spectrum_comparison_csv(
    original: &Spectrum,
    filtered: &Spectrum,
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    if original.len() != filtered.len() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!(
                "spectrum lengths differ: {} vs {}",
                original.len(),
                filtered.len()
            ),
        ));
    }

    let mut file = BufWriter::new(std::fs::File::create(path)?);
    let freqs = original.positive_frequencies();
    let before = original.positive_magnitudes();
    let after = filtered.positive_magnitudes();

    writeln!(file, "normalized_freq,original,filtered")?;
    for ((f, a), b) in freqs.iter().zip(before.iter()).zip(after.iter()) {
        writeln!(file, "{:.6},{:.6},{:.6}", f, a, b)?;
    }

    file.flush()
}

/// Export spectrogram to CSV format in dB.
///
/// Creates a CSV file with time on rows and frequency bins on columns.
/// First row contains frequency labels, first column contains frame centre
/// times. Values are `10·log10(power + ε)`.
///
/// # Example
///
/// ```rust,ignore
/// use chirplab_analysis::{StftAnalyzer, SpectrogramParams, export::export_spectrogram_csv};
///
/// let analyzer = StftAnalyzer::new(SpectrogramParams::new(64, 8000.0)?);
/// let spec = analyzer.analyze(&signal)?;
/// export_spectrogram_csv(&spec, "spectrogram.csv")?;
/// ```
pub fn export_spectrogram_csv(
    spectrogram: &Spectrogram,
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    let mut file = BufWriter::new(std::fs::File::create(path)?);

    write!(file, "time_s")?;
    for bin in 0..spectrogram.num_bins {
        write!(file, ",{:.2}", spectrogram.bin_to_freq(bin))?;
    }
    writeln!(file)?;

    for frame in 0..spectrogram.num_frames {
        write!(file, "{:.6}", spectrogram.frame_to_time(frame))?;

        if let Some(spectrum) = spectrogram.get_frame(frame) {
            for &power in spectrum {
                write!(file, ",{:.3}", power_to_db(power))?;
            }
        }
        writeln!(file)?;
    }

    file.flush()
}

/// Export spectrogram to PGM grayscale image format.
///
/// PGM is a simple ASCII image format that can be viewed by most image tools.
/// Time is on the X axis, frequency on Y axis (low frequencies at bottom).
///
/// # Arguments
///
/// * `spectrogram` - The spectrogram to export
/// * `path` - Output file path
/// * `db_range` - Dynamic range in dB (values below max-db_range map to black)
pub fn export_spectrogram_pgm(
    spectrogram: &Spectrogram,
    path: impl AsRef<Path>,
    db_range: f32,
) -> std::io::Result<()> {
    let mut file = BufWriter::new(std::fs::File::create(path)?);

    let width = spectrogram.num_frames;
    let height = spectrogram.num_bins;

    writeln!(file, "P2")?;
    writeln!(file, "# Spectrogram export from chirplab-analysis")?;
    writeln!(file, "# Width: {} frames, Height: {} bins", width, height)?;
    writeln!(file, "{} {}", width, height)?;
    writeln!(file, "255")?;

    let max_db = power_to_db(spectrogram.max_power());
    let db_range = db_range.max(f32::EPSILON);

    // Image data (top to bottom = high to low frequency)
    for bin in (0..height).rev() {
        let row: Vec<String> = (0..width)
            .map(|frame| {
                let db = power_to_db(spectrogram.get(frame, bin).unwrap_or(0.0));
                let normalized = ((db - (max_db - db_range)) / db_range).clamp(0.0, 1.0);
                ((normalized * 255.0) as u8).to_string()
            })
            .collect();
        writeln!(file, "{}", row.join(" "))?;
    }

    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrogram::SpectrogramParams;
    use rustfft::num_complex::Complex;
    use tempfile::NamedTempFile;

    fn tiny_spectrogram() -> Spectrogram {
        let params = SpectrogramParams::new(1, 1000.0).unwrap();
        Spectrogram {
            data: vec![
                vec![0.1, 0.5, 1.0],
                vec![0.2, 0.6, 0.8],
                vec![0.3, 0.7, 0.5],
            ],
            params,
            num_frames: 3,
            num_bins: 3,
        }
    }

    #[test]
    fn test_series_csv_export() {
        let signal = Signal::new(vec![0.5, -0.25], 4.0);
        let temp_file = NamedTempFile::new().unwrap();

        export_series_csv(&signal, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "index,time_s,amplitude");
        assert_eq!(lines[1], "0,0.000000,0.500000");
        assert_eq!(lines[2], "1,0.250000,-0.250000");
    }

    #[test]
    fn test_spectrum_comparison_export() {
        let original = Spectrum::from_bins(vec![Complex::new(3.0, 4.0); 4]);
        let filtered = Spectrum::from_bins(vec![Complex::new(0.0, 0.0); 4]);
        let temp_file = NamedTempFile::new().unwrap();

        export_spectrum_comparison_csv(&original, &filtered, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "0.250000,5.000000,0.000000");
    }

    #[test]
    fn test_spectrum_comparison_rejects_mismatch() {
        let a = Spectrum::from_bins(vec![Complex::new(1.0, 0.0); 4]);
        let b = Spectrum::from_bins(vec![Complex::new(1.0, 0.0); 6]);
        let temp_file = NamedTempFile::new().unwrap();
        assert!(export_spectrum_comparison_csv(&a, &b, temp_file.path()).is_err());
    }

    #[test]
    fn test_spectrogram_csv_export() {
        let temp_file = NamedTempFile::new().unwrap();
        export_spectrogram_csv(&tiny_spectrogram(), temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.starts_with("time_s,0.00,250.00,500.00"));
        // 10·log10(1.0 + ε) = 0 dB
        assert!(content.lines().nth(1).unwrap().ends_with(",0.000"));
        assert_eq!(content.lines().count(), 4);
    }

    #[test]
    fn test_spectrogram_pgm_export() {
        let temp_file = NamedTempFile::new().unwrap();
        export_spectrogram_pgm(&tiny_spectrogram(), temp_file.path(), 60.0).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.starts_with("P2"), "Should be P2 format");
        assert!(content.contains("3 3"), "Should have width 3 height 3");
        assert!(content.contains("255"), "Should have max value 255");
        // Top row is the highest bin; its first pixel holds the global maximum
        let first_row = content.lines().nth(5).unwrap();
        assert!(first_row.starts_with("255 "));
    }
}
