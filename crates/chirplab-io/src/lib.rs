//! File I/O for chirplab.
//!
//! This crate provides:
//!
//! - **WAV export**: [`write_wav`] and [`write_signal`] write mono 16-bit
//!   PCM using the lossy ×32767-and-truncate scaling
//! - **NumPy arrays**: [`read_npy`] for `.npy` input and [`write_npy`] for
//!   writing `<f8` arrays
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chirplab_io::{read_npy, write_signal};
//!
//! // Load a noisy recording saved with numpy.save
//! let array = read_npy("noisy_signal.npy")?;
//! println!("shape {:?}, {} samples", array.shape, array.len());
//!
//! // Export a chirp as 16-bit PCM
//! write_signal("chirp_signal.wav", &chirp.generate())?;
//! ```

mod npy;
mod wav;

pub use npy::{NpyArray, NpyDtype, parse_npy, read_npy, write_npy};
pub use wav::{write_signal, write_wav};

/// Error types for file I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Malformed `.npy` file.
    #[error("Malformed NPY file: {0}")]
    Npy(String),

    /// The requested sample format or array layout is not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for file I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
