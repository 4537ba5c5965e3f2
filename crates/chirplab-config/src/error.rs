//! Errors raised while loading, checking, or saving a lab configuration.

use crate::validation::ValidationError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Filesystem step that failed while handling a lab file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    /// Reading an existing lab file.
    Read,
    /// Writing a lab file.
    Write,
    /// Creating the directory a lab file is saved into.
    CreateDir,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileOp::Read => "read",
            FileOp::Write => "write",
            FileOp::CreateDir => "create directory for",
        })
    }
}

/// Failure to turn a lab file into a usable [`LabConfig`](crate::LabConfig) or back.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The lab file could not be read or written.
    #[error("cannot {op} lab file '{path}': {source}")]
    Io {
        /// Step that failed.
        op: FileOp,
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not TOML, or its tables do not match the lab layout.
    #[error("malformed lab file: {0}")]
    Malformed(#[from] toml::de::Error),

    /// The configuration could not be rendered back to TOML.
    #[error("cannot render lab file: {0}")]
    Render(#[from] toml::ser::Error),

    /// A value parsed but is outside its allowed range.
    #[error("invalid lab settings: {0}")]
    Invalid(#[from] ValidationError),
}

impl ConfigError {
    pub(crate) fn io(op: FileOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn missing() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "missing")
    }

    #[test]
    fn io_message_names_step_and_path() {
        let msg = ConfigError::io(FileOp::Write, "/a/b.toml", missing()).to_string();
        assert_eq!(msg, "cannot write lab file '/a/b.toml': missing");

        let msg = ConfigError::io(FileOp::CreateDir, "/a", missing()).to_string();
        assert!(msg.starts_with("cannot create directory for lab file"), "got: {msg}");
    }

    #[test]
    fn io_keeps_source() {
        let err = ConfigError::io(FileOp::Read, "/x", missing());
        assert!(err.source().is_some());
        assert!(matches!(err, ConfigError::Io { op: FileOp::Read, .. }));
    }

    #[test]
    fn invalid_wraps_field_message() {
        let err = ConfigError::from(ValidationError::Invalid {
            field: "downsample.factor".to_string(),
            reason: "must be at least 1".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "invalid lab settings: invalid value for 'downsample.factor': must be at least 1"
        );
    }
}
