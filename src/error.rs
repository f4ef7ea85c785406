//! Common error types used throughout the crate.

use std::fmt;
use std::path::PathBuf;

/// Result type used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type covering build and serialization failures.
///
/// Queries never produce errors: once an index is built, every query
/// path is total.
#[derive(Debug)]
pub enum Error {
    /// An argument violated preconditions.
    InvalidArgument(String),
    /// Serialized data was malformed or inconsistent.
    InvalidData(String),
    /// Opening, statting, or reading one of the input files failed.
    File {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// An input file has an impossible size or content.
    Corrupt {
        /// Path of the offending file.
        path: PathBuf,
        /// What was wrong with it.
        msg: String,
    },
    /// Two build inputs disagree on the number of runs.
    ShapeMismatch(String),
    /// Wrapper around [`std::io::Error`] values raised while
    /// serializing or deserializing an index.
    Io(std::io::Error),
}

impl Error {
    /// Creates an [`Error::InvalidArgument`] with the provided message.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an [`Error::InvalidData`] with the provided message.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Creates an [`Error::File`] for `path`.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Creates an [`Error::Corrupt`] for `path`.
    pub fn corrupt(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            msg: msg.into(),
        }
    }

    /// Creates an [`Error::ShapeMismatch`] with the provided message.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "{msg}"),
            Error::InvalidData(msg) => write!(f, "{msg}"),
            Error::File { path, source } => {
                write!(f, "file {} failed: {source}", path.display())
            }
            Error::Corrupt { path, msg } => {
                write!(f, "corrupt file {}: {msg}", path.display())
            }
            Error::ShapeMismatch(msg) => write!(f, "{msg}"),
            Error::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidArgument(_)
            | Error::InvalidData(_)
            | Error::Corrupt { .. }
            | Error::ShapeMismatch(_) => None,
            Error::File { source, .. } => Some(source),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
