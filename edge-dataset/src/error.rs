//! Error types of the dataset toolkit.

use std::path::PathBuf;
use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type returned by registry lookups, index building and sample retrieval.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("unknown dataset name '{0}'")]
    UnknownDataset(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("malformed line {line} in list file '{}': {reason}", path.display())]
    MalformedList {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("failed to decode image file '{}'", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("index {index} is out of range, the dataset has {size} samples")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("precondition violated: {0}")]
    Precondition(String),
    #[error("I/O error on '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}'", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
    #[cfg(feature = "with-tch")]
    #[error(transparent)]
    Tch(#[from] tch::TchError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the error is caused by a bad name, path or option
    /// supplied at construction time.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::UnknownDataset(_) | Self::Config(_) | Self::ConfigFile { .. }
        )
    }
}
