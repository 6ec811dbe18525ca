use std::path::PathBuf;

use sciframe_resample::ResampleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table {what} limit exceeded: requested {requested}, limit is {limit}")]
    Capacity {
        what: &'static str,
        requested: usize,
        limit: usize,
    },
    #[error("malformed sort expression: `{expression}`")]
    Sort { expression: String },
    #[error("invalid selection: {reason}")]
    InvalidSelection { reason: String },
    #[error("invalid resample request: {0}")]
    ResampleConfig(String),
    #[error("resampler desynchronized: {0}")]
    ResamplerInternal(String),
    #[error("invalid smooth request: {0}")]
    SmoothConfig(String),
    #[error("failed to write table to `{}`", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: WriteError,
    },
}

impl From<ResampleError> for TableError {
    fn from(err: ResampleError) -> Self {
        match err {
            ResampleError::InvalidDimensions { .. } | ResampleError::InvalidKernel => {
                TableError::ResampleConfig(err.to_string())
            }
            ResampleError::DegenerateKernel { .. } => TableError::ResamplerInternal(err.to_string()),
        }
    }
}

/// Failure reported by a [`crate::TableFileWriter`].
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("no writer for file extension `{0}`")]
    UnsupportedExtension(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
