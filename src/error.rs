//! Error types for offset alignment.

use thiserror::Error;

/// Errors produced by sampling, loss evaluation, and optimization.
///
/// Missing raster values are *not* errors: a point without valid cells is a
/// [`NoData`](crate::raster::NoData) value, and a comparison with no usable
/// pairs is [`LossStatus::NoValidData`](crate::loss::LossStatus).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    #[error("invalid argument: {name} = {value} ({reason})")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("measurement field '{0}' not found in point set")]
    MissingField(String),

    #[error("empty input: no points to align")]
    EmptyInput,

    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

impl AlignError {
    pub(crate) fn invalid(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        AlignError::InvalidArgument {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for alignment operations.
pub type Result<T> = std::result::Result<T, AlignError>;
