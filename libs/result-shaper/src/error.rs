/// Errors surfaced by the shaping functions.
///
/// Everything not listed here degrades to an empty or partial shape
/// instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// The time-series or annotation path found no usable time column.
    #[error("{message}")]
    MissingTimeColumn { message: &'static str },

    /// A dotted path did not resolve against a metadata item.
    #[error("path '{path}': no member '{segment}'")]
    PathNotFound { path: String, segment: String },
}

pub(crate) const NO_DATETIME_COLUMN: &str =
    "No datetime column found in the result. The Time Series format requires a time column.";

pub(crate) const NO_ANNOTATION_TIME_COLUMN: &str =
    "Missing mandatory time column in annotation query.";

impl ShapeError {
    pub(crate) fn no_datetime_column() -> Self {
        Self::MissingTimeColumn { message: NO_DATETIME_COLUMN }
    }

    pub(crate) fn no_annotation_time_column() -> Self {
        Self::MissingTimeColumn { message: NO_ANNOTATION_TIME_COLUMN }
    }

    /// True for both flavours of the missing-time-column failure.
    pub fn is_missing_time_column(&self) -> bool {
        matches!(self, Self::MissingTimeColumn { .. })
    }
}
