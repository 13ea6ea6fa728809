// File: ./src/error.rs
//! Error kinds shared by the aggregation and summarization pipeline.
use crate::model::AggregatedWindow;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatuslyError {
    /// End date precedes start date, or a date could not be parsed.
    #[error("invalid date range: {0}")]
    InvalidRange(String),

    #[error("missing credentials: {0}")]
    MissingCredentials(&'static str),

    #[error("external activity fetch failed: {0}")]
    ExternalFetchFailed(String),

    #[error("summarization failed: {0}")]
    SummarizationFailed(String),

    /// A daily record exists on disk but cannot be decoded.
    /// The aggregator recovers from this by treating the day as empty.
    #[error("corrupt daily record for {date}: {reason}")]
    CorruptDailyRecord { date: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StatuslyError>;

/// Failure of a range aggregation.
///
/// A failed activity fetch does not discard the log data gathered before it:
/// the partial window travels with the error so the caller can decide whether
/// to continue with log-only data.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error(transparent)]
    InvalidRange(StatuslyError),

    /// The activity source was never configured; no request was sent.
    #[error(transparent)]
    MissingCredentials(StatuslyError),

    #[error("{source}")]
    ExternalFetchFailed {
        partial: AggregatedWindow,
        #[source]
        source: StatuslyError,
    },
}

impl AggregateError {
    /// Log-derived data collected before the failure, if any.
    pub fn partial(&self) -> Option<&AggregatedWindow> {
        match self {
            AggregateError::InvalidRange(_) | AggregateError::MissingCredentials(_) => None,
            AggregateError::ExternalFetchFailed { partial, .. } => Some(partial),
        }
    }

    pub fn into_partial(self) -> Option<AggregatedWindow> {
        match self {
            AggregateError::InvalidRange(_) | AggregateError::MissingCredentials(_) => None,
            AggregateError::ExternalFetchFailed { partial, .. } => Some(partial),
        }
    }
}
