// File: ./src/report.rs
//! Range report workflow: aggregate, compose, summarize.
//!
//! The activity source and the summarizer are both optional. Leaving either
//! out degrades to a log-only digest instead of a different code path.
use crate::activity::ActivitySource;
use crate::aggregate::Aggregator;
use crate::digest::{Digest, compose};
use crate::error::{AggregateError, StatuslyError};
use crate::model::DateWindow;
use crate::storage::RecordStore;
use crate::summarize::Summarizer;

/// What to do when the activity fetch fails after the logs were read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    /// Return the fetch error; nothing is summarized.
    Abort,
    /// Continue with the log-derived data and record a warning.
    #[default]
    DegradeToLogs,
}

#[derive(Debug, Clone, Copy)]
pub struct ReportRequest {
    pub window: DateWindow,
    pub fetch_failure: FetchFailurePolicy,
}

#[derive(Debug)]
pub enum Report {
    /// No log entries and no external activity in the window.
    Empty,
    Ready {
        digest: Digest,
        /// `None` when no summarizer was configured.
        summary: Option<Result<String, StatuslyError>>,
        warnings: Vec<String>,
    },
}

pub async fn build_report(
    store: &dyn RecordStore,
    activity: Option<&dyn ActivitySource>,
    summarizer: Option<&dyn Summarizer>,
    request: ReportRequest,
) -> Result<Report, AggregateError> {
    let mut warnings = Vec::new();

    let aggregated = match Aggregator::new(store, activity)
        .aggregate(&request.window)
        .await
    {
        Ok(aggregated) => aggregated,
        Err(AggregateError::ExternalFetchFailed { partial, source })
            if request.fetch_failure == FetchFailurePolicy::DegradeToLogs =>
        {
            log::warn!("Activity fetch failed, continuing with logs only: {}", source);
            warnings.push(format!("{} (showing logged entries only)", source));
            partial
        }
        Err(e) => return Err(e),
    };

    let Some(digest) = compose(&aggregated) else {
        log::info!("Nothing logged in {}", request.window);
        return Ok(Report::Empty);
    };

    let summary = match summarizer {
        Some(s) => {
            let result = s.summarize(&digest).await;
            if let Err(e) = &result {
                log::warn!("{}", e);
            }
            Some(result)
        }
        None => None,
    };

    Ok(Report::Ready {
        digest,
        summary,
        warnings,
    })
}
