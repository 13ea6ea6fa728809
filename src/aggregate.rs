// File: ./src/aggregate.rs
//! Range aggregation: merge every day of a window, then external activity.
use crate::activity::ActivitySource;
use crate::error::{AggregateError, StatuslyError};
use crate::model::{AggregatedWindow, DateWindow, format_date};
use crate::storage::RecordStore;

/// Walks a date window against a record store and an optional activity source.
///
/// Without an activity source the aggregator runs in log-only mode.
pub struct Aggregator<'a> {
    store: &'a dyn RecordStore,
    activity: Option<&'a dyn ActivitySource>,
}

impl<'a> Aggregator<'a> {
    pub fn new(store: &'a dyn RecordStore, activity: Option<&'a dyn ActivitySource>) -> Self {
        Self { store, activity }
    }

    pub fn log_only(store: &'a dyn RecordStore) -> Self {
        Self::new(store, None)
    }

    /// Days are read strictly in ascending order, then the activity source
    /// is queried once for the whole window.
    ///
    /// A day whose record cannot be read counts as empty. A failed fetch
    /// returns the sets built from the logs inside the error. Missing
    /// credentials are not a fetch failure and carry no partial data.
    pub async fn aggregate(&self, window: &DateWindow) -> Result<AggregatedWindow, AggregateError> {
        window.validate().map_err(AggregateError::InvalidRange)?;

        let mut aggregated = AggregatedWindow::default();
        for day in window.days() {
            match self.store.get(day) {
                Ok(record) => aggregated.merge_record(&record),
                Err(StatuslyError::CorruptDailyRecord { date, reason }) => {
                    log::warn!("Skipping unreadable log for {}: {}", date, reason);
                }
                Err(e) => {
                    log::warn!("Skipping log for {}: {}", format_date(day), e);
                }
            }
        }

        let Some(activity) = self.activity else {
            return Ok(aggregated);
        };

        match activity.fetch(window).await {
            Ok(fetched) => {
                aggregated.merge_activity(fetched);
                Ok(aggregated)
            }
            Err(e @ StatuslyError::MissingCredentials(_)) => {
                Err(AggregateError::MissingCredentials(e))
            }
            Err(source) => Err(AggregateError::ExternalFetchFailed {
                partial: aggregated,
                source,
            }),
        }
    }
}
