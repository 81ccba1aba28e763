//! Reservation Selection
//!
//! Time-windowed query over blocks carrying the reservation due-date
//! attribute. The window is resolved against the current local date into
//! a plain `YYYYMMDD` comparison that the store evaluates; results come
//! back ordered ascending by due date. Every call re-executes the query -
//! there is no cached cursor.

use chrono::{Duration, Local, NaiveDate};
use tracing::debug;

use crate::models::Reservation;
use crate::services::error::ServiceError;
use crate::store::{DocStore, DueDateFilter};

/// Time window over reservation due dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// Due exactly today
    Today,
    /// Due today or later
    Future,
    /// Due on or after today shifted by the given number of days
    /// (negative values reach into the past)
    DaysAhead(i64),
}

impl TimeWindow {
    /// Resolve the window against a reference date into a store filter.
    pub fn to_filter(self, today: NaiveDate) -> DueDateFilter {
        let stamp = |date: NaiveDate| date.format("%Y%m%d").to_string();
        match self {
            TimeWindow::Today => DueDateFilter::Equals(stamp(today)),
            TimeWindow::Future => DueDateFilter::AtLeast(stamp(today)),
            TimeWindow::DaysAhead(days) => DueDateFilter::AtLeast(stamp(today + Duration::days(days))),
        }
    }
}

/// Select reservation items falling inside the window, ordered ascending
/// by due date.
pub async fn select_reservations(
    store: &dyn DocStore,
    window: TimeWindow,
) -> Result<Vec<Reservation>, ServiceError> {
    let filter = window.to_filter(Local::now().date_naive());
    let items = store.query_reservations(&filter).await?;
    debug!(?window, count = items.len(), "selected reservations");
    Ok(items)
}
