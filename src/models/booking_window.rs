use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Longest window accepted from a start-plus-duration request (one week).
pub const MAX_DURATION_HOURS: f64 = 168.0;

/// Half-open booking interval `[start, end)` built from separate date and time-of-day parts.
///
/// A window may span midnight; the invariant is only `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookingWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl BookingWindow {
    pub fn new(
        start_date: NaiveDate,
        start_time: NaiveTime,
        end_date: NaiveDate,
        end_time: NaiveTime,
    ) -> Result<Self, ServiceError> {
        Self::from_instants(start_date.and_time(start_time), end_date.and_time(end_time))
    }

    pub fn from_instants(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, ServiceError> {
        if start >= end {
            return Err(ServiceError::ValidationError(format!(
                "booking must start before it ends (start {}, end {})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Window of `hours` starting at `date`/`time`, rounded to whole minutes.
    pub fn starting_at(date: NaiveDate, time: NaiveTime, hours: f64) -> Result<Self, ServiceError> {
        if !hours.is_finite() || hours <= 0.0 || hours > MAX_DURATION_HOURS {
            return Err(ServiceError::ValidationError(format!(
                "duration must be between 0 and {} hours, got {}",
                MAX_DURATION_HOURS, hours
            )));
        }
        let start = date.and_time(time);
        let minutes = (hours * 60.0).round() as i64;
        let end = start
            .checked_add_signed(Duration::minutes(minutes))
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "a {} hour window starting at {} ends past the supported calendar",
                    hours, start
                ))
            })?;
        Self::from_instants(start, end)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// `[s1,e1)` and `[s2,e2)` overlap iff `s1 < e2 && s2 < e1`.
    pub fn overlaps(&self, other: &BookingWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for BookingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
