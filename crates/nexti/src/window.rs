//! Reporting window: two calendar days expanded to full-day timestamps.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use roster_core::DomainError;

/// Date format the report consumer sends (`ddmmyyyy`).
const REQUEST_DATE_FORMAT: &str = "%d%m%Y";
/// Timestamp format Nexti expects in path segments (`ddmmyyyyHHMMSS`).
const UPSTREAM_STAMP_FORMAT: &str = "%d%m%Y%H%M%S";

/// Inclusive `[start, finish]` window used for transfer-event scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    start: NaiveDateTime,
    finish: NaiveDateTime,
}

impl ReportWindow {
    /// Build a window from two `ddmmyyyy` strings.
    ///
    /// Only the first 8 characters are read, so a caller passing a full
    /// `ddmmyyyyHHMMSS` stamp gets the same day. The start is moved to
    /// 00:00:00.000 and the finish to 23:59:59.999 of their days.
    pub fn from_request_dates(start: &str, finish: &str) -> Result<Self, DomainError> {
        let start_day = parse_day(start, "start")?;
        let finish_day = parse_day(finish, "finish")?;
        Ok(Self::from_days(start_day, finish_day))
    }

    pub fn from_days(start: NaiveDate, finish: NaiveDate) -> Self {
        let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        Self {
            start: start.and_time(NaiveTime::MIN),
            finish: finish.and_time(end_of_day),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn finish(&self) -> NaiveDateTime {
        self.finish
    }

    /// Start formatted for the upstream path (14 chars, no separators).
    pub fn start_stamp(&self) -> String {
        self.start.format(UPSTREAM_STAMP_FORMAT).to_string()
    }

    /// Finish formatted for the upstream path (14 chars, no separators).
    pub fn finish_stamp(&self) -> String {
        self.finish.format(UPSTREAM_STAMP_FORMAT).to_string()
    }
}

fn parse_day(raw: &str, field: &str) -> Result<NaiveDate, DomainError> {
    let day = raw
        .trim()
        .get(..8)
        .ok_or_else(|| DomainError::validation(format!("{field} date must have 8 digits (ddmmyyyy)")))?;
    NaiveDate::parse_from_str(day, REQUEST_DATE_FORMAT)
        .map_err(|e| DomainError::validation(format!("{field} date '{day}' is invalid: {e}")))
}
