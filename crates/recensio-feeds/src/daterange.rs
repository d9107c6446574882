//! Month-granular date window used to filter incoming papers.
//!
//! The filter policy is strict about unknown dates: a record with no
//! resolvable year is excluded for every range shape, never
//! speculatively included. Month comparisons go through a single
//! `year * 12 + month` ordinal so cross-year ranges compare with plain
//! integer arithmetic instead of nested year/month conditionals.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound stand-in when a range is open-ended: "from start
/// onward, no upper limit".
const FAR_FUTURE_YEAR: i32 = 2099;
const FAR_FUTURE_MONTH: u32 = 12;

/// Inclusive `[start, end]` filter configuration.
///
/// With no months set this is a year-granularity lower bound ("on or
/// after `start_year`"). As soon as either month is given the filter
/// switches to month granularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start_year: i32,
    pub start_month: Option<u32>,
    pub end_year: Option<i32>,
    pub end_month: Option<u32>,
}

impl DateRange {
    pub fn from_year(start_year: i32) -> Self {
        Self {
            start_year,
            start_month: None,
            end_year: None,
            end_month: None,
        }
    }

    /// Reject configurations before any fetching begins.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(m) = self.start_month {
            if !(1..=12).contains(&m) {
                return Err(format!("start month must be 1-12, got {m}"));
            }
        }
        if let Some(m) = self.end_month {
            if !(1..=12).contains(&m) {
                return Err(format!("end month must be 1-12, got {m}"));
            }
            if self.end_year.is_none() {
                return Err("an end month requires an end year".to_string());
            }
        }
        if let Some(ey) = self.end_year {
            if ey < self.start_year {
                return Err(format!(
                    "end year {ey} is before start year {}",
                    self.start_year
                ));
            }
            if ey == self.start_year {
                if let (Some(sm), Some(em)) = (self.start_month, self.end_month) {
                    if em < sm {
                        return Err(format!(
                            "end month {em} is before start month {sm} within {ey}"
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn month_filtering_active(&self) -> bool {
        self.start_month.is_some() || self.end_month.is_some()
    }

    /// Decide whether a candidate falls inside the range.
    ///
    /// The candidate's effective (year, month) is resolved from the
    /// fully parsed date when available, else from the fallback pair
    /// (month defaulting to January). A candidate with no resolvable
    /// date at all is excluded unconditionally.
    pub fn contains(
        &self,
        published: Option<NaiveDate>,
        year_fallback: Option<i32>,
        month_fallback: Option<u32>,
    ) -> bool {
        let (year, month) = match (published, year_fallback) {
            (Some(d), _) => (d.year(), d.month()),
            (None, Some(y)) => (y, month_fallback.unwrap_or(1)),
            (None, None) => {
                debug!("no resolvable date, excluded");
                return false;
            }
        };

        if year < self.start_year {
            debug!(year, start_year = self.start_year, "before start year, excluded");
            return false;
        }

        // Pure year-granularity mode: the year check above is the only
        // constraint.
        if !self.month_filtering_active() {
            return true;
        }

        let (effective_end_year, effective_end_month) =
            if self.end_year.is_none() && self.end_month.is_none() {
                (FAR_FUTURE_YEAR, FAR_FUTURE_MONTH)
            } else {
                (
                    self.end_year.unwrap_or(self.start_year),
                    self.end_month.unwrap_or(12),
                )
            };
        let effective_start_month = self.start_month.unwrap_or(1);

        let candidate = ordinal(year, month);
        let start = ordinal(self.start_year, effective_start_month);
        let end = ordinal(effective_end_year, effective_end_month);

        let in_range = (start..=end).contains(&candidate);
        debug!(
            candidate = format!("{year}-{month:02}"),
            start = format!("{}-{effective_start_month:02}", self.start_year),
            end = format!("{effective_end_year}-{effective_end_month:02}"),
            in_range,
            "month-level range check"
        );
        in_range
    }

    /// Human-readable form for log lines and the report header.
    pub fn describe(&self) -> String {
        match self.start_month {
            None => format!("{}", self.start_year),
            Some(sm) => {
                let start = format!("{}-{sm:02}", self.start_year);
                if self.end_year.is_none() && self.end_month.is_none() {
                    format!("{start} onward")
                } else {
                    let ey = self.end_year.unwrap_or(self.start_year);
                    match self.end_month {
                        Some(em) => format!("{start} to {ey}-{em:02}"),
                        None => format!("{start} to {ey}"),
                    }
                }
            }
        }
    }
}

fn ordinal(year: i32, month: u32) -> i64 {
    year as i64 * 12 + month as i64
}
