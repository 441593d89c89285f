//! Data types shared by the analysis stages.

use chrono::{Days, Month, NaiveDate};
use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Column names of the reservation dataset.
pub mod columns {
    pub const ARRIVAL_YEAR: &str = "arrival_date_year";
    pub const ARRIVAL_MONTH: &str = "arrival_date_month";
    pub const ARRIVAL_DAY: &str = "arrival_date_day_of_month";
    pub const WEEKEND_NIGHTS: &str = "stays_in_weekend_nights";
    pub const WEEK_NIGHTS: &str = "stays_in_week_nights";
    pub const IS_CANCELED: &str = "is_canceled";
    pub const ADULTS: &str = "adults";
    pub const CHILDREN: &str = "children";
    pub const BABIES: &str = "babies";

    /// Names of the resolver-derived fields; never part of a persisted report.
    pub const ARRIVAL_DATE: &str = "arrival_date";
    pub const LEAVING_DATE: &str = "leaving_date";
}

/// A reservation row together with its reconstructed stay interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReservation {
    /// Zero-based position of the row in the source dataset.
    pub row: usize,
    pub record: StringRecord,
    pub month: Month,
    pub arrival_date: NaiveDate,
    pub leaving_date: NaiveDate,
    pub is_canceled: bool,
}

/// Calendar and status columns of a reservation row, read by header name.
///
/// Numbers are read as floats so that integer columns stored as `2015.0`
/// still parse; the resolver checks that they are whole.
#[derive(Debug, Deserialize)]
pub(crate) struct StayFields {
    pub(crate) arrival_date_year: f64,
    pub(crate) arrival_date_month: String,
    pub(crate) arrival_date_day_of_month: f64,
    pub(crate) stays_in_weekend_nights: f64,
    pub(crate) stays_in_week_nights: f64,
    pub(crate) is_canceled: f64,
}

/// Guest-count columns of a reservation row.
#[derive(Debug, Deserialize)]
pub(crate) struct GuestFields {
    pub(crate) adults: f64,
    pub(crate) children: f64,
    pub(crate) babies: f64,
}

/// Adults, children and babies of a single booking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuestCounts {
    pub adults: u64,
    pub children: u64,
    pub babies: u64,
}

impl GuestCounts {
    pub fn total(&self) -> u64 {
        self.adults + self.children + self.babies
    }
}

impl std::ops::AddAssign for GuestCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.adults += rhs.adults;
        self.children += rhs.children;
        self.babies += rhs.babies;
    }
}

/// One row of the guest-totals report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyGuestTotal {
    pub stayed_date: NaiveDate,
    pub adults: u64,
    pub children: u64,
    pub babies: u64,
    pub total_guests_per_day: u64,
}

impl DailyGuestTotal {
    /// Header of the guest-totals report, in column order.
    pub const HEADERS: [&'static str; 5] = [
        "stayed_date",
        "adults",
        "children",
        "babies",
        "total_guests_per_day",
    ];

    pub fn new(stayed_date: NaiveDate, guests: GuestCounts) -> Self {
        Self {
            stayed_date,
            adults: guests.adults,
            children: guests.children,
            babies: guests.babies,
            total_guests_per_day: guests.total(),
        }
    }
}

/// The active-bookings report: pass-through columns of every active row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActiveBookingsTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ActiveBookingsTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in row `row`, if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// The inclusive analysis window `[start, start + time_span]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl AnalysisWindow {
    /// Builds a window from a reference date and a forward day count.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Argument`] if `time_span` is negative or the
    /// window end is past the representable calendar.
    pub fn new(start: NaiveDate, time_span: i64) -> Result<Self> {
        let span_days = u64::try_from(time_span).map_err(|_| {
            AnalysisError::Argument(format!("time span must be non-negative, got {time_span}"))
        })?;
        let end = start.checked_add_days(Days::new(span_days)).ok_or_else(|| {
            AnalysisError::Argument(format!("time span of {span_days} days overflows the calendar"))
        })?;
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Whether the departure day counts as a stayed day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StayPolicy {
    /// Stayed days are `[arrival, leaving]`.
    #[default]
    IncludeLeavingDay,
    /// Stayed days are `[arrival, leaving)`, one per night.
    ExcludeLeavingDay,
}

/// How bookings are told apart when joining stayed days to guest counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Each dataset row is its own booking.
    #[default]
    RowIndex,
    /// Rows with identical field values share one booking identity. Because
    /// the join is many-to-many, `n` identical rows count `n * n` times per day.
    WholeRow,
}
