//! Expands active bookings into stayed days and sums guests per day.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::debug;

use crate::analysis::types::{
    AnalysisWindow, DailyGuestTotal, GuestCounts, GuestFields, IdentityPolicy,
    ResolvedReservation, StayPolicy, columns,
};
use crate::dataset::read_row;
use crate::error::{AnalysisError, Result};

/// Coerces a parsed guest count to an integer, truncating fractions such as
/// `1.7`. Negative and non-finite values are rejected.
pub(crate) fn guest_count(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value < u64::MAX as f64).then_some(value.trunc() as u64)
}

fn read_guests(headers: &StringRecord, reservation: &ResolvedReservation) -> Result<GuestCounts> {
    let fields: GuestFields = read_row(headers, &reservation.record, reservation.row)?;
    let count = |value: f64, name: &str| {
        guest_count(value)
            .ok_or_else(|| AnalysisError::integrity(reservation.row, name, &value.to_string()))
    };
    Ok(GuestCounts {
        adults: count(fields.adults, columns::ADULTS)?,
        children: count(fields.children, columns::CHILDREN)?,
        babies: count(fields.babies, columns::BABIES)?,
    })
}

/// Stayed days of a booking that fall inside `window`, in ascending order.
///
/// Only the overlap of the stay and the window is walked, so long stays cost
/// no more than the window does.
pub fn stayed_days(
    reservation: &ResolvedReservation,
    policy: StayPolicy,
    window: &AnalysisWindow,
) -> impl Iterator<Item = NaiveDate> + use<> {
    let first = reservation.arrival_date.max(window.start());
    let last = match policy {
        StayPolicy::IncludeLeavingDay => Some(reservation.leaving_date),
        StayPolicy::ExcludeLeavingDay => reservation.leaving_date.pred_opt(),
    }
    .map(|last| last.min(window.end()));

    first
        .iter_days()
        .take_while(move |d| last.is_some_and(|last| *d <= last))
}

/// One field of a row, compared by value rather than by spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CellValue {
    /// Bit pattern of a finite float, with `-0.0` folded into `0.0`.
    Number(u64),
    Text(String),
}

impl CellValue {
    fn number(value: f64) -> Self {
        CellValue::Number((value + 0.0).to_bits())
    }

    fn parse(text: &str) -> Self {
        match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => CellValue::number(value),
            _ => CellValue::Text(text.to_string()),
        }
    }
}

/// Identity key of a booking under `policy`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum BookingKey {
    Row(usize),
    Values {
        arrival: NaiveDate,
        leaving: NaiveDate,
        cells: Vec<CellValue>,
    },
}

fn booking_key(
    reservation: &ResolvedReservation,
    policy: IdentityPolicy,
    month_column: Option<usize>,
) -> BookingKey {
    match policy {
        IdentityPolicy::RowIndex => BookingKey::Row(reservation.row),
        IdentityPolicy::WholeRow => BookingKey::Values {
            arrival: reservation.arrival_date,
            leaving: reservation.leaving_date,
            cells: reservation
                .record
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if Some(i) == month_column {
                        CellValue::number(f64::from(reservation.month.number_from_month()))
                    } else {
                        CellValue::parse(cell)
                    }
                })
                .collect(),
        },
    }
}

/// Options controlling how stays are expanded and bookings are identified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccupancyOptions {
    pub stay_policy: StayPolicy,
    pub identity_policy: IdentityPolicy,
}

/// Computes per-day guest totals over `active`, restricted to `window`.
///
/// `headers` names the columns of the active records. The result is sorted
/// ascending by day and is empty when there are no active bookings.
pub fn daily_totals(
    active: &[ResolvedReservation],
    headers: &StringRecord,
    window: &AnalysisWindow,
    options: OccupancyOptions,
) -> Result<Vec<DailyGuestTotal>> {
    if active.is_empty() {
        debug!("No active bookings, guest totals are empty");
        return Ok(Vec::new());
    }

    let month_column = headers.iter().position(|h| h == columns::ARRIVAL_MONTH);

    // Guest counts of every booking sharing an identity.
    let mut guests_by_key: HashMap<BookingKey, Vec<GuestCounts>> = HashMap::new();
    let mut stays: Vec<(BookingKey, &ResolvedReservation)> = Vec::with_capacity(active.len());
    for reservation in active {
        let key = booking_key(reservation, options.identity_policy, month_column);
        guests_by_key
            .entry(key.clone())
            .or_default()
            .push(read_guests(headers, reservation)?);
        stays.push((key, reservation));
    }

    let mut per_day: BTreeMap<NaiveDate, GuestCounts> = BTreeMap::new();
    for (key, reservation) in &stays {
        let joined = guests_by_key.get(key).map(Vec::as_slice).unwrap_or_default();
        for day in stayed_days(reservation, options.stay_policy, window) {
            let total = per_day.entry(day).or_default();
            for guests in joined {
                *total += *guests;
            }
        }
    }

    let totals: Vec<_> = per_day
        .into_iter()
        .map(|(day, guests)| DailyGuestTotal::new(day, guests))
        .collect();

    debug!(
        bookings = active.len(),
        days = totals.len(),
        "Daily guest totals computed"
    );
    Ok(totals)
}
