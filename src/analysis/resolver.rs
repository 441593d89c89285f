//! Reconstructs each reservation's arrival and leaving dates from its raw
//! calendar fields.

use chrono::{Days, NaiveDate};
use csv::StringRecord;
use tracing::debug;

use crate::analysis::types::{ResolvedReservation, StayFields, columns};
use crate::dataset::{Dataset, read_row};
use crate::error::{AnalysisError, Result};
use crate::month::parse_month_name;

/// Narrows a parsed number to an integer, rejecting fractions.
pub(crate) fn whole_number(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64)
        .then_some(value as i64)
}

/// Calendar fields that do not parse make the row's dates unresolvable; the
/// cancellation flag stays a data-integrity problem.
fn calendar_error(err: AnalysisError) -> AnalysisError {
    match err {
        AnalysisError::DataIntegrity { row, column, value } if column != columns::IS_CANCELED => {
            AnalysisError::date(row, format!("{column} '{value}' is not a number"))
        }
        other => other,
    }
}

fn resolve_row(row: usize, record: &StringRecord, fields: StayFields) -> Result<ResolvedReservation> {
    let whole = |value: f64, name: &str| {
        whole_number(value)
            .ok_or_else(|| AnalysisError::date(row, format!("{name} '{value}' is not an integer")))
    };

    let month = parse_month_name(&fields.arrival_date_month).ok_or_else(|| {
        AnalysisError::date(row, format!("unknown month '{}'", fields.arrival_date_month))
    })?;
    let year = whole(fields.arrival_date_year, columns::ARRIVAL_YEAR)?;
    let day = whole(fields.arrival_date_day_of_month, columns::ARRIVAL_DAY)?;

    let arrival_date = i32::try_from(year)
        .ok()
        .zip(u32::try_from(day).ok())
        .and_then(|(y, d)| NaiveDate::from_ymd_opt(y, month.number_from_month(), d))
        .ok_or_else(|| {
            AnalysisError::date(row, format!("{year}-{}-{day} is not a calendar date", month.name()))
        })?;

    let nights = [
        (fields.stays_in_weekend_nights, columns::WEEKEND_NIGHTS),
        (fields.stays_in_week_nights, columns::WEEK_NIGHTS),
    ]
    .into_iter()
    .map(|(value, name)| {
        let n = whole(value, name)?;
        u64::try_from(n).map_err(|_| AnalysisError::date(row, format!("{name} is negative ({n})")))
    })
    .sum::<Result<u64>>()?;

    let leaving_date = arrival_date
        .checked_add_days(Days::new(nights))
        .ok_or_else(|| AnalysisError::date(row, "leaving date overflows the calendar"))?;

    let is_canceled = whole_number(fields.is_canceled).ok_or_else(|| {
        AnalysisError::integrity(row, columns::IS_CANCELED, &fields.is_canceled.to_string())
    })? != 0;

    Ok(ResolvedReservation {
        row,
        record: record.clone(),
        month,
        arrival_date,
        leaving_date,
        is_canceled,
    })
}

/// Resolves every row of `dataset` into a [`ResolvedReservation`].
///
/// The whole call fails on the first row whose dates cannot be built; rows
/// are never skipped.
pub fn resolve(dataset: &Dataset) -> Result<Vec<ResolvedReservation>> {
    let headers = dataset.headers();

    let resolved = dataset
        .records()
        .iter()
        .enumerate()
        .map(|(row, record)| -> Result<ResolvedReservation> {
            let fields: StayFields = read_row(headers, record, row).map_err(calendar_error)?;
            resolve_row(row, record, fields)
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(rows = resolved.len(), "Stay intervals resolved");
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Month;
    use proptest::prelude::*;

    const HEADERS: [&str; 9] = [
        "arrival_date_year",
        "arrival_date_month",
        "arrival_date_day_of_month",
        "stays_in_weekend_nights",
        "stays_in_week_nights",
        "is_canceled",
        "adults",
        "children",
        "babies",
    ];

    fn one_row(values: [&str; 9]) -> Dataset {
        Dataset::from_rows(&HEADERS, &[values.to_vec()])
    }

    #[test]
    fn test_whole_number() {
        assert_eq!(whole_number(2015.0), Some(2015));
        assert_eq!(whole_number(-1.0), Some(-1));
        assert_eq!(whole_number(2.5), None);
        assert_eq!(whole_number(f64::NAN), None);
        assert_eq!(whole_number(f64::INFINITY), None);
    }

    #[test]
    fn test_resolve_dates() {
        let ds = one_row(["2023", "July", "10", "2", "1", "0", "2", "0", "0"]);
        let resolved = resolve(&ds).unwrap();

        assert_eq!(resolved.len(), 1);
        let r = &resolved[0];
        assert_eq!(r.month, Month::July);
        assert_eq!(r.arrival_date, NaiveDate::from_ymd_opt(2023, 7, 10).unwrap());
        assert_eq!(r.leaving_date, NaiveDate::from_ymd_opt(2023, 7, 13).unwrap());
        assert!(!r.is_canceled);
    }

    #[test]
    fn test_resolve_float_encoded_integers() {
        let ds = one_row(["2015.0", "august", "3.0", "1.0", "0", "0.0", "2", "0", "0"]);
        let r = &resolve(&ds).unwrap()[0];
        assert_eq!(r.month, Month::August);
        assert_eq!(r.arrival_date, NaiveDate::from_ymd_opt(2015, 8, 3).unwrap());
        assert_eq!(r.leaving_date, NaiveDate::from_ymd_opt(2015, 8, 4).unwrap());
    }

    #[test]
    fn test_resolve_crosses_month_end() {
        let ds = one_row(["2016", "February", "27", "2", "2", "1", "1", "0", "0"]);
        let r = &resolve(&ds).unwrap()[0];
        assert_eq!(r.leaving_date, NaiveDate::from_ymd_opt(2016, 3, 2).unwrap());
        assert!(r.is_canceled);
    }

    #[test]
    fn test_resolve_bad_month_name() {
        let ds = one_row(["2023", "Jully", "10", "0", "1", "0", "2", "0", "0"]);
        let err = resolve(&ds).unwrap_err();
        assert!(matches!(err, AnalysisError::DateResolution { row: 0, .. }));
    }

    #[test]
    fn test_resolve_day_out_of_range() {
        let ds = one_row(["2023", "April", "31", "0", "1", "0", "2", "0", "0"]);
        let err = resolve(&ds).unwrap_err();
        assert!(matches!(err, AnalysisError::DateResolution { .. }));
    }

    #[test]
    fn test_resolve_non_integer_day() {
        let ds = one_row(["2023", "April", "tenth", "0", "1", "0", "2", "0", "0"]);
        assert!(matches!(
            resolve(&ds).unwrap_err(),
            AnalysisError::DateResolution { .. }
        ));
    }

    #[test]
    fn test_resolve_fractional_day() {
        let ds = one_row(["2023", "April", "3.5", "0", "1", "0", "2", "0", "0"]);
        assert!(matches!(
            resolve(&ds).unwrap_err(),
            AnalysisError::DateResolution { .. }
        ));
    }

    #[test]
    fn test_resolve_non_integer_cancellation_flag() {
        let ds = Dataset::from_rows(
            &HEADERS,
            &[
                vec!["2023", "July", "10", "0", "1", "0", "2", "0", "0"],
                vec!["2023", "July", "10", "0", "1", "maybe", "2", "0", "0"],
            ],
        );
        match resolve(&ds).unwrap_err() {
            AnalysisError::DataIntegrity { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "is_canceled");
                assert_eq!(value, "maybe");
            }
            other => panic!("unexpected error: {other}"),
        }

        let ds = one_row(["2023", "July", "10", "0", "1", "0.5", "2", "0", "0"]);
        assert!(matches!(
            resolve(&ds).unwrap_err(),
            AnalysisError::DataIntegrity { column, .. } if column == "is_canceled"
        ));
    }

    #[test]
    fn test_resolve_negative_nights() {
        let ds = one_row(["2023", "April", "3", "-1", "1", "0", "2", "0", "0"]);
        assert!(matches!(
            resolve(&ds).unwrap_err(),
            AnalysisError::DateResolution { .. }
        ));
    }

    #[test]
    fn test_resolve_missing_column() {
        let ds = Dataset::from_rows(&["arrival_date_year"], &[vec!["2023"]]);
        let err = resolve(&ds).unwrap_err();
        assert!(err.is_data_integrity());
        assert!(matches!(err, AnalysisError::MissingColumn(_)));
    }

    #[test]
    fn test_resolve_empty_dataset() {
        let ds = Dataset::from_rows(&HEADERS, &[]);
        assert!(resolve(&ds).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_reports_offending_row() {
        let ds = Dataset::from_rows(
            &HEADERS,
            &[
                vec!["2023", "July", "10", "0", "1", "0", "2", "0", "0"],
                vec!["2023", "June", "31", "0", "1", "0", "2", "0", "0"],
            ],
        );
        assert!(matches!(
            resolve(&ds).unwrap_err(),
            AnalysisError::DateResolution { row: 1, .. }
        ));
    }

    proptest! {
        #[test]
        fn test_leaving_never_before_arrival(
            month in 1u32..=12,
            day in 1u32..=28,
            weekend in 0u32..20,
            week in 0u32..60,
        ) {
            let month_name = Month::try_from(month as u8).unwrap().name();
            let (day, weekend, week) = (day.to_string(), weekend.to_string(), week.to_string());
            let ds = one_row(["2017", month_name, &day, &weekend, &week, "0", "1", "0", "0"]);
            let r = &resolve(&ds).unwrap()[0];
            prop_assert!(r.leaving_date >= r.arrival_date);
        }
    }
}
