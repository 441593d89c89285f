//! Shapes the active bookings into the persisted active-bookings report.

use csv::StringRecord;

use crate::analysis::types::{ActiveBookingsTable, ResolvedReservation, columns};

/// Placeholder columns left behind by index-writing tools, e.g. `Unnamed: 0`
/// or a blank header.
pub fn is_index_artifact(header: &str) -> bool {
    let header = header.trim();
    header.is_empty() || header.to_ascii_lowercase().contains("unnamed")
}

fn is_derived(header: &str) -> bool {
    header == columns::ARRIVAL_DATE || header == columns::LEAVING_DATE
}

/// Builds the active-bookings report.
///
/// Keeps every input column except index artifacts and the derived date
/// fields, and writes the arrival month back as its canonical full name.
pub fn format_active_bookings(
    headers: &StringRecord,
    active: &[ResolvedReservation],
) -> ActiveBookingsTable {
    let keep: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !is_index_artifact(h) && !is_derived(h))
        .collect();

    let rows = active
        .iter()
        .map(|r| {
            keep.iter()
                .map(|&(i, h)| {
                    if h == columns::ARRIVAL_MONTH {
                        r.month.name().to_string()
                    } else {
                        r.record.get(i).unwrap_or("").to_string()
                    }
                })
                .collect()
        })
        .collect();

    ActiveBookingsTable {
        headers: keep.iter().map(|(_, h)| h.to_string()).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Month, NaiveDate};

    #[test]
    fn test_index_artifacts() {
        assert!(is_index_artifact(""));
        assert!(is_index_artifact("Unnamed: 0"));
        assert!(is_index_artifact("unnamed_index"));
        assert!(!is_index_artifact("hotel"));
    }

    #[test]
    fn test_format_drops_artifacts_and_restores_month() {
        let headers = StringRecord::from(vec!["", "hotel", "arrival_date_month", "leaving_date", "adults"]);
        let arrival = NaiveDate::from_ymd_opt(2023, 7, 10).unwrap();
        let active = vec![ResolvedReservation {
            row: 0,
            record: StringRecord::from(vec!["17", "City Hotel", "july", "x", "2"]),
            month: Month::July,
            arrival_date: arrival,
            leaving_date: arrival,
            is_canceled: false,
        }];

        let table = format_active_bookings(&headers, &active);

        assert_eq!(table.headers, vec!["hotel", "arrival_date_month", "adults"]);
        assert_eq!(table.rows, vec![vec!["City Hotel", "July", "2"]]);
    }

    #[test]
    fn test_format_empty_keeps_headers() {
        let headers = StringRecord::from(vec!["hotel", "adults"]);
        let table = format_active_bookings(&headers, &[]);
        assert_eq!(table.headers.len(), 2);
        assert!(table.is_empty());
    }
}
