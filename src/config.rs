//! Environment-driven settings and the per-request analysis parameters.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;

use crate::analysis::occupancy::OccupancyOptions;
use crate::analysis::types::AnalysisWindow;
use crate::error::{AnalysisError, Result};

pub const DEFAULT_TIME_SPAN: i64 = 7;
pub const DEFAULT_MISSING_THRESHOLD: f64 = 0.8;

/// Where datasets and reports live, plus analysis defaults.
///
/// Every field can be overridden through the environment (a `.env` file is
/// honoured when loaded by the binary):
///
/// | Variable                       | Default                     |
/// |--------------------------------|-----------------------------|
/// | `HOTEL_RAW_DATA_PATH`          | `data/raw`                  |
/// | `HOTEL_RAW_NAME`               | `hotel_data_raw.csv`        |
/// | `HOTEL_RESULT_DATA_PATH`       | `data/results`              |
/// | `HOTEL_RESULT_ACTIVE_BOOKINGS` | `hotel_active_bookings.csv` |
/// | `HOTEL_RESULT_TOTAL_GUESTS`    | `hotel_total_guests.csv`    |
/// | `HOTEL_TIME_SPAN`              | `7`                         |
/// | `HOTEL_MISSING_THRESHOLD`      | `0.8`                       |
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub raw_data_path: PathBuf,
    pub raw_name: String,
    pub result_data_path: PathBuf,
    pub result_active_bookings: String,
    pub result_total_guests: String,
    pub time_span: i64,
    pub missing_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            raw_data_path: PathBuf::from("data/raw"),
            raw_name: "hotel_data_raw.csv".to_string(),
            result_data_path: PathBuf::from("data/results"),
            result_active_bookings: "hotel_active_bookings.csv".to_string(),
            result_total_guests: "hotel_total_guests.csv".to_string(),
            time_span: DEFAULT_TIME_SPAN,
            missing_threshold: DEFAULT_MISSING_THRESHOLD,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            raw_data_path: get("HOTEL_RAW_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.raw_data_path),
            raw_name: get("HOTEL_RAW_NAME").unwrap_or(defaults.raw_name),
            result_data_path: get("HOTEL_RESULT_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.result_data_path),
            result_active_bookings: get("HOTEL_RESULT_ACTIVE_BOOKINGS")
                .unwrap_or(defaults.result_active_bookings),
            result_total_guests: get("HOTEL_RESULT_TOTAL_GUESTS")
                .unwrap_or(defaults.result_total_guests),
            time_span: get("HOTEL_TIME_SPAN")
                .map(|v| parse_number("HOTEL_TIME_SPAN", &v))
                .transpose()?
                .unwrap_or(defaults.time_span),
            missing_threshold: get("HOTEL_MISSING_THRESHOLD")
                .map(|v| parse_number("HOTEL_MISSING_THRESHOLD", &v))
                .transpose()?
                .unwrap_or(defaults.missing_threshold),
        })
    }

    /// Location of the cleaned dataset.
    pub fn raw_dataset(&self) -> PathBuf {
        self.raw_data_path.join(&self.raw_name)
    }

    pub fn active_bookings_report(&self) -> PathBuf {
        self.result_data_path.join(&self.result_active_bookings)
    }

    pub fn total_guests_report(&self) -> PathBuf {
        self.result_data_path.join(&self.result_total_guests)
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| AnalysisError::Argument(format!("{key} has invalid value '{value}'")))
}

/// Parses a reference date in `YYYY-MM-DD` form.
pub fn parse_selected_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        AnalysisError::Argument(format!(
            "date '{value}' is not valid, the format should be YYYY-MM-DD ({e})"
        ))
    })
}

/// Rejects dataset paths that do not name a CSV file.
pub fn ensure_csv_path(path: &Path) -> Result<()> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        Ok(())
    } else {
        Err(AnalysisError::Argument(format!(
            "'{}' is not a CSV file",
            path.display()
        )))
    }
}

/// Everything one analysis needs, built per invocation and passed explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub dataset: PathBuf,
    pub window: AnalysisWindow,
    pub options: OccupancyOptions,
}

impl AnalysisRequest {
    pub fn new(dataset: impl Into<PathBuf>, selected_date: NaiveDate, time_span: i64) -> Result<Self> {
        Ok(Self {
            dataset: dataset.into(),
            window: AnalysisWindow::new(selected_date, time_span)?,
            options: OccupancyOptions::default(),
        })
    }

    pub fn with_options(mut self, options: OccupancyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.window.start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(
            settings.total_guests_report(),
            PathBuf::from("data/results/hotel_total_guests.csv")
        );
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("HOTEL_RESULT_DATA_PATH", "/tmp/out"),
            ("HOTEL_TIME_SPAN", "14"),
            ("HOTEL_MISSING_THRESHOLD", "0.5"),
        ]))
        .unwrap();
        assert_eq!(settings.time_span, 14);
        assert_eq!(settings.missing_threshold, 0.5);
        assert_eq!(
            settings.active_bookings_report(),
            PathBuf::from("/tmp/out/hotel_active_bookings.csv")
        );
    }

    #[test]
    fn test_bad_number_is_argument_error() {
        let err = Settings::from_lookup(lookup(&[("HOTEL_TIME_SPAN", "a week")])).unwrap_err();
        assert!(matches!(err, AnalysisError::Argument(_)));
    }

    #[test]
    fn test_parse_selected_date() {
        assert_eq!(
            parse_selected_date("2023-07-09").unwrap(),
            NaiveDate::from_ymd_opt(2023, 7, 9).unwrap()
        );
        assert!(parse_selected_date("09.07.2023").is_err());
        assert!(parse_selected_date("2023-02-30").is_err());
    }

    #[test]
    fn test_ensure_csv_path() {
        assert!(ensure_csv_path(Path::new("bookings.csv")).is_ok());
        assert!(ensure_csv_path(Path::new("bookings.CSV")).is_ok());
        assert!(ensure_csv_path(Path::new("bookings.xlsx")).is_err());
        assert!(ensure_csv_path(Path::new("bookings")).is_err());
    }

    #[test]
    fn test_request_rejects_negative_span() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 9).unwrap();
        assert!(AnalysisRequest::new("x.csv", date, -3).is_err());
        assert_eq!(AnalysisRequest::new("x.csv", date, 7).unwrap().selected_date(), date);
    }
}
