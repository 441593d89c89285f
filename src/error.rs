//! Error kinds raised by the booking-analysis pipeline.

use thiserror::Error;

/// Errors that can occur while resolving, filtering or aggregating bookings.
///
/// Every variant aborts the whole request; no report is persisted once one
/// of these has been raised.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A row's calendar fields do not form a valid date.
    #[error("row {row}: cannot resolve stay dates: {reason}")]
    DateResolution { row: usize, reason: String },

    /// A required column is missing.
    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    /// A field could not be coerced to the type its column requires.
    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    DataIntegrity {
        row: usize,
        column: String,
        value: String,
    },

    /// A caller-supplied argument violates the entry point's contract.
    #[error("invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub(crate) fn date(row: usize, reason: impl Into<String>) -> Self {
        AnalysisError::DateResolution {
            row,
            reason: reason.into(),
        }
    }

    pub(crate) fn integrity(row: usize, column: &str, value: &str) -> Self {
        AnalysisError::DataIntegrity {
            row,
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    /// Whether this error belongs to the data-integrity kind
    /// (missing column or uncoercible value).
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            AnalysisError::MissingColumn(_) | AnalysisError::DataIntegrity { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_resolution_message_names_row() {
        let err = AnalysisError::date(4, "unknown month 'Jully'");
        assert_eq!(
            err.to_string(),
            "row 4: cannot resolve stay dates: unknown month 'Jully'"
        );
    }

    #[test]
    fn test_integrity_kind() {
        assert!(AnalysisError::MissingColumn("adults".into()).is_data_integrity());
        assert!(AnalysisError::integrity(0, "children", "x").is_data_integrity());
        assert!(!AnalysisError::Argument("negative".into()).is_data_integrity());
    }
}
