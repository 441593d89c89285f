//! Raw dataset cleaning: drops columns that are mostly empty.

use std::path::Path;

use csv::StringRecord;
use tracing::{info, instrument};

use crate::dataset::Dataset;
use crate::error::{AnalysisError, Result};
use crate::output::write_dataset;

/// Cell values treated as missing, in addition to the empty string.
const NULL_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "#N/A", "#NA", "None",
    "<NA>",
];

fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || NULL_MARKERS.contains(&value)
}

/// Keeps only the columns whose missing-cell count is strictly below
/// `threshold * row_count`.
///
/// A dataset without rows keeps all of its columns.
pub fn prune_sparse_columns(dataset: &Dataset, threshold: f64) -> Result<Dataset> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AnalysisError::Argument(format!(
            "missing-value threshold must be within [0, 1], got {threshold}"
        )));
    }

    if dataset.is_empty() {
        return Ok(dataset.clone());
    }

    let limit = threshold * dataset.len() as f64;
    let keep: Vec<usize> = (0..dataset.headers().len())
        .filter(|&col| {
            let missing = dataset
                .records()
                .iter()
                .filter(|r| r.get(col).is_none_or(is_missing))
                .count();
            (missing as f64) < limit
        })
        .collect();

    let project = |record: &StringRecord| -> StringRecord {
        keep.iter().map(|&i| record.get(i).unwrap_or("")).collect()
    };

    Ok(Dataset::new(
        project(dataset.headers()),
        dataset.records().iter().map(project).collect(),
    ))
}

/// Loads `input`, prunes sparse columns and writes the result to `output`.
#[instrument(skip_all, fields(input = %input.as_ref().display(), output = %output.as_ref().display(), threshold = threshold))]
pub fn import_clean_data(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    threshold: f64,
) -> Result<Dataset> {
    let raw = Dataset::load(input)?;
    let cleaned = prune_sparse_columns(&raw, threshold)?;

    info!(
        rows = cleaned.len(),
        columns_before = raw.headers().len(),
        columns_after = cleaned.headers().len(),
        "Dataset cleaned"
    );

    write_dataset(output, &cleaned)?;
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_rows(
            &["hotel", "agent", "company"],
            &[
                vec!["Resort Hotel", "9", ""],
                vec!["City Hotel", "NULL", ""],
                vec!["City Hotel", "240", "NaN"],
                vec!["Resort Hotel", "", "45"],
            ],
        )
    }

    #[test]
    fn test_prune_drops_mostly_missing_column() {
        let cleaned = prune_sparse_columns(&sample(), 0.6).unwrap();

        // company: 3/4 missing (>= 2.4) dropped; agent: 2/4 missing kept
        assert_eq!(cleaned.headers(), &StringRecord::from(vec!["hotel", "agent"]));
        assert_eq!(&cleaned.records()[2][1], "240");
    }

    #[test]
    fn test_prune_limit_is_strict() {
        // agent has exactly 2 missing of 4; 2 < 0.5 * 4 is false
        let cleaned = prune_sparse_columns(&sample(), 0.5).unwrap();
        assert_eq!(cleaned.headers(), &StringRecord::from(vec!["hotel"]));
    }

    #[test]
    fn test_prune_empty_dataset_keeps_columns() {
        let ds = Dataset::from_rows(&["a", "b"], &[]);
        let cleaned = prune_sparse_columns(&ds, 0.8).unwrap();
        assert_eq!(cleaned.headers().len(), 2);
    }

    #[test]
    fn test_prune_rejects_bad_threshold() {
        let err = prune_sparse_columns(&sample(), 1.5).unwrap_err();
        assert!(matches!(err, AnalysisError::Argument(_)));
    }
}
