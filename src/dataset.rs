//! In-memory tabular dataset loaded from a delimited text file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ErrorKind, ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// A header row plus data rows, all kept as text.
///
/// Columns are never reinterpreted here; typed access happens in the
/// analysis stages that need it, so unknown columns pass through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl Dataset {
    pub fn new(headers: StringRecord, records: Vec<StringRecord>) -> Self {
        Self { headers, records }
    }

    /// Builds a dataset from string slices. Mostly handy in tests.
    pub fn from_rows(headers: &[&str], rows: &[Vec<&str>]) -> Self {
        Self {
            headers: StringRecord::from(headers.to_vec()),
            records: rows
                .iter()
                .map(|r| StringRecord::from(r.clone()))
                .collect(),
        }
    }

    /// Reads a CSV file with a header row.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading dataset");
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn records(&self) -> &[StringRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of the column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

}

/// Deserializes the columns `T` names from one record, matched by header.
///
/// A column `T` needs but the header lacks is [`AnalysisError::MissingColumn`];
/// a field that does not parse into its target type is
/// [`AnalysisError::DataIntegrity`] for `row`.
pub fn read_row<T: DeserializeOwned>(
    headers: &StringRecord,
    record: &StringRecord,
    row: usize,
) -> Result<T> {
    record
        .deserialize(Some(headers))
        .map_err(|err| row_error(headers, record, row, err))
}

fn row_error(
    headers: &StringRecord,
    record: &StringRecord,
    row: usize,
    err: csv::Error,
) -> AnalysisError {
    let detail = match err.kind() {
        ErrorKind::Deserialize { err: de, .. } => Some((de.field(), de.kind().to_string())),
        _ => None,
    };
    match detail {
        Some((Some(field), _)) => {
            let i = field as usize;
            AnalysisError::integrity(row, headers.get(i).unwrap_or(""), record.get(i).unwrap_or(""))
        }
        Some((None, message)) => AnalysisError::MissingColumn(missing_field_name(&message)),
        None => err.into(),
    }
}

/// Column name out of serde's "missing field `name`" message.
fn missing_field_name(message: &str) -> String {
    message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.strip_suffix('`'))
        .unwrap_or(message)
        .to_string()
}
