//! Core types for the member import pipeline

use std::sync::Arc;
use uuid::Uuid;

/// One raw record parsed from the input, keyed by column name.
///
/// The column set is fixed for the whole input (header row) and shared
/// between rows; per-row storage is just the values. Column order is
/// preserved for report rendering.
#[derive(Debug, Clone)]
pub struct RawRow {
    columns: Arc<Vec<String>>,
    values: Vec<String>,
}

impl RawRow {
    pub fn new(columns: Arc<Vec<String>>, values: Vec<String>) -> Self {
        Self { columns, values }
    }

    /// Value of the named column, if the column exists.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Iterate `(column, value)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn into_fields(self) -> Vec<(String, String)> {
        self.columns
            .iter()
            .cloned()
            .zip(self.values)
            .collect()
    }
}

/// A row that passed validation and normalization, ready for insertion.
///
/// Immutable once constructed: all columns from the raw row with empty
/// values replaced by the group's defaults, the subscription flag set, and
/// the owning group attached.
#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    pub group_id: Uuid,
    pub email: String,
    pub name: String,
    pub subscribed: bool,
    /// All columns in input order, defaults already applied.
    pub fields: Vec<(String, String)>,
}

impl NormalizedRecord {
    /// Value of the named column, if present.
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn into_rejection(self, reason: RejectReason) -> RejectionRecord {
        RejectionRecord {
            fields: self.fields,
            reason,
        }
    }
}

/// Why a row was not imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingName,
    InvalidEmail,
    Duplicate,
    PersistenceFailure,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingName => "missing-name",
            RejectReason::InvalidEmail => "invalid-email",
            RejectReason::Duplicate => "duplicate",
            RejectReason::PersistenceFailure => "persistence-failure",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row that failed validation, dedup, or persistence.
///
/// Rejections are append-only across the run; their ordering is not
/// guaranteed to match input order because batches complete out of order.
#[derive(Debug, Clone)]
pub struct RejectionRecord {
    /// The row's columns in input order.
    pub fields: Vec<(String, String)>,
    pub reason: RejectReason,
}

impl RejectionRecord {
    pub fn from_row(row: RawRow, reason: RejectReason) -> Self {
        Self {
            fields: row.into_fields(),
            reason,
        }
    }

    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }
}

/// A bounded group of validated records submitted to storage together.
///
/// The generation number exists for sizing-policy bookkeeping and log
/// correlation only.
#[derive(Debug)]
pub struct Batch {
    pub number: u64,
    pub records: Vec<NormalizedRecord>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(columns: &[&str], values: &[&str]) -> RawRow {
        RawRow::new(
            Arc::new(columns.iter().map(|s| s.to_string()).collect()),
            values.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_raw_row_lookup() {
        let row = row(&["name", "email", "city"], &["Ada", "ada@example.com", ""]);
        assert_eq!(row.get("email"), Some("ada@example.com"));
        assert_eq!(row.get("city"), Some(""));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_raw_row_preserves_column_order() {
        let row = row(&["b", "a"], &["2", "1"]);
        let fields: Vec<_> = row.iter().collect();
        assert_eq!(fields, vec![("b", "2"), ("a", "1")]);
    }

    #[test]
    fn test_reject_reason_codes() {
        assert_eq!(RejectReason::MissingName.as_str(), "missing-name");
        assert_eq!(RejectReason::InvalidEmail.as_str(), "invalid-email");
        assert_eq!(RejectReason::Duplicate.as_str(), "duplicate");
        assert_eq!(RejectReason::PersistenceFailure.as_str(), "persistence-failure");
    }
}
