//! Import report rendering
//!
//! Runs once, after aggregation finalizes. The report is a single CSV
//! document with two tables back to back: a one-row stats table, then the
//! error table listing every rejection with the original columns plus a
//! final `ERROR` column. Error rows follow batch completion order, which
//! may differ from input order; the stats counts are exact regardless.

use super::aggregate::RunTotals;
use super::types::RejectionRecord;

/// Stats table header, in the order the caller expects.
const STATS_HEADER: [&str; 3] = ["Added Users Count", "Not Added Users Count", "Total Users"];

#[derive(Debug)]
pub struct ImportReport {
    pub added: u64,
    pub not_added: u64,
    /// Authoritative post-run member count from the store, so members that
    /// existed before this run are reflected.
    pub total_members: u64,
    /// Columns observed in the input header, in input order.
    pub columns: Vec<String>,
    pub rejections: Vec<RejectionRecord>,
}

impl ImportReport {
    pub fn new(totals: RunTotals, total_members: u64, columns: Vec<String>) -> Self {
        Self {
            added: totals.added(),
            not_added: totals.rejected(),
            total_members,
            columns,
            rejections: totals.rejections,
        }
    }

    /// Render the two-part CSV document.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record(STATS_HEADER)?;
        writer.write_record([
            self.added.to_string(),
            self.not_added.to_string(),
            self.total_members.to_string(),
        ])?;

        // Error table header: upper-cased input columns plus ERROR. With a
        // headerless (zero-column) input this degrades to just ERROR.
        let mut header: Vec<String> = self.columns.iter().map(|c| c.to_uppercase()).collect();
        header.push("ERROR".to_string());
        writer.write_record(&header)?;

        for rejection in &self.rejections {
            let mut record: Vec<&str> = self
                .columns
                .iter()
                .map(|c| rejection.field(c).unwrap_or(""))
                .collect();
            record.push(rejection.reason.as_str());
            writer.write_record(&record)?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::RejectReason;

    fn totals(rows_seen: u64, rejections: Vec<RejectionRecord>) -> RunTotals {
        RunTotals {
            rows_seen,
            rejections,
        }
    }

    fn rejection(email: &str, reason: RejectReason) -> RejectionRecord {
        RejectionRecord {
            fields: vec![
                ("name".to_string(), "Ada".to_string()),
                ("email".to_string(), email.to_string()),
            ],
            reason,
        }
    }

    #[test]
    fn test_report_layout() {
        let report = ImportReport::new(
            totals(3, vec![rejection("a@b", RejectReason::InvalidEmail)]),
            12,
            vec!["name".to_string(), "email".to_string()],
        );

        let csv = report.to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Added Users Count,Not Added Users Count,Total Users");
        assert_eq!(lines[1], "2,1,12");
        assert_eq!(lines[2], "NAME,EMAIL,ERROR");
        assert_eq!(lines[3], "Ada,a@b,invalid-email");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_zero_row_input_renders_header_only_error_table() {
        let report = ImportReport::new(
            totals(0, vec![]),
            7,
            vec!["name".to_string(), "email".to_string()],
        );

        let csv = report.to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "0,0,7");
        assert_eq!(lines[2], "NAME,EMAIL,ERROR");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_no_columns_does_not_crash() {
        let report = ImportReport::new(totals(0, vec![]), 0, vec![]);
        let csv = report.to_csv().unwrap();
        assert!(csv.lines().nth(2).unwrap().contains("ERROR"));
    }

    #[test]
    fn test_rejection_missing_a_column_renders_empty_cell() {
        let report = ImportReport::new(
            totals(
                1,
                vec![RejectionRecord {
                    fields: vec![("email".to_string(), "x@y.com".to_string())],
                    reason: RejectReason::MissingName,
                }],
            ),
            0,
            vec!["name".to_string(), "email".to_string()],
        );

        let csv = report.to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[3], ",x@y.com,missing-name");
    }
}
