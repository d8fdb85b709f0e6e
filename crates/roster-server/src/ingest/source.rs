//! Streaming row source over delimited-text input
//!
//! Wraps an async CSV reader into a lazy, ordered sequence of [`RawRow`].
//! The header row fixes the column set for the whole input. The source is
//! restartable only by re-opening the input; a malformed record or an I/O
//! fault on the underlying stream surfaces as an error from
//! [`RowSource::next_row`] and is fatal to the run.

use std::sync::Arc;

use csv_async::{AsyncReader, AsyncReaderBuilder, StringRecord, Trim};
use tokio::io::AsyncRead;

use super::types::RawRow;

pub struct RowSource<R: AsyncRead + Unpin + Send> {
    reader: AsyncReader<R>,
    columns: Arc<Vec<String>>,
    record: StringRecord,
}

impl<R: AsyncRead + Unpin + Send> RowSource<R> {
    /// Open a source over a readable byte stream, consuming the header row.
    pub async fn open(input: R) -> Result<Self, csv_async::Error> {
        let mut reader = AsyncReaderBuilder::new()
            .trim(Trim::All)
            .create_reader(input);

        let columns: Vec<String> = reader
            .headers()
            .await?
            .iter()
            .map(|h| h.to_string())
            .collect();

        Ok(Self {
            reader,
            columns: Arc::new(columns),
            record: StringRecord::new(),
        })
    }

    /// Columns observed in the header row, in input order.
    pub fn columns(&self) -> Arc<Vec<String>> {
        self.columns.clone()
    }

    /// Next row, or `None` at end of input.
    pub async fn next_row(&mut self) -> Result<Option<RawRow>, csv_async::Error> {
        if !self.reader.read_record(&mut self.record).await? {
            return Ok(None);
        }

        let values = self.record.iter().map(|v| v.to_string()).collect();
        Ok(Some(RawRow::new(self.columns.clone(), values)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open(input: &str) -> RowSource<&[u8]> {
        RowSource::open(input.as_bytes()).await.unwrap()
    }

    #[tokio::test]
    async fn test_reads_rows_in_order() {
        let mut source = open("name,email\nAda,ada@example.com\nBob,bob@example.com\n").await;
        assert_eq!(*source.columns(), vec!["name", "email"]);

        let row = source.next_row().await.unwrap().unwrap();
        assert_eq!(row.get("name"), Some("Ada"));
        let row = source.next_row().await.unwrap().unwrap();
        assert_eq!(row.get("email"), Some("bob@example.com"));
        assert!(source.next_row().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_values_are_trimmed() {
        let mut source = open("name,email\n  Ada , ada@example.com \n").await;
        let row = source.next_row().await.unwrap().unwrap();
        assert_eq!(row.get("name"), Some("Ada"));
        assert_eq!(row.get("email"), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_header_only_input_yields_no_rows() {
        let mut source = open("name,email\n").await;
        assert_eq!(*source.columns(), vec!["name", "email"]);
        assert!(source.next_row().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unequal_field_count_is_an_error() {
        let mut source = open("name,email\nAda,ada@example.com,extra\n").await;
        assert!(source.next_row().await.is_err());
    }
}
