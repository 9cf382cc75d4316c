//! CSV writer for export operations
//!
//! Writes delimited rows to any async byte stream. Values are quoted only
//! when they need to be, and every row is flushed as soon as it is written
//! so that an interrupted run leaves a well-formed prefix behind.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::{ExportError, Result, WriteError};

use super::RowWriter;

/// Writer for delimited text
pub struct CsvWriter<W> {
    /// Underlying stream
    writer: W,
    /// Field delimiter
    delimiter: char,
    /// Column count fixed by the header
    columns: Option<usize>,
    /// Number of data rows written
    written: u64,
}

impl<W: AsyncWrite + Unpin + Send> CsvWriter<W> {
    /// Create a new CSV writer
    ///
    /// # Arguments
    /// * `writer` - Output stream
    /// * `delimiter` - Field delimiter, usually `,`
    pub fn new(writer: W, delimiter: char) -> Self {
        Self {
            writer,
            delimiter,
            columns: None,
            written: 0,
        }
    }

    /// Consume the writer and return the underlying stream
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Encode one record as a terminated line
    fn encode_record(&self, values: &[String]) -> String {
        // A lone empty field would otherwise be indistinguishable from a blank line
        if values.len() == 1 && values[0].is_empty() {
            return "\"\"\n".to_string();
        }

        let mut line = values
            .iter()
            .map(|v| Self::escape_csv_value(v, self.delimiter))
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string());
        line.push('\n');
        line
    }

    /// Escape a CSV value if necessary
    ///
    /// Values with leading whitespace are quoted too, so readers that trim
    /// unquoted fields keep it.
    ///
    /// # Arguments
    /// * `value` - Value to escape
    /// * `delimiter` - Active field delimiter
    ///
    /// # Returns
    /// * `String` - Escaped value
    fn escape_csv_value(value: &str, delimiter: char) -> String {
        if value.contains(delimiter)
            || value.contains('"')
            || value.contains('\n')
            || value.contains('\r')
            || value.starts_with(char::is_whitespace)
        {
            // Wrap in quotes and escape internal quotes by doubling them
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }

    async fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> RowWriter for CsvWriter<W> {
    async fn write_header(&mut self, fields: &[String]) -> Result<()> {
        let line = self.encode_record(fields);
        self.write_line(&line).await.map_err(WriteError::Header)?;
        self.columns = Some(fields.len());

        debug!("Wrote CSV header: {} fields", fields.len());
        Ok(())
    }

    async fn write_row(&mut self, row: &[String]) -> Result<()> {
        match self.columns {
            Some(n) if n == row.len() => {}
            Some(n) => {
                return Err(ExportError::Generic(format!(
                    "Row has {} columns but header has {}",
                    row.len(),
                    n
                )));
            }
            None => return Err("Row written before CSV header".into()),
        }

        let line = self.encode_record(row);
        let row_number = self.written + 1;
        self.write_line(&line)
            .await
            .map_err(|source| WriteError::Row {
                row: row_number,
                source,
            })?;

        self.written = row_number;
        Ok(())
    }

    async fn finalize(&mut self) -> Result<()> {
        self.writer.flush().await.map_err(WriteError::Flush)?;

        debug!("Finalized CSV output ({} rows)", self.written);
        Ok(())
    }

    fn rows_written(&self) -> u64 {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tokio_test::io::Builder;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_csv_writer_basic() {
        let mut writer = CsvWriter::new(Vec::new(), ',');
        writer.write_header(&strings(&["user_id", "email"])).await.unwrap();
        writer.write_row(&strings(&["auth0|1", "a@example.com"])).await.unwrap();
        writer.write_row(&strings(&["auth0|2", "b@example.com"])).await.unwrap();
        writer.finalize().await.unwrap();

        assert_eq!(writer.rows_written(), 2);
        let content = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            content,
            "user_id,email\nauth0|1,a@example.com\nauth0|2,b@example.com\n"
        );
    }

    #[tokio::test]
    async fn test_csv_writer_with_special_characters() {
        let mut writer = CsvWriter::new(Vec::new(), ',');
        writer.write_header(&strings(&["text"])).await.unwrap();
        writer.write_row(&strings(&["Hello, world!"])).await.unwrap();
        writer.write_row(&strings(&["Quote: \"test\""])).await.unwrap();
        writer.write_row(&strings(&["Newline\ntest"])).await.unwrap();

        let content = String::from_utf8(writer.into_inner()).unwrap();
        assert!(content.contains("\"Hello, world!\""));
        assert!(content.contains("\"Quote: \"\"test\"\"\""));
        assert!(content.contains("\"Newline\ntest\""));
    }

    #[tokio::test]
    async fn test_metadata_json_is_quoted() {
        let mut writer = CsvWriter::new(Vec::new(), ',');
        writer.write_header(&strings(&["user_id", "app_metadata"])).await.unwrap();
        writer
            .write_row(&strings(&["auth0|1", r#"{"a":"1","b":"2"}"#]))
            .await
            .unwrap();

        let content = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            content.lines().nth(1),
            Some(r#"auth0|1,"{""a"":""1"",""b"":""2""}""#)
        );
    }

    #[tokio::test]
    async fn test_custom_delimiter() {
        let mut writer = CsvWriter::new(Vec::new(), '\t');
        writer.write_header(&strings(&["name", "email"])).await.unwrap();
        writer.write_row(&strings(&["Doe, Jane", "tab\there"])).await.unwrap();

        let content = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(content, "name\temail\nDoe, Jane\t\"tab\there\"\n");
    }

    #[tokio::test]
    async fn test_single_empty_cell_is_quoted() {
        let mut writer = CsvWriter::new(Vec::new(), ',');
        writer.write_header(&strings(&["nickname"])).await.unwrap();
        writer.write_row(&strings(&[""])).await.unwrap();

        let content = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(content, "nickname\n\"\"\n");
    }

    #[tokio::test]
    async fn test_rows_are_written_in_order() {
        let stream = Builder::new()
            .write(b"user_id,email\n")
            .write(b"auth0|1,a@example.com\n")
            .build();

        let mut writer = CsvWriter::new(stream, ',');
        writer.write_header(&strings(&["user_id", "email"])).await.unwrap();
        writer.write_row(&strings(&["auth0|1", "a@example.com"])).await.unwrap();
        writer.finalize().await.unwrap();
    }

    #[tokio::test]
    async fn test_row_write_failure_is_reported() {
        let stream = Builder::new()
            .write(b"email\n")
            .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
            .build();

        let mut writer = CsvWriter::new(stream, ',');
        writer.write_header(&strings(&["email"])).await.unwrap();

        let err = writer.write_row(&strings(&["a@example.com"])).await.unwrap_err();
        match err {
            ExportError::Write(WriteError::Row { row, .. }) => assert_eq!(row, 1),
            other => panic!("expected row write error, got {other}"),
        }
        assert_eq!(writer.rows_written(), 0);
    }

    #[tokio::test]
    async fn test_header_write_failure_is_reported() {
        let stream = Builder::new()
            .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
            .build();

        let mut writer = CsvWriter::new(stream, ',');
        let err = writer.write_header(&strings(&["email"])).await.unwrap_err();
        assert!(matches!(err, ExportError::Write(WriteError::Header(_))));
    }

    #[tokio::test]
    async fn test_column_count_mismatch_rejected() {
        let mut writer = CsvWriter::new(Vec::new(), ',');
        writer.write_header(&strings(&["a", "b"])).await.unwrap();
        assert!(writer.write_row(&strings(&["only one"])).await.is_err());
        assert_eq!(writer.rows_written(), 0);
    }

    #[tokio::test]
    async fn test_row_before_header_rejected() {
        let mut writer = CsvWriter::new(Vec::new(), ',');
        assert!(writer.write_row(&strings(&["x"])).await.is_err());
    }

    #[test]
    fn test_csv_escape_value() {
        type W = CsvWriter<Vec<u8>>;
        assert_eq!(W::escape_csv_value("simple", ','), "simple");
        assert_eq!(W::escape_csv_value("with,comma", ','), "\"with,comma\"");
        assert_eq!(W::escape_csv_value("with,comma", ';'), "with,comma");
        assert_eq!(W::escape_csv_value("with\"quote", ','), "\"with\"\"quote\"");
        assert_eq!(W::escape_csv_value("with\nnewline", ','), "\"with\nnewline\"");
        assert_eq!(W::escape_csv_value(" Jane", ','), "\" Jane\"");
        assert_eq!(W::escape_csv_value("\tindented", ','), "\"\tindented\"");
        assert_eq!(W::escape_csv_value("Jane ", ','), "Jane ");
    }

    #[tokio::test]
    async fn test_leading_whitespace_is_quoted() {
        let mut writer = CsvWriter::new(Vec::new(), ',');
        writer.write_header(&strings(&["name", "nickname"])).await.unwrap();
        writer.write_row(&strings(&[" Jane Doe", "jd"])).await.unwrap();

        let content = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(content, "name,nickname\n\" Jane Doe\",jd\n");
    }
}
