//! Row writers for export output
//!
//! This module provides a unified interface for the output sink: a header
//! row followed by data rows, each durably handed to the underlying stream
//! before the next one is started.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::BufWriter;

use crate::error::{ConfigError, Result};

pub mod csv;

pub use csv::CsvWriter;

/// Trait for writing tabular rows
#[async_trait]
pub trait RowWriter: Send {
    /// Write the header row
    ///
    /// # Arguments
    /// * `fields` - Column names, in order
    ///
    /// # Returns
    /// * `Result<()>` - Success or write error
    async fn write_header(&mut self, fields: &[String]) -> Result<()>;

    /// Write one data row and flush it
    ///
    /// # Arguments
    /// * `row` - Cell values, one per header column
    ///
    /// # Returns
    /// * `Result<()>` - Success or write error
    async fn write_row(&mut self, row: &[String]) -> Result<()>;

    /// Flush any buffered output
    ///
    /// Safe to call more than once and after a failed write.
    async fn finalize(&mut self) -> Result<()>;

    /// Number of data rows written so far
    fn rows_written(&self) -> u64;
}

/// Open the configured output sink
///
/// # Arguments
/// * `path` - Output file, or None for stdout
/// * `delimiter` - Field delimiter
///
/// # Returns
/// * `Result<Box<dyn RowWriter>>` - Writer or error
pub async fn open_output(path: Option<&Path>, delimiter: char) -> Result<Box<dyn RowWriter>> {
    match path {
        Some(path) => {
            let file = create_writer(path).await?;
            Ok(Box::new(CsvWriter::new(file, delimiter)))
        }
        None => Ok(Box::new(CsvWriter::new(
            BufWriter::new(tokio::io::stdout()),
            delimiter,
        ))),
    }
}

/// Helper function to create a buffered file writer
///
/// # Arguments
/// * `path` - File path to create
///
/// # Returns
/// * `Result<BufWriter<File>>` - Buffered writer or error
pub(crate) async fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    validate_path(path)?;
    let file = File::create(path).await?;
    Ok(BufWriter::new(file))
}

/// Helper function to validate file path and directory
///
/// # Arguments
/// * `path` - File path to validate
///
/// # Returns
/// * `Result<()>` - Success or error
pub(crate) fn validate_path(path: &Path) -> Result<()> {
    // Check if parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(ConfigError::InvalidValue {
                field: "output".to_string(),
                value: format!("directory does not exist: {}", parent.display()),
            }
            .into());
        }
    }

    Ok(())
}
