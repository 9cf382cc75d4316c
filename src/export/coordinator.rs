//! Export coordinator for orchestrating export runs
//!
//! Brings together the page walker, the projector and the row writer: writes
//! the header, then projects and writes every user page by page. The writer
//! is finalized on every exit path, so rows that were written before a
//! failure are never lost in a buffer.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::Result;

use super::progress::ProgressTracker;
use super::projector::Projector;
use super::walker::PageWalker;
use super::writers::RowWriter;

/// Result of an export run
#[derive(Debug)]
pub struct ExportResult {
    /// Number of users written
    pub users_exported: u64,
    /// Number of non-empty pages processed
    pub pages_fetched: u32,
    /// Time taken for export
    pub elapsed_ms: u64,
}

/// Coordinator for export runs
pub struct ExportCoordinator {
    /// Collection walker feeding the pipeline
    walker: PageWalker,
    /// Projection from user to row
    projector: Projector,
    /// Output sink
    writer: Box<dyn RowWriter>,
    /// Progress tracker for user feedback
    tracker: ProgressTracker,
    /// Pages processed so far
    pages: u32,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    pub fn new(
        walker: PageWalker,
        projector: Projector,
        writer: Box<dyn RowWriter>,
        tracker: ProgressTracker,
    ) -> Self {
        Self {
            walker,
            projector,
            writer,
            tracker,
            pages: 0,
        }
    }

    /// Execute the export
    ///
    /// 1. Write the header row
    /// 2. Walk pages until the source is exhausted
    /// 3. Project and write each user, one row at a time
    /// 4. Finalize the writer, also when a step above failed
    ///
    /// # Returns
    /// * `Result<ExportResult>` - Export statistics or the first fatal error
    pub async fn execute(&mut self) -> Result<ExportResult> {
        let start_time = Instant::now();
        info!("Starting export");

        let outcome = self.stream_rows().await;

        debug!("Finalizing output");
        let finalized = self.writer.finalize().await;
        self.tracker.finish();

        let exported = self.writer.rows_written();
        if let Err(e) = outcome {
            if let Err(flush_err) = finalized {
                warn!("Failed to flush output after error: {}", flush_err);
            }
            info!(
                "Export aborted after {} users ({} pages)",
                exported, self.pages
            );
            return Err(e);
        }
        finalized?;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Export completed: {} users, {} pages, {} ms",
            exported, self.pages, elapsed_ms
        );

        Ok(ExportResult {
            users_exported: exported,
            pages_fetched: self.pages,
            elapsed_ms,
        })
    }

    async fn stream_rows(&mut self) -> Result<()> {
        self.writer.write_header(self.projector.header()).await?;

        while let Some(page) = self.walker.next_page().await? {
            for user in &page.records {
                let row = self.projector.project(user);
                self.writer.write_row(&row).await?;
            }

            self.pages += 1;
            if let Some(total) = self.walker.total_hint() {
                self.tracker.set_total(total);
            }
            self.tracker.update(self.writer.rows_written());

            // Log progress periodically
            if self.pages % 10 == 0 {
                info!(
                    "Progress: {} users exported ({} pages)",
                    self.writer.rows_written(),
                    self.pages
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExportError, WriteError};
    use crate::export::fields::FieldSpec;
    use crate::export::walker::tests::{MockSource, user};
    use crate::model::User;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorded {
        rows: Vec<Vec<String>>,
        finalized: usize,
    }

    // Mock row writer for testing; row 0 is the header
    struct MockWriter {
        recorded: Arc<Mutex<Recorded>>,
        fail_on_row: Option<u64>,
        written: u64,
    }

    impl MockWriter {
        fn new() -> (Self, Arc<Mutex<Recorded>>) {
            let recorded = Arc::new(Mutex::new(Recorded::default()));
            let writer = Self {
                recorded: recorded.clone(),
                fail_on_row: None,
                written: 0,
            };
            (writer, recorded)
        }
    }

    #[async_trait]
    impl RowWriter for MockWriter {
        async fn write_header(&mut self, fields: &[String]) -> Result<()> {
            self.recorded.lock().unwrap().rows.push(fields.to_vec());
            Ok(())
        }

        async fn write_row(&mut self, row: &[String]) -> Result<()> {
            if self.fail_on_row == Some(self.written + 1) {
                return Err(WriteError::Row {
                    row: self.written + 1,
                    source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"),
                }
                .into());
            }
            self.recorded.lock().unwrap().rows.push(row.to_vec());
            self.written += 1;
            Ok(())
        }

        async fn finalize(&mut self) -> Result<()> {
            self.recorded.lock().unwrap().finalized += 1;
            Ok(())
        }

        fn rows_written(&self) -> u64 {
            self.written
        }
    }

    fn coordinator(
        pages: Vec<Vec<User>>,
        fields: &str,
        source_fails_at: Option<u32>,
        writer: MockWriter,
    ) -> ExportCoordinator {
        let projector = Projector::new(FieldSpec::parse(fields).unwrap());
        let mut source = MockSource::new(pages);
        if let Some(page) = source_fails_at {
            source = source.failing_at(page);
        }
        let walker = PageWalker::new(Box::new(source), 2, projector.api_fields()).unwrap();
        ExportCoordinator::new(walker, projector, Box::new(writer), ProgressTracker::hidden())
    }

    #[tokio::test]
    async fn test_end_to_end_two_pages() {
        let pages = vec![
            vec![user("auth0|1", "one@example.com"), user("auth0|2", "two@example.com")],
            vec![user("auth0|3", "three@example.com"), user("auth0|4", "four@example.com")],
        ];
        let (writer, recorded) = MockWriter::new();
        let mut coordinator = coordinator(pages, "user_id,email", None, writer);

        let result = coordinator.execute().await.unwrap();
        assert_eq!(result.users_exported, 4);
        assert_eq!(result.pages_fetched, 2);

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.finalized, 1);
        assert_eq!(
            recorded.rows,
            vec![
                vec!["user_id", "email"],
                vec!["auth0|1", "one@example.com"],
                vec!["auth0|2", "two@example.com"],
                vec!["auth0|3", "three@example.com"],
                vec!["auth0|4", "four@example.com"],
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_collection_writes_header_only() {
        let (writer, recorded) = MockWriter::new();
        let mut coordinator = coordinator(vec![], "email,name", None, writer);

        let result = coordinator.execute().await.unwrap();
        assert_eq!(result.users_exported, 0);
        assert_eq!(result.pages_fetched, 0);
        assert_eq!(recorded.lock().unwrap().rows, vec![vec!["email", "name"]]);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_earlier_rows_and_finalizes() {
        let pages = vec![
            vec![user("auth0|1", "one@example.com"), user("auth0|2", "two@example.com")],
            vec![user("auth0|3", "three@example.com")],
        ];
        let (writer, recorded) = MockWriter::new();
        let mut coordinator = coordinator(pages, "email", Some(1), writer);

        let err = coordinator.execute().await.unwrap_err();
        assert!(matches!(err, ExportError::Fetch { page: 1, .. }));
        assert!(err.to_string().contains("page 1"));

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.finalized, 1);
        // header + the two rows from page 0, nothing from page 1 onwards
        assert_eq!(recorded.rows.len(), 3);
    }

    #[tokio::test]
    async fn test_write_failure_aborts_run() {
        let pages = vec![vec![user("auth0|1", "a@x"), user("auth0|2", "b@x")]];
        let (mut writer, recorded) = MockWriter::new();
        writer.fail_on_row = Some(2);
        let mut coordinator = coordinator(pages, "email", None, writer);

        let err = coordinator.execute().await.unwrap_err();
        assert!(matches!(err, ExportError::Write(WriteError::Row { row: 2, .. })));
        assert_eq!(recorded.lock().unwrap().finalized, 1);
    }

    #[tokio::test]
    async fn test_every_row_matches_header_width() {
        let pages = vec![vec![user("auth0|1", "a@x")], vec![User::default()]];
        let (writer, recorded) = MockWriter::new();
        let mut coordinator = coordinator(pages, "user_id,bogus,email,app_metadata", None, writer);

        coordinator.execute().await.unwrap();
        let recorded = recorded.lock().unwrap();
        assert!(recorded.rows.iter().all(|row| row.len() == 4));
    }
}
