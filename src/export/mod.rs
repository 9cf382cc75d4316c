//! Streaming user export
//!
//! The export pipeline is built from four parts:
//!
//! 1. **PageWalker**: walks an index-paged [`RecordSource`] until it returns
//!    an empty page
//! 2. **Projector**: maps each user onto the requested column layout
//! 3. **RowWriter**: writes the header and one row per user
//! 4. **ProgressTracker**: optional feedback on stderr
//!
//! These are orchestrated by the **ExportCoordinator**. Pages are fetched
//! strictly one at a time, and every row is flushed before the next page is
//! requested.
//!
//! # Example
//!
//! ```no_run
//! use auth0_export::export::{
//!     ExportCoordinator, FieldSpec, PageWalker, ProgressTracker, Projector, open_output,
//! };
//! # use auth0_export::export::RecordSource;
//! # async fn example(source: Box<dyn RecordSource>) -> auth0_export::Result<()> {
//! let projector = Projector::new(FieldSpec::parse("user_id,email")?);
//! let walker = PageWalker::new(source, 100, projector.api_fields())?;
//! let writer = open_output(None, ',').await?;
//!
//! let mut coordinator =
//!     ExportCoordinator::new(walker, projector, writer, ProgressTracker::hidden());
//! let result = coordinator.execute().await?;
//! println!("{} users", result.users_exported);
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod fields;
pub mod progress;
pub mod projector;
pub mod walker;
pub mod writers;

pub use coordinator::{ExportCoordinator, ExportResult};
pub use fields::{DEFAULT_FIELDS, FieldSpec};
pub use progress::ProgressTracker;
pub use projector::{Projector, Row};
pub use walker::{Page, PageWalker, RecordSource};
pub use writers::{CsvWriter, RowWriter, open_output};
