//! Error handling for export runs.
//!
//! Fatal errors carry the stage they came from (client init, page fetch or
//! output write) so the final message tells the operator where the run
//! stopped. Per-cell projection failures have their own type and never
//! abort a run.
//!
//! # Example
//!
//! ```rust
//! use auth0_export::error::{ExportError, FetchError};
//!
//! let err = ExportError::Fetch {
//!     page: 3,
//!     source: FetchError::Transport("connection reset".to_string()),
//! };
//! assert!(err.to_string().contains("page 3"));
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{
    ConfigError, ExportError, FetchError, InitError, ProjectionError, Result, WriteError,
};
