//! Auth0 user export library
//!
//! This library provides the pieces behind the `auth0-export` binary. They
//! can also be used to stream users from any paged source into CSV.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `client`: Auth0 Management API client
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `export`: Page walker, projector, writers and coordinator
//! - `model`: User records as returned by the API
//!
//! # Example
//!
//! ```no_run
//! use auth0_export::{Config, ManagementClient};
//! use auth0_export::export::{ExportCoordinator, PageWalker, ProgressTracker, Projector, open_output};
//!
//! #[tokio::main]
//! async fn main() -> auth0_export::Result<()> {
//!     let mut config = Config::default();
//!     config.auth0.domain = Some("tenant.auth0.com".to_string());
//!     config.auth0.client_id = Some("client-id".to_string());
//!     config.auth0.client_secret = Some("client-secret".to_string());
//!
//!     let projector = Projector::new(config.field_spec()?);
//!     let client = ManagementClient::connect(&config.client_settings()?).await?;
//!     let walker = PageWalker::new(Box::new(client), 100, projector.api_fields())?;
//!     let writer = open_output(None, ',').await?;
//!
//!     ExportCoordinator::new(walker, projector, writer, ProgressTracker::hidden())
//!         .execute()
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod model;

// Re-export commonly used types
pub use client::{ClientSettings, ManagementClient};
pub use config::Config;
pub use error::{ExportError, Result};
pub use export::{ExportCoordinator, ExportResult, FieldSpec, Projector};
pub use model::User;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}
