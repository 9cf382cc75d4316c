//! auth0-export
//!
//! Exports every user of an Auth0 tenant as CSV, one row per user, with a
//! header naming the requested fields.
//!
//! # Usage
//!
//! ```bash
//! # Default fields to stdout
//! AUTH0_DOMAIN=tenant.auth0.com AUTH0_CLIENT_ID=... AUTH0_CLIENT_SECRET=... auth0-export
//!
//! # Selected fields to a file
//! auth0-export -f user_id,email,last_login -o users.csv
//! ```

use tracing::{Level, info};

use auth0_export::cli::CliInterface;
use auth0_export::client::ManagementClient;
use auth0_export::error::Result;
use auth0_export::export::{
    ExportCoordinator, PageWalker, ProgressTracker, Projector, open_output,
};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or run the export
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    run_export(&cli).await
}

/// Authenticate, then stream every user to the configured output
async fn run_export(cli: &CliInterface) -> Result<()> {
    let config = cli.config();
    config.validate()?;

    let projector = Projector::new(config.field_spec()?);
    let settings = config.client_settings()?;
    let client = ManagementClient::connect(&settings).await?;

    let walker = PageWalker::new(
        Box::new(client),
        config.export.page_size,
        projector.api_fields(),
    )?;
    let writer = open_output(config.export.output.as_deref(), config.export.delimiter).await?;
    let tracker = ProgressTracker::new(None, cli.show_progress());

    let mut coordinator = ExportCoordinator::new(walker, projector, writer, tracker);
    let result = coordinator.execute().await?;

    info!(
        "Exported {} users in {} ms",
        result.users_exported, result.elapsed_ms
    );
    Ok(())
}

/// Initialize logging system based on verbosity level
///
/// Logs go to stderr so stdout carries only CSV.
///
/// # Arguments
/// * `cli` - CLI interface with verbosity settings
fn initialize_logging(cli: &CliInterface) {
    let level: Level = cli.config().logging.level.to_tracing_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
