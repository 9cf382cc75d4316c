//! Command-line interface for auth0-export
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Environment variable binding for credentials and fields
//! - Configuration loading and merging
//! - Subcommands (version, completion, config)

pub mod completion;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{Config, LogLevel};
use crate::error::Result;

/// Export Auth0 users as CSV
#[derive(Parser, Debug)]
#[command(
    name = "auth0-export",
    version,
    about = "Export Auth0 users as CSV",
    long_about = "Pages through the Auth0 Management API users endpoint and writes one CSV
row per user, with a header row naming the requested fields."
)]
pub struct CliArgs {
    /// Auth0 tenant domain
    ///
    /// Example: example.eu.auth0.com
    #[arg(short = 'd', long, env = "AUTH0_DOMAIN", value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Machine-to-machine application client ID
    #[arg(short = 'i', long, env = "AUTH0_CLIENT_ID", value_name = "ID")]
    pub client_id: Option<String>,

    /// Machine-to-machine application client secret
    #[arg(
        short = 's',
        long,
        env = "AUTH0_CLIENT_SECRET",
        value_name = "SECRET",
        hide_env_values = true
    )]
    pub client_secret: Option<String>,

    /// Comma-separated list of fields to export
    ///
    /// Default: user_id,email,name,app_metadata
    #[arg(short = 'f', long, env = "AUTH0_EXPORT_FIELDS", value_name = "FIELDS")]
    pub fields: Option<String>,

    /// Write CSV to this file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Users per page (1-100)
    #[arg(long, value_name = "N")]
    pub page_size: Option<u32>,

    /// Field delimiter
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, conflicts_with_all = ["verbose", "very_verbose"])]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for auth0-export
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Configuration with arguments applied
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// Validation is left to the caller so that `config --validate` can
    /// report problems instead of failing on them.
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Get the configuration
    ///
    /// # Returns
    /// * `&Config` - Reference to configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    ///
    /// # Returns
    /// * `&CliArgs` - Reference to arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Whether to draw the progress spinner
    ///
    /// Only when writing to a file, so it never interleaves with CSV on a
    /// terminal.
    pub fn show_progress(&self) -> bool {
        self.config.export.output.is_some() && !self.args.quiet && !self.args.no_progress
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments (or their
    /// environment variables) where provided
    ///
    /// # Arguments
    /// * `config` - Configuration to modify
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_auth0_args(config, args);
        Self::apply_export_args(config, args);
        Self::apply_logging_args(config, args);
    }

    /// Apply tenant-related CLI arguments to configuration
    fn apply_auth0_args(config: &mut Config, args: &CliArgs) {
        if let Some(domain) = &args.domain {
            config.auth0.domain = Some(domain.clone());
        }
        if let Some(client_id) = &args.client_id {
            config.auth0.client_id = Some(client_id.clone());
        }
        if let Some(client_secret) = &args.client_secret {
            config.auth0.client_secret = Some(client_secret.clone());
        }
        if let Some(timeout) = args.timeout {
            config.auth0.timeout = timeout;
        }
    }

    /// Apply export-related CLI arguments to configuration
    fn apply_export_args(config: &mut Config, args: &CliArgs) {
        if let Some(fields) = &args.fields {
            config.export.fields = fields.clone();
        }
        if let Some(page_size) = args.page_size {
            config.export.page_size = page_size;
        }
        if let Some(delimiter) = args.delimiter {
            config.export.delimiter = delimiter;
        }
        if let Some(output) = &args.output {
            config.export.output = Some(output.clone());
        }
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                completion::generate_completion(*shell)?;
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("auth0-export version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    ///
    /// With neither flag set the effective configuration is shown.
    ///
    /// # Arguments
    /// * `show` - Whether to show configuration
    /// * `validate` - Whether to validate configuration
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config();
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate the effective configuration
    fn validate_config(&self) {
        let path = self.get_config_path();
        if path.exists() {
            println!("Validating configuration file: {}", path.display());
        } else {
            println!("No configuration file at {}, validating defaults", path.display());
        }

        match self.config.validate() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => println!("Configuration validation failed: {}", e),
        }

        if let Err(e) = self.config.client_settings() {
            println!("Note: {}", e);
        }
    }

    /// Show effective configuration, with the client secret masked
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.redacted().to_toml()?);

        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }
}
