use std::{fmt, io};

/// Crate-wide `Result` type using [`ExportError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Top-level error type for export runs.
///
/// Every variant except `Config` and `Io` names the pipeline stage that
/// failed. All of them abort the run.
#[derive(Debug)]
pub enum ExportError {
    /// Client bootstrap or authentication failed.
    Init(InitError),

    /// Fetching a page of users failed.
    Fetch { page: u32, source: FetchError },

    /// Writing to the output sink failed.
    Write(WriteError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors outside the row writer (opening the output file, etc.).
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Client initialization errors.
#[derive(Debug)]
pub enum InitError {
    /// The tenant domain could not be turned into a base URL.
    InvalidDomain(String),

    /// Building the HTTP client failed.
    HttpClient(String),

    /// The token request could not be sent or decoded.
    TokenRequest(String),

    /// The token endpoint answered with a non-success status.
    TokenRejected { status: u16, message: String },
}

/// Page fetch errors.
#[derive(Debug)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS).
    Transport(String),

    /// The API answered with a non-success status.
    Status { status: u16, message: String },

    /// The response body was not a user list.
    Decode(String),
}

/// Output sink errors.
#[derive(Debug)]
pub enum WriteError {
    /// Writing the header row failed.
    Header(io::Error),

    /// Writing a data row failed. `row` is 1-based and excludes the header.
    Row { row: u64, source: io::Error },

    /// Flushing buffered output failed.
    Flush(io::Error),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Generic configuration error.
    Generic(String),
}

/// Per-cell projection failure.
///
/// Never escapes the projector: the cell degrades to an empty string.
#[derive(Debug)]
pub enum ProjectionError {
    /// No accessor is registered for the requested name.
    UnknownField(String),

    /// A structured value could not be serialized.
    Serialize { field: String, message: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Init(e) => {
                write!(f, "Failed to initialize Auth0 management client: {e}")
            }
            ExportError::Fetch { page, source } => {
                write!(f, "Failed to fetch users (page {page}): {source}")
            }
            ExportError::Write(e) => write!(f, "Output error: {e}"),
            ExportError::Config(e) => write!(f, "Configuration error: {e}"),
            ExportError::Io(e) => write!(f, "I/O error: {e}"),
            ExportError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::InvalidDomain(domain) => write!(f, "Invalid domain: {domain}"),
            InitError::HttpClient(msg) => write!(f, "Failed to build HTTP client: {msg}"),
            InitError::TokenRequest(msg) => write!(f, "Token request failed: {msg}"),
            InitError::TokenRejected { status, message } => {
                write!(f, "Token request rejected ({status}): {message}")
            }
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "Transport error: {msg}"),
            FetchError::Status { status, message } => {
                write!(f, "API returned {status}: {message}")
            }
            FetchError::Decode(msg) => write!(f, "Invalid response body: {msg}"),
        }
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Header(e) => write!(f, "Error writing CSV header: {e}"),
            WriteError::Row { row, source } => {
                write!(f, "Error writing user record #{row}: {source}")
            }
            WriteError::Flush(e) => write!(f, "Error flushing output: {e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::UnknownField(name) => write!(f, "Unknown field: {name}"),
            ProjectionError::Serialize { field, message } => {
                write!(f, "Failed to serialize field '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Init(e) => Some(e),
            ExportError::Fetch { source, .. } => Some(source),
            ExportError::Write(e) => Some(e),
            ExportError::Config(e) => Some(e),
            ExportError::Io(e) => Some(e),
            ExportError::Generic(_) => None,
        }
    }
}

impl std::error::Error for InitError {}
impl std::error::Error for FetchError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ProjectionError {}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WriteError::Header(e) | WriteError::Flush(e) => Some(e),
            WriteError::Row { source, .. } => Some(source),
        }
    }
}

/* ========================= Conversions ========================= */

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<InitError> for ExportError {
    fn from(err: InitError) -> Self {
        ExportError::Init(err)
    }
}

impl From<WriteError> for ExportError {
    fn from(err: WriteError) -> Self {
        ExportError::Write(err)
    }
}

impl From<ConfigError> for ExportError {
    fn from(err: ConfigError) -> Self {
        ExportError::Config(err)
    }
}

impl From<String> for ExportError {
    fn from(msg: String) -> Self {
        ExportError::Generic(msg)
    }
}

impl From<&str> for ExportError {
    fn from(msg: &str) -> Self {
        ExportError::Generic(msg.to_owned())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::InvalidFormat(err.to_string())
    }
}
