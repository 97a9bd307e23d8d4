//! Centralized error handling for the dashboard.
//!
//! Library code returns [`Result<T>`], whose error is [`EdaError`]. The
//! variants follow the places a render pass can fail:
//!
//! - **Load**: the uploaded file could not be turned into a dataset. This is
//!   fatal for that upload and the user has to upload again.
//! - **`UnsupportedFormat`**: the upload's extension is not `.csv`, `.xlsx`
//!   or `.xls`.
//! - **`DataProcessing`**: a polars operation failed while preparing data or
//!   building a chart.
//!
//! Missing columns are never errors; gated steps are skipped instead.
//!
//! ```
//! use ecommerce_eda::error::EdaError;
//!
//! fn describe(err: &EdaError) -> &'static str {
//!     match err {
//!         EdaError::Load(_) | EdaError::UnsupportedFormat(_) => "upload again",
//!         _ => "internal",
//!     }
//! }
//! ```
//!
//! ## Context Extension Trait
//!
//! [`ResultExt`] adds `.context()` to any `Result` whose error converts into
//! [`EdaError`]:
//!
//! ```no_run
//! use ecommerce_eda::error::ResultExt as _;
//!
//! fn read() -> ecommerce_eda::error::Result<String> {
//!     std::fs::read_to_string("orders.csv").context("Failed to read upload")
//! }
//! ```

use std::fmt;

/// Main error type for dashboard operations.
#[derive(Debug)]
pub enum EdaError {
    /// I/O errors (reading uploads, writing rendered pages)
    Io(std::io::Error),

    /// The uploaded file is malformed or in an unreadable encoding
    Load(String),

    /// The uploaded file's extension is not accepted
    UnsupportedFormat(String),

    /// Data processing errors (Polars casts, column access)
    DataProcessing(String),

    /// Configuration errors
    Config(String),

    /// Output generation errors
    Render(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for EdaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Load(msg) => write!(f, "Failed to load dataset: {msg}"),
            Self::UnsupportedFormat(ext) => write!(
                f,
                "Unsupported file type '{ext}': upload a .csv, .xlsx or .xls file"
            ),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EdaError {}

impl From<std::io::Error> for EdaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for EdaError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for EdaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for EdaError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<calamine::Error> for EdaError {
    fn from(err: calamine::Error) -> Self {
        Self::Load(err.to_string())
    }
}

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, EdaError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<EdaError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: EdaError = e.into();
            EdaError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: EdaError = e.into();
            EdaError::Other(format!("{}: {}", f(), err))
        })
    }
}
