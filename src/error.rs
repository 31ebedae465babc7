//! Unified error handling for the sluice crate
//!
//! Domain errors ([`FetchError`], [`SubmitError`]) stay close to the code
//! that raises them. This module wraps them into a single [`Error`] for
//! module boundaries and classifies every failure into an [`ErrorCategory`].
//!
//! Harvest code asks a failure for its [`ErrorCategory`] and records the
//! category's [`ItemOutcome`]; unreadable content is a skip, everything else
//! a failure.

use std::io;
use thiserror::Error;

use crate::models::ItemOutcome;

pub use crate::utils::error::{FetchError, SubmitError};

/// Common trait for all sluice error types
pub trait SluiceErrorTrait: std::error::Error {
    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad URL, connection, timeout or non-success status
    Transport,
    /// Upstream data that cannot be read as a feed or record
    MalformedContent,
    /// Ranking refresh returned nothing; the previous snapshot is kept
    StaleCache,
    /// Invalid configuration; fatal at startup
    Config,
}

impl ErrorCategory {
    /// Short label used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::MalformedContent => "malformed",
            Self::StaleCache => "stale_cache",
            Self::Config => "config",
        }
    }

    /// How an item that failed this way is counted
    pub fn outcome(self) -> ItemOutcome {
        match self {
            Self::MalformedContent => ItemOutcome::Skipped,
            Self::Transport | Self::StaleCache | Self::Config => ItemOutcome::Failed,
        }
    }
}

impl SluiceErrorTrait for FetchError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Feed(_) | Self::Json(_) => ErrorCategory::MalformedContent,
            Self::Http(_) | Self::Timeout | Self::Status(_) | Self::InvalidUrl(_) => {
                ErrorCategory::Transport
            }
        }
    }
}

impl SluiceErrorTrait for SubmitError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Transport
    }
}

/// Unified error type for the sluice crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Submit-specific errors
    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    /// The ranking collaborator returned no titles
    #[error("Ranking refresh returned no titles")]
    StaleCache,

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Catalog or config file decode errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SluiceErrorTrait for Error {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Submit(e) => e.category(),
            Self::StaleCache => ErrorCategory::StaleCache,
            Self::Config(_) | Self::Io(_) | Self::Toml(_) => ErrorCategory::Config,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
