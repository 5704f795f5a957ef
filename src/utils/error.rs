//! Error types for trendscope stages
//!
//! This module defines the domain errors used throughout the application.

use thiserror::Error;

/// Error raised by any lookup against the trends service
///
/// Network failures, upstream rejections and malformed bodies all collapse
/// into this one type; the message carries the underlying cause.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct FetchError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FetchError {
    /// Create a fetch error from a plain message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a fetch error with context and an underlying cause
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        let context = context.into();
        Self {
            message: format!("{context}: {source}"),
            source: Some(Box::new(source)),
        }
    }

    /// Upstream answered with a non-success HTTP status
    pub fn status(url: &str, status: u16) -> Self {
        let hint = if status == 429 {
            " (the trends service is throttling requests, try again later)"
        } else {
            ""
        };
        Self::new(format!("Upstream returned status {status} for {url}{hint}"))
    }

    /// Human-readable cause text
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::with_source("Request timeout", err)
        } else {
            Self::with_source("HTTP request failed", err)
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source("Malformed upstream response", err)
    }
}

/// Errors raised while validating user-supplied parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No keyword left after splitting and trimming
    #[error("Please enter at least one keyword.")]
    NoKeywords,

    /// Category outside the service's range
    #[error("Category must be between 0 and {max}, got {value}")]
    CategoryOutOfRange { value: u32, max: u32 },

    /// Category field is not a whole number
    #[error("Category must be a whole number, got \"{0}\"")]
    InvalidCategory(String),

    /// Unknown timeframe token
    #[error("Unknown timeframe: {0}")]
    UnknownTimeframe(String),

    /// Unknown region resolution
    #[error("Unknown region resolution: {0}")]
    UnknownResolution(String),
}

/// Errors raised while building the choropleth figure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// Nothing to plot
    #[error("No regions to plot")]
    NoRegions,

    /// Some rows carry no region name
    #[error("Region names missing for {0} rows")]
    MissingNames(usize),

    /// Value column not among the result's keywords
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
}
