//! Unified error handling for the trendscope crate
//!
//! Domain errors live in [`crate::utils::error`]; this module wraps them,
//! together with the I/O and templating errors of the surrounding glue, into
//! a single [`Error`] enum.
//!
//! Stage failures never travel through this type: the dashboard keeps them
//! as per-stage results so that one failing lookup does not abort the run.

use std::io;
use thiserror::Error;

pub use crate::utils::error::{FetchError, MapError, ValidationError};

/// Unified error type for the trendscope crate
#[derive(Error, Debug)]
pub enum Error {
    /// Trends service errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Invalid user input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Page template could not be registered
    #[error("Template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    /// Page could not be rendered
    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<handlebars::TemplateError> for Error {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(Box::new(err))
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_conversion() {
        let err: Error = FetchError::new("timed out").into();
        assert!(matches!(err, Error::Fetch(_)));
        assert_eq!(err.to_string(), "Fetch error: timed out");
    }

    #[test]
    fn test_validation_conversion() {
        let err: Error = ValidationError::NoKeywords.into();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation error: Please enter at least one keyword."
        );
    }

    #[test]
    fn test_template_conversion() {
        let mut hb = handlebars::Handlebars::new();
        let template_err = hb.register_template_string("bad", "{{#if}}").unwrap_err();
        let err: Error = template_err.into();
        assert!(matches!(err, Error::Template(_)));
    }

    #[test]
    fn test_io_conversion() {
        let err: Error = io::Error::new(io::ErrorKind::AddrInUse, "port taken").into();
        assert_eq!(err.to_string(), "I/O error: port taken");
    }
}
