//! Error type returned by the analysis engine.
//!
//! The engine degrades gracefully for malformed data, so the only conditions
//! that surface as errors are invalid caller options and undecodable input
//! handed over by the loaders in [`crate::io_utils`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsightError {
    /// An option was outside the range the computation is defined for.
    #[error("Invalid argument '{name}': {message}")]
    InvalidArgument { name: &'static str, message: String },
    /// Input could not be decoded into rows or usage records.
    #[error("Failed to parse input: {0}")]
    Parse(String),
}

impl InsightError {
    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        InsightError::InvalidArgument {
            name,
            message: message.into(),
        }
    }
}

pub type InsightResult<T> = std::result::Result<T, InsightError>;
