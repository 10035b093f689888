// src/error.rs

//! Unified error handling for the outage crawler.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// None of these are retried. Any of them aborts the current run, and the
/// open run transaction is rolled back when it is dropped.
#[derive(Error, Debug)]
pub enum AppError {
    /// Non-200 or redirect response, or a transport failure
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Response body could not be decoded
    #[error("Decode error for {context}: {message}")]
    Decode { context: String, message: String },

    /// Upstream timestamp did not match the expected format
    #[error("Timestamp parse error for '{value}': {message}")]
    TimestampParse { value: String, message: String },

    /// SQLite failure, including constraint violations
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error for a URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a decode error with context.
    pub fn decode(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a timestamp parse error.
    pub fn timestamp(value: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::TimestampParse {
            value: value.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Fetch { .. } => 2,
            Self::Decode { .. } | Self::TimestampParse { .. } => 3,
            Self::Store(_) => 4,
            Self::Io(_) | Self::Toml(_) | Self::Config(_) | Self::Validation(_) => 1,
        }
    }
}
