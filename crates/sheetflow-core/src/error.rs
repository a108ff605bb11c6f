// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for sheetflow.

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum SheetflowError {
    /// Configuration errors (invalid TOML, bad ranges, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Startup credentials or connection settings are missing or unusable.
    ///
    /// Fatal: raised while constructing a store or client, never mid-session.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// The external data source could not be read (network, auth, quota, I/O).
    #[error("source unavailable: {message}")]
    Source {
        message: String,
        source: Option<BoxedSource>,
    },

    /// The named sheet does not exist in the source.
    #[error("sheet `{sheet}` not found")]
    SheetNotFound { sheet: String },

    /// A write to the external data source failed.
    #[error("write failed: {message}")]
    Write {
        message: String,
        source: Option<BoxedSource>,
    },

    /// Completion service errors (API failure, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<BoxedSource>,
    },

    /// Chat history could not be read or persisted.
    #[error("history error: {message}")]
    History {
        message: String,
        source: Option<BoxedSource>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SheetflowError {
    /// Shorthand for a [`SheetflowError::Source`] without an underlying cause.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`SheetflowError::Write`] without an underlying cause.
    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
            source: None,
        }
    }
}
