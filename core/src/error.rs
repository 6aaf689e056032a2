//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// Which value a runtime validation failure was raised against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ValidationTarget {
    /// The caller-supplied query object.
    #[display("query")]
    Query,
    /// The caller-supplied request body.
    #[display("body")]
    Body,
    /// The parsed response payload.
    #[display("response")]
    Response,
}

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The spec could not be read, parsed, or is structurally unusable.
    #[from(ignore)]
    #[display("Input Error: {_0}")]
    Input(String),

    /// Missing or invalid client configuration, raised before any network I/O.
    #[from(ignore)]
    #[display("Configuration Error: {_0}")]
    Config(String),

    /// A schema shape was rejected while compiling in strict mode.
    #[from(ignore)]
    #[display("Compile Error: {_0}")]
    Compile(String),

    /// A query, body or response failed its validator.
    #[from(ignore)]
    #[display("Validation Error ({target}): {path}: {message}")]
    Validation {
        /// The value that was being validated.
        target: ValidationTarget,
        /// Dotted path to the offending value (`$` for the root).
        path: String,
        /// Human readable reason.
        message: String,
    },

    /// The server answered with a non-success status.
    #[from(ignore)]
    #[display("Request failed with status {status} {status_text}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// HTTP reason phrase.
        status_text: String,
        /// The parsed response body, kept for diagnostics.
        body: serde_json::Value,
    },

    /// The transport could not complete the exchange.
    #[from(ignore)]
    #[display("Transport Error: {_0}")]
    Transport(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
