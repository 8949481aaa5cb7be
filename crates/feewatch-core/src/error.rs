//! Core error types for feewatch-core.
//!
//! Every public operation returns a `Result`; nothing in the core is
//! allowed to panic past its own boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for feewatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Fee API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Settings storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Settings value errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Badge/notification sink errors
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Errors from the fee source client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request exceeded the fixed timeout
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Non-success HTTP status
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// Connection-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The configured base URL could not be parsed
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Errors from the settings store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read the settings file
    #[error("failed to read settings from {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },

    /// Failed to write the settings file
    #[error("failed to write settings to {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    /// Failed to parse or serialize the settings record
    #[error("failed to parse settings: {0}")]
    ParseFailed(String),

    /// Config directory could not be resolved or created
    #[error("config directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Errors from keyed settings access.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Key does not name a settable field
    #[error("unknown settings key: {0}")]
    UnknownKey(String),

    /// Value rejected by validation
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the host badge/notification sinks.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Badge rendering failed
    #[error("badge sink: {0}")]
    Badge(String),

    /// Notification dispatch failed
    #[error("notification sink: {0}")]
    Notification(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
