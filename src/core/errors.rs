/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use thiserror::Error;

/// Request/response codec errors
///
/// A codec error never stops the server: the offending record is skipped
/// (decode side) or the response is dropped (encode side) and logged.
#[derive(Error, Debug, Diagnostic)]
pub enum CodecError {
    #[error("Malformed request: {0}")]
    #[diagnostic(
        code(codec::malformed),
        help("The record could not be parsed as JSON. It is skipped and decoding resumes.")
    )]
    Malformed(String),

    #[error("Invalid request: {0}")]
    #[diagnostic(
        code(codec::invalid_request),
        help("The record is valid JSON but lacks a required field or has the wrong type.")
    )]
    InvalidRequest(String),

    #[error("Failed to encode response: {0}")]
    #[diagnostic(code(codec::encode_failed))]
    Encode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    #[diagnostic(code(codec::io))]
    Io(#[from] std::io::Error),
}

/// Launch configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid worker count: {0}")]
    #[diagnostic(
        code(config::invalid_workers),
        help("Pass a positive integer to run in parallel mode, or no argument for sequential mode.")
    )]
    InvalidWorkers(String),

    #[error("Invalid reader limit: {0}")]
    #[diagnostic(
        code(config::invalid_max_readers),
        help("TIMELINE_MAX_READERS must be a positive integer.")
    )]
    InvalidMaxReaders(String),

    #[error("Unexpected arguments: {0}")]
    #[diagnostic(
        code(config::unexpected_arguments),
        help("Usage: timeline-server [WORKERS]")
    )]
    UnexpectedArguments(String),
}

/// Unified server error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to spawn worker thread: {0}")]
    #[diagnostic(
        code(server::spawn_failed),
        help("The system refused to create another thread. Try a smaller worker count.")
    )]
    Spawn(#[source] std::io::Error),
}

pub type CodecResult<T> = Result<T, CodecError>;
pub type ServerResult<T> = Result<T, ServerError>;
