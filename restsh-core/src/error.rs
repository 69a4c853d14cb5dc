//! Error types for restsh.

use std::io;
use thiserror::Error;

/// Result type for restsh operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while tokenizing, dispatching or replaying.
#[derive(Debug, Error)]
pub enum Error {
    /// A quoted region was opened but never closed.
    #[error("mismatched quotes")]
    Tokenize,

    /// The base URL and path could not be combined into a valid URL.
    #[error("cannot resolve url: {0}")]
    UrlResolution(String),

    /// The request could not be constructed.
    #[error("cannot build request: {0}")]
    RequestBuild(String),

    /// Transport-level failure while sending the request.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be read in full.
    #[error("cannot read response body: {0}")]
    BodyRead(String),

    /// One side of a body comparison is not a JSON object.
    #[error("invalid json: {0}")]
    JsonDecode(String),

    /// The observed status code differs from the expected one.
    #[error("wanted status {expected}, got {actual}: {body}")]
    StatusMismatch {
        /// Status text from the expectation line
        expected: String,
        /// Status code the server actually returned
        actual: u16,
        /// Body the server returned alongside the unexpected status
        body: String,
    },

    /// The observed body differs structurally from the expected one.
    #[error("body mismatch: {expected} != {actual}")]
    BodyMismatch {
        /// JSON text from the expectation line
        expected: String,
        /// Body the server actually returned
        actual: String,
    },

    /// A replay script violated the directive/expectation pairing.
    /// Always fatal, regardless of continue-on-error.
    #[error("script format error: {0}")]
    ScriptFormat(String),

    /// A command line that maps to no known command or has the wrong arity.
    #[error("invalid args: {0:?}")]
    InvalidCommand(Vec<String>),

    /// I/O error while reading a replay script.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
