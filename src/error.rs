//! Error taxonomy for the knowledge-base client.
//!
//! Every manager and transport call returns [`Result`]. Nothing in the
//! library panics on an expected failure; the caller decides whether to
//! render, retry, or abort.
//!
//! | Variant | Raised by | When |
//! |---------|-----------|------|
//! | [`Error::Config`] | [`Credentials`](crate::config::Credentials) | API key or base URL missing at startup |
//! | [`Error::Api`] | [`Transport`](crate::transport::Transport) | HTTP status ≥ 400 or no response at all |
//! | [`Error::InvalidArgument`] | managers | bad enum value or empty identifier, before any request |
//! | [`Error::FileNotFound`] | document uploads | local path does not exist, before any request |

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the knowledge-base client.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Missing or empty credentials. Fatal, never retryable.
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote API rejected the request, or no response was received.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A local argument failed validation before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An upload path does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// An upload path exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A local value could not be serialized or a body could not be decoded
    /// into the requested type.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the wrapped [`ApiError`], if this is a remote failure.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// A failure reported by the remote API or by the HTTP layer underneath it.
///
/// `status` is the HTTP status code, or `0` when the request never produced
/// a response (DNS, connect, timeout).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{code}] {message} (Status: {status})")]
pub struct ApiError {
    pub message: String,
    pub code: String,
    pub status: u16,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            status,
        }
    }

    /// True when no HTTP response was received.
    pub fn is_network(&self) -> bool {
        self.status == 0
    }
}
