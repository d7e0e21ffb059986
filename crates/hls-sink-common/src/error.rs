//! Common error type used throughout hls-sink.
//!
//! Every failure a request can hit funnels into [`Error`], which carries
//! enough context for the HTTP layer to derive a status code via
//! [`Error::http_status`].

/// Common error type for hls-sink.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The origin URL could not be parsed or has no usable host/file name.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The stored artifact differs from the one being submitted.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidUrl(_) => 400,
            Error::Validation(_) => 400,
            Error::Conflict(_) => 409,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidUrl(_) => "invalid_url",
            Error::Validation(_) => "validation_error",
            Error::Conflict(_) => "conflict",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Create a new InvalidUrl error.
    pub fn invalid_url<S: Into<String>>(msg: S) -> Self {
        Self::InvalidUrl(msg.into())
    }

    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new Conflict error.
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
