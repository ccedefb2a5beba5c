//! Client-side error type.

/// Failure of a single page request.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request was cancelled before it completed. Never retried.
    #[error("request cancelled")]
    Cancelled,

    /// Transport failure (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
