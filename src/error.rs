//! Typed error taxonomy for the gateway.
//!
//! Every fallible step of an operation (inbound validation, remote call,
//! local persistence) maps into one of these variants, so callers never
//! have to inspect transport internals to decide on a response.

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Inbound payload is missing required fields or is otherwise invalid.
    /// Detected locally, before any remote call is made.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Bearer credential missing, malformed, or failed verification.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The remote service refused the operation for the authenticated caller.
    #[error("forbidden")]
    Forbidden,

    /// The image does not exist, locally or remotely depending on the verb.
    #[error("not found")]
    NotFound,

    /// The remote service answered with a body that was not the JSON it
    /// promised, regardless of status code.
    #[error("remote response was not JSON: {0}")]
    Content(String),

    /// Any other non-success remote outcome, carried verbatim.
    #[error("remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Connection-level failure talking to the remote service.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Local persistence failure. Never triggers a compensating remote
    /// call; the inconsistency window is accepted.
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl Error {
    /// Create a bad request error.
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::BadRequest(reason.into())
    }

    /// Create an unauthorized error.
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    /// Create a remote error from a status code and response body.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }
}

/// Convert gateway error to HTTP status code.
impl Error {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Remote { status, .. } => *status,
            Self::Content(_) | Self::Transport(_) => 502,
            Self::Store(_) => 500,
        }
    }
}
