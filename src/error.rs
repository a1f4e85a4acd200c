// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed record or record-set input (extra keys, wrong value
    /// types, empty content).
    #[error("invalid record data: {0}")]
    Validation(String),

    /// A zone or record name that must be canonical does not end in '.'.
    #[error("name is not canonical: {0}")]
    Canonical(String),

    /// A non-2xx API outcome, carrying the offending URL and the message
    /// extracted from the response body.
    #[error("API error {status_code} at {url}: {message}")]
    Transport {
        url: String,
        status_code: u16,
        message: String,
    },

    /// Connection-level failure before any status line was obtained.
    #[error("http request failed")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response payload")]
    Json(#[from] serde_json::Error),

    #[error("backup file i/o failed")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn canonical(name: impl Into<String>) -> Self {
        Error::Canonical(name.into())
    }

    /// Status code of the API error, if this is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Transport { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
