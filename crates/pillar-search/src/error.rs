use thiserror::Error;

/// Search failure taxonomy. A request superseded by a newer one is not an
/// error at all: its outcome is dropped before it can reach a listener.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network-level failure: connect, timeout, body read
    #[error("search request failed: {0}")]
    Transport(String),
    /// Non-2xx backend response
    #[error("{message}")]
    Backend { status: u16, message: String },
    /// Response body did not match any known backend shape
    #[error("unrecognized search response: {0}")]
    Shape(String),
}

impl SearchError {
    /// Message suitable for the `Error` event: the backend-provided message
    /// when there is one, otherwise the error's own description.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Transport(err.to_string())
    }
}
