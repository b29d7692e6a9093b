//! Error types for the search engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid pagination cursor")]
    InvalidCursor,

    #[error("Query execution error: {0}")]
    QueryExecution(String),

    #[error("Search cancelled")]
    Cancelled,

    #[error("Operation too costly: {0}")]
    TooCostly(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether this error should surface to the caller as a client error
    /// (HTTP 400-equivalent) rather than a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::InvalidCursor | Error::TooCostly(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_classification() {
        assert!(Error::Validation("bad".into()).is_client_error());
        assert!(Error::InvalidCursor.is_client_error());
        assert!(!Error::QueryExecution("timeout".into()).is_client_error());
        assert!(!Error::Cancelled.is_client_error());
    }
}
