use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid YAML: {0}")]
    InvalidDocument(String),

    #[error("Could not find '{0}' field")]
    MissingField(&'static str),

    /// One message per malformed matrix row, newline-separated.
    #[error("{0}")]
    MalformedMatrix(String),
}
