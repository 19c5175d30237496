//! Error types for the evader crate

use thiserror::Error;

/// Main error type for the evader crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("malformed Q-table value '{value}' at line {line}, field {field}")]
    TableParse {
        line: usize,
        field: usize,
        value: String,
    },

    #[error("Q-table is flagged invalid by a failed load (line {line}, field {field})")]
    InvalidTable { line: usize, field: usize },

    #[error("invalid map at line {line}: {message}")]
    InvalidMap { line: usize, message: String },

    #[error("world has no walkable cells")]
    NoWalkableCells,

    #[error("cell ({x}, {y}) is not walkable")]
    UnwalkableCell { x: i32, y: i32 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}
