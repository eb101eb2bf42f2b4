//! Error types for table ingestion, partitioning and splitting

use thiserror::Error;

use crate::schema::DataType;

/// Result type for rec-data operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rec-data operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid argument (buffer sizes, unknown names, ratios, schema problems)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A raw value could not be coerced to the declared type of an attribute
    #[error("Cannot convert {value:?} to {expected} for attribute '{attribute}'")]
    TypeConversion {
        /// Name of the attribute doing the conversion
        attribute: String,

        /// Debug rendering of the rejected raw value
        value: String,

        /// Declared type of the attribute
        expected: DataType,
    },

    /// Index out of bounds
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,

        /// Number of valid indices
        len: usize,
    },

    /// Malformed JSON configuration
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}
