//! Error types for record readers

use thiserror::Error;

/// Error type for record readers
#[derive(Error, Debug)]
pub enum Error {
    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] rec_data_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV format error
    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Input does not match the table schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// Malformed record
    #[error("Format error: {0}")]
    Format(String),

    /// A record was rejected during ingestion
    #[error("Record {record}: {source}")]
    Record {
        /// 1-based number of the record, not counting the header
        record: usize,

        /// Ingestion error
        #[source]
        source: rec_data_core::Error,
    },
}

/// Result type for record readers
pub type Result<T> = std::result::Result<T, Error>;
