//! Record readers for rec-data tables
//!
//! Readers turn raw interaction records into frozen [`Table`]s, driving the
//! dictionaries and columns of a [`rec_data_core::TableBuilder`] one record at
//! a time.

#![warn(missing_docs)]

mod error;

#[cfg(feature = "csv")]
pub mod csv;

pub use error::{Error, Result};

// Re-export core types
pub use rec_data_core::{ColumnOptions, DataType, Table, TableSchema};
