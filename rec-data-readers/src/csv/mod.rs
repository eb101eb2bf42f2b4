//! CSV ingestion into interaction tables
//!
//! Each record is converted field by field through the table's dictionaries
//! and continuous attributes; the first record that fails conversion aborts
//! the read with its record number.

mod reader;

pub use reader::{CsvReaderOptions, CsvTableReader};
