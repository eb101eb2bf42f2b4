//! Column-oriented interaction tables for recommender pipelines
//!
//! Raw interaction records are ingested into a [`TableBuilder`]: discrete
//! fields are dictionary-encoded to dense codes, continuous fields are stored
//! in chunked float columns. Freezing the builder yields an immutable
//! [`Table`], which can be bucketed by a discrete field with [`Partition`],
//! split into train/test position sets by the [`split`] module, and wrapped
//! into labelled views by the [`marker`] module.

#![warn(missing_docs)]

pub mod accessor;
pub mod chunk;
pub mod column;
pub mod dictionary;
pub mod error;
pub mod marker;
pub mod partition;
pub mod schema;
pub mod split;
pub mod table;

// Re-export key types for convenience
pub use accessor::{DataAccessor, RowView};
pub use chunk::{ChunkedArray, ColumnOptions};
pub use column::{ContinuousAttribute, ContinuousColumn, DiscreteColumn};
pub use dictionary::{AttributeDictionary, Code};
pub use error::{Error, Result};
pub use marker::{AttributeMarker, ConstantMarker, Marker};
pub use partition::Partition;
pub use schema::{DataType, RawValue, TableSchema, Value};
pub use split::{DataSplitter, Fold, SplitterConfig};
pub use table::{Table, TableBuilder};
