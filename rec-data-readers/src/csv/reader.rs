//! CSV table reader implementation

use std::fs::File;
use std::io::Read;
use std::path::Path;

use ::csv::{ReaderBuilder, StringRecord, Trim};
use rec_data_core::{ColumnOptions, RawValue, Table, TableBuilder, TableSchema};
use tracing::debug;

use crate::error::{Error, Result};

/// Options for CSV reader
#[derive(Debug, Clone)]
pub struct CsvReaderOptions {
    /// Whether the CSV has a header row
    pub has_header: bool,

    /// Delimiter character
    pub delimiter: u8,

    /// Quote character
    pub quote: u8,

    /// Whether to trim whitespace around fields
    pub trim: bool,

    /// Storage options of the resulting table
    pub column_options: ColumnOptions,
}

impl Default for CsvReaderOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            trim: false,
            column_options: ColumnOptions::default(),
        }
    }
}

/// Reads delimited interaction records into a [`Table`]
///
/// With a header row, CSV columns are matched to schema fields by name and
/// unused columns are ignored. Without one, the first columns are taken as
/// the schema's fields in declaration order.
#[derive(Debug, Clone)]
pub struct CsvTableReader {
    /// Schema of the table to build
    schema: TableSchema,

    /// Reader options
    options: CsvReaderOptions,
}

impl CsvTableReader {
    /// Create a reader for the given schema
    pub fn new(schema: TableSchema, options: CsvReaderOptions) -> Self {
        Self { schema, options }
    }

    /// Schema of the tables this reader builds
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Read a table from a file
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Table> {
        let file = File::open(path)?;
        self.read(file)
    }

    /// Read every record of `reader` into a frozen table
    pub fn read<R: Read>(&self, reader: R) -> Result<Table> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .has_headers(self.options.has_header)
            .trim(if self.options.trim { Trim::All } else { Trim::None })
            .flexible(true)
            .from_reader(reader);

        let columns = if self.options.has_header {
            self.header_columns(reader.headers()?)?
        } else {
            (0..self.schema.fields.len()).collect()
        };

        let mut builder = TableBuilder::new(self.schema.clone(), self.options.column_options)?;
        let mut record = StringRecord::new();
        let mut values = Vec::with_capacity(columns.len());
        let mut number = 0;
        while reader.read_record(&mut record)? {
            number += 1;
            values.clear();
            for &column in &columns {
                let text = record.get(column).ok_or_else(|| {
                    Error::Format(format!(
                        "Record {} has {} columns, field needs column {}",
                        number,
                        record.len(),
                        column + 1
                    ))
                })?;
                values.push(RawValue::from(text));
            }
            builder
                .append_row(&values)
                .map_err(|source| Error::Record { record: number, source })?;
        }

        debug!(records = number, fields = columns.len(), "Read CSV table");
        Ok(builder.build()?)
    }

    /// Column index of every schema field, resolved against the header
    fn header_columns(&self, header: &StringRecord) -> Result<Vec<usize>> {
        self.schema
            .fields
            .iter()
            .map(|field| {
                header
                    .iter()
                    .position(|name| name == field.name)
                    .ok_or_else(|| Error::Schema(format!("Header has no column for field '{}'", field.name)))
            })
            .collect()
    }
}
