//! Column implementations for discrete codes and continuous values

use std::sync::Arc;

use crate::chunk::{ChunkedArray, ColumnOptions, Iter};
use crate::dictionary::Code;
use crate::error::{Error, Result};
use crate::schema::{DataType, RawValue};

/// Descriptor of a continuous attribute: a name and a declared numeric type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuousAttribute {
    /// Name of the attribute
    name: String,

    /// Declared numeric type
    data_type: DataType,
}

impl ContinuousAttribute {
    /// Create a continuous attribute
    pub fn new(name: &str, data_type: DataType) -> Result<Self> {
        if !data_type.is_numeric() {
            return Err(Error::invalid(format!(
                "Continuous attribute '{}' must be numeric, got {}",
                name, data_type
            )));
        }

        Ok(Self {
            name: name.to_string(),
            data_type,
        })
    }

    /// Name of the attribute
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the attribute
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Convert a raw value to the stored float representation
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn convert(&self, raw: &RawValue) -> Result<f32> {
        let converted = match (self.data_type, raw) {
            (_, RawValue::Integer(value)) => Some(*value as f32),
            (DataType::Float, RawValue::Float(value)) => Some(*value as f32),
            (DataType::Float, RawValue::Text(text)) => text.trim().parse::<f32>().ok(),
            (DataType::Integer, RawValue::Float(value)) if value.fract() == 0.0 => Some(*value as f32),
            (DataType::Integer, RawValue::Text(text)) => {
                text.trim().parse::<i64>().ok().map(|value| value as f32)
            }
            _ => None,
        };

        converted.ok_or_else(|| Error::TypeConversion {
            attribute: self.name.clone(),
            value: format!("{:?}", raw),
            expected: self.data_type,
        })
    }
}

/// Chunked append-only float storage for one numeric field
#[derive(Debug, Clone)]
pub struct ContinuousColumn {
    /// Name of the field
    name: String,

    /// Attribute converting raw values for this column
    attribute: Arc<ContinuousAttribute>,

    /// Stored values
    values: ChunkedArray<f32>,
}

impl ContinuousColumn {
    /// Create an empty column
    pub fn new(name: &str, attribute: Arc<ContinuousAttribute>, options: ColumnOptions) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            attribute,
            values: ChunkedArray::new(options)?,
        })
    }

    /// Name of the field
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute of the field
    pub fn attribute(&self) -> &Arc<ContinuousAttribute> {
        &self.attribute
    }

    /// Convert `raw` through the attribute and append it at the next position
    pub fn append(&mut self, raw: impl Into<RawValue>) -> Result<()> {
        let value = self.attribute.convert(&raw.into())?;
        self.values.push(value);
        Ok(())
    }

    pub(crate) fn push(&mut self, value: f32) {
        self.values.push(value);
    }

    /// Number of stored values
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Value at `position`, if in range
    pub fn get(&self, position: usize) -> Option<f32> {
        self.values.get(position)
    }

    /// Value at `position`
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range.
    #[inline]
    pub fn value(&self, position: usize) -> f32 {
        match self.values.get(position) {
            Some(value) => value,
            None => panic!("position {} out of range for column '{}' of size {}", position, self.name, self.size()),
        }
    }

    /// Iterate over all values in insertion order
    pub fn iter(&self) -> Iter<'_, f32> {
        self.values.iter()
    }
}

/// Chunked code storage for one dictionary-encoded field
#[derive(Debug, Clone)]
pub struct DiscreteColumn {
    /// Name of the field
    name: String,

    /// Index of the dictionary coding this field, within its table
    dictionary: usize,

    /// Stored codes
    codes: ChunkedArray<Code>,
}

impl DiscreteColumn {
    /// Create an empty column coded by the dictionary at `dictionary`
    pub fn new(name: &str, dictionary: usize, options: ColumnOptions) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            dictionary,
            codes: ChunkedArray::new(options)?,
        })
    }

    /// Name of the field
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the dictionary coding this field
    pub fn dictionary(&self) -> usize {
        self.dictionary
    }

    /// Append a code at the next position
    pub fn push(&mut self, code: Code) {
        self.codes.push(code);
    }

    /// Number of stored codes
    pub fn size(&self) -> usize {
        self.codes.len()
    }

    /// Code at `position`, if in range
    pub fn get(&self, position: usize) -> Option<Code> {
        self.codes.get(position)
    }

    /// Code at `position`
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range.
    #[inline]
    pub fn code(&self, position: usize) -> Code {
        match self.codes.get(position) {
            Some(code) => code,
            None => panic!("position {} out of range for column '{}' of size {}", position, self.name, self.size()),
        }
    }

    /// Iterate over all codes in insertion order
    pub fn iter(&self) -> Iter<'_, Code> {
        self.codes.iter()
    }
}
