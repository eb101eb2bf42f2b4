//! Schema definitions: value types, attributes and the fields that use them

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Declared type of an attribute's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Boolean flag
    Boolean,

    /// 64-bit signed integer
    Integer,

    /// Floating point number
    Float,

    /// UTF-8 string
    String,
}

impl DataType {
    /// Whether a continuous attribute may declare this type
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }

    /// Whether a discrete attribute may declare this type
    pub fn is_discrete(&self) -> bool {
        matches!(self, DataType::Boolean | DataType::Integer | DataType::String)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "Boolean"),
            DataType::Integer => write!(f, "Integer"),
            DataType::Float => write!(f, "Float"),
            DataType::String => write!(f, "String"),
        }
    }
}

/// An untyped value handed to ingestion, before conversion to a declared type
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Textual value, as read from a delimited file
    Text(String),

    /// Integer value
    Integer(i64),

    /// Floating point value
    Float(f64),

    /// Boolean value
    Boolean(bool),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(text) => write!(f, "{}", text),
            RawValue::Integer(value) => write!(f, "{}", value),
            RawValue::Float(value) => write!(f, "{}", value),
            RawValue::Boolean(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Integer(i64::from(value))
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        RawValue::Integer(i64::from(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<f32> for RawValue {
    fn from(value: f32) -> Self {
        RawValue::Float(f64::from(value))
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Boolean(value)
    }
}

/// A typed discrete value, the key of an attribute dictionary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value
    Boolean(bool),

    /// Integer value
    Integer(i64),

    /// String value
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Integer(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
        }
    }
}

/// Whether an attribute is dictionary-encoded or stored as floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Categorical values, dictionary-encoded to dense codes
    Discrete,

    /// Numeric values, stored in chunked float columns
    Continuous,
}

/// Declaration of an attribute: a named value domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Name of the attribute
    pub name: String,

    /// Discrete or continuous storage
    pub kind: AttributeKind,

    /// Declared value type
    pub data_type: DataType,
}

/// Declaration of a field: a named column whose values come from an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Name of the field
    pub name: String,

    /// Name of the attribute coding this field
    pub attribute: String,
}

/// Schema of an interaction table
///
/// Attributes are value domains; fields are the table's columns. Several
/// fields may share one attribute, in which case they share one dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Declared attributes
    pub attributes: Vec<AttributeSpec>,

    /// Declared fields, in column order
    pub fields: Vec<FieldSpec>,
}

impl TableSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a schema from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let schema: Self = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Declare a discrete attribute
    pub fn discrete(mut self, name: &str, data_type: DataType) -> Self {
        self.attributes.push(AttributeSpec {
            name: name.to_string(),
            kind: AttributeKind::Discrete,
            data_type,
        });
        self
    }

    /// Declare a continuous attribute
    pub fn continuous(mut self, name: &str, data_type: DataType) -> Self {
        self.attributes.push(AttributeSpec {
            name: name.to_string(),
            kind: AttributeKind::Continuous,
            data_type,
        });
        self
    }

    /// Declare a field coded by an already declared attribute
    pub fn field(mut self, name: &str, attribute: &str) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            attribute: attribute.to_string(),
        });
        self
    }

    /// Declare a discrete attribute and a field of the same name
    pub fn discrete_field(self, name: &str, data_type: DataType) -> Self {
        self.discrete(name, data_type).field(name, name)
    }

    /// Declare a continuous attribute and a field of the same name
    pub fn continuous_field(self, name: &str, data_type: DataType) -> Self {
        self.continuous(name, data_type).field(name, name)
    }

    /// Look up an attribute declaration by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// Position of a field in declaration order
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Check names are unique, fields resolve, and types fit their kinds
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.attributes.len());
        for attribute in &self.attributes {
            if !seen.insert(attribute.name.as_str()) {
                return Err(Error::invalid(format!("Duplicate attribute: {}", attribute.name)));
            }
            let allowed = match attribute.kind {
                AttributeKind::Discrete => attribute.data_type.is_discrete(),
                AttributeKind::Continuous => attribute.data_type.is_numeric(),
            };
            if !allowed {
                return Err(Error::invalid(format!(
                    "Attribute '{}' cannot be {:?} with type {}",
                    attribute.name, attribute.kind, attribute.data_type
                )));
            }
        }

        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(Error::invalid(format!("Duplicate field: {}", field.name)));
            }
            if self.attribute(&field.attribute).is_none() {
                return Err(Error::invalid(format!(
                    "Field '{}' references unknown attribute '{}'",
                    field.name, field.attribute
                )));
            }
        }

        Ok(())
    }
}
