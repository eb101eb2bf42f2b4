//! Dictionary encoding of discrete attribute values
//!
//! An [`AttributeDictionary`] maps every distinct value it has seen to a dense
//! code. Codes are handed out sequentially in first-seen order and are never
//! reassigned, so `values()[code]` always reproduces the interned value.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::schema::{DataType, RawValue, Value};

/// Dense code of a dictionary-encoded value
pub type Code = u32;

/// Bidirectional value/code mapping for one discrete attribute
#[derive(Debug, Clone)]
pub struct AttributeDictionary {
    /// Name of the attribute
    name: String,

    /// Declared type values are converted to
    data_type: DataType,

    /// Mapping from values to codes
    value_to_code: HashMap<Value, Code>,

    /// Mapping from codes to values
    code_to_value: Vec<Value>,
}

impl AttributeDictionary {
    /// Create an empty dictionary
    pub fn new(name: &str, data_type: DataType) -> Result<Self> {
        if !data_type.is_discrete() {
            return Err(Error::invalid(format!(
                "Attribute '{}' cannot be dictionary-encoded as {}",
                name, data_type
            )));
        }

        Ok(Self {
            name: name.to_string(),
            data_type,
            value_to_code: HashMap::new(),
            code_to_value: Vec::new(),
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

    /// Convert `raw` to the declared type and return its code, interning it
    /// if it has not been seen before
    pub fn make_value(&mut self, raw: impl Into<RawValue>) -> Result<Code> {
        let value = self.convert(&raw.into())?;
        self.intern(value)
    }

    /// Convert `raw` to the declared type without touching the dictionary
    pub fn convert(&self, raw: &RawValue) -> Result<Value> {
        let converted = match (self.data_type, raw) {
            (DataType::String, RawValue::Text(text)) => Some(Value::String(text.clone())),
            (DataType::String, other) => Some(Value::String(other.to_string())),

            (DataType::Integer, RawValue::Integer(value)) => Some(Value::Integer(*value)),
            (DataType::Integer, RawValue::Float(value)) => integral(*value).map(Value::Integer),
            (DataType::Integer, RawValue::Text(text)) => text.trim().parse().ok().map(Value::Integer),

            (DataType::Boolean, RawValue::Boolean(value)) => Some(Value::Boolean(*value)),
            (DataType::Boolean, RawValue::Integer(0)) => Some(Value::Boolean(false)),
            (DataType::Boolean, RawValue::Integer(1)) => Some(Value::Boolean(true)),
            (DataType::Boolean, RawValue::Text(text)) => parse_bool(text).map(Value::Boolean),

            _ => None,
        };

        converted.ok_or_else(|| Error::TypeConversion {
            attribute: self.name.clone(),
            value: format!("{:?}", raw),
            expected: self.data_type,
        })
    }

    /// Return the code of an already converted value, assigning the next
    /// sequential code on first sight
    pub fn intern(&mut self, value: Value) -> Result<Code> {
        if let Some(&code) = self.value_to_code.get(&value) {
            return Ok(code);
        }

        self.check_room(1)?;
        let code = Code::try_from(self.code_to_value.len()).map_err(|_| self.full())?;
        self.value_to_code.insert(value.clone(), code);
        self.code_to_value.push(value);
        Ok(code)
    }

    /// Fail unless `additional` new values can still be given codes
    pub fn check_room(&self, additional: usize) -> Result<()> {
        if has_room(self.code_to_value.len(), additional) {
            Ok(())
        } else {
            Err(self.full())
        }
    }

    fn full(&self) -> Error {
        Error::invalid(format!("Dictionary for '{}' is full", self.name))
    }

    /// Code of a value, if it has been interned
    pub fn code_of(&self, value: &Value) -> Option<Code> {
        self.value_to_code.get(value).copied()
    }

    /// Value behind a code
    pub fn value(&self, code: Code) -> Option<&Value> {
        self.code_to_value.get(code as usize)
    }

    /// Number of distinct values seen so far
    pub fn size(&self) -> usize {
        self.code_to_value.len()
    }

    /// Check if no value has been interned yet
    pub fn is_empty(&self) -> bool {
        self.code_to_value.is_empty()
    }

    /// All interned values, indexed by code
    pub fn values(&self) -> &[Value] {
        &self.code_to_value
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then(|| value as i64)
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

/// Whether a dictionary holding `len` values can code `additional` more
fn has_room(len: usize, additional: usize) -> bool {
    let capacity = u64::from(Code::MAX) + 1;
    match (u64::try_from(len), u64::try_from(additional)) {
        (Ok(len), Ok(additional)) => len.saturating_add(additional) <= capacity,
        _ => false,
    }
}
