//! Position-aligned interaction tables and their builder
//!
//! A [`TableBuilder`] is the only mutable stage: it owns the dictionaries and
//! columns while records are appended. [`TableBuilder::build`] freezes them
//! into a [`Table`], which has no mutating API and can be shared freely
//! between readers.

use std::collections::HashMap;
use std::sync::Arc;

use static_assertions::assert_impl_all;
use tracing::debug;

use crate::accessor::DataAccessor;
use crate::chunk::ColumnOptions;
use crate::column::{ContinuousAttribute, ContinuousColumn, DiscreteColumn};
use crate::dictionary::{AttributeDictionary, Code};
use crate::error::{Error, Result};
use crate::schema::{AttributeKind, RawValue, TableSchema, Value};

/// Where a declared field is stored
#[derive(Debug, Clone, Copy)]
enum Slot {
    Discrete(usize),
    Continuous(usize),
}

enum Converted {
    Discrete(Value),
    Continuous(f32),
}

/// Mutable ingestion stage of a table
#[derive(Debug)]
pub struct TableBuilder {
    /// Schema the table was declared with
    schema: TableSchema,

    /// Dictionaries of the discrete attributes, in declaration order
    dictionaries: Vec<AttributeDictionary>,

    /// Discrete columns, in field declaration order
    discrete: Vec<DiscreteColumn>,

    /// Continuous columns, in field declaration order
    continuous: Vec<ContinuousColumn>,

    /// Storage slot of each declared field
    slots: Vec<Slot>,

    /// Number of appended rows
    row_count: usize,
}

impl TableBuilder {
    /// Create a builder for the given schema
    pub fn new(schema: TableSchema, options: ColumnOptions) -> Result<Self> {
        schema.validate()?;

        let mut dictionaries = Vec::new();
        let mut dictionary_indices = HashMap::new();
        let mut continuous_attributes = HashMap::new();
        for attribute in &schema.attributes {
            match attribute.kind {
                AttributeKind::Discrete => {
                    dictionary_indices.insert(attribute.name.as_str(), dictionaries.len());
                    dictionaries.push(AttributeDictionary::new(&attribute.name, attribute.data_type)?);
                }
                AttributeKind::Continuous => {
                    let descriptor = ContinuousAttribute::new(&attribute.name, attribute.data_type)?;
                    continuous_attributes.insert(attribute.name.as_str(), Arc::new(descriptor));
                }
            }
        }

        let mut discrete = Vec::new();
        let mut continuous = Vec::new();
        let mut slots = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let attribute = field.attribute.as_str();
            if let Some(&dictionary) = dictionary_indices.get(attribute) {
                slots.push(Slot::Discrete(discrete.len()));
                discrete.push(DiscreteColumn::new(&field.name, dictionary, options)?);
            } else if let Some(descriptor) = continuous_attributes.get(attribute) {
                slots.push(Slot::Continuous(continuous.len()));
                continuous.push(ContinuousColumn::new(&field.name, Arc::clone(descriptor), options)?);
            } else {
                return Err(Error::invalid(format!("Unknown attribute: {}", attribute)));
            }
        }

        Ok(Self {
            schema,
            dictionaries,
            discrete,
            continuous,
            slots,
            row_count: 0,
        })
    }

    /// Schema of the table being built
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Number of rows appended so far
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Dictionary of a discrete attribute
    pub fn dictionary(&self, attribute: &str) -> Option<&AttributeDictionary> {
        self.dictionaries.iter().find(|dictionary| dictionary.name() == attribute)
    }

    /// Append one record, given as one raw value per declared field in field
    /// order
    ///
    /// Every value is converted, and every dictionary checked for room for its
    /// new values, before any dictionary or column is touched, so a record
    /// that fails leaves the builder unchanged.
    pub fn append_row(&mut self, values: &[RawValue]) -> Result<()> {
        if values.len() != self.slots.len() {
            return Err(Error::invalid(format!(
                "Record has {} values, schema declares {} fields",
                values.len(),
                self.slots.len()
            )));
        }

        let mut converted = Vec::with_capacity(values.len());
        for (slot, raw) in self.slots.iter().zip(values) {
            converted.push(match *slot {
                Slot::Discrete(dimension) => {
                    let dictionary = self.discrete[dimension].dictionary();
                    Converted::Discrete(self.dictionaries[dictionary].convert(raw)?)
                }
                Slot::Continuous(dimension) => {
                    Converted::Continuous(self.continuous[dimension].attribute().convert(raw)?)
                }
            });
        }

        self.check_room(&converted)?;

        for (slot, value) in self.slots.iter().zip(converted) {
            match (*slot, value) {
                (Slot::Discrete(dimension), Converted::Discrete(value)) => {
                    let column = &mut self.discrete[dimension];
                    let code = self.dictionaries[column.dictionary()].intern(value)?;
                    column.push(code);
                }
                (Slot::Continuous(dimension), Converted::Continuous(value)) => {
                    self.continuous[dimension].push(value);
                }
                _ => unreachable!("conversion follows the slot kind"),
            }
        }

        self.row_count += 1;
        Ok(())
    }

    /// Fail if interning the new values of a converted row would overflow a
    /// dictionary; fields sharing a dictionary count a repeated value once
    fn check_room(&self, converted: &[Converted]) -> Result<()> {
        let mut fresh: Vec<(usize, &Value)> = Vec::new();
        for (slot, value) in self.slots.iter().zip(converted) {
            if let (Slot::Discrete(dimension), Converted::Discrete(value)) = (*slot, value) {
                let dictionary = self.discrete[dimension].dictionary();
                let seen = self.dictionaries[dictionary].code_of(value).is_some()
                    || fresh.contains(&(dictionary, value));
                if !seen {
                    fresh.push((dictionary, value));
                }
            }
        }

        for (index, dictionary) in self.dictionaries.iter().enumerate() {
            let additional = fresh.iter().filter(|(owner, _)| *owner == index).count();
            if additional > 0 {
                dictionary.check_room(additional)?;
            }
        }
        Ok(())
    }

    /// Append one record from anything convertible to raw values
    pub fn append<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<RawValue>,
    {
        let values: Vec<RawValue> = values.into_iter().map(Into::into).collect();
        self.append_row(&values)
    }

    /// Freeze the builder into an immutable table
    pub fn build(self) -> Result<Table> {
        Table::from_parts(self.dictionaries, self.discrete, self.continuous)
    }
}

/// A frozen, column-oriented interaction table
#[derive(Debug, Clone)]
pub struct Table {
    /// Dictionaries of the discrete attributes
    dictionaries: Vec<AttributeDictionary>,

    /// Discrete columns, one per discrete dimension
    discrete: Vec<DiscreteColumn>,

    /// Continuous columns, one per continuous dimension
    continuous: Vec<ContinuousColumn>,

    /// Discrete dimension by field name
    discrete_index: HashMap<String, usize>,

    /// Continuous dimension by field name
    continuous_index: HashMap<String, usize>,

    /// Number of rows
    size: usize,
}

assert_impl_all!(Table: Send, Sync);

impl Table {
    /// Assemble a table from independently ingested dictionaries and columns
    ///
    /// Checks that every column has the same size, that field names are
    /// unique, and that every discrete code is valid in its dictionary.
    pub fn from_parts(
        dictionaries: Vec<AttributeDictionary>,
        discrete: Vec<DiscreteColumn>,
        continuous: Vec<ContinuousColumn>,
    ) -> Result<Self> {
        let size = discrete
            .first()
            .map(DiscreteColumn::size)
            .or_else(|| continuous.first().map(ContinuousColumn::size))
            .unwrap_or(0);

        let mut discrete_index = HashMap::with_capacity(discrete.len());
        for (dimension, column) in discrete.iter().enumerate() {
            if column.size() != size {
                return Err(Error::invalid(format!(
                    "Column '{}' has {} rows, expected {}",
                    column.name(),
                    column.size(),
                    size
                )));
            }
            let dictionary = dictionaries.get(column.dictionary()).ok_or_else(|| {
                Error::invalid(format!("Column '{}' references a missing dictionary", column.name()))
            })?;
            let cardinality = dictionary.size();
            if let Some(code) = column.iter().find(|&code| code as usize >= cardinality) {
                return Err(Error::invalid(format!(
                    "Column '{}' holds code {} outside dictionary '{}' of size {}",
                    column.name(),
                    code,
                    dictionary.name(),
                    cardinality
                )));
            }
            if discrete_index.insert(column.name().to_string(), dimension).is_some() {
                return Err(Error::invalid(format!("Duplicate field: {}", column.name())));
            }
        }

        let mut continuous_index = HashMap::with_capacity(continuous.len());
        for (dimension, column) in continuous.iter().enumerate() {
            if column.size() != size {
                return Err(Error::invalid(format!(
                    "Column '{}' has {} rows, expected {}",
                    column.name(),
                    column.size(),
                    size
                )));
            }
            if discrete_index.contains_key(column.name())
                || continuous_index.insert(column.name().to_string(), dimension).is_some()
            {
                return Err(Error::invalid(format!("Duplicate field: {}", column.name())));
            }
        }

        debug!(
            rows = size,
            discrete = discrete.len(),
            continuous = continuous.len(),
            dictionaries = dictionaries.len(),
            "Froze table"
        );

        Ok(Self {
            dictionaries,
            discrete,
            continuous,
            discrete_index,
            continuous_index,
            size,
        })
    }

    /// All dictionaries, in attribute declaration order
    pub fn dictionaries(&self) -> &[AttributeDictionary] {
        &self.dictionaries
    }

    /// Dictionary of a discrete attribute
    pub fn dictionary(&self, attribute: &str) -> Option<&AttributeDictionary> {
        self.dictionaries.iter().find(|dictionary| dictionary.name() == attribute)
    }

    /// Dictionary coding a discrete dimension
    pub fn field_dictionary(&self, dimension: usize) -> &AttributeDictionary {
        &self.dictionaries[self.discrete[dimension].dictionary()]
    }

    /// Column of a discrete dimension
    pub fn discrete_column(&self, dimension: usize) -> &DiscreteColumn {
        &self.discrete[dimension]
    }

    /// Column of a continuous dimension
    pub fn continuous_column(&self, dimension: usize) -> &ContinuousColumn {
        &self.continuous[dimension]
    }

    /// Decoded value of a discrete dimension at a position
    pub fn discrete_raw(&self, dimension: usize, position: usize) -> &Value {
        let code = self.discrete[dimension].code(position);
        &self.field_dictionary(dimension).values()[code as usize]
    }

    /// Every position of the table, in order
    pub fn positions(&self) -> Vec<usize> {
        (0..self.size).collect()
    }
}

impl DataAccessor for Table {
    fn size(&self) -> usize {
        self.size
    }

    fn discrete_order(&self) -> usize {
        self.discrete.len()
    }

    fn continuous_order(&self) -> usize {
        self.continuous.len()
    }

    fn discrete_dimension(&self, name: &str) -> Option<usize> {
        self.discrete_index.get(name).copied()
    }

    fn continuous_dimension(&self, name: &str) -> Option<usize> {
        self.continuous_index.get(name).copied()
    }

    fn discrete_name(&self, dimension: usize) -> &str {
        self.discrete[dimension].name()
    }

    fn continuous_name(&self, dimension: usize) -> &str {
        self.continuous[dimension].name()
    }

    fn discrete_cardinality(&self, dimension: usize) -> usize {
        self.field_dictionary(dimension).size()
    }

    #[inline]
    fn discrete_value(&self, dimension: usize, position: usize) -> Code {
        self.discrete[dimension].code(position)
    }

    #[inline]
    fn continuous_value(&self, dimension: usize, position: usize) -> f32 {
        self.continuous[dimension].value(position)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::DataType;

    /// Interactions table shared by the tests of this crate:
    /// discrete `user`, `item`, continuous `score`, `time`
    /// Route `debug!` events of the code under test to the test output
    pub(crate) fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    pub(crate) fn interactions() -> Table {
        init_tracing();
        let schema = TableSchema::new()
            .discrete_field("user", DataType::String)
            .discrete_field("item", DataType::Integer)
            .continuous_field("score", DataType::Float)
            .continuous_field("time", DataType::Integer);
        let mut builder = TableBuilder::new(schema, ColumnOptions { chunk_size: 2 }).unwrap();

        let rows = [
            ("A", 10, 1.0, 100),
            ("A", 11, 2.0, 101),
            ("B", 10, 3.0, 102),
            ("A", 12, 4.0, 103),
            ("B", 11, 5.0, 104),
        ];
        for (user, item, score, time) in rows {
            builder
                .append([
                    RawValue::from(user),
                    RawValue::from(item),
                    RawValue::from(score),
                    RawValue::from(time),
                ])
                .unwrap();
        }

        builder.build().unwrap()
    }

    #[test]
    fn test_build_and_access() {
        let table = interactions();

        assert_eq!(table.size(), 5);
        assert_eq!(table.discrete_order(), 2);
        assert_eq!(table.continuous_order(), 2);
        assert_eq!(table.discrete_dimension("item"), Some(1));
        assert_eq!(table.continuous_dimension("time"), Some(1));
        assert_eq!(table.discrete_dimension("score"), None);
        assert_eq!(table.discrete_cardinality(0), 2);
        assert_eq!(table.discrete_cardinality(1), 3);

        let user_codes: Vec<Code> = table.rows().map(|row| row.discrete(0)).collect();
        assert_eq!(user_codes, vec![0, 0, 1, 0, 1]);
        assert_eq!(table.continuous_value(0, 4), 5.0);
        assert_eq!(table.discrete_raw(1, 3), &Value::Integer(12));
    }

    #[test]
    fn test_shared_attribute_shares_dictionary() {
        let schema = TableSchema::new()
            .discrete("user", DataType::String)
            .field("user", "user")
            .field("friend", "user");
        let mut builder = TableBuilder::new(schema, ColumnOptions::default()).unwrap();
        builder.append(["A", "B"]).unwrap();
        builder.append(["B", "C"]).unwrap();
        let table = builder.build().unwrap();

        assert_eq!(table.dictionaries().len(), 1);
        assert_eq!(table.discrete_cardinality(0), 3);
        assert_eq!(table.discrete_cardinality(1), 3);
        assert_eq!(table.discrete_value(1, 0), table.discrete_value(0, 1));
    }

    #[test]
    fn test_failed_row_leaves_builder_unchanged() {
        let schema = TableSchema::new()
            .discrete_field("user", DataType::String)
            .continuous_field("score", DataType::Float);
        let mut builder = TableBuilder::new(schema, ColumnOptions::default()).unwrap();
        builder.append(["A", "1.0"]).unwrap();

        let error = builder.append(["B", "high"]).unwrap_err();
        assert!(matches!(error, Error::TypeConversion { .. }));
        assert_eq!(builder.row_count(), 1);
        assert_eq!(builder.dictionary("user").unwrap().size(), 1);

        let table = builder.build().unwrap();
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let schema = TableSchema::new().discrete_field("user", DataType::String);
        let mut builder = TableBuilder::new(schema, ColumnOptions::default()).unwrap();
        assert!(matches!(builder.append(["A", "B"]), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_from_parts_rejects_misaligned_columns() {
        let options = ColumnOptions::default();
        let mut dictionary = AttributeDictionary::new("user", DataType::String).unwrap();
        let mut users = DiscreteColumn::new("user", 0, options).unwrap();
        users.push(dictionary.make_value("A").unwrap());
        users.push(dictionary.make_value("B").unwrap());

        let attribute = Arc::new(ContinuousAttribute::new("score", DataType::Float).unwrap());
        let mut scores = ContinuousColumn::new("score", attribute, options).unwrap();
        scores.append(1.0).unwrap();

        let result = Table::from_parts(vec![dictionary], vec![users], vec![scores]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_from_parts_rejects_unknown_codes() {
        let options = ColumnOptions::default();
        let dictionary = AttributeDictionary::new("user", DataType::String).unwrap();
        let mut users = DiscreteColumn::new("user", 0, options).unwrap();
        users.push(0);

        let result = Table::from_parts(vec![dictionary], vec![users], Vec::new());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_table() {
        let schema = TableSchema::new().discrete_field("user", DataType::String);
        let table = TableBuilder::new(schema, ColumnOptions::default())
            .unwrap()
            .build()
            .unwrap();

        assert!(table.is_empty());
        assert_eq!(table.rows().count(), 0);
        assert_eq!(table.discrete_cardinality(0), 0);
    }
}
