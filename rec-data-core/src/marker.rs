//! Labelled views over a subset of an accessor's rows
//!
//! A marker wraps a source accessor and a position set, typically one side of
//! a split. Row `i` of the marker is row `positions[i]` of the source. Nothing
//! is copied: the marker borrows both the source and the positions, and reads
//! through them on every access.

use crate::accessor::DataAccessor;
use crate::dictionary::Code;
use crate::error::{Error, Result};

/// An accessor whose rows carry a label
pub trait Marker: DataAccessor {
    /// Label of the row at `index`
    fn mark(&self, index: usize) -> f32;
}

fn check_positions<A: DataAccessor + ?Sized>(source: &A, positions: &[usize]) -> Result<()> {
    let len = source.size();
    match positions.iter().find(|&&position| position >= len) {
        Some(&index) => Err(Error::IndexOutOfBounds { index, len }),
        None => Ok(()),
    }
}

/// View labelling every row with the same constant
pub struct ConstantMarker<'a, A: ?Sized> {
    source: &'a A,
    positions: &'a [usize],
    mark: f32,
}

impl<'a, A> ConstantMarker<'a, A>
where
    A: DataAccessor + ?Sized,
{
    /// Wrap `positions` of `source`, labelling each with `mark`
    pub fn new(source: &'a A, positions: &'a [usize], mark: f32) -> Result<Self> {
        check_positions(source, positions)?;
        Ok(Self {
            source,
            positions,
            mark,
        })
    }

    /// Source accessor
    pub fn source(&self) -> &'a A {
        self.source
    }

    /// Source position of every row of the view
    pub fn positions(&self) -> &'a [usize] {
        self.positions
    }
}

impl<'a, A> DataAccessor for ConstantMarker<'a, A>
where
    A: DataAccessor + ?Sized,
{
    fn size(&self) -> usize {
        self.positions.len()
    }

    fn discrete_order(&self) -> usize {
        self.source.discrete_order()
    }

    fn continuous_order(&self) -> usize {
        self.source.continuous_order()
    }

    fn discrete_dimension(&self, name: &str) -> Option<usize> {
        self.source.discrete_dimension(name)
    }

    fn continuous_dimension(&self, name: &str) -> Option<usize> {
        self.source.continuous_dimension(name)
    }

    fn discrete_name(&self, dimension: usize) -> &str {
        self.source.discrete_name(dimension)
    }

    fn continuous_name(&self, dimension: usize) -> &str {
        self.source.continuous_name(dimension)
    }

    fn discrete_cardinality(&self, dimension: usize) -> usize {
        self.source.discrete_cardinality(dimension)
    }

    fn discrete_value(&self, dimension: usize, position: usize) -> Code {
        self.source.discrete_value(dimension, self.positions[position])
    }

    fn continuous_value(&self, dimension: usize, position: usize) -> f32 {
        self.source.continuous_value(dimension, self.positions[position])
    }
}

impl<'a, A> Marker for ConstantMarker<'a, A>
where
    A: DataAccessor + ?Sized,
{
    fn mark(&self, _index: usize) -> f32 {
        self.mark
    }
}

/// View using one continuous field as the label
///
/// The label field is removed from the continuous dimensions; the remaining
/// ones keep their relative order and are renumbered from zero. Discrete
/// dimensions pass through unchanged.
pub struct AttributeMarker<'a, A: ?Sized> {
    source: &'a A,
    positions: &'a [usize],
    label: usize,
}

impl<'a, A> AttributeMarker<'a, A>
where
    A: DataAccessor + ?Sized,
{
    /// Wrap `positions` of `source`, labelled by the continuous field `label`
    pub fn new(source: &'a A, positions: &'a [usize], label: &str) -> Result<Self> {
        let label = source
            .continuous_dimension(label)
            .ok_or_else(|| Error::invalid(format!("Unknown continuous field: {}", label)))?;
        check_positions(source, positions)?;
        Ok(Self {
            source,
            positions,
            label,
        })
    }

    /// Source accessor
    pub fn source(&self) -> &'a A {
        self.source
    }

    /// Source position of every row of the view
    pub fn positions(&self) -> &'a [usize] {
        self.positions
    }

    /// Name of the label field
    pub fn label_name(&self) -> &str {
        self.source.continuous_name(self.label)
    }

    /// Source continuous dimension behind a view dimension
    fn source_dimension(&self, dimension: usize) -> usize {
        assert!(
            dimension < self.continuous_order(),
            "continuous dimension {} out of range for {} dimensions",
            dimension,
            self.continuous_order()
        );
        if dimension < self.label {
            dimension
        } else {
            dimension + 1
        }
    }
}

impl<'a, A> DataAccessor for AttributeMarker<'a, A>
where
    A: DataAccessor + ?Sized,
{
    fn size(&self) -> usize {
        self.positions.len()
    }

    fn discrete_order(&self) -> usize {
        self.source.discrete_order()
    }

    fn continuous_order(&self) -> usize {
        self.source.continuous_order() - 1
    }

    fn discrete_dimension(&self, name: &str) -> Option<usize> {
        self.source.discrete_dimension(name)
    }

    fn continuous_dimension(&self, name: &str) -> Option<usize> {
        match self.source.continuous_dimension(name)? {
            dimension if dimension == self.label => None,
            dimension if dimension < self.label => Some(dimension),
            dimension => Some(dimension - 1),
        }
    }

    fn discrete_name(&self, dimension: usize) -> &str {
        self.source.discrete_name(dimension)
    }

    fn continuous_name(&self, dimension: usize) -> &str {
        self.source.continuous_name(self.source_dimension(dimension))
    }

    fn discrete_cardinality(&self, dimension: usize) -> usize {
        self.source.discrete_cardinality(dimension)
    }

    fn discrete_value(&self, dimension: usize, position: usize) -> Code {
        self.source.discrete_value(dimension, self.positions[position])
    }

    fn continuous_value(&self, dimension: usize, position: usize) -> f32 {
        self.source
            .continuous_value(self.source_dimension(dimension), self.positions[position])
    }
}

impl<'a, A> Marker for AttributeMarker<'a, A>
where
    A: DataAccessor + ?Sized,
{
    fn mark(&self, index: usize) -> f32 {
        self.source.continuous_value(self.label, self.positions[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ColumnOptions;
    use crate::schema::{DataType, RawValue, TableSchema};
    use crate::split::{DataSplitter, PredicateSplitter};
    use crate::table::tests::interactions;
    use crate::table::{Table, TableBuilder};

    fn wide() -> Table {
        let schema = TableSchema::new()
            .continuous_field("a", DataType::Float)
            .discrete_field("user", DataType::String)
            .continuous_field("b", DataType::Float)
            .continuous_field("rating", DataType::Float)
            .continuous_field("c", DataType::Float);
        let mut builder = TableBuilder::new(schema, ColumnOptions { chunk_size: 3 }).unwrap();
        for row in 0..8u8 {
            let base = f32::from(row);
            builder
                .append([
                    RawValue::from(base),
                    RawValue::from(format!("u{}", row % 3)),
                    RawValue::from(base + 0.25),
                    RawValue::from(base * 10.0),
                    RawValue::from(base + 0.5),
                ])
                .unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_attribute_marker_reprojects_features() {
        let table = wide();
        let positions = [6, 1, 4];
        let marker = AttributeMarker::new(&table, &positions, "rating").unwrap();

        assert_eq!(marker.size(), 3);
        assert_eq!(marker.label_name(), "rating");
        assert_eq!(marker.continuous_order(), 3);
        let names: Vec<&str> = (0..marker.continuous_order()).map(|d| marker.continuous_name(d)).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(marker.continuous_dimension("a"), Some(0));
        assert_eq!(marker.continuous_dimension("b"), Some(1));
        assert_eq!(marker.continuous_dimension("c"), Some(2));
        assert_eq!(marker.continuous_dimension("rating"), None);
        assert_eq!(marker.discrete_dimension("user"), Some(0));
    }

    #[test]
    fn test_attribute_marker_reads_source_rows() {
        let table = wide();
        let rating = table.continuous_dimension("rating").unwrap();
        let positions = [6, 1, 4];
        let marker = AttributeMarker::new(&table, &positions, "rating").unwrap();

        for (index, &position) in positions.iter().enumerate() {
            assert_eq!(marker.mark(index), table.continuous_value(rating, position));
            assert_eq!(marker.continuous_value(2, index), table.continuous_value(3, position));
            assert_eq!(marker.continuous_value(1, index), table.continuous_value(1, position));
            assert_eq!(marker.discrete_value(0, index), table.discrete_value(0, position));
        }
        assert_eq!(marker.mark(0), 60.0);
    }

    #[test]
    fn test_attribute_marker_rejects_bad_arguments() {
        let table = wide();
        assert!(matches!(
            AttributeMarker::new(&table, &[0], "user"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            AttributeMarker::new(&table, &[0, 8], "rating"),
            Err(Error::IndexOutOfBounds { index: 8, len: 8 })
        ));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_attribute_marker_hides_label_dimension() {
        let table = wide();
        let marker = AttributeMarker::new(&table, &[0], "c").unwrap();
        marker.continuous_value(3, 0);
    }

    #[test]
    fn test_constant_marker_passes_columns_through() {
        let table = interactions();
        let positions = [4, 0];
        let marker = ConstantMarker::new(&table, &positions, 1.0).unwrap();

        assert_eq!(marker.size(), 2);
        assert_eq!(marker.continuous_order(), table.continuous_order());
        assert_eq!(marker.mark(0), 1.0);
        assert_eq!(marker.mark(1), 1.0);
        assert_eq!(marker.continuous_value(0, 0), 5.0);
        assert_eq!(marker.discrete_value(0, 1), 0);
        let rows: Vec<usize> = marker.rows().map(|row| row.position()).collect();
        assert_eq!(rows, vec![0, 1]);
    }

    #[test]
    fn test_markers_over_split() {
        let table = interactions();
        let time = table.continuous_dimension("time").unwrap();
        let splitter = PredicateSplitter::new(&table, |row| row.continuous(time) >= 103.0);

        let train = AttributeMarker::new(&table, splitter.train_positions(0).unwrap(), "score").unwrap();
        let test = AttributeMarker::new(&table, splitter.test_positions(0).unwrap(), "score").unwrap();

        let train_marks: Vec<f32> = (0..train.size()).map(|index| train.mark(index)).collect();
        let test_marks: Vec<f32> = (0..test.size()).map(|index| test.mark(index)).collect();
        assert_eq!(train_marks, vec![1.0, 2.0, 3.0]);
        assert_eq!(test_marks, vec![4.0, 5.0]);
        assert_eq!(test.continuous_dimension("time"), Some(0));
    }

    #[test]
    fn test_markers_nest() {
        let table = wide();
        let outer_positions = [7, 5, 3, 1];
        let outer = ConstantMarker::new(&table, &outer_positions, 0.0).unwrap();
        let inner_positions = [1, 3];
        let inner = AttributeMarker::new(&outer, &inner_positions, "a").unwrap();

        assert_eq!(inner.mark(0), 5.0);
        assert_eq!(inner.mark(1), 1.0);
        assert_eq!(inner.continuous_name(0), "b");
    }
}
