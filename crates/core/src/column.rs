//! Column storage.
//!
//! A column is a homogeneous, append-oriented sequence of cells addressed by a
//! zero-based row index. Removing a cell shifts every later cell down by one.

use crate::error::{Error, Result};
use crate::value::Value;
use alloc::vec::Vec;

/// A sequence of cell values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Column {
    values: Vec<Value>,
}

impl Column {
    /// Creates an empty column.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Creates an empty column with room for `capacity` cells.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Creates a column from its cells.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Returns the number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column holds no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Appends a cell.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    /// Returns the cell at `row`.
    pub fn get(&self, row: usize) -> Result<&Value> {
        self.values
            .get(row)
            .ok_or_else(|| Error::row_out_of_range(row, self.values.len()))
    }

    /// Replaces the cell at `row`.
    pub fn set(&mut self, row: usize, value: impl Into<Value>) -> Result<()> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(row)
            .ok_or_else(|| Error::row_out_of_range(row, len))?;
        *slot = value.into();
        Ok(())
    }

    /// Removes and returns the cell at `row`, shifting later cells down.
    pub fn remove_at(&mut self, row: usize) -> Result<Value> {
        if row >= self.values.len() {
            return Err(Error::row_out_of_range(row, self.values.len()));
        }
        Ok(self.values.remove(row))
    }

    /// Removes and returns the last cell.
    pub fn remove_last(&mut self) -> Result<Value> {
        self.values.pop().ok_or_else(|| Error::row_out_of_range(0, 0))
    }

    /// Appends every cell of `other`.
    pub fn append(&mut self, other: &Column) {
        self.values.extend_from_slice(&other.values);
    }

    /// Returns the cells in `[start, end)`. Bounds are checked by the caller.
    pub(crate) fn slice(&self, start: usize, end: usize) -> Column {
        Column::from_values(self.values[start..end].to_vec())
    }

    /// Returns the cells whose index is set in `keep`.
    pub(crate) fn retain_rows(&self, keep: &[bool]) -> Column {
        let values = self
            .values
            .iter()
            .zip(keep)
            .filter(|(_, &k)| k)
            .map(|(v, _)| v.clone())
            .collect();
        Column::from_values(values)
    }

    /// Iterates over the cells.
    pub fn iter(&self) -> core::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Returns the cells as a slice.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns a mutable reference to the cells.
    #[inline]
    pub fn values_mut(&mut self) -> &mut Vec<Value> {
        &mut self.values
    }

    /// Consumes the column, returning its cells.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl<V: Into<Value>> FromIterator<V> for Column {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Column::from_values(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a Column {
    type Item = &'a Value;
    type IntoIter = core::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Column {
        ["a", "b", "c"].into_iter().collect()
    }

    #[test]
    fn test_push_and_get() {
        let mut col = Column::new();
        col.push("x");
        col.push(10i64);
        assert_eq!(col.len(), 2);
        assert_eq!(col.get(0).unwrap(), &Value::from("x"));
        assert_eq!(col.get(1).unwrap(), &Value::Int64(10));
        assert!(matches!(col.get(2), Err(Error::RowOutOfRange { row: 2, len: 2 })));
    }

    #[test]
    fn test_remove_shifts_indices() {
        let mut col = sample();
        let removed = col.remove_at(1).unwrap();
        assert_eq!(removed, Value::from("b"));
        assert_eq!(col.get(1).unwrap(), &Value::from("c"));
        assert_eq!(col.len(), 2);
        assert!(col.remove_at(5).is_err());
    }

    #[test]
    fn test_remove_last() {
        let mut col = sample();
        assert_eq!(col.remove_last().unwrap(), Value::from("c"));
        col.remove_last().unwrap();
        col.remove_last().unwrap();
        assert!(col.remove_last().is_err());
    }

    #[test]
    fn test_set() {
        let mut col = sample();
        col.set(0, "z").unwrap();
        assert_eq!(col.get(0).unwrap(), &Value::from("z"));
        assert!(col.set(3, "w").is_err());
    }

    #[test]
    fn test_append() {
        let mut col = sample();
        col.append(&sample());
        assert_eq!(col.len(), 6);
        assert_eq!(col.get(3).unwrap(), &Value::from("a"));
    }
}
