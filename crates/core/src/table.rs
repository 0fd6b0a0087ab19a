//! Columnar table.
//!
//! A [`Table`] is an ordered list of named [`Column`]s that always share one
//! row count. Every operation that could break that invariant checks it and
//! fails instead. Tables carry no key: stages that need unique keys (group-by)
//! enforce it themselves.

use crate::accumulator::{Accumulator, NumericPolicy};
use crate::column::Column;
use crate::error::{Error, Result};
use crate::predicate::{CompareOp, Predicate};
use crate::value::{Number, Value};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// Named columns of equal length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    rows: usize,
}

/// Borrowed view of one row, handed to [`Table::filter_rows`].
#[derive(Clone, Copy, Debug)]
pub struct RowView<'a> {
    table: &'a Table,
    row: usize,
}

impl<'a> RowView<'a> {
    /// Row index inside the table.
    #[inline]
    pub fn index(&self) -> usize {
        self.row
    }

    /// Cell in column position `column`.
    #[inline]
    pub fn at(&self, column: usize) -> Option<&'a Value> {
        self.table.columns.get(column).and_then(|c| c.values().get(self.row))
    }

    /// Cell in the named column.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.table.column_index(column).and_then(|i| self.at(i))
    }
}

impl Table {
    /// Creates a table with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table with the given column names.
    pub fn with_columns(names: &[&str]) -> Result<Self> {
        let mut table = Table::new();
        for name in names {
            table.add_column(*name, Column::new())?;
        }
        Ok(table)
    }

    /// Builds a table from `(name, column)` pairs.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Column)>) -> Result<Self> {
        let mut table = Table::new();
        for (name, column) in columns {
            table.add_column(name, column)?;
        }
        Ok(table)
    }

    /// Builds a table from row-major cells.
    pub fn from_rows(names: &[&str], rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut table = Table::with_columns(names)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Two-column constructor for callers that already guarantee equal lengths.
    pub(crate) fn two_columns(key: &str, keys: Column, value: &str, values: Column) -> Table {
        let rows = keys.len();
        Table {
            names: alloc::vec![key.to_string(), value.to_string()],
            columns: alloc::vec![keys, values],
            rows,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    /// Position of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Returns true if the named column exists.
    #[inline]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Fails with [`Error::MissingColumn`] on the first absent name.
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        match names.iter().find(|n| !self.has_column(n.as_ref())) {
            Some(missing) => Err(Error::missing_column(missing.as_ref())),
            None => Ok(()),
        }
    }

    /// Returns the named column.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.column_index(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// Appends a column. Its length must match once the table has a column.
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(Error::DuplicateColumn { column: name });
        }
        if !self.columns.is_empty() && column.len() != self.rows {
            return Err(Error::schema(format!(
                "column {} has {} rows, table has {}",
                name,
                column.len(),
                self.rows
            )));
        }
        self.rows = column.len();
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Replaces the cells of an existing column, keeping its position.
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<()> {
        let idx = self.column_index(name).ok_or_else(|| Error::column_not_found(name))?;
        if column.len() != self.rows {
            return Err(Error::schema(format!(
                "column {} has {} rows, table has {}",
                name,
                column.len(),
                self.rows
            )));
        }
        self.columns[idx] = column;
        Ok(())
    }

    /// Replaces `name` if present, otherwise appends it.
    pub fn set_column(&mut self, name: &str, column: Column) -> Result<()> {
        if self.has_column(name) {
            self.replace_column(name, column)
        } else {
            self.add_column(name, column)
        }
    }

    /// Removes a column and returns its cells.
    pub fn drop_column(&mut self, name: &str) -> Result<Column> {
        let idx = self.column_index(name).ok_or_else(|| Error::column_not_found(name))?;
        self.names.remove(idx);
        let column = self.columns.remove(idx);
        if self.columns.is_empty() {
            self.rows = 0;
        }
        Ok(column)
    }

    /// Renames a column in place.
    pub fn rename_column(&mut self, from: &str, to: impl Into<String>) -> Result<()> {
        let to = to.into();
        let idx = self.column_index(from).ok_or_else(|| Error::column_not_found(from))?;
        if from != to && self.has_column(&to) {
            return Err(Error::DuplicateColumn { column: to });
        }
        self.names[idx] = to;
        Ok(())
    }

    /// Projects the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let mut out = Table::new();
        for name in names {
            out.add_column(*name, self.column(name)?.clone())?;
        }
        Ok(out)
    }

    /// Appends one row given in column order.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::schema(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value);
        }
        self.rows += 1;
        Ok(())
    }

    /// Returns the cells of one row in column order.
    pub fn row(&self, row: usize) -> Result<Vec<&Value>> {
        if row >= self.rows {
            return Err(Error::row_out_of_range(row, self.rows));
        }
        Ok(self.columns.iter().map(|c| &c.values()[row]).collect())
    }

    /// Returns one cell.
    pub fn get_value(&self, column: &str, row: usize) -> Result<&Value> {
        self.column(column)?.get(row)
    }

    /// Overwrites one cell.
    pub fn update_value(
        &mut self,
        column: &str,
        row: usize,
        value: impl Into<Value>,
    ) -> Result<()> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| Error::column_not_found(column))?;
        self.columns[idx].set(row, value)
    }

    /// Rewrites every cell of one column.
    pub fn map_column<F>(&mut self, column: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&Value) -> Value,
    {
        let idx = self
            .column_index(column)
            .ok_or_else(|| Error::column_not_found(column))?;
        for cell in self.columns[idx].values_mut().iter_mut() {
            *cell = f(cell);
        }
        Ok(())
    }

    /// Keeps the rows for which `keep` is true.
    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(RowView<'_>) -> bool,
    {
        let mask: Vec<bool> = (0..self.rows)
            .map(|row| keep(RowView { table: self, row }))
            .collect();
        self.retain(&mask)
    }

    /// Keeps the rows whose entry in a boolean column of equal length is true.
    pub fn filter_mask(&self, mask: &Column) -> Result<Table> {
        if mask.len() != self.rows {
            return Err(Error::invalid_predicate(format!(
                "mask has {} entries, table has {} rows",
                mask.len(),
                self.rows
            )));
        }
        let keep = mask
            .iter()
            .enumerate()
            .map(|(row, v)| {
                v.as_bool().ok_or_else(|| {
                    Error::invalid_predicate(format!("mask entry {} is not a boolean", row))
                })
            })
            .collect::<Result<Vec<bool>>>()?;
        Ok(self.retain(&keep))
    }

    /// Keeps the rows whose numeric cell in `column` satisfies `op value`.
    ///
    /// `op` is one of `<`, `>`, `<=`, `>=`, `==`, `!=`. A cell that is not a
    /// number fails the call with [`Error::Parse`].
    pub fn filter(&self, column: &str, op: &str, value: Number) -> Result<Table> {
        let op: CompareOp = op.parse()?;
        self.filter_by(&Predicate::Compare {
            column: column.to_string(),
            op,
            value,
        })
    }

    /// Applies a [`Predicate`].
    pub fn filter_by(&self, predicate: &Predicate) -> Result<Table> {
        match predicate {
            Predicate::Mask(mask) => self.filter_mask(mask),
            Predicate::Compare { column, op, value } => {
                let cells = self.column(column)?;
                let keep = cells
                    .iter()
                    .enumerate()
                    .map(|(row, cell)| {
                        cell.to_number()
                            .map(|n| op.eval(n, *value))
                            .ok_or_else(|| Error::parse(column.as_str(), row, cell.to_string()))
                    })
                    .collect::<Result<Vec<bool>>>()?;
                Ok(self.retain(&keep))
            }
        }
    }

    /// Sums `value` per distinct `key`. Malformed numbers are an error.
    ///
    /// The result has the columns `key` and `value`, one row per key, sorted
    /// by key. An empty table yields an empty result.
    pub fn group_by_sum(&self, key: &str, value: &str) -> Result<Table> {
        self.group_by_sum_with(key, value, NumericPolicy::Strict)
    }

    /// [`group_by_sum`](Self::group_by_sum) with an explicit malformed-cell policy.
    pub fn group_by_sum_with(
        &self,
        key: &str,
        value: &str,
        policy: NumericPolicy,
    ) -> Result<Table> {
        let mut acc = Accumulator::new();
        acc.absorb(self, key, value, policy)?;
        Ok(acc.into_table(key, value))
    }

    /// Counts rows per distinct `key` into a `count` column.
    pub fn group_by_count(&self, key: &str, count: &str) -> Result<Table> {
        let mut acc = Accumulator::new();
        acc.count(self, key)?;
        Ok(acc.into_table(key, count))
    }

    /// Rows of `self` followed by rows of `other`.
    ///
    /// Both tables must have the same column names in the same order.
    pub fn concat(&self, other: &Table) -> Result<Table> {
        if self.names != other.names {
            return Err(Error::SchemaMismatch {
                left: self.names.clone(),
                right: other.names.clone(),
            });
        }
        let mut out = self.clone();
        for (column, tail) in out.columns.iter_mut().zip(&other.columns) {
            column.append(tail);
        }
        out.rows += other.rows;
        Ok(out)
    }

    /// Rows in `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<Table> {
        if start >= end || end > self.rows {
            return Err(Error::range(start, end, self.rows));
        }
        Ok(Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.slice(start, end)).collect(),
            rows: end - start,
        })
    }

    fn retain(&self, keep: &[bool]) -> Table {
        let rows = keep.iter().filter(|k| **k).count();
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.retain_rows(keep)).collect(),
            rows,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.names {
            write!(f, "{:>15}", name)?;
        }
        writeln!(f)?;
        for row in 0..self.rows {
            for column in &self.columns {
                write!(f, "{:>15}", column.values()[row].to_string())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn reservations() -> Table {
        Table::from_rows(
            &["status", "date", "price"],
            vec![
                vec!["confirmed".into(), "2024-01-01".into(), "100".into()],
                vec!["confirmed".into(), "2024-01-01".into(), "50".into()],
                vec!["cancelled".into(), "2024-01-02".into(), "999".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_add_column_length_check() {
        let mut table = Table::new();
        table
            .add_column("a", ["1", "2"].into_iter().collect())
            .unwrap();
        let err = table
            .add_column("b", ["1"].into_iter().collect())
            .unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
        assert!(matches!(
            table.add_column("a", ["3", "4"].into_iter().collect()),
            Err(Error::DuplicateColumn { .. })
        ));
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_get_and_update_value() {
        let mut table = reservations();
        assert_eq!(table.get_value("price", 2).unwrap(), &Value::from("999"));
        table.update_value("price", 2, "1").unwrap();
        assert_eq!(table.get_value("price", 2).unwrap(), &Value::from("1"));

        assert!(matches!(
            table.get_value("missing", 0),
            Err(Error::ColumnNotFound { .. })
        ));
        assert!(matches!(
            table.update_value("price", 3, "x"),
            Err(Error::RowOutOfRange { row: 3, len: 3 })
        ));
    }

    #[test]
    fn test_filter_numeric() {
        let table = reservations();
        let cheap = table.filter("price", "<", Number::Int(100)).unwrap();
        assert_eq!(cheap.row_count(), 1);
        assert_eq!(cheap.get_value("price", 0).unwrap(), &Value::from("50"));

        let not_fifty = table.filter("price", "!=", Number::Int(50)).unwrap();
        assert_eq!(not_fifty.row_count(), 2);

        assert!(matches!(
            table.filter("price", "=>", Number::Int(1)),
            Err(Error::InvalidPredicate { .. })
        ));
        assert!(matches!(
            table.filter("status", ">", Number::Int(1)),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_filter_mask() {
        let table = reservations();
        let mask: Column = [true, false, true].into_iter().collect();
        let kept = table.filter_mask(&mask).unwrap();
        assert_eq!(kept.row_count(), 2);
        assert_eq!(kept.get_value("status", 1).unwrap(), &Value::from("cancelled"));

        let short: Column = [true].into_iter().collect();
        assert!(table.filter_mask(&short).is_err());
    }

    #[test]
    fn test_status_then_group_by_sum() {
        let confirmed = reservations().filter_rows(|row| {
            row.get("status").and_then(Value::as_str) == Some("confirmed")
        });
        let result = confirmed.group_by_sum("date", "price").unwrap();
        assert_eq!(result.row_count(), 1);
        assert_eq!(result.get_value("date", 0).unwrap().to_string(), "2024-01-01");
        assert_eq!(result.get_value("price", 0).unwrap().to_string(), "150");
    }

    #[test]
    fn test_group_by_sum_empty_table() {
        let empty = Table::with_columns(&["date", "price"]).unwrap();
        let result = empty.group_by_sum("date", "price").unwrap();
        assert!(result.is_empty());
        assert_eq!(result.column_names(), vec!["date", "price"]);
    }

    #[test]
    fn test_concat() {
        let a = reservations().slice(0, 1).unwrap();
        let b = reservations().slice(1, 3).unwrap();
        let joined = a.concat(&b).unwrap();
        assert_eq!(joined, reservations());

        let other = reservations().select(&["price", "date"]).unwrap();
        assert!(matches!(a.concat(&other), Err(Error::SchemaMismatch { .. })));
    }

    #[test]
    fn test_slice_bounds() {
        let table = reservations();
        assert!(matches!(table.slice(0, 0), Err(Error::Range { .. })));
        assert!(matches!(table.slice(3, 3), Err(Error::Range { .. })));
        assert!(matches!(table.slice(1, 4), Err(Error::Range { .. })));
        assert_eq!(table.slice(1, 3).unwrap().row_count(), 2);
    }

    #[test]
    fn test_column_management() {
        let mut table = reservations();
        table.rename_column("date", "reservation_time").unwrap();
        assert!(table.has_column("reservation_time"));
        assert!(table.rename_column("price", "status").is_err());

        let dropped = table.drop_column("status").unwrap();
        assert_eq!(dropped.len(), 3);
        assert_eq!(table.column_names(), vec!["reservation_time", "price"]);
        assert!(matches!(
            table.require_columns(&["price", "status"]),
            Err(Error::MissingColumn { column }) if column == "status"
        ));
    }

    #[test]
    fn test_push_row_arity() {
        let mut table = reservations();
        assert!(table.push_row(vec!["x".into()]).is_err());
        table
            .push_row(vec!["pending".into(), "2024-02-01".into(), "1".into()])
            .unwrap();
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.row(3).unwrap()[0], &Value::from("pending"));
    }

    #[test]
    fn test_display_lists_headers() {
        let text = reservations().to_string();
        assert!(text.contains("status"));
        assert!(text.contains("2024-01-02"));
    }
}
