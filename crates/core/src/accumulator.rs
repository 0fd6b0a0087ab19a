//! Keyed running totals.
//!
//! An [`Accumulator`] maps a group key to a [`Number`] total. Partials built
//! from disjoint row ranges combine with [`Accumulator::merge`]. Integer and
//! decimal addition is exact, so merging in any order equals one pass over
//! the whole input.

use crate::column::Column;
use crate::error::{Error, Result};
use crate::table::Table;
use crate::value::{Number, Value};
use alloc::string::ToString;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// How a non-numeric cell in a summed column is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NumericPolicy {
    /// Malformed cells fail the whole operation with [`Error::Parse`].
    #[default]
    Strict,
    /// Malformed cells count as zero. The key is still recorded.
    ZeroOnMalformed,
}

/// Key → running total map.
#[derive(Clone, Debug, Default)]
pub struct Accumulator {
    totals: HashMap<Value, Number>,
}

impl Accumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Returns true if no key has been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Adds `amount` to the total for `key`.
    pub fn add(&mut self, key: Value, amount: Number) {
        *self.totals.entry(key).or_default() += amount;
    }

    /// Returns the current total for `key`.
    pub fn get(&self, key: &Value) -> Option<Number> {
        self.totals.get(key).copied()
    }

    /// Adds every `(key, value)` row of `table`.
    pub fn absorb(
        &mut self,
        table: &Table,
        key: &str,
        value: &str,
        policy: NumericPolicy,
    ) -> Result<()> {
        let keys = table.column(key)?;
        let values = table.column(value)?;
        for (row, (k, v)) in keys.iter().zip(values.iter()).enumerate() {
            let amount = match (v.to_number(), policy) {
                (Some(n), _) => n,
                (None, NumericPolicy::ZeroOnMalformed) => Number::ZERO,
                (None, NumericPolicy::Strict) => {
                    return Err(Error::parse(value, row, v.to_string()));
                }
            };
            self.add(k.clone(), amount);
        }
        Ok(())
    }

    /// Adds one to the total for every cell of `key`.
    pub fn count(&mut self, table: &Table, key: &str) -> Result<()> {
        for k in table.column(key)? {
            self.add(k.clone(), Number::Int(1));
        }
        Ok(())
    }

    /// Folds another accumulator into this one by keyed addition.
    pub fn merge(&mut self, other: Accumulator) {
        for (key, amount) in other.totals {
            self.add(key, amount);
        }
    }

    /// Converts to a two-column table sorted by key.
    pub fn into_table(self, key: &str, value: &str) -> Table {
        let mut entries: Vec<(Value, Number)> = self.totals.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut keys = Column::with_capacity(entries.len());
        let mut totals = Column::with_capacity(entries.len());
        for (k, n) in entries {
            keys.push(k);
            totals.push(n);
        }
        Table::two_columns(key, keys, value, totals)
    }
}
