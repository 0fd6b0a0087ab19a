//! Contiguous row-range partitioning.

use crate::error::Result;
use crate::table::Table;
use alloc::vec::Vec;

/// A contiguous slice of a parent table tagged with its position.
///
/// `index` is the only thing that makes order-sensitive merges deterministic:
/// partitions may finish in any order but concatenate by ascending index.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    pub index: usize,
    pub table: Table,
}

impl Partition {
    /// Creates a partition.
    pub fn new(index: usize, table: Table) -> Self {
        Self { index, table }
    }
}

impl Table {
    /// Splits the table into `n` contiguous partitions.
    ///
    /// Each partition gets `row_count / n` rows and the last one also takes the
    /// remainder. `n` is clamped to `1..=row_count` so no partition is an empty
    /// range; an empty table yields a single empty partition.
    pub fn partition(&self, n: usize) -> Result<Vec<Partition>> {
        let rows = self.row_count();
        if rows == 0 {
            return Ok(alloc::vec![Partition::new(0, self.clone())]);
        }
        let n = n.clamp(1, rows);
        let chunk = rows / n;
        (0..n)
            .map(|i| {
                let start = i * chunk;
                let end = if i == n - 1 { rows } else { start + chunk };
                self.slice(start, end).map(|t| Partition::new(i, t))
            })
            .collect()
    }
}
