//! Truncates timestamps to their date.

use super::columns::RESERVATION_TIME;
use crate::error::{StageError, StageResult};
use crate::stage::{Stage, StageKind};
use tally_core::{Table, Value};

/// Keeps the first `prefix_len` characters of `reservation_time`.
///
/// Shorter values and non-text cells pass through unchanged.
#[derive(Clone, Debug)]
pub struct DateNormalize {
    column: String,
    prefix_len: usize,
}

impl DateNormalize {
    pub fn new(prefix_len: usize) -> Self {
        Self::on_column(RESERVATION_TIME, prefix_len)
    }

    pub fn on_column(column: impl Into<String>, prefix_len: usize) -> Self {
        Self {
            column: column.into(),
            prefix_len,
        }
    }
}

fn truncate(text: &str, chars: usize) -> Option<&str> {
    text.char_indices().nth(chars).map(|(at, _)| &text[..at])
}

impl Stage for DateNormalize {
    fn kind(&self) -> StageKind {
        StageKind::DateNormalize
    }

    fn process(&self, mut table: Table) -> StageResult<Table> {
        let len = self.prefix_len;
        table
            .map_column(&self.column, |cell| match cell {
                Value::String(s) => match truncate(s, len) {
                    Some(prefix) => Value::from(prefix),
                    None => cell.clone(),
                },
                _ => cell.clone(),
            })
            .map_err(StageError::table(self.kind()))?;
        Ok(table)
    }
}
