//! Keeps rows with one reservation status.

use super::columns::STATUS;
use crate::error::{StageError, StageResult};
use crate::stage::{Stage, StageKind};
use tally_core::{Error, Table};

#[derive(Clone, Debug)]
pub struct StatusFilter {
    target: String,
}

impl StatusFilter {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Stage for StatusFilter {
    fn kind(&self) -> StageKind {
        StageKind::StatusFilter
    }

    fn process(&self, table: Table) -> StageResult<Table> {
        let status = table
            .column_index(STATUS)
            .ok_or_else(|| StageError::table(self.kind())(Error::missing_column(STATUS)))?;
        Ok(table.filter_rows(|row| {
            row.at(status)
                .and_then(|v| v.as_str())
                .is_some_and(|s| s.trim() == self.target)
        }))
    }
}
