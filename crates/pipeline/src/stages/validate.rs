//! Drops rows with missing identifying fields.

use crate::config::PipelineConfig;
use crate::error::{StageError, StageResult};
use crate::stage::{Stage, StageKind};
use tally_core::{Error, Table, Value};

/// Keeps rows whose required fields are all present.
///
/// A field is missing when it is null, blank, or equal to one of the
/// configured missing-data markers. Missing rows are dropped, not reported.
#[derive(Clone, Debug)]
pub struct Validate {
    required: Vec<String>,
    markers: Vec<String>,
}

impl Validate {
    pub fn new(required: Vec<String>, markers: Vec<String>) -> Self {
        Self { required, markers }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.required_fields.clone(), config.missing_markers.clone())
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    fn is_missing(&self, value: &Value) -> bool {
        if value.is_blank() {
            return true;
        }
        match value.as_str() {
            Some(s) => self.markers.iter().any(|m| m == s.trim()),
            None => false,
        }
    }
}

impl Stage for Validate {
    fn kind(&self) -> StageKind {
        StageKind::Validate
    }

    fn process(&self, table: Table) -> StageResult<Table> {
        let positions = self
            .required
            .iter()
            .map(|field| {
                table
                    .column_index(field)
                    .ok_or_else(|| Error::missing_column(field.as_str()))
            })
            .collect::<Result<Vec<usize>, Error>>()
            .map_err(StageError::table(self.kind()))?;

        let kept = table.filter_rows(|row| {
            positions
                .iter()
                .all(|&i| row.at(i).is_some_and(|v| !self.is_missing(v)))
        });
        let dropped = table.row_count() - kept.row_count();
        if dropped > 0 {
            log::debug!("validate dropped {} of {} rows", dropped, table.row_count());
        }
        Ok(kept)
    }
}
