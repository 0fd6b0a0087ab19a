//! In-memory sink.
//!
//! Stores every table as an ordered key → values map behind one mutex, so
//! concurrent writers are serialized the same way a single storage handle
//! would require.

use crate::error::{Result, SinkError};
use crate::schema::{RowFailure, SchemaSpec, UpsertReport};
use crate::{Sink, WriteMode};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tally_core::{Column, DataType, Number, Table, Value};

#[derive(Debug)]
struct StoredTable {
    schema: SchemaSpec,
    rows: BTreeMap<Vec<Value>, Vec<Value>>,
}

/// Sink that keeps every table in process memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: Mutex<BTreeMap<String, StoredTable>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the tables created so far.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.lock().keys().cloned().collect()
    }

    /// Number of stored rows in `name`.
    pub fn row_count(&self, name: &str) -> Result<usize> {
        self.tables
            .lock()
            .get(name)
            .map(|t| t.rows.len())
            .ok_or_else(|| SinkError::UnknownTable { name: name.into() })
    }

    fn apply(
        &self,
        name: &str,
        table: &Table,
        keys: &[&str],
        values: &[&str],
        mode: WriteMode,
    ) -> Result<UpsertReport> {
        let mut tables = self.tables.lock();
        let stored = tables
            .get_mut(name)
            .ok_or_else(|| SinkError::UnknownTable { name: name.into() })?;

        let layout = Layout::resolve(name, &stored.schema, keys, values)?;
        let key_cells: Vec<&Column> = keys
            .iter()
            .map(|k| table.column(k))
            .collect::<tally_core::Result<_>>()?;
        let value_cells: Vec<&Column> = values
            .iter()
            .map(|v| table.column(v))
            .collect::<tally_core::Result<_>>()?;

        let mut report = UpsertReport::new(name);
        for row in 0..table.row_count() {
            let key: Vec<Value> = key_cells.iter().map(|c| c.values()[row].clone()).collect();
            let incoming: Vec<&Value> = value_cells.iter().map(|c| &c.values()[row]).collect();

            let mut merged = match stored.rows.get(&key) {
                Some(existing) => existing.clone(),
                None => vec![Value::Null; layout.types.len()],
            };
            let existed = stored.rows.contains_key(&key);

            let mut failure = None;
            for (i, cell) in incoming.into_iter().enumerate() {
                let slot = layout.positions[i];
                match combine(&merged[slot], cell, layout.types[slot], existed, mode) {
                    Ok(value) => merged[slot] = value,
                    Err(reason) => {
                        failure = Some(reason);
                        break;
                    }
                }
            }

            match failure {
                Some(reason) => {
                    log::warn!("{}: skipping row {}: {}", name, row, reason);
                    report.failed.push(RowFailure { row, reason });
                }
                None => {
                    stored.rows.insert(key, merged);
                    if existed {
                        report.updated += 1;
                    } else {
                        report.inserted += 1;
                    }
                }
            }
        }
        Ok(report)
    }
}

/// Maps the caller's value columns onto the stored value positions.
struct Layout {
    positions: Vec<usize>,
    types: Vec<DataType>,
}

impl Layout {
    fn resolve(name: &str, schema: &SchemaSpec, keys: &[&str], values: &[&str]) -> Result<Layout> {
        let schema_keys: Vec<&str> = schema.key_columns().map(|c| c.name.as_str()).collect();
        if schema_keys != keys {
            return Err(SinkError::schema(
                name,
                format!("key columns {:?} do not match {:?}", keys, schema_keys),
            ));
        }
        let stored: Vec<_> = schema.value_columns().collect();
        if values.len() != stored.len() {
            return Err(SinkError::schema(
                name,
                format!("expected {} value columns, got {}", stored.len(), values.len()),
            ));
        }
        let positions = values
            .iter()
            .map(|v| {
                stored
                    .iter()
                    .position(|c| c.name == *v)
                    .ok_or_else(|| SinkError::schema(name, format!("unknown value column {}", v)))
            })
            .collect::<Result<Vec<usize>>>()?;
        Ok(Layout {
            positions,
            types: stored.iter().map(|c| c.data_type).collect(),
        })
    }
}

fn combine(
    current: &Value,
    incoming: &Value,
    data_type: DataType,
    existed: bool,
    mode: WriteMode,
) -> std::result::Result<Value, String> {
    if !data_type.is_numeric() {
        return Ok(incoming.clone());
    }
    let amount = incoming
        .to_number()
        .ok_or_else(|| format!("{:?} is not numeric", incoming.to_string()))?;
    let amount = coerce(amount, data_type);
    match (mode, existed) {
        (WriteMode::Accumulate, true) => {
            let base = current.to_number().unwrap_or(Number::ZERO);
            Ok(Value::from(coerce(base + amount, data_type)))
        }
        _ => Ok(Value::from(amount)),
    }
}

/// REAL columns always hold floats so repeated writes keep one cell type.
fn coerce(n: Number, data_type: DataType) -> Number {
    match data_type {
        DataType::Float64 => Number::Float(n.as_f64()),
        _ => n,
    }
}

impl Sink for MemorySink {
    fn create_schema(&self, name: &str, schema: &SchemaSpec) -> Result<()> {
        if schema.key_columns().next().is_none() {
            return Err(SinkError::schema(name, "schema has no key column"));
        }
        let mut tables = self.tables.lock();
        tables.entry(name.to_string()).or_insert_with(|| {
            log::debug!("creating table {} {}", name, schema.to_sql());
            StoredTable {
                schema: schema.clone(),
                rows: BTreeMap::new(),
            }
        });
        Ok(())
    }

    fn upsert(
        &self,
        name: &str,
        table: &Table,
        keys: &[&str],
        values: &[&str],
    ) -> Result<UpsertReport> {
        self.apply(name, table, keys, values, WriteMode::Accumulate)
    }

    fn overwrite(
        &self,
        name: &str,
        table: &Table,
        keys: &[&str],
        values: &[&str],
    ) -> Result<UpsertReport> {
        self.apply(name, table, keys, values, WriteMode::Replace)
    }

    fn snapshot(&self, name: &str) -> Result<Table> {
        let tables = self.tables.lock();
        let stored = tables
            .get(name)
            .ok_or_else(|| SinkError::UnknownTable { name: name.into() })?;

        let schema = &stored.schema;
        let key_names: Vec<&str> = schema.key_columns().map(|c| c.name.as_str()).collect();
        let value_names: Vec<&str> = schema.value_columns().map(|c| c.name.as_str()).collect();
        let mut names = key_names.clone();
        names.extend(value_names.iter().copied());

        let mut out = Table::with_columns(&names)?;
        for (key, values) in &stored.rows {
            let mut row = key.clone();
            row.extend(values.iter().cloned());
            out.push_row(row)?;
        }
        Ok(out)
    }
}
