//! Persisted table schemas and write reports.

use tally_core::DataType;

/// One persisted column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: DataType,
    pub primary_key: bool,
}

/// Column layout of a persisted table. Key columns identify a row; every
/// other column is a value column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaSpec {
    columns: Vec<ColumnSpec>,
}

impl SchemaSpec {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key column.
    pub fn key(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(ColumnSpec {
            name: name.into(),
            data_type,
            primary_key: true,
        });
        self
    }

    /// Adds a value column.
    pub fn value(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(ColumnSpec {
            name: name.into(),
            data_type,
            primary_key: false,
        });
        self
    }

    /// All columns in declaration order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Key columns in declaration order.
    pub fn key_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    /// Value columns in declaration order.
    pub fn value_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| !c.primary_key)
    }

    /// Renders the column list the way a SQL backend would declare it.
    pub fn to_sql(&self) -> String {
        let keys: Vec<&str> = self.key_columns().map(|c| c.name.as_str()).collect();
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.data_type.sql_name()))
            .collect();
        if !keys.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", keys.join(", ")));
        }
        format!("({})", parts.join(", "))
    }
}

/// A row the sink could not write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowFailure {
    pub row: usize,
    pub reason: String,
}

/// Outcome of one upsert call. Failed rows do not stop the remaining rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpsertReport {
    pub table: String,
    pub inserted: usize,
    pub updated: usize,
    pub failed: Vec<RowFailure>,
}

impl UpsertReport {
    /// Creates an empty report for `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Rows written, inserted or updated.
    pub fn written(&self) -> usize {
        self.inserted + self.updated
    }

    /// Returns true if every row was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_sql() {
        let schema = SchemaSpec::new()
            .key("reservation_time", DataType::String)
            .value("price", DataType::Float64);
        assert_eq!(
            schema.to_sql(),
            "(reservation_time TEXT, price REAL, PRIMARY KEY (reservation_time))"
        );
        assert_eq!(schema.key_columns().count(), 1);
        assert_eq!(schema.value_columns().count(), 1);
    }

    #[test]
    fn test_report_counts() {
        let mut report = UpsertReport::new("t");
        report.inserted = 2;
        report.updated = 1;
        assert_eq!(report.written(), 3);
        assert!(report.is_complete());
    }
}
