//! Data type definitions for Tally tables.

/// Scalar types a table cell or a persisted column can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    /// Boolean type (true/false)
    Boolean,
    /// 64-bit signed integer
    Int64,
    /// Exact fixed-point number
    Decimal,
    /// 64-bit floating point number
    Float64,
    /// UTF-8 string
    String,
}

impl DataType {
    /// Returns true for the types that take part in sums.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int64 | DataType::Decimal | DataType::Float64
        )
    }

    /// Name used when describing a persisted column.
    pub fn sql_name(&self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int64 => "INTEGER",
            DataType::Decimal => "NUMERIC",
            DataType::Float64 => "REAL",
            DataType::String => "TEXT",
        }
    }
}
