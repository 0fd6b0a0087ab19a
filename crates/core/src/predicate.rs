//! Row predicates for [`Table::filter`](crate::Table::filter).

use crate::column::Column;
use crate::error::{Error, Result};
use crate::value::Number;
use alloc::format;
use alloc::string::String;
use core::cmp::Ordering;
use core::str::FromStr;

/// Numeric comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Evaluates `lhs <op> rhs`.
    pub fn eval(&self, lhs: Number, rhs: Number) -> bool {
        let nan = |n: Number| matches!(n, Number::Float(f) if f.is_nan());
        if nan(lhs) || nan(rhs) {
            return false;
        }
        let ord = lhs.total_cmp(&rhs);
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }

    /// Returns the operator's textual form.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

impl FromStr for CompareOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "==" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Le),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Ge),
            other => Err(Error::invalid_predicate(format!("unknown operator {:?}", other))),
        }
    }
}

/// A row filter.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// Keeps rows whose numeric cell in `column` satisfies `op value`.
    Compare {
        column: String,
        op: CompareOp,
        value: Number,
    },
    /// Keeps rows whose entry in a boolean column of equal length is `true`.
    Mask(Column),
}

impl Predicate {
    /// Builds a comparison predicate from an operator string.
    pub fn compare(column: impl Into<String>, op: &str, value: Number) -> Result<Self> {
        Ok(Predicate::Compare {
            column: column.into(),
            op: op.parse()?,
            value,
        })
    }
}
