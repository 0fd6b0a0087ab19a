//! Cell values and the numeric view used by aggregations.
//!
//! Sources hand tables over with `String` cells. Aggregations read those cells
//! through [`Number`], which keeps integer and decimal sums exact so that
//! adding partial totals in any order gives the same result as one pass over
//! the whole table.

use crate::decimal::Decimal;
use crate::types::DataType;
use alloc::string::{String, ToString};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Add;

/// A value stored in a table cell.
#[derive(Clone, Debug)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit signed integer
    Int64(i64),
    /// Exact fixed-point number
    Decimal(Decimal),
    /// 64-bit floating point
    Float64(f64),
    /// UTF-8 string
    String(String),
}

impl Value {
    /// Returns the data type of this value, or None if it's Null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Decimal(_) => Some(DataType::Decimal),
            Value::Float64(_) => Some(DataType::Float64),
            Value::String(_) => Some(DataType::String),
        }
    }

    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for Null and for strings that are empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the boolean value if this is a Boolean, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the i64 value if this is an Int64, None otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the f64 value if this is a Float64, None otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Interprets the cell as a number.
    ///
    /// Numeric cells convert directly. Strings are trimmed and parsed with
    /// [`Number::parse`], so `"100"` and `"99.90"` stay exact. Non-finite
    /// floats, booleans, nulls and anything unparsable yield `None`.
    pub fn to_number(&self) -> Option<Number> {
        match self {
            Value::Int64(i) => Some(Number::Int(*i)),
            Value::Decimal(d) => Some(Number::exact(*d)),
            Value::Float64(f) if f.is_finite() => Some(Number::Float(*f)),
            Value::String(s) => Number::parse(s),
            _ => None,
        }
    }

    /// Numeric cells as a [`Number`], keeping NaN and infinities.
    fn numeric(&self) -> Option<Number> {
        match self {
            Value::Int64(i) => Some(Number::Int(*i)),
            Value::Decimal(d) => Some(Number::Decimal(*d)),
            Value::Float64(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Returns a type ordering value for comparing different types.
    fn type_order(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Int64(_) => 2,
            Value::Decimal(_) => 3,
            Value::Float64(_) => 4,
            Value::String(_) => 5,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Int64(i) => i.hash(state),
            Value::Decimal(d) => d.hash(state),
            // NaNs compare equal, and so do 0.0 and -0.0
            Value::Float64(f) if f.is_nan() => f64::NAN.to_bits().hash(state),
            Value::Float64(f) if *f == 0.0 => 0.0f64.to_bits().hash(state),
            Value::Float64(f) => f.to_bits().hash(state),
            Value::String(s) => s.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => match (self.numeric(), other.numeric()) {
                // numerically equal cells of different types order by type
                (Some(a), Some(b)) => a
                    .total_cmp(&b)
                    .then_with(|| self.type_order().cmp(&other.type_order())),
                _ => self.type_order().cmp(&other.type_order()),
            },
        }
    }
}

/// NaN sorts above every other float.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(i) => Value::Int64(i),
            Number::Decimal(d) => Value::Decimal(d),
            Number::Float(f) => Value::Float64(f),
        }
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

/// Numeric view of a cell.
///
/// Sums of integers and decimals are exact and kept in canonical form: a whole
/// value that fits an `i64` is an `Int`, anything else a normalized `Decimal`.
/// The result of a sum therefore depends only on its value, never on how the
/// addends were grouped. A float operand, or an overflow past the decimal
/// range, widens the sum to `Float`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// Exact integer
    Int(i64),
    /// Exact fixed-point value
    Decimal(Decimal),
    /// Floating point
    Float(f64),
}

impl Number {
    /// Additive identity.
    pub const ZERO: Number = Number::Int(0);

    /// Parses trimmed text.
    ///
    /// Plain integer and decimal text is read exactly. Exponent forms fall
    /// back to a finite float.
    pub fn parse(text: &str) -> Option<Number> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(i) = text.parse::<i64>() {
            return Some(Number::Int(i));
        }
        if let Some(d) = Decimal::parse(text) {
            return Some(Number::exact(d));
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Some(Number::Float(f)),
            _ => None,
        }
    }

    /// Canonical form of an exact value.
    pub fn exact(d: Decimal) -> Number {
        match d.to_i64() {
            Some(i) => Number::Int(i),
            None => Number::Decimal(d.normalize()),
        }
    }

    /// Returns the value as f64.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Decimal(d) => d.to_f64(),
            Number::Float(f) => *f,
        }
    }

    fn to_decimal(self) -> Option<Decimal> {
        match self {
            Number::Int(i) => Some(Decimal::from(i)),
            Number::Decimal(d) => Some(d),
            Number::Float(_) => None,
        }
    }

    /// Total order by value. NaN sorts above every other number.
    pub fn total_cmp(&self, other: &Number) -> Ordering {
        match (self.to_decimal(), other.to_decimal()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => cmp_f64(self.as_f64(), other.as_f64()),
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::ZERO
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Number) -> Number {
        if let (Number::Int(a), Number::Int(b)) = (self, rhs) {
            if let Some(sum) = a.checked_add(b) {
                return Number::Int(sum);
            }
        }
        match (self.to_decimal(), rhs.to_decimal()) {
            (Some(a), Some(b)) => match a.checked_add(b) {
                Some(sum) => Number::exact(sum),
                None => Number::Float(self.as_f64() + rhs.as_f64()),
            },
            _ => Number::Float(self.as_f64() + rhs.as_f64()),
        }
    }
}

impl core::ops::AddAssign for Number {
    fn add_assign(&mut self, rhs: Number) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Decimal(d) => write!(f, "{}", d),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}
