//! Dynamic cell and filter values.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use crate::error::FilterError;
use crate::filter::DataType;

/// Date input/display format used by date columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A dynamic value held by a grid cell or a filter predicate.
///
/// This enum covers every value shape the grid renders and filters on.
/// It's used in [`Record`](crate::record::Record) to store field values
/// dynamically and in [`ActiveFilter`](crate::filter::ActiveFilter) as
/// the comparison operand.
///
/// # Example
///
/// ```
/// use trestle::value::Value;
///
/// let name = Value::from("Contoso");
/// let age = Value::from(30i64);
/// let active = Value::from(true);
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    Text(String),
    /// Calendar date without a time component.
    Date(NaiveDate),
    /// Collection of values, for multi-valued operators.
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if this is a boolean or numeric value.
    ///
    /// Booleans and numbers are always considered "present" for filter
    /// completeness: `false` and `0` are legitimate comparison operands.
    pub fn is_bool_or_number(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Int(_) | Value::Float(_))
    }

    /// Returns `true` if the value carries usable content.
    ///
    /// Empty strings and empty lists do not count; `false` and `0` do.
    pub fn is_present(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Date(_) => true,
            Value::Text(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::List(_) => "list",
        }
    }

    /// Numeric view of the value, if it has one.
    ///
    /// Used by footer aggregates and numeric comparisons.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// String view of the value, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse raw user input according to a column's data type.
    ///
    /// Empty input parses as [`Value::Null`] for every type; completeness
    /// checking is the caller's concern. Numbers prefer integers and fall
    /// back to floats, dates use [`DATE_FORMAT`].
    ///
    /// # Example
    ///
    /// ```
    /// use trestle::filter::DataType;
    /// use trestle::value::Value;
    ///
    /// let v = Value::parse_typed("30", DataType::Number).unwrap();
    /// assert_eq!(v, Value::Int(30));
    /// assert!(Value::parse_typed("thirty", DataType::Number).is_err());
    /// ```
    pub fn parse_typed(input: &str, data_type: DataType) -> Result<Value, FilterError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        match data_type {
            DataType::Text => Ok(Value::Text(trimmed.to_string())),
            DataType::Number => {
                if let Ok(n) = trimmed.parse::<i64>() {
                    Ok(Value::Int(n))
                } else {
                    trimmed
                        .parse::<f64>()
                        .map(Value::Float)
                        .map_err(|_| FilterError::InvalidValue {
                            value: trimmed.to_string(),
                            expected: data_type,
                        })
                }
            }
            DataType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" => Ok(Value::Bool(true)),
                "false" | "no" => Ok(Value::Bool(false)),
                _ => Err(FilterError::InvalidValue {
                    value: trimmed.to_string(),
                    expected: data_type,
                }),
            },
            DataType::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .map(Value::Date)
                .map_err(|_| FilterError::InvalidValue {
                    value: trimmed.to_string(),
                    expected: data_type,
                }),
        }
    }

    /// Total ordering across values, used for sorting rows.
    ///
    /// Nulls sort first, then values compare within their type bucket;
    /// mixed numeric types compare as floats, everything else falls back
    /// to display-text comparison.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => self.to_string().cmp(&other.to_string()),
            },
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::List(items) => {
                let mut first = true;
                for item in items {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}
