//! Filter predicates and the filter-row editor widget.
//!
//! A filter is a `(path, operator, value)` triple edited by [`FilterRow`]
//! and applied by the consumer. Operator choices derive from the selected
//! column's [`DataType`] through the static catalog in [`operators`].

pub mod operators;

mod events;
mod render;
mod state;

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

pub use state::FilterField;
pub use state::FilterRow;
pub use state::FilterRowId;
pub use state::SUBMIT_DELAY;

use crate::record::Record;
use crate::value::Value;

/// Data-type tag attached to each column.
///
/// Drives the operator option list, value parsing, and default alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Free text.
    Text,
    /// Integer or floating point.
    Number,
    /// True/false.
    Boolean,
    /// Calendar date.
    Date,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Text => "text",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
        };
        f.write_str(name)
    }
}

/// One filter predicate under construction or in effect.
///
/// Instances start empty, are mutated in place by the filter-row editor on
/// every user edit, and are pushed upward (debounced) once complete. A
/// column change resets the dependent fields; see
/// [`FilterRow`](crate::filter::FilterRow).
///
/// # Example
///
/// ```
/// use trestle::filter::{ActiveFilter, DataType};
/// use trestle::value::Value;
///
/// let filter = ActiveFilter {
///     path: Some("age".into()),
///     operator: Some("=".into()),
///     value: Value::Int(30),
///     data_type: Some(DataType::Number),
/// };
/// assert!(filter.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActiveFilter {
    /// Column identifier, or `None` while unselected.
    pub path: Option<String>,
    /// Operator id from the catalog, or `None` while unselected.
    pub operator: Option<String>,
    /// Comparison operand; `Null` while unset and for existence checks.
    pub value: Value,
    /// Data type of the selected column.
    pub data_type: Option<DataType>,
}

impl ActiveFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the filter is submittable.
    ///
    /// Requires a non-empty path, a non-empty operator, and a usable value
    /// unless the operator is an existence check. Booleans and numbers
    /// always count as usable (`false` and `0` are valid operands).
    pub fn is_complete(&self) -> bool {
        let has_path = self.path.as_deref().is_some_and(|p| !p.is_empty());
        let has_operator = self.operator.as_deref().is_some_and(|o| !o.is_empty());
        if !has_path || !has_operator {
            return false;
        }
        let operator = self.operator.as_deref().unwrap_or_default();
        operators::is_existence(operator) || self.value.is_present()
    }

    /// Snapshot handed to consumers on submission.
    ///
    /// Existence operators never carry a comparison value: whatever was
    /// typed earlier is forced to `Null`.
    pub fn submission(&self) -> ActiveFilter {
        let mut out = self.clone();
        if out
            .operator
            .as_deref()
            .is_some_and(operators::is_existence)
        {
            out.value = Value::Null;
        }
        out
    }

    /// Evaluates the predicate against a row.
    ///
    /// An incomplete filter matches everything (it does not constrain).
    pub fn matches(&self, record: &Record) -> bool {
        if !self.is_complete() {
            return true;
        }
        let path = self.path.as_deref().unwrap_or_default();
        let operator = self.operator.as_deref().unwrap_or_default();
        let cell = record.get(path);

        use std::cmp::Ordering;
        match operator {
            operators::EXISTS => record.has(path),
            operators::NOT_EXISTS => !record.has(path),
            operators::EQ => cell.compare(&self.value) == Ordering::Equal,
            operators::NE => cell.compare(&self.value) != Ordering::Equal,
            operators::LT => !cell.is_null() && cell.compare(&self.value) == Ordering::Less,
            operators::GT => !cell.is_null() && cell.compare(&self.value) == Ordering::Greater,
            operators::LE => !cell.is_null() && cell.compare(&self.value) != Ordering::Greater,
            operators::GE => !cell.is_null() && cell.compare(&self.value) != Ordering::Less,
            operators::CONTAINS => text_op(cell, &self.value, |c, n| c.contains(n)),
            operators::STARTS_WITH => text_op(cell, &self.value, |c, n| c.starts_with(n)),
            operators::ENDS_WITH => text_op(cell, &self.value, |c, n| c.ends_with(n)),
            operators::ONE_OF => match &self.value {
                Value::List(items) => items
                    .iter()
                    .any(|item| cell.compare(item) == Ordering::Equal),
                other => cell.compare(other) == Ordering::Equal,
            },
            unknown => {
                log::warn!("unknown operator '{unknown}', filter matches all rows");
                true
            }
        }
    }
}

fn text_op(cell: &Value, needle: &Value, op: impl Fn(&str, &str) -> bool) -> bool {
    if cell.is_null() {
        return false;
    }
    let cell_text = cell.to_string().to_lowercase();
    let needle_text = needle.to_string().to_lowercase();
    op(&cell_text, &needle_text)
}

/// Keeps the rows matching every complete filter.
pub fn apply_filters(filters: &[ActiveFilter], records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .filter(|record| filters.iter().all(|f| f.matches(record)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(path: &str, operator: &str, value: Value) -> ActiveFilter {
        ActiveFilter {
            path: Some(path.into()),
            operator: Some(operator.into()),
            value,
            data_type: None,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            Record::new("a").set("name", "Ada").set("age", 36i64),
            Record::new("b").set("name", "Brin").set("age", 29i64),
            Record::new("c").set("name", "Cole"),
        ]
    }

    #[test]
    fn incomplete_filter_matches_everything() {
        let rows = sample();
        let empty = ActiveFilter::new();
        assert_eq!(apply_filters(&[empty], &rows).len(), 3);
    }

    #[test]
    fn numeric_comparison() {
        let rows = sample();
        let kept = apply_filters(&[filter("age", operators::GT, Value::Int(30))], &rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id(), "a");
    }

    #[test]
    fn comparison_skips_missing_cells() {
        let rows = sample();
        let kept = apply_filters(&[filter("age", operators::LE, Value::Int(100))], &rows);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn existence_checks_presence_not_value() {
        let rows = sample();
        let kept = apply_filters(&[filter("age", operators::EXISTS, Value::Null)], &rows);
        assert_eq!(kept.len(), 2);
        let kept = apply_filters(&[filter("age", operators::NOT_EXISTS, Value::Null)], &rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id(), "c");
    }

    #[test]
    fn contains_is_case_insensitive() {
        let rows = sample();
        let kept = apply_filters(
            &[filter("name", operators::CONTAINS, Value::from("ADA"))],
            &rows,
        );
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn one_of_matches_any_list_member() {
        let rows = sample();
        let list = Value::List(vec![Value::Int(29), Value::Int(99)]);
        let kept = apply_filters(&[filter("age", operators::ONE_OF, list)], &rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id(), "b");
    }

    #[test]
    fn submission_nulls_value_for_existence() {
        let f = filter("age", operators::EXISTS, Value::Int(42));
        assert_eq!(f.submission().value, Value::Null);
        let f = filter("age", operators::EQ, Value::Int(42));
        assert_eq!(f.submission().value, Value::Int(42));
    }
}
