//! Error types for filter editing.

use thiserror::Error;

use crate::filter::DataType;

/// Errors produced while building a filter predicate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// The typed value does not parse as the column's data type.
    #[error("'{value}' is not a valid {expected}")]
    InvalidValue {
        /// The raw text the user entered.
        value: String,
        /// The data type the column expects.
        expected: DataType,
    },
}
