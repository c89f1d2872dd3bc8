//! Static operator catalog.
//!
//! Each entry pairs an operator id with optional per-type display labels.
//! The option list for a column is the catalog filtered to operators with
//! no type restriction, a default label, or an explicit label for the
//! column's type; label resolution prefers the type-specific label, then
//! the default label, then the raw id.

use crate::filter::DataType;

/// Equality.
pub const EQ: &str = "=";
/// Inequality.
pub const NE: &str = "!=";
/// Strictly less than.
pub const LT: &str = "<";
/// Less than or equal.
pub const LE: &str = "<=";
/// Strictly greater than.
pub const GT: &str = ">";
/// Greater than or equal.
pub const GE: &str = ">=";
/// Substring match.
pub const CONTAINS: &str = "contains";
/// Prefix match.
pub const STARTS_WITH: &str = "starts with";
/// Suffix match.
pub const ENDS_WITH: &str = "ends with";
/// Membership in a comma-separated list.
pub const ONE_OF: &str = "one of";
/// Field presence check; takes no comparison value.
pub const EXISTS: &str = "exists";
/// Field absence check; takes no comparison value.
pub const NOT_EXISTS: &str = "not exists";

/// Catalog entry describing one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSpec {
    /// Operator id, the value carried by submitted filters.
    pub id: &'static str,
    /// Label used when no type-specific label applies.
    pub default_label: Option<&'static str>,
    /// Per-type display labels; also acts as the type restriction for
    /// operators without a default label.
    pub type_labels: &'static [(DataType, &'static str)],
    /// `false` for existence checks, which take no comparison value.
    pub needs_value: bool,
}

impl OperatorSpec {
    /// Display label for a column of the given type.
    pub fn label_for(&self, data_type: DataType) -> &'static str {
        self.type_labels
            .iter()
            .find(|(t, _)| *t == data_type)
            .map(|(_, label)| *label)
            .or(self.default_label)
            .unwrap_or(self.id)
    }

    /// Whether this operator is offered for a column of the given type.
    pub fn applies_to(&self, data_type: DataType) -> bool {
        self.type_labels.is_empty()
            || self.default_label.is_some()
            || self.type_labels.iter().any(|(t, _)| *t == data_type)
    }
}

/// The full operator catalog, in display order.
pub static CATALOG: &[OperatorSpec] = &[
    OperatorSpec {
        id: EQ,
        default_label: Some("="),
        type_labels: &[(DataType::Text, "is")],
        needs_value: true,
    },
    OperatorSpec {
        id: NE,
        default_label: Some("!="),
        type_labels: &[(DataType::Text, "is not")],
        needs_value: true,
    },
    OperatorSpec {
        id: LT,
        default_label: None,
        type_labels: &[(DataType::Number, "<"), (DataType::Date, "before")],
        needs_value: true,
    },
    OperatorSpec {
        id: LE,
        default_label: None,
        type_labels: &[(DataType::Number, "<="), (DataType::Date, "on or before")],
        needs_value: true,
    },
    OperatorSpec {
        id: GT,
        default_label: None,
        type_labels: &[(DataType::Number, ">"), (DataType::Date, "after")],
        needs_value: true,
    },
    OperatorSpec {
        id: GE,
        default_label: None,
        type_labels: &[(DataType::Number, ">="), (DataType::Date, "on or after")],
        needs_value: true,
    },
    OperatorSpec {
        id: CONTAINS,
        default_label: None,
        type_labels: &[(DataType::Text, "contains")],
        needs_value: true,
    },
    OperatorSpec {
        id: STARTS_WITH,
        default_label: None,
        type_labels: &[(DataType::Text, "starts with")],
        needs_value: true,
    },
    OperatorSpec {
        id: ENDS_WITH,
        default_label: None,
        type_labels: &[(DataType::Text, "ends with")],
        needs_value: true,
    },
    OperatorSpec {
        id: ONE_OF,
        default_label: None,
        type_labels: &[(DataType::Text, "is one of"), (DataType::Number, "is one of")],
        needs_value: true,
    },
    OperatorSpec {
        id: EXISTS,
        default_label: Some("exists"),
        type_labels: &[],
        needs_value: false,
    },
    OperatorSpec {
        id: NOT_EXISTS,
        default_label: Some("does not exist"),
        type_labels: &[],
        needs_value: false,
    },
];

/// Operators offered for a column of the given type, in catalog order.
pub fn options_for(data_type: DataType) -> Vec<&'static OperatorSpec> {
    CATALOG
        .iter()
        .filter(|spec| spec.applies_to(data_type))
        .collect()
}

/// Looks up a catalog entry by operator id.
pub fn find(id: &str) -> Option<&'static OperatorSpec> {
    CATALOG.iter().find(|spec| spec.id == id)
}

/// Whether the operator id denotes an existence check.
pub fn is_existence(id: &str) -> bool {
    matches!(id, EXISTS | NOT_EXISTS)
}

/// Default operator a freshly picked column resets to.
pub fn default_for(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Text => CONTAINS,
        DataType::Number | DataType::Boolean | DataType::Date => EQ,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_options_exclude_numeric_comparators() {
        let options = options_for(DataType::Text);
        let ids: Vec<&str> = options.iter().map(|o| o.id).collect();
        assert!(ids.contains(&EQ));
        assert!(ids.contains(&CONTAINS));
        assert!(ids.contains(&EXISTS));
        assert!(!ids.contains(&LT));
        assert!(!ids.contains(&GE));
    }

    #[test]
    fn number_options_include_comparators_not_text_ops() {
        let ids: Vec<&str> = options_for(DataType::Number).iter().map(|o| o.id).collect();
        assert!(ids.contains(&LT));
        assert!(ids.contains(&ONE_OF));
        assert!(!ids.contains(&CONTAINS));
        assert!(!ids.contains(&STARTS_WITH));
    }

    #[test]
    fn boolean_options_are_the_unrestricted_set() {
        let ids: Vec<&str> = options_for(DataType::Boolean)
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![EQ, NE, EXISTS, NOT_EXISTS]);
    }

    #[test]
    fn label_resolution_prefers_type_specific() {
        let eq = find(EQ).unwrap();
        assert_eq!(eq.label_for(DataType::Text), "is");
        assert_eq!(eq.label_for(DataType::Number), "=");
        let lt = find(LT).unwrap();
        assert_eq!(lt.label_for(DataType::Date), "before");
        // No default and no entry for the type: falls back to the raw id.
        assert_eq!(lt.label_for(DataType::Boolean), LT);
    }

    #[test]
    fn existence_operators_need_no_value() {
        assert!(is_existence(EXISTS));
        assert!(is_existence(NOT_EXISTS));
        assert!(!is_existence(EQ));
        assert!(!find(EXISTS).unwrap().needs_value);
        assert!(find(EQ).unwrap().needs_value);
    }

    #[test]
    fn defaults_per_type() {
        assert_eq!(default_for(DataType::Number), EQ);
        assert_eq!(default_for(DataType::Text), CONTAINS);
    }
}
