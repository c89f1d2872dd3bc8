//! Column definitions, grouping, and footer aggregates.

use serde::Deserialize;
use serde::Serialize;

use crate::filter::DataType;
use crate::filter::operators;
use crate::value::Value;

/// Horizontal cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    /// Left-aligned (default for text).
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right-aligned (default for numbers).
    Right,
}

/// Aggregate computed for a footer cell over the full current row set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FooterRule {
    /// Number of non-null values.
    Count,
    /// Sum of numeric values.
    Sum,
    /// Arithmetic mean of numeric values.
    Avg,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
}

impl FooterRule {
    /// Compute the footer text for a column's values.
    ///
    /// Non-numeric values are skipped by the numeric aggregates; an empty
    /// input yields an empty string rather than `NaN` noise.
    pub fn compute<'a>(&self, values: impl Iterator<Item = &'a Value>) -> String {
        match self {
            FooterRule::Count => {
                let count = values.filter(|v| !v.is_null()).count();
                count.to_string()
            }
            FooterRule::Sum => {
                let mut sum = 0.0;
                let mut all_int = true;
                let mut any = false;
                for value in values {
                    if let Some(n) = value.as_f64() {
                        sum += n;
                        any = true;
                        if !matches!(value, Value::Int(_)) {
                            all_int = false;
                        }
                    }
                }
                format_aggregate(sum, any, all_int)
            }
            FooterRule::Avg => {
                let mut sum = 0.0;
                let mut count = 0usize;
                for value in values {
                    if let Some(n) = value.as_f64() {
                        sum += n;
                        count += 1;
                    }
                }
                if count == 0 {
                    String::new()
                } else {
                    format!("{:.2}", sum / count as f64)
                }
            }
            FooterRule::Min => extremum(values, std::cmp::Ordering::Less),
            FooterRule::Max => extremum(values, std::cmp::Ordering::Greater),
        }
    }
}

fn format_aggregate(sum: f64, any: bool, all_int: bool) -> String {
    if !any {
        String::new()
    } else if all_int {
        format!("{}", sum as i64)
    } else {
        format!("{sum:.2}")
    }
}

fn extremum<'a>(values: impl Iterator<Item = &'a Value>, keep: std::cmp::Ordering) -> String {
    let mut best: Option<&Value> = None;
    for value in values {
        if value.is_null() {
            continue;
        }
        match best {
            None => best = Some(value),
            Some(current) => {
                if value.compare(current) == keep {
                    best = Some(value);
                }
            }
        }
    }
    best.map(Value::to_string).unwrap_or_default()
}

/// A single leaf column.
///
/// Declares where its cells read from (`path`), how they render (title,
/// width, alignment), and how the filter editor treats the column (data
/// type, default operator).
///
/// # Example
///
/// ```
/// use trestle::column::{Column, FooterRule};
/// use trestle::filter::DataType;
///
/// let age = Column::new("age", "Age", DataType::Number)
///     .width(8)
///     .footer(FooterRule::Avg);
/// assert_eq!(age.default_operator, "=");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Field path into each row's value map; also the column identity.
    pub path: String,
    /// Header text.
    pub title: String,
    /// Current rendered width in terminal cells.
    pub width: u16,
    /// Lower clamp for interactive resizing.
    pub min_width: u16,
    /// Data type, drives operator options and value parsing.
    pub data_type: DataType,
    /// Operator the filter editor resets to when this column is picked.
    pub default_operator: String,
    /// Horizontal cell alignment.
    pub align: Alignment,
    /// Optional per-column footer aggregate.
    pub footer: Option<FooterRule>,
}

impl Column {
    /// Creates a column with type-appropriate defaults.
    ///
    /// Numbers right-align; every type gets its catalog default operator.
    pub fn new(path: impl Into<String>, title: impl Into<String>, data_type: DataType) -> Self {
        let align = match data_type {
            DataType::Number => Alignment::Right,
            _ => Alignment::Left,
        };
        Self {
            path: path.into(),
            title: title.into(),
            width: 12,
            min_width: 4,
            data_type,
            default_operator: operators::default_for(data_type).to_string(),
            align,
            footer: None,
        }
    }

    /// Sets the rendered width.
    pub fn width(mut self, width: u16) -> Self {
        self.width = width.max(self.min_width);
        self
    }

    /// Sets the minimum width used as the resize clamp.
    pub fn min_width(mut self, min_width: u16) -> Self {
        self.min_width = min_width;
        self.width = self.width.max(min_width);
        self
    }

    /// Overrides the default operator.
    pub fn default_operator(mut self, operator: impl Into<String>) -> Self {
        self.default_operator = operator.into();
        self
    }

    /// Sets the alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Declares a per-column footer aggregate.
    pub fn footer(mut self, rule: FooterRule) -> Self {
        self.footer = Some(rule);
        self
    }
}

/// Footer spanning a column group: `label` followed by `rule` computed
/// over the values at `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFooter {
    /// Text rendered before the aggregate.
    pub label: String,
    /// Source column path the aggregate reads from.
    pub path: String,
    /// Aggregate rule.
    pub rule: FooterRule,
}

/// A titled group of columns sharing a spanning header cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnGroup {
    /// Group header text.
    pub title: String,
    /// Member columns, rendered adjacently.
    pub columns: Vec<Column>,
    /// Optional group-level footer spanning the member columns.
    pub footer: Option<GroupFooter>,
}

impl ColumnGroup {
    /// Creates a group from its member columns.
    pub fn new(title: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            title: title.into(),
            columns,
            footer: None,
        }
    }

    /// Declares the group footer.
    pub fn footer(
        mut self,
        label: impl Into<String>,
        path: impl Into<String>,
        rule: FooterRule,
    ) -> Self {
        self.footer = Some(GroupFooter {
            label: label.into(),
            path: path.into(),
            rule,
        });
        self
    }
}

/// One entry of the grid's column structure: a leaf column or a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnSpec {
    /// Ungrouped column.
    Single(Column),
    /// Grouped columns under a spanning header.
    Group(ColumnGroup),
}

impl ColumnSpec {
    /// Leaf columns of this entry, in render order.
    pub fn leaves(&self) -> &[Column] {
        match self {
            ColumnSpec::Single(column) => std::slice::from_ref(column),
            ColumnSpec::Group(group) => &group.columns,
        }
    }

    fn leaves_mut(&mut self) -> &mut [Column] {
        match self {
            ColumnSpec::Single(column) => std::slice::from_mut(column),
            ColumnSpec::Group(group) => &mut group.columns,
        }
    }
}

impl From<Column> for ColumnSpec {
    fn from(column: Column) -> Self {
        ColumnSpec::Single(column)
    }
}

impl From<ColumnGroup> for ColumnSpec {
    fn from(group: ColumnGroup) -> Self {
        ColumnSpec::Group(group)
    }
}

/// Iterate the leaf columns of a column structure in render order.
pub fn leaf_columns(specs: &[ColumnSpec]) -> impl Iterator<Item = &Column> {
    specs.iter().flat_map(ColumnSpec::leaves)
}

/// Mutable variant of [`leaf_columns`].
pub(crate) fn leaf_columns_mut(specs: &mut [ColumnSpec]) -> impl Iterator<Item = &mut Column> {
    specs.iter_mut().flat_map(ColumnSpec::leaves_mut)
}

/// Whether any leaf column declares a per-column footer.
pub fn has_column_footers(specs: &[ColumnSpec]) -> bool {
    leaf_columns(specs).any(|c| c.footer.is_some())
}

/// Whether any group declares a group-level footer.
pub fn has_group_footers(specs: &[ColumnSpec]) -> bool {
    specs.iter().any(|spec| match spec {
        ColumnSpec::Group(group) => group.footer.is_some(),
        ColumnSpec::Single(_) => false,
    })
}

/// Number of footer lines the structure needs: zero, one, or two.
///
/// Per-column footers occupy the first line, group footers the second;
/// either kind alone collapses to a single line.
pub fn footer_row_count(specs: &[ColumnSpec]) -> usize {
    usize::from(has_column_footers(specs)) + usize::from(has_group_footers(specs))
}

/// Whether the structure contains any grouped columns.
pub fn has_groups(specs: &[ColumnSpec]) -> bool {
    specs.iter().any(|s| matches!(s, ColumnSpec::Group(_)))
}
