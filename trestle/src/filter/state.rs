//! Filter row widget state.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use ratatui::layout::Rect;

use crate::column::Column;
use crate::debounce::Debouncer;
use crate::events::{EventSink, GridEvent};
use crate::filter::operators;
use crate::filter::operators::OperatorSpec;
use crate::filter::{ActiveFilter, DataType};
use crate::value::Value;

/// Quiet period between the last edit and filter submission.
pub const SUBMIT_DELAY: Duration = Duration::from_millis(500);

/// Dropdown rows shown at once; longer lists scroll with the cursor.
pub(crate) const MAX_VISIBLE_OPTIONS: usize = 10;

/// Unique identifier for a FilterRow widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterRowId(usize);

impl FilterRowId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for FilterRowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__filter_row_{}", self.0)
    }
}

/// Sub-fields of a filter row, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterField {
    /// Column dropdown.
    #[default]
    Column,
    /// Operator dropdown.
    Operator,
    /// Value input.
    Value,
}

#[derive(Debug, Default)]
struct FilterRowInner {
    /// The predicate being edited.
    filter: ActiveFilter,
    /// Leaf columns offered by the column dropdown.
    columns: Vec<Column>,
    /// Focused sub-field.
    focus: FilterField,
    /// Which dropdown is open, if any.
    open: Option<FilterField>,
    /// Dropdown cursor position.
    cursor: usize,
    /// Raw text in the value input.
    value_text: String,
    /// Caret position in `value_text`, in chars.
    value_cursor: usize,
    /// Per-field validation flags.
    path_error: bool,
    operator_error: bool,
    value_error: bool,
    /// Parse failure text shown under the value input.
    value_message: Option<String>,
    /// Whether the remove control is enabled.
    removable: bool,
    /// Rendered sub-areas, absolute coordinates (set during render).
    area: Rect,
    column_area: Rect,
    operator_area: Rect,
    value_area: Rect,
    remove_area: Rect,
    options_area: Rect,
}

/// Editor for a single filter predicate.
///
/// Owns one [`ActiveFilter`] as component-local state, derives the
/// operator options from the selected column's data type, validates after
/// every edit, and submits complete predicates through the event sink
/// after [`SUBMIT_DELAY`] of inactivity (only the latest valid state in
/// the window is emitted). A column change resets the operator to the
/// column's default and clears the value.
///
/// # Example
///
/// ```no_run
/// use trestle::column::Column;
/// use trestle::events::EventSink;
/// use trestle::filter::{DataType, FilterRow};
///
/// let (sink, _rx) = EventSink::channel();
/// let columns = vec![Column::new("age", "Age", DataType::Number)];
/// let row = FilterRow::new(columns, sink);
/// row.set_column(0);
/// assert_eq!(row.filter().operator.as_deref(), Some("="));
/// ```
pub struct FilterRow {
    id: FilterRowId,
    inner: Arc<RwLock<FilterRowInner>>,
    dirty: Arc<AtomicBool>,
    debouncer: Debouncer,
    sink: EventSink,
}

impl Clone for FilterRow {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            debouncer: self.debouncer.clone(),
            sink: self.sink.clone(),
        }
    }
}

impl FilterRow {
    /// Creates an empty filter row over the given leaf columns.
    pub fn new(columns: Vec<Column>, sink: EventSink) -> Self {
        Self {
            id: FilterRowId::new(),
            inner: Arc::new(RwLock::new(FilterRowInner {
                columns,
                removable: true,
                ..Default::default()
            })),
            dirty: Arc::new(AtomicBool::new(true)),
            debouncer: Debouncer::new(SUBMIT_DELAY),
            sink,
        }
    }

    /// Restores an existing predicate into the editor.
    pub fn with_filter(self, filter: ActiveFilter) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.value_text = filter.value.to_string();
            inner.value_cursor = inner.value_text.chars().count();
            inner.filter = filter;
        }
        self
    }

    /// Enables or disables the remove control.
    ///
    /// The trailing empty placeholder row is created non-removable so the
    /// list always retains one editable slot.
    pub fn removable(self, removable: bool) -> Self {
        self.set_removable(removable);
        self
    }

    /// Get the unique ID for this filter row.
    pub fn id(&self) -> FilterRowId {
        self.id
    }

    /// Get the ID as a string (for hit-map registration).
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    // -------------------------------------------------------------------------
    // Predicate state
    // -------------------------------------------------------------------------

    /// The predicate as currently edited.
    pub fn filter(&self) -> ActiveFilter {
        self.inner
            .read()
            .map(|inner| inner.filter.clone())
            .unwrap_or_default()
    }

    /// Leaf columns offered by the column dropdown.
    pub fn columns(&self) -> Vec<Column> {
        self.inner
            .read()
            .map(|inner| inner.columns.clone())
            .unwrap_or_default()
    }

    /// Index of the selected column within [`columns`](Self::columns).
    pub fn selected_column(&self) -> Option<usize> {
        self.inner.read().ok().and_then(|inner| {
            let path = inner.filter.path.as_deref()?;
            inner.columns.iter().position(|c| c.path == path)
        })
    }

    /// Operator options for the selected column's type, in catalog order.
    pub fn operator_options(&self) -> Vec<&'static OperatorSpec> {
        self.data_type()
            .map(operators::options_for)
            .unwrap_or_default()
    }

    /// Data type of the selected column.
    pub fn data_type(&self) -> Option<DataType> {
        self.inner
            .read()
            .map(|inner| inner.filter.data_type)
            .unwrap_or(None)
    }

    /// Selects a column by index in [`columns`](Self::columns).
    ///
    /// A change resets the operator to the column's default and clears
    /// the value; re-picking the current column is a no-op.
    pub fn set_column(&self, index: usize) {
        let changed = match self.inner.write() {
            Ok(mut inner) => {
                let Some(col) = inner.columns.get(index).cloned() else {
                    return;
                };
                if inner.filter.path.as_deref() == Some(col.path.as_str()) {
                    false
                } else {
                    inner.filter.path = Some(col.path.clone());
                    inner.filter.data_type = Some(col.data_type);
                    inner.filter.operator = Some(col.default_operator.clone());
                    inner.filter.value = Value::Null;
                    inner.value_text.clear();
                    inner.value_cursor = 0;
                    inner.value_message = None;
                    true
                }
            }
            Err(_) => false,
        };
        if changed {
            log::debug!("{} column -> {:?}", self.id, self.filter().path);
            self.after_edit(false);
        }
        self.mark_dirty();
    }

    /// Selects an operator by index in [`operator_options`](Self::operator_options).
    ///
    /// Picking an existence operator submits immediately; everything else
    /// goes through the debounce window.
    pub fn set_operator(&self, index: usize) {
        let options = self.operator_options();
        let Some(spec) = options.get(index) else {
            return;
        };
        let changed = match self.inner.write() {
            Ok(mut inner) => {
                if inner.filter.operator.as_deref() == Some(spec.id) {
                    false
                } else {
                    inner.filter.operator = Some(spec.id.to_string());
                    true
                }
            }
            Err(_) => false,
        };
        if changed {
            log::debug!("{} operator -> {}", self.id, spec.id);
            self.after_edit(operators::is_existence(spec.id));
        }
        self.mark_dirty();
    }

    /// Whether the value input is shown.
    ///
    /// Existence operators hide it; the filter then submits with a null
    /// value.
    pub fn shows_value(&self) -> bool {
        self.inner
            .read()
            .map(|inner| {
                !inner
                    .filter
                    .operator
                    .as_deref()
                    .is_some_and(operators::is_existence)
            })
            .unwrap_or(true)
    }

    /// Raw text of the value input.
    pub fn value_text(&self) -> String {
        self.inner
            .read()
            .map(|inner| inner.value_text.clone())
            .unwrap_or_default()
    }

    /// Caret position in chars.
    pub fn value_cursor(&self) -> usize {
        self.inner
            .read()
            .map(|inner| inner.value_cursor)
            .unwrap_or(0)
    }

    /// Replaces the value text wholesale.
    pub fn set_value_text(&self, text: impl Into<String>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.value_text = text.into();
            inner.value_cursor = inner.value_text.chars().count();
        }
        self.after_edit(false);
    }

    /// Inserts a character at the caret.
    pub fn insert_char(&self, ch: char) {
        if let Ok(mut inner) = self.inner.write() {
            let at = byte_index(&inner.value_text, inner.value_cursor);
            inner.value_text.insert(at, ch);
            inner.value_cursor += 1;
        }
        self.after_edit(false);
    }

    /// Deletes the character before the caret.
    pub fn backspace(&self) {
        let mut edited = false;
        if let Ok(mut inner) = self.inner.write() {
            if inner.value_cursor > 0 {
                inner.value_cursor -= 1;
                let at = byte_index(&inner.value_text, inner.value_cursor);
                inner.value_text.remove(at);
                edited = true;
            }
        }
        if edited {
            self.after_edit(false);
        }
    }

    /// Deletes the character under the caret.
    pub fn delete_forward(&self) {
        let mut edited = false;
        if let Ok(mut inner) = self.inner.write() {
            if inner.value_cursor < inner.value_text.chars().count() {
                let at = byte_index(&inner.value_text, inner.value_cursor);
                inner.value_text.remove(at);
                edited = true;
            }
        }
        if edited {
            self.after_edit(false);
        }
    }

    /// Moves the caret left.
    pub fn cursor_left(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.value_cursor = inner.value_cursor.saturating_sub(1);
        }
        self.mark_dirty();
    }

    /// Moves the caret right.
    pub fn cursor_right(&self) {
        if let Ok(mut inner) = self.inner.write() {
            let max = inner.value_text.chars().count();
            inner.value_cursor = (inner.value_cursor + 1).min(max);
        }
        self.mark_dirty();
    }

    /// Moves the caret to the start of the input.
    pub fn cursor_home(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.value_cursor = 0;
        }
        self.mark_dirty();
    }

    /// Moves the caret past the end of the input.
    pub fn cursor_end(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.value_cursor = inner.value_text.chars().count();
        }
        self.mark_dirty();
    }

    // -------------------------------------------------------------------------
    // Validation & submission
    // -------------------------------------------------------------------------

    /// Re-parses the value, refreshes the per-field error flags, and
    /// schedules (or fires) submission when the predicate is complete.
    ///
    /// An edit that leaves the predicate incomplete cancels whatever was
    /// pending, so a stale snapshot never submits.
    fn after_edit(&self, immediate: bool) {
        let snapshot = match self.inner.write() {
            Ok(mut inner) => {
                refresh_value(&mut inner);
                refresh_errors(&mut inner);
                if inner.filter.is_complete() {
                    Some(inner.filter.submission())
                } else {
                    None
                }
            }
            Err(_) => None,
        };
        match snapshot {
            Some(filter) => {
                let sink = self.sink.clone();
                let source = self.id.to_string();
                if immediate {
                    log::debug!("{source} submitting now");
                    self.debouncer
                        .fire_now(move || sink.send(GridEvent::FilterSubmit { source, filter }));
                } else {
                    log::debug!("{source} submission scheduled");
                    self.debouncer
                        .schedule(move || sink.send(GridEvent::FilterSubmit { source, filter }));
                }
            }
            None => self.debouncer.cancel(),
        }
        self.mark_dirty();
    }

    /// Flushes a pending valid submission immediately, if any.
    pub fn flush(&self) {
        let complete = self
            .inner
            .read()
            .map(|inner| inner.filter.is_complete())
            .unwrap_or(false);
        if complete {
            self.after_edit(true);
        }
    }

    /// Reports this row's predicate upward for removal.
    ///
    /// Ignored while the remove control is disabled. Cancels any pending
    /// submission first: the row is going away.
    pub fn remove(&self) {
        if !self.is_removable() {
            return;
        }
        self.debouncer.cancel();
        self.sink.send(GridEvent::FilterRemove {
            source: self.id.to_string(),
            filter: self.filter(),
        });
    }

    /// Whether the remove control is enabled.
    pub fn is_removable(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.removable)
            .unwrap_or(false)
    }

    /// Enables or disables the remove control.
    pub fn set_removable(&self, removable: bool) {
        if let Ok(mut inner) = self.inner.write() {
            inner.removable = removable;
        }
        self.mark_dirty();
    }

    /// Validation flag of the column field.
    pub fn path_error(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.path_error)
            .unwrap_or(false)
    }

    /// Validation flag of the operator field.
    pub fn operator_error(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.operator_error)
            .unwrap_or(false)
    }

    /// Validation flag of the value field.
    pub fn value_error(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.value_error)
            .unwrap_or(false)
    }

    /// Parse failure text shown under the value input.
    pub fn value_message(&self) -> Option<String> {
        self.inner
            .read()
            .map(|inner| inner.value_message.clone())
            .unwrap_or(None)
    }

    // -------------------------------------------------------------------------
    // Focus & dropdown state
    // -------------------------------------------------------------------------

    /// Focused sub-field.
    pub fn focus(&self) -> FilterField {
        self.inner
            .read()
            .map(|inner| inner.focus)
            .unwrap_or_default()
    }

    /// Moves focus to a sub-field, closing any open dropdown.
    pub fn set_focus(&self, field: FilterField) {
        if let Ok(mut inner) = self.inner.write() {
            inner.focus = field;
            inner.open = None;
        }
        self.mark_dirty();
    }

    /// Advances focus; returns `false` when it wrapped past the last
    /// field (the caller should move focus to the next widget).
    pub fn focus_next(&self) -> bool {
        self.cycle_focus(1)
    }

    /// Moves focus backwards; returns `false` when it wrapped.
    pub fn focus_prev(&self) -> bool {
        self.cycle_focus(-1)
    }

    fn cycle_focus(&self, step: isize) -> bool {
        let fields = self.visible_fields();
        let current = self.focus();
        let here = fields.iter().position(|f| *f == current).unwrap_or(0) as isize;
        let next = here + step;
        let wrapped = next < 0 || next >= fields.len() as isize;
        let next = next.rem_euclid(fields.len() as isize) as usize;
        self.set_focus(fields[next]);
        !wrapped
    }

    fn visible_fields(&self) -> Vec<FilterField> {
        let mut fields = vec![FilterField::Column, FilterField::Operator];
        if self.shows_value() {
            fields.push(FilterField::Value);
        }
        fields
    }

    /// Which dropdown is open, if any.
    pub fn open_dropdown(&self) -> Option<FilterField> {
        self.inner.read().map(|inner| inner.open).unwrap_or(None)
    }

    /// Opens the dropdown for a field and seeds its cursor.
    ///
    /// The operator dropdown stays closed until a column is selected:
    /// its options derive from the column's type.
    pub fn open(&self, field: FilterField) {
        let seed = match field {
            FilterField::Column => self.selected_column().unwrap_or(0),
            FilterField::Operator => {
                if self.data_type().is_none() {
                    return;
                }
                let current = self.filter().operator;
                self.operator_options()
                    .iter()
                    .position(|spec| Some(spec.id) == current.as_deref())
                    .unwrap_or(0)
            }
            FilterField::Value => return,
        };
        if let Ok(mut inner) = self.inner.write() {
            inner.focus = field;
            inner.open = Some(field);
            inner.cursor = seed;
        }
        self.mark_dirty();
    }

    /// Closes any open dropdown.
    pub fn close_dropdowns(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.open = None;
        }
        self.mark_dirty();
    }

    /// Dropdown cursor position.
    pub fn cursor(&self) -> usize {
        self.inner.read().map(|inner| inner.cursor).unwrap_or(0)
    }

    /// Jumps the dropdown cursor to an option index.
    pub fn set_cursor(&self, index: usize) {
        let max = self.open_option_count().saturating_sub(1);
        if let Ok(mut inner) = self.inner.write() {
            inner.cursor = index.min(max);
        }
        self.mark_dirty();
    }

    /// Moves the dropdown cursor up.
    pub fn cursor_up(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.cursor = inner.cursor.saturating_sub(1);
        }
        self.mark_dirty();
    }

    /// Moves the dropdown cursor down.
    pub fn cursor_down(&self) {
        let max = self.open_option_count().saturating_sub(1);
        if let Ok(mut inner) = self.inner.write() {
            inner.cursor = (inner.cursor + 1).min(max);
        }
        self.mark_dirty();
    }

    /// Number of options in the currently open dropdown.
    pub fn open_option_count(&self) -> usize {
        match self.open_dropdown() {
            Some(FilterField::Column) => self.columns().len(),
            Some(FilterField::Operator) => self.operator_options().len(),
            _ => 0,
        }
    }

    /// First visible option index, keeping the cursor inside the window.
    pub(crate) fn option_scroll(&self) -> usize {
        self.cursor().saturating_sub(MAX_VISIBLE_OPTIONS - 1)
    }

    /// Picks the option under the dropdown cursor and closes the dropdown.
    pub fn choose_at_cursor(&self) {
        let cursor = self.cursor();
        match self.open_dropdown() {
            Some(FilterField::Column) => self.set_column(cursor),
            Some(FilterField::Operator) => self.set_operator(cursor),
            _ => return,
        }
        self.close_dropdowns();
    }

    /// Lines this widget needs: the field row, an open dropdown, and the
    /// parse message when present.
    pub fn required_height(&self) -> u16 {
        let mut height = 1u16;
        height += self.open_option_count().min(MAX_VISIBLE_OPTIONS) as u16;
        if self.value_message().is_some() {
            height += 1;
        }
        height
    }

    // -------------------------------------------------------------------------
    // Rendered areas (set during render, used for hit handling)
    // -------------------------------------------------------------------------

    pub(crate) fn set_areas(
        &self,
        area: Rect,
        column_area: Rect,
        operator_area: Rect,
        value_area: Rect,
        remove_area: Rect,
        options_area: Rect,
    ) {
        if let Ok(mut inner) = self.inner.write() {
            inner.area = area;
            inner.column_area = column_area;
            inner.operator_area = operator_area;
            inner.value_area = value_area;
            inner.remove_area = remove_area;
            inner.options_area = options_area;
        }
    }

    pub(crate) fn areas(&self) -> (Rect, Rect, Rect, Rect, Rect, Rect) {
        self.inner
            .read()
            .map(|inner| {
                (
                    inner.area,
                    inner.column_area,
                    inner.operator_area,
                    inner.value_area,
                    inner.remove_area,
                    inner.options_area,
                )
            })
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the row needs re-rendering.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Re-parse `value_text` into the predicate's value.
fn refresh_value(inner: &mut FilterRowInner) {
    inner.value_message = None;
    let Some(data_type) = inner.filter.data_type else {
        inner.filter.value = Value::Null;
        return;
    };
    let needs_list = inner.filter.operator.as_deref() == Some(operators::ONE_OF);
    let parsed = if needs_list {
        parse_list(&inner.value_text, data_type)
    } else {
        Value::parse_typed(&inner.value_text, data_type)
    };
    match parsed {
        Ok(value) => inner.filter.value = value,
        Err(err) => {
            inner.filter.value = Value::Null;
            inner.value_message = Some(err.to_string());
        }
    }
}

fn parse_list(text: &str, data_type: DataType) -> Result<Value, crate::error::FilterError> {
    let mut items = Vec::new();
    for piece in text.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        items.push(Value::parse_typed(piece, data_type)?);
    }
    if items.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::List(items))
    }
}

/// Refresh per-field validation flags from the predicate.
fn refresh_errors(inner: &mut FilterRowInner) {
    let filter = &inner.filter;
    inner.path_error = !filter.path.as_deref().is_some_and(|p| !p.is_empty());
    inner.operator_error = !filter.operator.as_deref().is_some_and(|o| !o.is_empty());
    let existence = filter
        .operator
        .as_deref()
        .is_some_and(operators::is_existence);
    inner.value_error = if existence {
        false
    } else {
        inner.value_message.is_some() || !filter.value.is_present()
    };
}
