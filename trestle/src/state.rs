//! Shared grid-state container.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::column;
use crate::column::Column;
use crate::column::ColumnSpec;
use crate::record::Record;

/// Default rows-per-page when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 25;

type SelectionCallback = Arc<dyn Fn(&[Record]) + Send + Sync>;

struct GridInner {
    rows: Vec<Record>,
    columns: Vec<ColumnSpec>,
    page: usize,
    page_size: usize,
    selection: HashSet<String>,
    hidden: HashMap<String, bool>,
    loading: bool,
    macos: bool,
    on_selected_rows_change: Option<SelectionCallback>,
}

/// Externally-owned table state consumed by the grid widgets.
///
/// Holds the current row set, column structure, pagination cursor,
/// selection map keyed by row identity, hidden-columns map, and the
/// loading flag. Handles are cheap clones sharing one interior-locked
/// state; widgets receive a handle at construction and both read state
/// down and call the update methods up.
///
/// The application owns the data: filtering, sorting, and fetching all
/// happen outside and land here via [`set_rows`](GridState::set_rows).
pub struct GridState {
    inner: Arc<RwLock<GridInner>>,
    dirty: Arc<AtomicBool>,
}

impl Clone for GridState {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl GridState {
    /// Creates an empty grid over the given column structure.
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(GridInner {
                rows: Vec::new(),
                columns,
                page: 0,
                page_size: DEFAULT_PAGE_SIZE,
                selection: HashSet::new(),
                hidden: HashMap::new(),
                loading: false,
                macos: cfg!(target_os = "macos"),
                on_selected_rows_change: None,
            })),
            dirty: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Sets the initial rows.
    pub fn with_rows(self, rows: Vec<Record>) -> Self {
        self.set_rows(rows);
        self
    }

    /// Sets the rows-per-page.
    pub fn with_page_size(self, page_size: usize) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.page_size = page_size.max(1);
        }
        self
    }

    /// Overrides macOS detection for the keyboard-hint text.
    pub fn with_macos(self, macos: bool) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.macos = macos;
        }
        self
    }

    /// Registers the selection-change callback.
    ///
    /// Invoked with the currently selected row values whenever the
    /// selection map's contents change.
    pub fn on_selected_rows_change<F>(self, callback: F) -> Self
    where
        F: Fn(&[Record]) + Send + Sync + 'static,
    {
        if let Ok(mut inner) = self.inner.write() {
            inner.on_selected_rows_change = Some(Arc::new(callback));
        }
        self
    }

    // =========================================================================
    // Rows & pagination
    // =========================================================================

    /// Replaces the row set, clamping the page to the new range.
    pub fn set_rows(&self, rows: Vec<Record>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.rows = rows;
            let last = last_page(inner.rows.len(), inner.page_size);
            inner.page = inner.page.min(last);
        }
        self.mark_dirty();
    }

    /// All rows of the current set.
    pub fn rows(&self) -> Vec<Record> {
        self.inner
            .read()
            .map(|inner| inner.rows.clone())
            .unwrap_or_default()
    }

    /// Number of rows in the current set.
    pub fn row_count(&self) -> usize {
        self.inner.read().map(|inner| inner.rows.len()).unwrap_or(0)
    }

    /// Current zero-based page.
    pub fn page(&self) -> usize {
        self.inner.read().map(|inner| inner.page).unwrap_or(0)
    }

    /// Rows-per-page.
    pub fn page_size(&self) -> usize {
        self.inner
            .read()
            .map(|inner| inner.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Number of pages; at least one even when empty.
    pub fn page_count(&self) -> usize {
        self.inner
            .read()
            .map(|inner| last_page(inner.rows.len(), inner.page_size) + 1)
            .unwrap_or(1)
    }

    /// Rows of the current page, in order.
    pub fn page_rows(&self) -> Vec<Record> {
        self.inner
            .read()
            .map(|inner| {
                let start = inner.page * inner.page_size;
                inner
                    .rows
                    .iter()
                    .skip(start)
                    .take(inner.page_size)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Jumps to a page, clamped to the valid range.
    pub fn set_page(&self, page: usize) {
        if let Ok(mut inner) = self.inner.write() {
            let last = last_page(inner.rows.len(), inner.page_size);
            inner.page = page.min(last);
        }
        self.mark_dirty();
    }

    /// Changes the rows-per-page. Always resets the page to 0: a new page
    /// size invalidates prior offsets.
    pub fn set_page_size(&self, page_size: usize) {
        if let Ok(mut inner) = self.inner.write() {
            inner.page_size = page_size.max(1);
            inner.page = 0;
        }
        self.mark_dirty();
    }

    /// Advances one page if possible.
    pub fn next_page(&self) {
        self.set_page(self.page().saturating_add(1));
    }

    /// Goes back one page if possible.
    pub fn prev_page(&self) {
        self.set_page(self.page().saturating_sub(1));
    }

    // =========================================================================
    // Columns & visibility
    // =========================================================================

    /// The column structure, groups included.
    pub fn columns(&self) -> Vec<ColumnSpec> {
        self.inner
            .read()
            .map(|inner| inner.columns.clone())
            .unwrap_or_default()
    }

    /// Replaces the column structure.
    pub fn set_columns(&self, columns: Vec<ColumnSpec>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.columns = columns;
        }
        self.mark_dirty();
    }

    /// Leaf columns that are currently visible, in render order.
    pub fn visible_leaf_columns(&self) -> Vec<Column> {
        self.inner
            .read()
            .map(|inner| {
                column::leaf_columns(&inner.columns)
                    .filter(|c| !*inner.hidden.get(&c.path).unwrap_or(&false))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resizes one column, clamped to its minimum width.
    pub fn set_column_width(&self, path: &str, width: u16) {
        if let Ok(mut inner) = self.inner.write() {
            for col in column::leaf_columns_mut(&mut inner.columns) {
                if col.path == path {
                    col.width = width.max(col.min_width);
                    break;
                }
            }
        }
        self.mark_dirty();
    }

    /// Whether a column is currently hidden.
    pub fn is_hidden(&self, path: &str) -> bool {
        self.inner
            .read()
            .map(|inner| *inner.hidden.get(path).unwrap_or(&false))
            .unwrap_or(false)
    }

    /// Hides or shows one column.
    pub fn set_column_hidden(&self, path: impl Into<String>, hidden: bool) {
        if let Ok(mut inner) = self.inner.write() {
            inner.hidden.insert(path.into(), hidden);
        }
        self.mark_dirty();
    }

    /// Replaces the hidden-columns map.
    pub fn set_hidden_map(&self, hidden: HashMap<String, bool>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.hidden = hidden;
        }
        self.mark_dirty();
    }

    /// Makes every column visible again.
    pub fn show_all_columns(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.hidden.clear();
        }
        self.mark_dirty();
    }

    /// True iff the hidden-columns map is empty or every entry is false.
    pub fn all_columns_visible(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.hidden.is_empty() || inner.hidden.values().all(|&v| !v))
            .unwrap_or(true)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Whether the row with this identity is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.inner
            .read()
            .map(|inner| inner.selection.contains(id))
            .unwrap_or(false)
    }

    /// Number of selected row identities.
    pub fn selection_count(&self) -> usize {
        self.inner
            .read()
            .map(|inner| inner.selection.len())
            .unwrap_or(0)
    }

    /// Selected rows present in the current row set, in row order.
    pub fn selected_rows(&self) -> Vec<Record> {
        self.inner
            .read()
            .map(|inner| selected_of(&inner.rows, &inner.selection))
            .unwrap_or_default()
    }

    /// Toggles one row's membership in the selection.
    pub fn toggle_selected(&self, id: impl Into<String>) {
        let id = id.into();
        self.mutate_selection(|selection| {
            if !selection.remove(&id) {
                selection.insert(id);
            }
            true
        });
    }

    /// Replaces the selection with a single row.
    pub fn select_only(&self, id: impl Into<String>) {
        let id = id.into();
        self.mutate_selection(|selection| {
            if selection.len() == 1 && selection.contains(&id) {
                return false;
            }
            selection.clear();
            selection.insert(id);
            true
        });
    }

    /// Empties the selection map.
    pub fn clear_selection(&self) {
        self.mutate_selection(|selection| {
            if selection.is_empty() {
                return false;
            }
            selection.clear();
            true
        });
    }

    /// Applies `f` to the selection; fires the change callback when `f`
    /// reports a change. The callback runs outside the lock so it may
    /// read this state freely.
    fn mutate_selection(&self, f: impl FnOnce(&mut HashSet<String>) -> bool) {
        let notify = match self.inner.write() {
            Ok(mut inner) => {
                if !f(&mut inner.selection) {
                    return;
                }
                let rows = selected_of(&inner.rows, &inner.selection);
                inner.on_selected_rows_change.clone().map(|cb| (cb, rows))
            }
            Err(_) => None,
        };
        self.mark_dirty();
        if let Some((callback, rows)) = notify {
            log::debug!("selection changed: {} rows", rows.len());
            callback(&rows);
        }
    }

    // =========================================================================
    // Flags
    // =========================================================================

    /// Whether the grid is in the loading state.
    pub fn is_loading(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.loading)
            .unwrap_or(false)
    }

    /// Sets the loading state. Rendering dims; interaction stays enabled.
    pub fn set_loading(&self, loading: bool) {
        if let Ok(mut inner) = self.inner.write() {
            inner.loading = loading;
        }
        self.mark_dirty();
    }

    /// Whether hint text should use macOS key names.
    pub fn is_macos(&self) -> bool {
        self.inner.read().map(|inner| inner.macos).unwrap_or(false)
    }

    /// Whether a re-render is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    /// Acknowledges a render.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::Relaxed);
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Relaxed);
    }
}

fn last_page(row_count: usize, page_size: usize) -> usize {
    if row_count == 0 {
        0
    } else {
        (row_count - 1) / page_size.max(1)
    }
}

fn selected_of(rows: &[Record], selection: &HashSet<String>) -> Vec<Record> {
    rows.iter()
        .filter(|r| selection.contains(r.id()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::filter::DataType;

    fn grid(rows: usize) -> GridState {
        let columns = vec![
            Column::new("name", "Name", DataType::Text).into(),
            Column::new("age", "Age", DataType::Number).into(),
        ];
        let records = (0..rows)
            .map(|i| Record::new(format!("r{i}")).set("age", i as i64))
            .collect();
        GridState::new(columns).with_rows(records)
    }

    #[test]
    fn page_size_change_resets_page() {
        let grid = grid(100).with_page_size(10);
        grid.set_page(7);
        assert_eq!(grid.page(), 7);
        grid.set_page_size(25);
        assert_eq!(grid.page(), 0);
        assert_eq!(grid.page_size(), 25);
    }

    #[test]
    fn page_clamps_to_last() {
        let grid = grid(30).with_page_size(10);
        grid.set_page(99);
        assert_eq!(grid.page(), 2);
        grid.set_rows(Vec::new());
        assert_eq!(grid.page(), 0);
        assert_eq!(grid.page_count(), 1);
    }

    #[test]
    fn page_rows_window() {
        let grid = grid(25).with_page_size(10);
        grid.set_page(2);
        let rows = grid.page_rows();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].id(), "r20");
    }

    #[test]
    fn all_visible_iff_map_empty_or_all_false() {
        let grid = grid(1);
        assert!(grid.all_columns_visible());
        grid.set_column_hidden("age", false);
        assert!(grid.all_columns_visible());
        grid.set_column_hidden("age", true);
        assert!(!grid.all_columns_visible());
        grid.show_all_columns();
        assert!(grid.all_columns_visible());
    }

    #[test]
    fn hidden_columns_drop_out_of_leaves() {
        let grid = grid(1);
        grid.set_column_hidden("name", true);
        let visible: Vec<String> = grid
            .visible_leaf_columns()
            .into_iter()
            .map(|c| c.path)
            .collect();
        assert_eq!(visible, vec!["age".to_string()]);
    }

    #[test]
    fn selection_callback_receives_row_values() {
        let seen: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let grid = grid(3).on_selected_rows_change(move |rows| {
            let ids = rows.iter().map(|r| r.id().to_string()).collect();
            sink.lock().unwrap().push(ids);
        });

        grid.toggle_selected("r1");
        grid.toggle_selected("r2");
        grid.clear_selection();

        let calls = seen.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], vec!["r1"]);
        assert_eq!(calls[1], vec!["r1", "r2"]);
        assert!(calls[2].is_empty());
    }

    #[test]
    fn clearing_empty_selection_does_not_fire() {
        let count = Arc::new(Mutex::new(0usize));
        let sink = count.clone();
        let grid = grid(3).on_selected_rows_change(move |_| {
            *sink.lock().unwrap() += 1;
        });
        grid.clear_selection();
        assert_eq!(*count.lock().unwrap(), 0);
        grid.select_only("r0");
        grid.select_only("r0");
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn resize_clamps_to_min_width() {
        let grid = grid(1);
        grid.set_column_width("age", 2);
        let age = grid
            .visible_leaf_columns()
            .into_iter()
            .find(|c| c.path == "age")
            .unwrap();
        assert_eq!(age.width, age.min_width);
    }
}
