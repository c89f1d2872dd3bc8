//! Table widget state.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use ratatui::layout::Rect;

use crate::events::{EventSink, GridEvent};
use crate::state::GridState;

/// Page sizes offered by the chrome dropdown.
pub const PAGE_SIZE_OPTIONS: &[usize] = &[10, 25, 50, 100];

/// Unique identifier for a TableView widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableViewId(usize);

impl TableViewId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for TableViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__table_{}", self.0)
    }
}

/// In-flight column resize gesture.
///
/// Captured on press over a header boundary; the column width follows the
/// pointer's horizontal displacement from `start_x` until release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeDrag {
    /// Path of the column being resized.
    pub path: String,
    /// Pointer column where the gesture started.
    pub start_x: u16,
    /// Column width when the gesture started.
    pub start_width: u16,
}

#[derive(Debug, Default)]
struct TableInner {
    /// View-side sort order (column path, ascending). The consumer
    /// reorders rows when notified.
    sort: Option<(String, bool)>,
    /// Whether header boundaries can be dragged.
    resizable: bool,
    /// In-flight resize gesture.
    resize: Option<ResizeDrag>,
    /// Page-size dropdown state.
    size_open: bool,
    size_cursor: usize,
    /// Rendered areas, absolute coordinates (set during render).
    area: Rect,
    header_cells: Vec<(String, Rect)>,
    resize_handles: Vec<(String, Rect)>,
    row_areas: Vec<(String, Rect)>,
    gutter_areas: Vec<(String, Rect)>,
    prev_area: Rect,
    next_area: Rect,
    size_area: Rect,
    size_options_area: Rect,
    show_all_area: Rect,
    clear_area: Rect,
    export_area: Rect,
}

/// Paged table over a shared [`GridState`].
///
/// The container owns rows, paging, selection, and column visibility, so
/// several widgets can share one. The view adds what only the table
/// knows: sort order, the resize gesture, dropdown state, and the areas
/// it rendered into. Sort changes and export requests go out through the
/// event sink; everything else mutates the container directly.
pub struct TableView {
    id: TableViewId,
    grid: GridState,
    inner: Arc<RwLock<TableInner>>,
    dirty: Arc<AtomicBool>,
    sink: EventSink,
}

impl Clone for TableView {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            grid: self.grid.clone(),
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            sink: self.sink.clone(),
        }
    }
}

impl TableView {
    /// Creates a table view over a shared state container.
    pub fn new(grid: GridState, sink: EventSink) -> Self {
        Self {
            id: TableViewId::new(),
            grid,
            inner: Arc::new(RwLock::new(TableInner::default())),
            dirty: Arc::new(AtomicBool::new(true)),
            sink,
        }
    }

    /// Enables pointer-drag column resizing.
    pub fn resizable(self, resizable: bool) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.resizable = resizable;
        }
        self
    }

    /// Get the unique ID for this table view.
    pub fn id(&self) -> TableViewId {
        self.id
    }

    /// Get the ID as a string (for hit-map registration).
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    /// The shared state container this view renders.
    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    // -------------------------------------------------------------------------
    // Sort
    // -------------------------------------------------------------------------

    /// Current sort order (column path, ascending).
    pub fn sort(&self) -> Option<(String, bool)> {
        self.inner
            .read()
            .map(|inner| inner.sort.clone())
            .unwrap_or(None)
    }

    /// Restores a sort order without notifying the consumer.
    pub fn set_sort(&self, sort: Option<(String, bool)>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.sort = sort;
        }
        self.mark_dirty();
    }

    /// Cycles the sort on a column: ascending, then descending, and
    /// notifies the consumer.
    pub fn toggle_sort(&self, path: &str) {
        let next = match self.sort() {
            Some((p, ascending)) if p == path => (p, !ascending),
            _ => (path.to_string(), true),
        };
        if let Ok(mut inner) = self.inner.write() {
            inner.sort = Some(next.clone());
        }
        log::debug!("{} sort -> {} {}", self.id, next.0, next.1);
        self.sink.send(GridEvent::SortChange {
            path: next.0,
            ascending: next.1,
        });
        self.mark_dirty();
    }

    // -------------------------------------------------------------------------
    // Column resize
    // -------------------------------------------------------------------------

    /// Whether header boundaries can be dragged.
    pub fn is_resizable(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.resizable)
            .unwrap_or(false)
    }

    /// In-flight resize gesture, if any.
    pub fn resize(&self) -> Option<ResizeDrag> {
        self.inner
            .read()
            .map(|inner| inner.resize.clone())
            .unwrap_or(None)
    }

    /// Starts a resize gesture on a column's boundary.
    pub fn begin_resize(&self, path: &str, x: u16) {
        let Some(start_width) = self
            .grid
            .visible_leaf_columns()
            .iter()
            .find(|c| c.path == path)
            .map(|c| c.width)
        else {
            return;
        };
        if let Ok(mut inner) = self.inner.write() {
            inner.resize = Some(ResizeDrag {
                path: path.to_string(),
                start_x: x,
                start_width,
            });
        }
        log::debug!("{} resize start {path} at x={x}", self.id);
        self.mark_dirty();
    }

    /// Follows the pointer: width is the start width plus the horizontal
    /// displacement (the container clamps to the column minimum).
    pub fn update_resize(&self, x: u16) {
        let Some(drag) = self.resize() else {
            return;
        };
        let width = drag.start_width as i32 + (x as i32 - drag.start_x as i32);
        self.grid.set_column_width(&drag.path, width.max(1) as u16);
        self.mark_dirty();
    }

    /// Ends the resize gesture.
    pub fn end_resize(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.resize = None;
        }
        self.mark_dirty();
    }

    // -------------------------------------------------------------------------
    // Page-size dropdown
    // -------------------------------------------------------------------------

    /// Whether the page-size dropdown is open.
    pub fn is_size_open(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.size_open)
            .unwrap_or(false)
    }

    /// Opens the page-size dropdown with the cursor on the current size.
    pub fn open_size_menu(&self) {
        let seed = PAGE_SIZE_OPTIONS
            .iter()
            .position(|s| *s == self.grid.page_size())
            .unwrap_or(0);
        if let Ok(mut inner) = self.inner.write() {
            inner.size_open = true;
            inner.size_cursor = seed;
        }
        self.mark_dirty();
    }

    /// Closes the page-size dropdown.
    pub fn close_size_menu(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.size_open = false;
        }
        self.mark_dirty();
    }

    /// Page-size dropdown cursor.
    pub fn size_cursor(&self) -> usize {
        self.inner
            .read()
            .map(|inner| inner.size_cursor)
            .unwrap_or(0)
    }

    /// Moves the page-size cursor up.
    pub fn size_cursor_up(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.size_cursor = inner.size_cursor.saturating_sub(1);
        }
        self.mark_dirty();
    }

    /// Moves the page-size cursor down.
    pub fn size_cursor_down(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.size_cursor = (inner.size_cursor + 1).min(PAGE_SIZE_OPTIONS.len() - 1);
        }
        self.mark_dirty();
    }

    /// Applies the page size under the cursor and closes the dropdown.
    ///
    /// Goes through the container, so the page snaps back to the first.
    pub fn choose_size_at_cursor(&self) {
        let cursor = self.size_cursor();
        if let Some(size) = PAGE_SIZE_OPTIONS.get(cursor) {
            self.grid.set_page_size(*size);
        }
        self.close_size_menu();
    }

    /// Applies one of [`PAGE_SIZE_OPTIONS`] by index.
    pub fn choose_size(&self, index: usize) {
        if let Some(size) = PAGE_SIZE_OPTIONS.get(index) {
            self.grid.set_page_size(*size);
        }
        self.close_size_menu();
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    /// Asks the consumer to export the current data set.
    ///
    /// The table renders the trigger only; serialization stays outside.
    pub fn export(&self) {
        self.sink.send(GridEvent::ExportRequested);
    }

    // -------------------------------------------------------------------------
    // Rendered areas (set during render, used for hit handling)
    // -------------------------------------------------------------------------

    pub(super) fn record_areas(&self, areas: RenderedAreas) {
        if let Ok(mut inner) = self.inner.write() {
            inner.area = areas.area;
            inner.header_cells = areas.header_cells;
            inner.resize_handles = areas.resize_handles;
            inner.row_areas = areas.row_areas;
            inner.gutter_areas = areas.gutter_areas;
            inner.prev_area = areas.prev_area;
            inner.next_area = areas.next_area;
            inner.size_area = areas.size_area;
            inner.size_options_area = areas.size_options_area;
            inner.show_all_area = areas.show_all_area;
            inner.clear_area = areas.clear_area;
            inner.export_area = areas.export_area;
        }
    }

    pub(super) fn header_at(&self, x: u16, y: u16) -> Option<String> {
        self.lookup(x, y, |inner| inner.header_cells.clone())
    }

    pub(super) fn handle_at(&self, x: u16, y: u16) -> Option<String> {
        self.lookup(x, y, |inner| inner.resize_handles.clone())
    }

    pub(super) fn row_at(&self, x: u16, y: u16) -> Option<String> {
        self.lookup(x, y, |inner| inner.row_areas.clone())
    }

    pub(super) fn gutter_at(&self, x: u16, y: u16) -> Option<String> {
        self.lookup(x, y, |inner| inner.gutter_areas.clone())
    }

    fn lookup(
        &self,
        x: u16,
        y: u16,
        pick: impl Fn(&TableInner) -> Vec<(String, Rect)>,
    ) -> Option<String> {
        let entries = self.inner.read().map(|inner| pick(&inner)).ok()?;
        entries
            .into_iter()
            .find(|(_, rect)| contains(*rect, x, y))
            .map(|(id, _)| id)
    }

    pub(super) fn chrome_areas(&self) -> ChromeAreas {
        self.inner
            .read()
            .map(|inner| ChromeAreas {
                prev: inner.prev_area,
                next: inner.next_area,
                size: inner.size_area,
                size_options: inner.size_options_area,
                show_all: inner.show_all_area,
                clear: inner.clear_area,
                export: inner.export_area,
            })
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the view or its container needs re-rendering.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst) || self.grid.is_dirty()
    }

    /// Clear both dirty flags.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
        self.grid.clear_dirty();
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }
}

pub(super) fn contains(rect: Rect, x: u16, y: u16) -> bool {
    rect.contains(ratatui::layout::Position { x, y })
}

/// Everything the renderer measured this frame.
#[derive(Debug, Default)]
pub(super) struct RenderedAreas {
    pub area: Rect,
    pub header_cells: Vec<(String, Rect)>,
    pub resize_handles: Vec<(String, Rect)>,
    pub row_areas: Vec<(String, Rect)>,
    pub gutter_areas: Vec<(String, Rect)>,
    pub prev_area: Rect,
    pub next_area: Rect,
    pub size_area: Rect,
    pub size_options_area: Rect,
    pub show_all_area: Rect,
    pub clear_area: Rect,
    pub export_area: Rect,
}

/// Chrome rects used by click dispatch.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct ChromeAreas {
    pub prev: Rect,
    pub next: Rect,
    pub size: Rect,
    pub size_options: Rect,
    pub show_all: Rect,
    pub clear: Rect,
    pub export: Rect,
}
