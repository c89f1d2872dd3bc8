//! Demo application: a filter bar stacked above a paged table.
//!
//! The event loop is a thin dispatcher. Crossterm events are hit-tested
//! against the widgets' registered areas and forwarded; widget outcomes
//! come back over the [`GridEvent`] channel and are applied to the shared
//! grid state here.

use std::collections::BTreeMap;
use std::io;

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc;

use trestle::column::leaf_columns;
use trestle::prelude::*;

use crate::data;
use crate::term::TerminalGuard;

pub struct App {
    grid: GridState,
    table: TableView,
    filters: Vec<FilterRow>,
    /// Last submitted predicate per filter-row id.
    active: BTreeMap<String, ActiveFilter>,
    /// Unfiltered dataset; the grid only ever sees the filtered view.
    master: Vec<Record>,
    sink: EventSink,
    events: mpsc::UnboundedReceiver<GridEvent>,
    hit_map: HitMap,
    theme: GridTheme,
    /// Focus ring index: filter rows first, then the table.
    focus: usize,
    /// Widget id owning the in-flight mouse drag, if any.
    drag: Option<String>,
    status: Option<String>,
    quit: bool,
}

impl App {
    pub fn new() -> Self {
        let (sink, events) = EventSink::channel();
        let master = data::records();
        let grid = GridState::new(data::columns())
            .with_rows(master.clone())
            .with_macos(cfg!(target_os = "macos"))
            .on_selected_rows_change(|rows| log::debug!("selection now {} rows", rows.len()));
        let table = TableView::new(grid.clone(), sink.clone()).resizable(true);
        let specs = grid.columns();
        let columns: Vec<Column> = leaf_columns(&specs).cloned().collect();
        let filters = vec![FilterRow::new(columns, sink.clone()).removable(false)];

        Self {
            grid,
            table,
            filters,
            active: BTreeMap::new(),
            master,
            sink,
            events,
            hit_map: HitMap::new(),
            theme: GridTheme::default(),
            focus: 0,
            drag: None,
            status: None,
            quit: false,
        }
    }

    pub async fn run(mut self) -> io::Result<()> {
        let mut guard = TerminalGuard::new()?;
        let mut input = EventStream::new();

        self.draw(&mut guard)?;

        while !self.quit {
            tokio::select! {
                maybe_event = input.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.on_input(event),
                        Some(Err(err)) => {
                            log::error!("input stream error: {err}");
                            break;
                        }
                        None => break,
                    }
                }
                Some(event) = self.events.recv() => self.on_grid_event(event),
            }
            // Apply everything already queued before spending a frame.
            while let Ok(event) = self.events.try_recv() {
                self.on_grid_event(event);
            }
            self.draw(&mut guard)?;
        }

        Ok(())
    }

    // =========================================================================
    // Input dispatch
    // =========================================================================

    fn on_input(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.on_key(key),
            Event::Mouse(mouse) => self.on_mouse(mouse),
            _ => {}
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        // The focused widget sees the key first; app bindings only get
        // what it ignores, so typing "q" into a value input still works.
        let result = match self.focused_widget() {
            Some(widget) => widget.on_key(&key),
            None => EventResult::Ignored,
        };
        if result.is_handled() {
            return;
        }

        match key.code {
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_prev(),
            KeyCode::Char('e') => self.table.export(),
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        let (x, y) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(id) = self.hit_map.hit_test(x, y).map(|hit| hit.id.clone()) else {
                    return;
                };
                self.focus_widget(&id);
                let result = match self.widget_by_id(&id) {
                    Some(widget) => widget.on_click(x, y, ClickModifiers::from(mouse.modifiers)),
                    None => EventResult::Ignored,
                };
                if result == EventResult::StartDrag {
                    self.drag = Some(id);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(id) = self.drag.clone()
                    && let Some(widget) = self.widget_by_id(&id)
                {
                    widget.on_drag(x, y);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(id) = self.drag.take()
                    && let Some(widget) = self.widget_by_id(&id)
                {
                    widget.on_release(x, y);
                }
            }
            _ => {}
        }
    }

    // =========================================================================
    // Focus ring
    // =========================================================================

    fn focused_widget(&self) -> Option<&dyn GridWidget> {
        if self.focus < self.filters.len() {
            self.filters
                .get(self.focus)
                .map(|row| row as &dyn GridWidget)
        } else {
            Some(&self.table)
        }
    }

    fn widget_by_id(&self, id: &str) -> Option<&dyn GridWidget> {
        if self.table.id_string() == id {
            return Some(&self.table);
        }
        self.filters
            .iter()
            .find(|row| row.id_string() == id)
            .map(|row| row as &dyn GridWidget)
    }

    fn focus_widget(&mut self, id: &str) {
        let target = if self.table.id_string() == id {
            self.filters.len()
        } else if let Some(ix) = self.filters.iter().position(|row| row.id_string() == id) {
            ix
        } else {
            return;
        };
        if target != self.focus {
            self.blur_current();
            self.focus = target;
        }
    }

    fn focus_next(&mut self) {
        self.blur_current();
        self.focus = (self.focus + 1) % (self.filters.len() + 1);
    }

    fn focus_prev(&mut self) {
        self.blur_current();
        self.focus = (self.focus + self.filters.len()) % (self.filters.len() + 1);
    }

    fn blur_current(&mut self) {
        if let Some(widget) = self.focused_widget() {
            widget.on_blur();
        }
    }

    // =========================================================================
    // Grid events
    // =========================================================================

    fn on_grid_event(&mut self, event: GridEvent) {
        match event {
            GridEvent::FilterSubmit { source, filter } => {
                log::debug!("filter from {source}: {filter:?}");
                self.active.insert(source.clone(), filter);
                self.grow_filter_bar(&source);
                self.refresh_rows();
            }
            GridEvent::FilterRemove { source, .. } => {
                self.active.remove(&source);
                self.filters.retain(|row| row.id_string() != source);
                if self.filters.is_empty() {
                    let row = self.blank_filter();
                    self.filters.push(row);
                }
                self.focus = self.focus.min(self.filters.len());
                self.refresh_rows();
            }
            GridEvent::SortChange { path, ascending } => {
                log::debug!("sort by {path} {}", if ascending { "asc" } else { "desc" });
                self.refresh_rows();
            }
            GridEvent::ExportRequested => match self.export_csv("trestle-export.csv") {
                Ok(count) => {
                    self.status = Some(format!("wrote trestle-export.csv ({count} rows)"));
                }
                Err(err) => {
                    log::error!("export failed: {err}");
                    self.status = Some(format!("export failed: {err}"));
                }
            },
        }
    }

    /// Keeps one untouched, non-removable row at the end of the bar. Once
    /// that row submits a predicate it becomes a regular removable row and
    /// a fresh blank one is appended after it.
    fn grow_filter_bar(&mut self, source: &str) {
        let submitted_last = self
            .filters
            .last()
            .is_some_and(|row| row.id_string() == source && !row.is_removable());
        if submitted_last {
            if let Some(last) = self.filters.last() {
                last.set_removable(true);
            }
            let row = self.blank_filter();
            self.filters.push(row);
        }
    }

    fn blank_filter(&self) -> FilterRow {
        let specs = self.grid.columns();
        let columns: Vec<Column> = leaf_columns(&specs).cloned().collect();
        FilterRow::new(columns, self.sink.clone()).removable(false)
    }

    /// Re-derives the grid's row set from the master data: filter, then
    /// sort by the table's current order.
    fn refresh_rows(&mut self) {
        let filters: Vec<ActiveFilter> = self.active.values().cloned().collect();
        let mut rows = apply_filters(&filters, &self.master);
        if let Some((path, ascending)) = self.table.sort() {
            rows.sort_by(|a, b| {
                let ordering = a.get(&path).compare(b.get(&path));
                if ascending { ordering } else { ordering.reverse() }
            });
        }
        log::debug!("{} of {} rows match", rows.len(), self.master.len());
        self.grid.set_rows(rows);
    }

    fn export_csv(&self, path: &str) -> io::Result<usize> {
        let columns = self.grid.visible_leaf_columns();
        let rows = self.grid.rows();
        let mut out = String::new();
        let header: Vec<String> = columns.iter().map(|col| csv_field(&col.title)).collect();
        out.push_str(&header.join(","));
        out.push('\n');
        for row in &rows {
            let line: Vec<String> = columns
                .iter()
                .map(|col| csv_field(&row.get(&col.path).to_string()))
                .collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        std::fs::write(path, out)?;
        Ok(rows.len())
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn draw(&mut self, guard: &mut TerminalGuard) -> io::Result<()> {
        guard.terminal().draw(|frame| {
            self.hit_map.clear();
            let mut ctx = RenderContext {
                theme: &self.theme,
                hit_map: &mut self.hit_map,
            };

            let filters_height: u16 = self.filters.iter().map(|row| row.required_height()).sum();
            let [title_area, filter_area, table_area] = Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(filters_height),
                Constraint::Min(5),
            ])
            .areas(frame.area());

            let mut title = vec![
                Span::styled(" trestle demo ", self.theme.chrome.bar),
                Span::raw(" "),
                Span::styled(
                    "tab cycles focus, e exports, q quits",
                    self.theme.chrome.hint,
                ),
            ];
            if let Some(status) = &self.status {
                title.push(Span::raw("  "));
                title.push(Span::styled(status.clone(), self.theme.chrome.bar));
            }
            frame.render_widget(Paragraph::new(Line::from(title)), title_area);

            let mut y = filter_area.y;
            for (ix, row) in self.filters.iter().enumerate() {
                let height = row
                    .required_height()
                    .min(filter_area.bottom().saturating_sub(y));
                if height == 0 {
                    break;
                }
                let slot = Rect::new(filter_area.x, y, filter_area.width, height);
                row.render(frame, slot, self.focus == ix, &mut ctx);
                y += height;
            }

            self.table.render(
                frame,
                table_area,
                self.focus == self.filters.len(),
                &mut ctx,
            );
        })?;

        for row in &self.filters {
            row.clear_dirty();
        }
        self.table.clear_dirty();
        Ok(())
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
