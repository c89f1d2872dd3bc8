//! Behavioral tests for the table view: footer bands, paging chrome,
//! column resize, and click dispatch against a rendered frame.

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;

use trestle::column::{Column, ColumnGroup, ColumnSpec, FooterRule};
use trestle::events::{ClickModifiers, EventSink, GridEvent};
use trestle::filter::DataType;
use trestle::hit::HitMap;
use trestle::record::Record;
use trestle::state::GridState;
use trestle::table::TableView;
use trestle::theme::GridTheme;
use trestle::widget::{GridWidget, RenderContext};

fn people_columns() -> Vec<ColumnSpec> {
    vec![
        Column::new("name", "Name", DataType::Text).width(10).into(),
        Column::new("age", "Age", DataType::Number)
            .width(6)
            .footer(FooterRule::Avg)
            .into(),
    ]
}

fn grouped_columns(with_column_footer: bool) -> Vec<ColumnSpec> {
    let age = if with_column_footer {
        Column::new("age", "Age", DataType::Number)
            .width(6)
            .footer(FooterRule::Avg)
    } else {
        Column::new("age", "Age", DataType::Number).width(6)
    };
    vec![
        Column::new("name", "Name", DataType::Text).width(10).into(),
        ColumnGroup::new(
            "Stats",
            vec![age, Column::new("score", "Score", DataType::Number).width(9)],
        )
        .footer("Total score", "score", FooterRule::Sum)
        .into(),
    ]
}

fn people(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            Record::new(format!("p{i}"))
                .set("name", format!("Person {i}"))
                .set("age", 20 + (i as i64 % 9))
                .set("score", 10 * i as i64)
        })
        .collect()
}

fn view_over(columns: Vec<ColumnSpec>, rows: usize) -> (TableView, GridState) {
    let (sink, _rx) = EventSink::channel();
    let grid = GridState::new(columns).with_rows(people(rows));
    (TableView::new(grid.clone(), sink), grid)
}

fn draw(view: &TableView, width: u16, height: u16) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("terminal");
    let theme = GridTheme::default();
    let mut hit_map = HitMap::new();
    terminal
        .draw(|frame| {
            let mut ctx = RenderContext {
                theme: &theme,
                hit_map: &mut hit_map,
            };
            view.render(frame, frame.area(), true, &mut ctx);
        })
        .expect("draw frame");
    terminal.backend().buffer().clone()
}

fn buffer_text(buf: &Buffer) -> String {
    let mut lines = Vec::new();
    for y in 0..buf.area.height {
        let line: String = (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect();
        lines.push(line);
    }
    lines.join("\n")
}

/// Screen cell of the first occurrence of `needle`.
fn find_text(buf: &Buffer, needle: &str) -> (u16, u16) {
    for y in 0..buf.area.height {
        let line: String = (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect();
        if let Some(ix) = line.find(needle) {
            return (line[..ix].chars().count() as u16, y);
        }
    }
    panic!("{needle:?} not on screen:\n{}", buffer_text(buf));
}

fn click(view: &TableView, x: u16, y: u16) {
    view.on_click(x, y, ClickModifiers::default());
}

// =============================================================================
// Paging chrome
// =============================================================================

#[test]
fn test_page_size_change_resets_to_first_page() {
    let (view, grid) = view_over(people_columns(), 35);
    grid.set_page_size(10);
    grid.set_page(2);
    assert_eq!(grid.page(), 2);

    view.choose_size(1); // 25
    assert_eq!(grid.page_size(), 25);
    assert_eq!(grid.page(), 0, "page must reset on every size change");
}

#[test]
fn test_prev_next_through_rendered_chrome() {
    let (view, grid) = view_over(people_columns(), 35);
    grid.set_page_size(10);

    let buf = draw(&view, 100, 16);
    let (next_x, next_y) = find_text(&buf, "next ›");
    click(&view, next_x, next_y);
    assert_eq!(grid.page(), 1);

    let buf = draw(&view, 100, 16);
    let (prev_x, prev_y) = find_text(&buf, "‹ prev");
    click(&view, prev_x, prev_y);
    assert_eq!(grid.page(), 0);
}

#[test]
fn test_size_menu_opens_and_applies() {
    let (view, grid) = view_over(people_columns(), 60);
    grid.set_page(1);

    let buf = draw(&view, 100, 16);
    let (x, y) = find_text(&buf, "rows: 25");
    click(&view, x, y);
    assert!(view.is_size_open());

    let buf = draw(&view, 100, 16);
    let (x, y) = find_text(&buf, " 100");
    click(&view, x, y);
    assert_eq!(grid.page_size(), 100);
    assert_eq!(grid.page(), 0);
    assert!(!view.is_size_open());
}

#[test]
fn test_show_all_click_restores_hidden_columns() {
    let (view, grid) = view_over(people_columns(), 5);
    grid.set_column_hidden("age", true);
    assert!(!grid.all_columns_visible());

    let buf = draw(&view, 100, 12);
    assert!(!buffer_text(&buf).contains("Age"), "hidden column rendered");
    let (x, y) = find_text(&buf, "show all");
    click(&view, x, y);
    assert!(grid.all_columns_visible());

    // Disabled once everything is visible: clicking again is a no-op.
    let buf = draw(&view, 100, 12);
    let (x, y) = find_text(&buf, "show all");
    click(&view, x, y);
    assert!(grid.all_columns_visible());
}

#[test]
fn test_loading_dims_without_blocking_input() {
    let (view, grid) = view_over(people_columns(), 35);
    grid.set_page_size(10);
    grid.set_loading(true);

    let buf = draw(&view, 100, 16);
    assert!(buffer_text(&buf).contains("loading…"));
    let (x, y) = find_text(&buf, "next ›");
    click(&view, x, y);
    assert_eq!(grid.page(), 1, "loading must not block interaction");
}

#[test]
fn test_modifier_hint_follows_platform_flag() {
    let (sink, _rx) = EventSink::channel();
    let grid = GridState::new(people_columns())
        .with_rows(people(3))
        .with_macos(true);
    let view = TableView::new(grid.clone(), sink);
    assert!(buffer_text(&draw(&view, 100, 12)).contains("⌘-click"));

    let (sink, _rx) = EventSink::channel();
    let grid = GridState::new(people_columns())
        .with_rows(people(3))
        .with_macos(false);
    let view = TableView::new(grid, sink);
    assert!(buffer_text(&draw(&view, 100, 12)).contains("ctrl-click"));
}

// =============================================================================
// Footer bands
// =============================================================================

#[test]
fn test_no_footers_renders_no_footer_band() {
    let columns = vec![
        ColumnSpec::from(Column::new("name", "Name", DataType::Text).width(10)),
        ColumnSpec::from(Column::new("age", "Age", DataType::Number).width(6)),
    ];
    let (view, _grid) = view_over(columns, 3);
    let text = buffer_text(&draw(&view, 100, 12));
    assert!(!text.contains("Total"));
    assert!(!text.contains("20."));
}

#[test]
fn test_single_kind_collapses_to_one_footer_line() {
    // Group footer only: one line, directly above the chrome bar.
    let (view, _grid) = view_over(grouped_columns(false), 4);
    let buf = draw(&view, 64, 14);
    let (_, total_y) = find_text(&buf, "Total score:");
    assert_eq!(total_y, buf.area.height - 2);
}

#[test]
fn test_both_kinds_render_two_footer_lines() {
    // Ages 20, 21, 22, 23 keep the average recognizable.
    let (view, _grid) = view_over(grouped_columns(true), 4);
    let buf = draw(&view, 64, 14);
    let (_, avg_y) = find_text(&buf, "21.50");
    let (_, total_y) = find_text(&buf, "Total score:");
    assert_eq!(avg_y, buf.area.height - 3, "column footers line first");
    assert_eq!(total_y, buf.area.height - 2, "group footers line second");
}

#[test]
fn test_group_header_spans_its_columns() {
    let (view, _grid) = view_over(grouped_columns(false), 2);
    let buf = draw(&view, 64, 14);
    let (stats_x, stats_y) = find_text(&buf, "Stats");
    let (age_x, age_y) = find_text(&buf, "Age");
    assert_eq!(stats_y, 0);
    assert_eq!(age_y, 1);
    assert!(stats_x >= age_x, "group title sits over its leaves");
}

#[test]
fn test_footers_aggregate_whole_set_not_page() {
    let (view, grid) = view_over(people_columns(), 18);
    grid.set_page_size(5);
    // Ages cycle 20..=28 over 18 rows: average is 24.
    let text = buffer_text(&draw(&view, 100, 16));
    assert!(text.contains("24.00"), "footer must cover all rows:\n{text}");
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn test_click_replaces_selection_and_modifier_toggles() {
    let (view, grid) = view_over(people_columns(), 5);
    let buf = draw(&view, 100, 12);
    let (_, y0) = find_text(&buf, "Person 0");
    let (_, y1) = find_text(&buf, "Person 1");

    click(&view, 8, y0);
    assert!(grid.is_selected("p0"));

    // Plain click on another row replaces the selection.
    click(&view, 8, y1);
    assert!(!grid.is_selected("p0"));
    assert!(grid.is_selected("p1"));

    // Ctrl-click adds to it.
    view.on_click(
        8,
        y0,
        ClickModifiers {
            ctrl: true,
            ..Default::default()
        },
    );
    assert_eq!(grid.selection_count(), 2);

    // The gutter checkbox always toggles.
    click(&view, 0, y1);
    assert_eq!(grid.selection_count(), 1);
    assert!(!grid.is_selected("p1"));

    let text = buffer_text(&draw(&view, 100, 12));
    assert!(text.contains("■"), "selected row shows a filled gutter");
}

#[test]
fn test_clear_selection_through_chrome() {
    let (view, grid) = view_over(people_columns(), 5);
    grid.toggle_selected("p0");
    grid.toggle_selected("p2");

    let buf = draw(&view, 100, 12);
    let (x, y) = find_text(&buf, "clear (2)");
    click(&view, x, y);
    assert_eq!(grid.selection_count(), 0);
}

// =============================================================================
// Sort and export
// =============================================================================

#[test]
fn test_header_click_cycles_sort_direction() {
    let (sink, mut rx) = EventSink::channel();
    let grid = GridState::new(people_columns()).with_rows(people(5));
    let view = TableView::new(grid, sink);

    let buf = draw(&view, 100, 12);
    let (x, y) = find_text(&buf, "Age");
    view.on_click(x, y, ClickModifiers::default());
    assert!(matches!(
        rx.try_recv(),
        Ok(GridEvent::SortChange { ref path, ascending: true }) if path == "age"
    ));
    assert_eq!(view.sort(), Some(("age".to_string(), true)));

    view.on_click(x, y, ClickModifiers::default());
    assert!(matches!(
        rx.try_recv(),
        Ok(GridEvent::SortChange { ascending: false, .. })
    ));

    let text = buffer_text(&draw(&view, 100, 12));
    assert!(text.contains("▼"), "descending indicator on the header");
}

#[test]
fn test_export_is_delegated_upward() {
    let (sink, mut rx) = EventSink::channel();
    let grid = GridState::new(people_columns()).with_rows(people(3));
    let view = TableView::new(grid, sink);

    let buf = draw(&view, 100, 12);
    let (x, y) = find_text(&buf, "export csv");
    view.on_click(x, y, ClickModifiers::default());
    assert!(matches!(rx.try_recv(), Ok(GridEvent::ExportRequested)));
}

// =============================================================================
// Column resize
// =============================================================================

#[test]
fn test_resize_follows_horizontal_displacement() {
    let (view, grid) = view_over(people_columns(), 3);
    let view = view.resizable(true);

    view.begin_resize("name", 40);
    view.update_resize(46);
    assert_eq!(grid.visible_leaf_columns()[0].width, 16);

    // Dragging left shrinks, clamped at the column minimum.
    view.update_resize(20);
    assert_eq!(grid.visible_leaf_columns()[0].width, 4);

    view.end_resize();
    assert_eq!(view.resize(), None);
}

#[test]
fn test_resize_needs_gesture_and_opt_in() {
    let (view, grid) = view_over(people_columns(), 3);

    // No gesture captured: pointer movement changes nothing.
    view.update_resize(55);
    assert_eq!(grid.visible_leaf_columns()[0].width, 10);

    // Resize stays off unless opted in: the handle click is not captured.
    let buf = draw(&view, 100, 12);
    let (_, header_y) = find_text(&buf, "Name");
    let handle_x = 2 + 10; // gutter + first column width
    let result = view.on_click(handle_x, header_y, ClickModifiers::default());
    assert_ne!(result, trestle::events::EventResult::StartDrag);
    assert_eq!(view.resize(), None);
}

#[test]
fn test_handle_click_starts_drag_when_resizable() {
    let (view, _grid) = view_over(people_columns(), 3);
    let view = view.resizable(true);

    let buf = draw(&view, 100, 12);
    let (_, header_y) = find_text(&buf, "Name");
    let handle_x = 2 + 10;
    let result = view.on_click(handle_x, header_y, ClickModifiers::default());
    assert_eq!(result, trestle::events::EventResult::StartDrag);
    let drag = view.resize().expect("drag captured");
    assert_eq!(drag.path, "name");
    assert_eq!(drag.start_x, handle_x);
    assert_eq!(drag.start_width, 10);
}
