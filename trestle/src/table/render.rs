//! Table widget rendering.
//!
//! Band layout, top to bottom: group header (only when column groups
//! exist), column headers, data rows for the current page, zero, one, or
//! two footer lines, and the chrome bar. Every interactive cell records
//! its rect for hit handling.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::column::{self, Alignment, Column, ColumnSpec};
use crate::record::Record;
use crate::text;
use crate::theme::GridTheme;
use crate::widget::RenderContext;

use super::state::{PAGE_SIZE_OPTIONS, RenderedAreas, TableView};

/// Selection gutter: two cells for the checkbox glyph and a space.
const GUTTER_WIDTH: u16 = 2;

/// A visible leaf column with its rendered x-position and clipped width.
struct Slot {
    col: Column,
    x: u16,
    w: u16,
}

pub(super) fn draw(
    view: &TableView,
    frame: &mut Frame,
    area: Rect,
    _focused: bool,
    ctx: &mut RenderContext<'_>,
) {
    if area.width < 8 || area.height < 3 {
        return;
    }
    let theme = ctx.theme;
    let grid = view.grid();
    let specs = grid.columns();
    let loading = grid.is_loading();
    let slots = layout_slots(&grid.visible_leaf_columns(), area);

    let has_groups = column::has_groups(&specs);
    let footer_rows = column::footer_row_count(&specs) as u16;
    let bar_y = area.bottom() - 1;
    let mut y = area.y;
    let mut areas = RenderedAreas {
        area,
        ..Default::default()
    };

    if has_groups && y < bar_y {
        draw_group_header(frame, &specs, &slots, area, y, theme);
        y += 1;
    }

    let header_y = y;
    if header_y < bar_y {
        draw_header(view, frame, &slots, area, header_y, theme, &mut areas);
        y += 1;
    }

    // Body: current page, clipped to the space the footers leave.
    let footer_top = bar_y.saturating_sub(footer_rows).max(y);
    let page_rows = grid.page_rows();
    let row_style = dim_if(theme.row, loading, theme);
    let selected_style = dim_if(theme.row_selected, loading, theme);
    if page_rows.is_empty() && y < footer_top {
        let text = text::align("  no rows", area.width as usize, Alignment::Left);
        frame
            .buffer_mut()
            .set_span(area.x, y, &Span::styled(text, theme.chrome.hint), area.width);
    }
    for record in &page_rows {
        if y >= footer_top {
            break;
        }
        let selected = grid.is_selected(record.id());
        let style = if selected { selected_style } else { row_style };
        draw_row(frame, record, selected, &slots, area, y, style);
        areas
            .row_areas
            .push((record.id().to_string(), Rect::new(area.x, y, area.width, 1)));
        areas
            .gutter_areas
            .push((record.id().to_string(), Rect::new(area.x, y, GUTTER_WIDTH, 1)));
        y += 1;
    }

    // Footers aggregate over the whole data set, not the page. With only
    // one kind configured the two conceptual lines collapse into one.
    if footer_rows > 0 {
        let rows = grid.rows();
        let footer_style = dim_if(theme.footer, loading, theme);
        let mut footer_y = footer_top;
        if column::has_column_footers(&specs) && footer_y < bar_y {
            fill_line(frame, area.x, footer_y, area.width, footer_style);
            draw_column_footers(frame, &slots, &rows, footer_y, footer_style);
            footer_y += 1;
        }
        if column::has_group_footers(&specs) && footer_y < bar_y {
            fill_line(frame, area.x, footer_y, area.width, footer_style);
            draw_group_footers(frame, &specs, &slots, &rows, footer_y, footer_style);
        }
    }

    draw_chrome(view, frame, area, bar_y, theme, &mut areas);

    if view.is_size_open() {
        draw_size_options(view, frame, area, theme, &mut areas);
    }

    ctx.hit_map.register(view.id_string(), area, false);
    view.record_areas(areas);
}

fn layout_slots(columns: &[Column], area: Rect) -> Vec<Slot> {
    let mut slots = Vec::with_capacity(columns.len());
    let mut x = area.x + GUTTER_WIDTH;
    for col in columns {
        if x >= area.right() {
            break;
        }
        let w = col.width.min(area.right() - x);
        slots.push(Slot {
            col: col.clone(),
            x,
            w,
        });
        // One separator cell between columns hosts the resize handle.
        x += w + 1;
    }
    slots
}

fn dim_if(style: Style, loading: bool, theme: &GridTheme) -> Style {
    if loading {
        style.patch(theme.loading)
    } else {
        style
    }
}

fn fill_line(frame: &mut Frame, x: u16, y: u16, width: u16, style: Style) {
    let blank = " ".repeat(width as usize);
    frame
        .buffer_mut()
        .set_span(x, y, &Span::styled(blank, style), width);
}

/// Group titles centered over the visible extent of their leaves.
fn draw_group_header(
    frame: &mut Frame,
    specs: &[ColumnSpec],
    slots: &[Slot],
    area: Rect,
    y: u16,
    theme: &GridTheme,
) {
    fill_line(frame, area.x, y, area.width, theme.group_header);
    for spec in specs {
        let ColumnSpec::Group(group) = spec else {
            continue;
        };
        let Some((start, end)) = group_extent(&group.columns, slots) else {
            continue;
        };
        let w = end - start;
        let text = text::align(&group.title, w as usize, Alignment::Center);
        frame
            .buffer_mut()
            .set_span(start, y, &Span::styled(text, theme.group_header), w);
    }
}

/// Visible extent of a set of leaf columns: start x and end x.
fn group_extent(leaves: &[Column], slots: &[Slot]) -> Option<(u16, u16)> {
    let member: Vec<&Slot> = slots
        .iter()
        .filter(|s| leaves.iter().any(|c| c.path == s.col.path))
        .collect();
    let first = member.first()?;
    let last = member.last()?;
    Some((first.x, last.x + last.w))
}

fn draw_header(
    view: &TableView,
    frame: &mut Frame,
    slots: &[Slot],
    area: Rect,
    y: u16,
    theme: &GridTheme,
    areas: &mut RenderedAreas,
) {
    fill_line(frame, area.x, y, area.width, theme.header);
    let sort = view.sort();
    let drag = view.resize();
    for slot in slots {
        let mut title = slot.col.title.clone();
        if let Some((path, ascending)) = &sort
            && *path == slot.col.path
        {
            let indicator = if *ascending { "▲" } else { "▼" };
            // Indicator goes on the padded side so the title stays put.
            title = match slot.col.align {
                Alignment::Right => format!("{indicator} {title}"),
                _ => format!("{title} {indicator}"),
            };
        }
        let cell = text::align(&title, slot.w as usize, slot.col.align);
        frame
            .buffer_mut()
            .set_span(slot.x, y, &Span::styled(cell, theme.header), slot.w);
        areas
            .header_cells
            .push((slot.col.path.clone(), Rect::new(slot.x, y, slot.w, 1)));

        let handle_x = slot.x + slot.w;
        if handle_x < area.right() {
            let active = drag.as_ref().is_some_and(|d| d.path == slot.col.path);
            let style = if active {
                theme.resize_handle.add_modifier(Modifier::REVERSED)
            } else {
                theme.resize_handle
            };
            frame
                .buffer_mut()
                .set_span(handle_x, y, &Span::styled("│", style), 1);
            areas
                .resize_handles
                .push((slot.col.path.clone(), Rect::new(handle_x, y, 1, 1)));
        }
    }
}

fn draw_row(
    frame: &mut Frame,
    record: &Record,
    selected: bool,
    slots: &[Slot],
    area: Rect,
    y: u16,
    style: Style,
) {
    fill_line(frame, area.x, y, area.width, style);
    let glyph = if selected { "■ " } else { "□ " };
    frame
        .buffer_mut()
        .set_span(area.x, y, &Span::styled(glyph, style), GUTTER_WIDTH);
    for slot in slots {
        let value = record.get(&slot.col.path);
        let cell = text::align(&value.to_string(), slot.w as usize, slot.col.align);
        frame
            .buffer_mut()
            .set_span(slot.x, y, &Span::styled(cell, style), slot.w);
    }
}

fn draw_column_footers(
    frame: &mut Frame,
    slots: &[Slot],
    rows: &[Record],
    y: u16,
    style: Style,
) {
    for slot in slots {
        let Some(rule) = &slot.col.footer else {
            continue;
        };
        let value = rule.compute(rows.iter().map(|r| r.get(&slot.col.path)));
        let cell = text::align(&value, slot.w as usize, slot.col.align);
        frame
            .buffer_mut()
            .set_span(slot.x, y, &Span::styled(cell, style), slot.w);
    }
}

/// Group footers span their group's visible extent; the aggregate still
/// draws from the configured source column even when it is hidden.
fn draw_group_footers(
    frame: &mut Frame,
    specs: &[ColumnSpec],
    slots: &[Slot],
    rows: &[Record],
    y: u16,
    style: Style,
) {
    for spec in specs {
        let ColumnSpec::Group(group) = spec else {
            continue;
        };
        let Some(footer) = &group.footer else {
            continue;
        };
        let Some((start, end)) = group_extent(&group.columns, slots) else {
            continue;
        };
        let w = end - start;
        let value = footer.rule.compute(rows.iter().map(|r| r.get(&footer.path)));
        let cell = text::align(
            &format!("{}: {}", footer.label, value),
            w as usize,
            Alignment::Left,
        );
        frame
            .buffer_mut()
            .set_span(start, y, &Span::styled(cell, style), w);
    }
}

fn draw_chrome(
    view: &TableView,
    frame: &mut Frame,
    area: Rect,
    y: u16,
    theme: &GridTheme,
    areas: &mut RenderedAreas,
) {
    let grid = view.grid();
    let chrome = &theme.chrome;
    fill_line(frame, area.x, y, area.width, chrome.bar);

    let page = grid.page();
    let pages = grid.page_count();
    let selected = grid.selection_count();
    let mut x = area.x;

    let style = if page == 0 {
        chrome.button_disabled
    } else {
        chrome.button
    };
    areas.prev_area = put(frame, &mut x, y, area.right(), " ‹ prev ", style);
    put(
        frame,
        &mut x,
        y,
        area.right(),
        &format!(" {}/{} ", page + 1, pages),
        chrome.bar,
    );
    let style = if page + 1 >= pages {
        chrome.button_disabled
    } else {
        chrome.button
    };
    areas.next_area = put(frame, &mut x, y, area.right(), " next › ", style);

    areas.size_area = put(
        frame,
        &mut x,
        y,
        area.right(),
        &format!("  rows: {} ▾ ", grid.page_size()),
        chrome.button,
    );

    let style = if grid.all_columns_visible() {
        chrome.button_disabled
    } else {
        chrome.button
    };
    areas.show_all_area = put(frame, &mut x, y, area.right(), "  show all ", style);

    let style = if selected == 0 {
        chrome.button_disabled
    } else {
        chrome.button
    };
    areas.clear_area = put(
        frame,
        &mut x,
        y,
        area.right(),
        &format!("  clear ({selected}) "),
        style,
    );

    areas.export_area = put(frame, &mut x, y, area.right(), "  export csv ", chrome.button);

    // The loading notice takes the hint's spot rather than adding a line.
    let hint = if grid.is_loading() {
        "loading…"
    } else if grid.is_macos() {
        "⌘-click toggles"
    } else {
        "ctrl-click toggles"
    };
    let hint_w = text::display_width(hint) as u16;
    if x + hint_w + 1 < area.right() {
        let hx = area.right() - hint_w - 1;
        frame
            .buffer_mut()
            .set_span(hx, y, &Span::styled(hint.to_string(), chrome.hint), hint_w);
    }
}

fn put(frame: &mut Frame, x: &mut u16, y: u16, right: u16, label: &str, style: Style) -> Rect {
    if *x >= right {
        return Rect::default();
    }
    let width = (text::display_width(label) as u16).min(right - *x);
    frame
        .buffer_mut()
        .set_span(*x, y, &Span::styled(label.to_string(), style), width);
    let rect = Rect::new(*x, y, width, 1);
    *x += width;
    rect
}

/// Page-size options pop up above the chrome bar.
fn draw_size_options(
    view: &TableView,
    frame: &mut Frame,
    area: Rect,
    theme: &GridTheme,
    areas: &mut RenderedAreas,
) {
    let count = PAGE_SIZE_OPTIONS.len() as u16;
    let bar_y = area.bottom() - 1;
    if bar_y < area.y + count {
        return;
    }
    let top = bar_y - count;
    let width = 6u16.min(area.width);
    let x = areas.size_area.x.min(area.right().saturating_sub(width));
    areas.size_options_area = Rect::new(x, top, width, count);
    let current = view.grid().page_size();
    for (i, size) in PAGE_SIZE_OPTIONS.iter().enumerate() {
        let style = if i == view.size_cursor() {
            theme.field.option_cursor
        } else if *size == current {
            theme.field.option_selected
        } else {
            theme.field.option
        };
        let text = text::align(&format!(" {size}"), width as usize, Alignment::Left);
        frame
            .buffer_mut()
            .set_span(x, top + i as u16, &Span::styled(text, style), width);
    }
}
