//! Rendering for the FilterRow widget.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::column::Alignment;
use crate::text;
use crate::theme::FieldStyles;
use crate::widget::RenderContext;

use super::operators;
use super::state::{FilterField, FilterRow, MAX_VISIBLE_OPTIONS};

const REMOVE_WIDTH: u16 = 3;

/// Draw the field row, the open dropdown, and the parse message, and
/// record the sub-areas for hit handling.
pub(super) fn draw(
    row: &FilterRow,
    frame: &mut Frame,
    area: Rect,
    focused: bool,
    ctx: &mut RenderContext<'_>,
) {
    // Narrowest layout is 8 + 8 + 2 + 3 field cells plus three gaps.
    if area.width < 24 || area.height == 0 {
        return;
    }
    let styles = ctx.theme.field.clone();
    let filter = row.filter();
    let columns = row.columns();

    // Field layout: column, operator, value, remove, one space apart.
    let column_w = 20u16.min(area.width / 4).max(8);
    let operator_w = 14u16.min(area.width / 5).max(8);
    let value_w = area
        .width
        .saturating_sub(column_w + operator_w + REMOVE_WIDTH + 3);
    let column_area = Rect::new(area.x, area.y, column_w, 1);
    let operator_area = Rect::new(column_area.right() + 1, area.y, operator_w, 1);
    let value_area = Rect::new(operator_area.right() + 1, area.y, value_w, 1);
    let remove_area = Rect::new(value_area.right() + 1, area.y, REMOVE_WIDTH, 1);

    let column_title = row
        .selected_column()
        .and_then(|i| columns.get(i))
        .map(|c| c.title.clone());
    let column_style = trigger_style(
        &styles,
        focused && row.focus() == FilterField::Column,
        row.path_error(),
        false,
    );
    draw_trigger(
        frame,
        column_area,
        column_title.as_deref(),
        "column",
        row.open_dropdown() == Some(FilterField::Column),
        column_style,
        &styles,
    );

    let operator_label = match (&filter.operator, filter.data_type) {
        (Some(op), Some(dt)) => Some(
            operators::find(op)
                .map(|spec| spec.label_for(dt).to_string())
                .unwrap_or_else(|| op.clone()),
        ),
        (Some(op), None) => Some(op.clone()),
        (None, _) => None,
    };
    let operator_style = trigger_style(
        &styles,
        focused && row.focus() == FilterField::Operator,
        row.operator_error(),
        filter.data_type.is_none(),
    );
    draw_trigger(
        frame,
        operator_area,
        operator_label.as_deref(),
        "operator",
        row.open_dropdown() == Some(FilterField::Operator),
        operator_style,
        &styles,
    );

    // Existence operators take no value; the input drops out entirely.
    let shows_value = row.shows_value();
    if shows_value && value_w > 0 {
        draw_value(
            frame,
            value_area,
            &row.value_text(),
            row.value_cursor(),
            focused && row.focus() == FilterField::Value,
            row.value_error(),
            &styles,
        );
    }
    let value_hit = if shows_value { value_area } else { Rect::default() };

    let remove_style = if row.is_removable() {
        ctx.theme.chrome.button
    } else {
        ctx.theme.chrome.button_disabled
    };
    frame.render_widget(
        Paragraph::new(Line::styled(" ✕ ", remove_style)),
        remove_area,
    );

    let mut next_y = area.y + 1;

    let mut options_area = Rect::default();
    if let Some(field) = row.open_dropdown() {
        let labels: Vec<String> = match field {
            FilterField::Column => columns.iter().map(|c| c.title.clone()).collect(),
            FilterField::Operator => row
                .operator_options()
                .iter()
                .map(|spec| match filter.data_type {
                    Some(dt) => spec.label_for(dt).to_string(),
                    None => spec.id.to_string(),
                })
                .collect(),
            FilterField::Value => Vec::new(),
        };
        if !labels.is_empty() {
            let anchor = match field {
                FilterField::Operator => operator_area,
                _ => column_area,
            };
            let longest = labels
                .iter()
                .map(|l| text::display_width(l))
                .max()
                .unwrap_or(0) as u16;
            let width = (longest + 2)
                .max(anchor.width)
                .min(area.right().saturating_sub(anchor.x));
            let scroll = row.option_scroll();
            let visible = labels
                .len()
                .saturating_sub(scroll)
                .min(MAX_VISIBLE_OPTIONS)
                .min(area.bottom().saturating_sub(next_y) as usize);
            options_area = Rect::new(anchor.x, next_y, width, visible as u16);
            let selected = match field {
                FilterField::Column => row.selected_column(),
                FilterField::Operator => row
                    .operator_options()
                    .iter()
                    .position(|spec| Some(spec.id) == filter.operator.as_deref()),
                FilterField::Value => None,
            };
            for (line_no, (index, label)) in labels
                .iter()
                .enumerate()
                .skip(scroll)
                .take(visible)
                .enumerate()
            {
                let style = if index == row.cursor() {
                    styles.option_cursor
                } else if Some(index) == selected {
                    styles.option_selected
                } else {
                    styles.option
                };
                frame.render_widget(
                    Paragraph::new(Line::styled(
                        text::align(&format!(" {label}"), width as usize, Alignment::Left),
                        style,
                    )),
                    Rect::new(options_area.x, next_y + line_no as u16, width, 1),
                );
            }
            next_y += visible as u16;
        }
    }

    if let Some(message) = row.value_message() {
        if next_y < area.bottom() {
            let x = if shows_value { value_area.x } else { area.x };
            let width = area.right().saturating_sub(x);
            frame.render_widget(
                Paragraph::new(Line::styled(
                    text::truncate(&message, width as usize),
                    styles.error,
                )),
                Rect::new(x, next_y, width, 1),
            );
            next_y += 1;
        }
    }

    // One hit box covers the row and whatever it grew below it.
    let extent = Rect::new(area.x, area.y, area.width, (next_y - area.y).max(1));
    ctx.hit_map.register(
        row.id_string(),
        extent,
        focused && row.focus() == FilterField::Value && shows_value,
    );
    row.set_areas(
        extent,
        column_area,
        operator_area,
        value_hit,
        remove_area,
        options_area,
    );
}

fn trigger_style(styles: &FieldStyles, focused: bool, error: bool, disabled: bool) -> Style {
    if disabled {
        styles.disabled
    } else if error && !focused {
        styles.error
    } else if focused {
        styles.focused
    } else {
        styles.normal
    }
}

/// Closed dropdown appearance: padded label plus a direction indicator.
fn draw_trigger(
    frame: &mut Frame,
    area: Rect,
    label: Option<&str>,
    placeholder: &str,
    open: bool,
    base: Style,
    styles: &FieldStyles,
) {
    let inner = area.width.saturating_sub(2) as usize;
    let (display, text_style) = match label {
        Some(l) => (l, base),
        None => (placeholder, base.patch(styles.placeholder)),
    };
    let indicator = if open { "▲" } else { "▼" };
    let line = Line::from(vec![
        Span::styled(text::align(display, inner, Alignment::Left), text_style),
        Span::styled(" ", base),
        Span::styled(indicator, base.add_modifier(Modifier::DIM)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Value input with a reverse-video caret, horizontally scrolled so the
/// caret stays visible.
fn draw_value(
    frame: &mut Frame,
    area: Rect,
    value: &str,
    cursor: usize,
    focused: bool,
    error: bool,
    styles: &FieldStyles,
) {
    let width = area.width as usize;
    let base = if focused {
        styles.focused
    } else if error {
        styles.error
    } else {
        styles.normal
    };
    let is_empty = value.is_empty();
    let display = if is_empty { "value" } else { value };
    let text_style = if is_empty {
        base.patch(styles.placeholder)
    } else {
        base
    };

    if !focused {
        frame.render_widget(
            Paragraph::new(Line::styled(
                text::align(display, width, Alignment::Left),
                text_style,
            )),
            area,
        );
        return;
    }

    // Cursor sits at 0 over the placeholder.
    let cursor = if is_empty { 0 } else { cursor };
    let scroll = cursor.saturating_sub(width.saturating_sub(1));
    let chars: Vec<char> = display.chars().skip(scroll).collect();
    let cursor = cursor - scroll;
    let before: String = chars.iter().take(cursor).collect();
    let at: String = chars
        .get(cursor)
        .map(|c| c.to_string())
        .unwrap_or_else(|| " ".to_string());
    let after: String = chars.iter().skip(cursor + 1).collect();
    let used = text::display_width(&before) + text::display_width(&at);
    let line = Line::from(vec![
        Span::styled(before, text_style),
        Span::styled(at, text_style.add_modifier(Modifier::REVERSED)),
        Span::styled(
            text::align(&after, width.saturating_sub(used), Alignment::Left),
            text_style,
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
