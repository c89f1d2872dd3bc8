//! Event handling for the FilterRow widget.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};

use crate::events::{ClickModifiers, EventResult};
use crate::widget::{GridWidget, RenderContext};

use super::render;
use super::state::{FilterField, FilterRow};

fn hit(rect: Rect, x: u16, y: u16) -> bool {
    rect.contains(Position { x, y })
}

impl GridWidget for FilterRow {
    fn id(&self) -> String {
        self.id_string()
    }

    fn is_dirty(&self) -> bool {
        FilterRow::is_dirty(self)
    }

    fn clear_dirty(&self) {
        FilterRow::clear_dirty(self)
    }

    fn captures_input(&self) -> bool {
        // Printable keys belong to the value input while it is focused.
        self.focus() == FilterField::Value && self.shows_value()
    }

    fn on_click(&self, x: u16, y: u16, _modifiers: ClickModifiers) -> EventResult {
        let (_, column_area, operator_area, value_area, remove_area, options_area) = self.areas();

        if self.open_dropdown().is_some() && hit(options_area, x, y) {
            let index = self.option_scroll() + (y - options_area.y) as usize;
            if index < self.open_option_count() {
                match self.open_dropdown() {
                    Some(FilterField::Column) => self.set_column(index),
                    Some(FilterField::Operator) => self.set_operator(index),
                    _ => {}
                }
            }
            self.close_dropdowns();
            return EventResult::Consumed;
        }

        if hit(column_area, x, y) {
            if self.open_dropdown() == Some(FilterField::Column) {
                self.close_dropdowns();
                self.set_focus(FilterField::Column);
            } else {
                self.open(FilterField::Column);
            }
            return EventResult::Consumed;
        }

        if hit(operator_area, x, y) {
            // Inert until a column is selected: the options derive from
            // the column's type.
            if self.data_type().is_none() {
                self.close_dropdowns();
            } else if self.open_dropdown() == Some(FilterField::Operator) {
                self.close_dropdowns();
                self.set_focus(FilterField::Operator);
            } else {
                self.open(FilterField::Operator);
            }
            return EventResult::Consumed;
        }

        if hit(value_area, x, y) && self.shows_value() {
            self.set_focus(FilterField::Value);
            return EventResult::Consumed;
        }

        if hit(remove_area, x, y) {
            // No-op while the remove control is disabled.
            self.remove();
            return EventResult::Consumed;
        }

        self.close_dropdowns();
        EventResult::Consumed
    }

    fn on_key(&self, key: &KeyEvent) -> EventResult {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return EventResult::Ignored;
        }

        if self.open_dropdown().is_some() {
            return match key.code {
                KeyCode::Up => {
                    self.cursor_up();
                    EventResult::Consumed
                }
                KeyCode::Down => {
                    self.cursor_down();
                    EventResult::Consumed
                }
                KeyCode::Home => {
                    self.set_cursor(0);
                    EventResult::Consumed
                }
                KeyCode::End => {
                    self.set_cursor(self.open_option_count().saturating_sub(1));
                    EventResult::Consumed
                }
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.choose_at_cursor();
                    EventResult::Consumed
                }
                KeyCode::Esc => {
                    self.close_dropdowns();
                    EventResult::Consumed
                }
                KeyCode::Tab => {
                    self.close_dropdowns();
                    if self.focus_next() {
                        EventResult::Consumed
                    } else {
                        EventResult::Ignored
                    }
                }
                _ => EventResult::Ignored,
            };
        }

        match key.code {
            KeyCode::Tab => {
                if self.focus_next() {
                    EventResult::Consumed
                } else {
                    EventResult::Ignored
                }
            }
            KeyCode::BackTab => {
                if self.focus_prev() {
                    EventResult::Consumed
                } else {
                    EventResult::Ignored
                }
            }
            _ => match self.focus() {
                FilterField::Column => match key.code {
                    KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down => {
                        self.open(FilterField::Column);
                        EventResult::Consumed
                    }
                    _ => EventResult::Ignored,
                },
                FilterField::Operator => match key.code {
                    KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down => {
                        self.open(FilterField::Operator);
                        EventResult::Consumed
                    }
                    _ => EventResult::Ignored,
                },
                FilterField::Value => match key.code {
                    KeyCode::Char(ch) => {
                        self.insert_char(ch);
                        EventResult::Consumed
                    }
                    KeyCode::Backspace => {
                        self.backspace();
                        EventResult::Consumed
                    }
                    KeyCode::Delete => {
                        self.delete_forward();
                        EventResult::Consumed
                    }
                    KeyCode::Left => {
                        self.cursor_left();
                        EventResult::Consumed
                    }
                    KeyCode::Right => {
                        self.cursor_right();
                        EventResult::Consumed
                    }
                    KeyCode::Home => {
                        self.cursor_home();
                        EventResult::Consumed
                    }
                    KeyCode::End => {
                        self.cursor_end();
                        EventResult::Consumed
                    }
                    KeyCode::Enter => {
                        // Flush the pending submission without waiting out
                        // the debounce window.
                        self.flush();
                        EventResult::Consumed
                    }
                    _ => EventResult::Ignored,
                },
            },
        }
    }

    fn on_blur(&self) {
        self.close_dropdowns();
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, ctx: &mut RenderContext<'_>) {
        render::draw(self, frame, area, focused, ctx);
    }
}
